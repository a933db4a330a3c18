//! Turns a line typed at the terminal into a session action.

use quiz_core::model::{Catalog, CategoryId, DraftUpdate, Question, QuestionKind};
use quiz_core::session::SessionPhase;

/// What the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Select(CategoryId),
    Update(DraftUpdate),
    Submit,
    Next,
    Back,
    Restart,
    Save,
    Help,
    Quit,
    /// Nothing to do for this line in the current phase.
    Ignore,
    Invalid(String),
}

/// Interpret `line` for the given phase.
///
/// Lines starting with `:` are commands in every phase. An empty line submits
/// while answering and moves on while feedback is shown. Anything else is an
/// answer to `question`, or a category choice at the menu.
#[must_use]
pub fn parse_line(
    line: &str,
    phase: SessionPhase,
    catalog: &Catalog,
    question: Option<&Question>,
) -> Input {
    let line = line.trim();

    if let Some(command) = line.strip_prefix(':') {
        return parse_command(command.trim());
    }

    match phase {
        SessionPhase::SelectingCategory => parse_category(line, catalog),
        SessionPhase::Answering => match (line.is_empty(), question) {
            (true, _) => Input::Submit,
            (false, Some(question)) => parse_answer(line, question),
            (false, None) => Input::Ignore,
        },
        SessionPhase::ShowingFeedback => {
            if line.is_empty() {
                Input::Next
            } else {
                Input::Invalid("press Enter or type :next to continue".into())
            }
        }
        SessionPhase::Completed => {
            if line.is_empty() {
                Input::Ignore
            } else {
                parse_category(line, catalog)
            }
        }
    }
}

fn parse_command(command: &str) -> Input {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    match name.as_str() {
        "s" | "submit" => Input::Submit,
        "n" | "next" => Input::Next,
        "b" | "back" | "menu" => Input::Back,
        "r" | "restart" => Input::Restart,
        "save" => Input::Save,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        "clear" => match parts.next().and_then(parse_position) {
            Some(left) => Input::Update(DraftUpdate::Unmatch { left }),
            None => Input::Invalid("usage: :clear <left number>".into()),
        },
        other => Input::Invalid(format!("unknown command :{other}")),
    }
}

fn parse_category(line: &str, catalog: &Catalog) -> Input {
    if let Some(index) = parse_position(line) {
        return catalog
            .categories()
            .get(index)
            .map_or_else(
                || Input::Invalid(format!("no category number {line}")),
                |c| Input::Select(c.id().clone()),
            );
    }
    match line.parse::<CategoryId>() {
        Ok(id) => Input::Select(id),
        Err(_) => Input::Invalid("pick a category by number or id".into()),
    }
}

fn parse_answer(line: &str, question: &Question) -> Input {
    match question.kind() {
        QuestionKind::TrueFalse { .. } => match line.to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" => Input::Update(DraftUpdate::Boolean(true)),
            "f" | "false" | "n" | "no" => Input::Update(DraftUpdate::Boolean(false)),
            _ => Input::Invalid("answer true or false".into()),
        },
        QuestionKind::MultipleChoice { .. } => match parse_position(line) {
            Some(index) => Input::Update(DraftUpdate::Choice(index)),
            None => Input::Invalid("answer with an option number".into()),
        },
        QuestionKind::Matching { .. } => parse_match(line),
        QuestionKind::FillBlank { .. } | QuestionKind::ShortQuestion { .. } => {
            Input::Update(DraftUpdate::Text(line.to_owned()))
        }
    }
}

/// `"2 c"`, `"2c"` or `"2 3"` pairs left item 2 with right item c (3).
fn parse_match(line: &str) -> Input {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let split = compact
        .find(|c: char| !c.is_ascii_digit())
        .filter(|&i| i > 0);

    let (left, right) = match split {
        Some(i) => (&compact[..i], &compact[i..]),
        None => {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(l), Some(r), None) => (l, r),
                _ => return Input::Invalid("pair items like `1 b`".into()),
            }
        }
    };

    match (parse_position(left), parse_letter_or_number(right)) {
        (Some(left), Some(right)) => Input::Update(DraftUpdate::Match { left, right }),
        _ => Input::Invalid("pair items like `1 b`".into()),
    }
}

/// 1-based number to 0-based index.
fn parse_position(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn parse_letter_or_number(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(usize::from(c.to_ascii_lowercase() as u8 - b'a'))
        }
        _ => parse_position(raw),
    }
}

/// Right-hand label for index `i` in a matching question.
#[must_use]
pub fn letter(i: usize) -> char {
    u8::try_from(i)
        .ok()
        .filter(|&i| i < 26)
        .map_or('?', |i| char::from(b'a' + i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Category, QuestionId};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn question(kind: QuestionKind) -> Question {
        Question::new(QuestionId::new(1), "Prompt", "", kind).unwrap()
    }

    fn catalog() -> Catalog {
        let q = question(QuestionKind::TrueFalse { correct: true });
        let a = Category::new(CategoryId::new("sleep"), "Sleep", "", vec![q.clone()]).unwrap();
        let b = Category::new(CategoryId::new("food"), "Food", "", vec![q]).unwrap();
        Catalog::new(vec![a, b]).unwrap()
    }

    #[test]
    fn commands_work_in_every_phase() {
        let catalog = catalog();
        for phase in [
            SessionPhase::SelectingCategory,
            SessionPhase::Answering,
            SessionPhase::ShowingFeedback,
            SessionPhase::Completed,
        ] {
            assert_eq!(parse_line(":quit", phase, &catalog, None), Input::Quit);
            assert_eq!(parse_line(" :Next ", phase, &catalog, None), Input::Next);
            assert_eq!(parse_line(":restart", phase, &catalog, None), Input::Restart);
        }
    }

    #[test]
    fn menu_accepts_number_or_id() {
        let catalog = catalog();
        let phase = SessionPhase::SelectingCategory;
        assert_eq!(
            parse_line("2", phase, &catalog, None),
            Input::Select(CategoryId::new("food"))
        );
        assert_eq!(
            parse_line("sleep", phase, &catalog, None),
            Input::Select(CategoryId::new("sleep"))
        );
        assert!(matches!(
            parse_line("9", phase, &catalog, None),
            Input::Invalid(_)
        ));
    }

    #[test]
    fn empty_line_submits_or_continues() {
        let catalog = catalog();
        let q = question(QuestionKind::TrueFalse { correct: true });
        assert_eq!(
            parse_line("", SessionPhase::Answering, &catalog, Some(&q)),
            Input::Submit
        );
        assert_eq!(
            parse_line("", SessionPhase::ShowingFeedback, &catalog, Some(&q)),
            Input::Next
        );
    }

    #[test]
    fn answers_follow_question_type() {
        let catalog = catalog();
        let phase = SessionPhase::Answering;

        let tf = question(QuestionKind::TrueFalse { correct: true });
        assert_eq!(
            parse_line("No", phase, &catalog, Some(&tf)),
            Input::Update(DraftUpdate::Boolean(false))
        );

        let mc = question(QuestionKind::MultipleChoice {
            options: strings(&["a", "b"]),
            correct_index: 0,
        });
        assert_eq!(
            parse_line("2", phase, &catalog, Some(&mc)),
            Input::Update(DraftUpdate::Choice(1))
        );
        assert!(matches!(
            parse_line("0", phase, &catalog, Some(&mc)),
            Input::Invalid(_)
        ));

        let fill = question(QuestionKind::FillBlank {
            acceptable_answers: strings(&["water"]),
        });
        assert_eq!(
            parse_line("  Water ", phase, &catalog, Some(&fill)),
            Input::Update(DraftUpdate::Text("Water".into()))
        );
    }

    #[test]
    fn matching_pairs_accept_letters_and_numbers() {
        let catalog = catalog();
        let phase = SessionPhase::Answering;
        let m = question(QuestionKind::Matching {
            left_items: strings(&["x", "y"]),
            right_items: strings(&["p", "q"]),
            correct_mapping: vec![1, 0],
        });

        for line in ["2 a", "2a", "2 1"] {
            assert_eq!(
                parse_line(line, phase, &catalog, Some(&m)),
                Input::Update(DraftUpdate::Match { left: 1, right: 0 }),
                "{line}"
            );
        }
        assert_eq!(
            parse_line(":clear 1", phase, &catalog, Some(&m)),
            Input::Update(DraftUpdate::Unmatch { left: 0 })
        );
        assert!(matches!(
            parse_line("a b", phase, &catalog, Some(&m)),
            Input::Invalid(_)
        ));
    }

    #[test]
    fn letters_label_right_items() {
        assert_eq!(letter(0), 'a');
        assert_eq!(letter(2), 'c');
        assert_eq!(letter(40), '?');
    }
}
