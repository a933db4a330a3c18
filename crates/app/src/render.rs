//! Plain-text rendering of session snapshots and the leaderboard.

use std::fmt::Write as _;

use quiz_core::model::{
    AnswerDraft, Catalog, Question, QuestionKind, QuestionOutcome, RankTier, ScoreRecord,
};
use quiz_core::session::SessionSnapshot;
use services::LeaderboardEntry;

use crate::input::letter;

#[must_use]
pub fn format_timer(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes}:{remainder:02}")
}

#[must_use]
pub fn category_menu(catalog: &Catalog) -> String {
    let mut out = String::from("Choose a category:\n");
    for (i, category) in catalog.categories().iter().enumerate() {
        let _ = write!(
            out,
            "  {}. {} ({} questions)",
            i + 1,
            category.name(),
            category.len()
        );
        if !category.description().is_empty() {
            let _ = write!(out, " - {}", category.description());
        }
        out.push('\n');
    }
    out.push_str("Type a number, or :help for commands.");
    out
}

/// The current question with the player's draft so far.
#[must_use]
pub fn question_view(snapshot: &SessionSnapshot<'_>) -> String {
    let Some(question) = snapshot.question else {
        return String::new();
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n[{}] Question {}/{}  score {}  time {}",
        snapshot.category_name.unwrap_or_default(),
        snapshot.state.current_question_index + 1,
        snapshot.total_questions,
        snapshot.state.score,
        format_timer(snapshot.state.seconds_remaining_on_question),
    );
    let _ = writeln!(out, "{}", question.prompt());
    out.push_str(&answer_area(question, snapshot.draft));
    out
}

fn answer_area(question: &Question, draft: Option<&AnswerDraft>) -> String {
    let mut out = String::new();
    match (question.kind(), draft) {
        (QuestionKind::TrueFalse { .. }, Some(AnswerDraft::TrueFalse(value))) => {
            let chosen = match value {
                Some(true) => " (chosen: true)",
                Some(false) => " (chosen: false)",
                None => "",
            };
            let _ = write!(out, "  true / false{chosen}");
        }
        (
            QuestionKind::MultipleChoice { options, .. },
            Some(AnswerDraft::MultipleChoice(value)),
        ) => {
            for (i, option) in options.iter().enumerate() {
                let marker = if *value == Some(i) { '>' } else { ' ' };
                let _ = writeln!(out, " {marker}{}. {option}", i + 1);
            }
            out.push_str("  answer with an option number");
        }
        (
            QuestionKind::Matching {
                left_items,
                right_items,
                ..
            },
            Some(AnswerDraft::Matching(slots)),
        ) => {
            for (i, left) in left_items.iter().enumerate() {
                let paired = slots
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|r| format!(" = {}", letter(r)))
                    .unwrap_or_default();
                let _ = writeln!(out, "  {}. {left}{paired}", i + 1);
            }
            for (i, right) in right_items.iter().enumerate() {
                let _ = writeln!(out, "     {}) {right}", letter(i));
            }
            out.push_str("  pair items like `1 b`; :clear 1 removes a pair");
        }
        (
            QuestionKind::FillBlank { .. } | QuestionKind::ShortQuestion { .. },
            Some(AnswerDraft::FillBlank(text) | AnswerDraft::ShortQuestion(text)),
        ) => {
            if text.is_empty() {
                out.push_str("  type your answer");
            } else {
                let _ = write!(out, "  answer: {text}");
            }
        }
        _ => {}
    }
    out
}

#[must_use]
pub fn feedback(question: &Question, outcome: &QuestionOutcome, advance_pending: bool) -> String {
    let mut out = String::new();
    let verdict = match (outcome.correct, outcome.timed_out) {
        (true, _) => "Correct!",
        (false, true) => "Time's up.",
        (false, false) => "Not quite.",
    };
    let _ = writeln!(out, "{verdict} Answer: {}", question.answer_hint());
    if !question.explanation().is_empty() {
        let _ = writeln!(out, "{}", question.explanation());
    }
    if advance_pending {
        out.push_str("Moving on shortly...");
    } else {
        out.push_str("Press Enter to continue.");
    }
    out
}

#[must_use]
pub fn rank_badge(rank: RankTier) -> String {
    format!("{} {}", rank.emoji(), rank.title())
}

#[must_use]
pub fn final_result(record: &ScoreRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{} finished {}: {}/{} ({}%) in {}",
        record.player_name(),
        record.category_name(),
        record.score(),
        record.total(),
        record.percentage(),
        format_timer(record.elapsed_seconds()),
    );
    let _ = writeln!(out, "{}", rank_badge(record.rank()));
    out.push_str(":restart to play again, pick another category, or :quit.");
    out
}

#[must_use]
pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return String::from("No scores yet.");
    }
    let mut out = String::from("Leaderboard\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>3}. {:<20} {:<22} {:>3}/{:<3} {:>3}%  {:>6}  {}",
            entry.position,
            entry.player_name,
            entry.category_name,
            entry.score,
            entry.total,
            entry.percentage,
            format_timer(entry.elapsed_seconds),
            rank_badge(entry.rank),
        );
    }
    out
}

pub const HELP: &str = "\
Commands:
  :submit (or Enter)   submit the current answer
  :next   (or Enter)   continue after feedback
  :back                return to the category menu
  :restart             replay the finished category
  :save                retry saving a score that failed to save
  :quit                leave the quiz";

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryId, PlayerName, QuestionId};
    use quiz_core::time::fixed_now;

    #[test]
    fn timer_is_minutes_and_seconds() {
        assert_eq!(format_timer(60), "1:00");
        assert_eq!(format_timer(9), "0:09");
    }

    #[test]
    fn feedback_shows_answer_and_explanation() {
        let q = Question::new(
            QuestionId::new(1),
            "Carrots fix eyesight",
            "Only with a deficiency.",
            QuestionKind::TrueFalse { correct: false },
        )
        .unwrap();
        let outcome = QuestionOutcome {
            question_id: q.id(),
            correct: false,
            timed_out: true,
            seconds_spent: 60,
        };

        let text = feedback(&q, &outcome, true);

        assert!(text.starts_with("Time's up. Answer: False"));
        assert!(text.contains("Only with a deficiency."));
        assert!(text.ends_with("Moving on shortly..."));
    }

    #[test]
    fn matching_view_marks_pairs() {
        let q = Question::new(
            QuestionId::new(1),
            "Match",
            "",
            QuestionKind::Matching {
                left_items: vec!["Fibre".into(), "Vitamin C".into()],
                right_items: vec!["Oranges".into(), "Beans".into()],
                correct_mapping: vec![1, 0],
            },
        )
        .unwrap();
        let draft = AnswerDraft::Matching(vec![Some(1), None]);

        let text = answer_area(&q, Some(&draft));

        assert!(text.contains("1. Fibre = b"));
        assert!(text.contains("2. Vitamin C\n"));
        assert!(text.contains("a) Oranges"));
    }

    #[test]
    fn final_result_includes_rank() {
        let record = ScoreRecord::from_persisted(
            PlayerName::new("Hsu").unwrap(),
            CategoryId::new("sleep"),
            "Sleep and Rest",
            4,
            5,
            75,
            fixed_now(),
        )
        .unwrap();

        let text = final_result(&record);

        assert!(text.contains("4/5 (80%) in 1:15"));
        assert!(text.contains("Health Champion"));
    }

    #[test]
    fn empty_leaderboard_has_placeholder() {
        assert_eq!(leaderboard(&[]), "No scores yet.");
    }
}
