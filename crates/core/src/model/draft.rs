use thiserror::Error;

use crate::model::question::{Question, QuestionKind, QuestionType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DraftError {
    #[error("a {update} update does not apply to a {expected} question")]
    WrongShape {
        expected: QuestionType,
        update: QuestionType,
    },

    #[error("option {index} is out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("left item {index} is out of range for {len} items")]
    LeftOutOfRange { index: usize, len: usize },

    #[error("right item {index} is out of range for {len} items")]
    RightOutOfRange { index: usize, len: usize },
}

/// The player's in-progress answer for the current question.
///
/// The shape always matches the current question's kind. A `Matching` draft
/// holds one slot per left item; `None` marks a slot the player has not
/// matched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerDraft {
    TrueFalse(Option<bool>),
    MultipleChoice(Option<usize>),
    Matching(Vec<Option<usize>>),
    FillBlank(String),
    ShortQuestion(String),
}

impl AnswerDraft {
    /// Empty draft shaped for `question`.
    #[must_use]
    pub fn empty_for(question: &Question) -> Self {
        match question.kind() {
            QuestionKind::TrueFalse { .. } => AnswerDraft::TrueFalse(None),
            QuestionKind::MultipleChoice { .. } => AnswerDraft::MultipleChoice(None),
            QuestionKind::Matching { left_items, .. } => {
                AnswerDraft::Matching(vec![None; left_items.len()])
            }
            QuestionKind::FillBlank { .. } => AnswerDraft::FillBlank(String::new()),
            QuestionKind::ShortQuestion { .. } => AnswerDraft::ShortQuestion(String::new()),
        }
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            AnswerDraft::TrueFalse(_) => QuestionType::TrueFalse,
            AnswerDraft::MultipleChoice(_) => QuestionType::MultipleChoice,
            AnswerDraft::Matching(_) => QuestionType::Matching,
            AnswerDraft::FillBlank(_) => QuestionType::FillBlank,
            AnswerDraft::ShortQuestion(_) => QuestionType::ShortQuestion,
        }
    }

    /// Merge a partial answer into this draft.
    ///
    /// The draft is left untouched when the update is rejected.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::WrongShape` if the update targets another question
    /// type, or a range error if an index does not exist on `question`.
    pub fn apply(&mut self, question: &Question, update: DraftUpdate) -> Result<(), DraftError> {
        match (self, question.kind(), update) {
            (AnswerDraft::TrueFalse(slot), _, DraftUpdate::Boolean(value)) => {
                *slot = Some(value);
                Ok(())
            }
            (
                AnswerDraft::MultipleChoice(slot),
                QuestionKind::MultipleChoice { options, .. },
                DraftUpdate::Choice(index),
            ) => {
                if index >= options.len() {
                    return Err(DraftError::OptionOutOfRange {
                        index,
                        len: options.len(),
                    });
                }
                *slot = Some(index);
                Ok(())
            }
            (
                AnswerDraft::Matching(slots),
                QuestionKind::Matching { right_items, .. },
                DraftUpdate::Match { left, right },
            ) => {
                if left >= slots.len() {
                    return Err(DraftError::LeftOutOfRange {
                        index: left,
                        len: slots.len(),
                    });
                }
                if right >= right_items.len() {
                    return Err(DraftError::RightOutOfRange {
                        index: right,
                        len: right_items.len(),
                    });
                }
                slots[left] = Some(right);
                Ok(())
            }
            (AnswerDraft::Matching(slots), _, DraftUpdate::Unmatch { left }) => {
                let len = slots.len();
                let slot = slots
                    .get_mut(left)
                    .ok_or(DraftError::LeftOutOfRange { index: left, len })?;
                *slot = None;
                Ok(())
            }
            (
                AnswerDraft::FillBlank(text) | AnswerDraft::ShortQuestion(text),
                _,
                DraftUpdate::Text(value),
            ) => {
                *text = value;
                Ok(())
            }
            (draft, _, update) => Err(DraftError::WrongShape {
                expected: draft.question_type(),
                update: update.question_type(),
            }),
        }
    }
}

/// A partial answer produced by one player interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftUpdate {
    Boolean(bool),
    Choice(usize),
    Match { left: usize, right: usize },
    Unmatch { left: usize },
    Text(String),
}

impl DraftUpdate {
    fn question_type(&self) -> QuestionType {
        match self {
            DraftUpdate::Boolean(_) => QuestionType::TrueFalse,
            DraftUpdate::Choice(_) => QuestionType::MultipleChoice,
            DraftUpdate::Match { .. } | DraftUpdate::Unmatch { .. } => QuestionType::Matching,
            // Text fits both free-text kinds; report the first for error messages.
            DraftUpdate::Text(_) => QuestionType::FillBlank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;

    fn matching() -> Question {
        Question::new(
            QuestionId::new(1),
            "Match",
            "",
            QuestionKind::Matching {
                left_items: vec!["a".into(), "b".into(), "c".into()],
                right_items: vec!["x".into(), "y".into(), "z".into()],
                correct_mapping: vec![2, 0, 1],
            },
        )
        .unwrap()
    }

    #[test]
    fn matching_draft_starts_unset_per_left_item() {
        let draft = AnswerDraft::empty_for(&matching());
        assert_eq!(draft, AnswerDraft::Matching(vec![None, None, None]));
    }

    #[test]
    fn match_and_unmatch_update_single_slot() {
        let question = matching();
        let mut draft = AnswerDraft::empty_for(&question);

        draft
            .apply(&question, DraftUpdate::Match { left: 1, right: 0 })
            .unwrap();
        assert_eq!(draft, AnswerDraft::Matching(vec![None, Some(0), None]));

        draft.apply(&question, DraftUpdate::Unmatch { left: 1 }).unwrap();
        assert_eq!(draft, AnswerDraft::Matching(vec![None, None, None]));
    }

    #[test]
    fn out_of_range_match_leaves_draft_untouched() {
        let question = matching();
        let mut draft = AnswerDraft::empty_for(&question);

        let err = draft
            .apply(&question, DraftUpdate::Match { left: 0, right: 9 })
            .unwrap_err();
        assert_eq!(err, DraftError::RightOutOfRange { index: 9, len: 3 });
        assert_eq!(draft, AnswerDraft::Matching(vec![None, None, None]));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let question = matching();
        let mut draft = AnswerDraft::empty_for(&question);

        let err = draft
            .apply(&question, DraftUpdate::Boolean(true))
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::WrongShape {
                expected: QuestionType::Matching,
                update: QuestionType::TrueFalse,
            }
        );
    }

    #[test]
    fn text_update_replaces_free_text() {
        let question = Question::new(
            QuestionId::new(2),
            "Capital of France?",
            "",
            QuestionKind::FillBlank {
                acceptable_answers: vec!["Paris".into()],
            },
        )
        .unwrap();
        let mut draft = AnswerDraft::empty_for(&question);

        draft
            .apply(&question, DraftUpdate::Text("Par".into()))
            .unwrap();
        draft
            .apply(&question, DraftUpdate::Text("Paris".into()))
            .unwrap();
        assert_eq!(draft, AnswerDraft::FillBlank("Paris".into()));
    }
}
