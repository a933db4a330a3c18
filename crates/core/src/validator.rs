//! Type-specific answer checks.
//!
//! Both functions are pure: the same inputs always give the same answer, and
//! neither touches session state.

use crate::model::{AnswerDraft, Question, QuestionKind, QuestionType};

/// Whether `draft` is a correct answer to `question`.
///
/// A draft shaped for a different question type is never correct, and an
/// empty draft never matches (questions reject blank answers and keywords at
/// construction, so there is no vacuous match).
#[must_use]
pub fn is_correct(question: &Question, draft: &AnswerDraft) -> bool {
    match (question.kind(), draft) {
        (QuestionKind::TrueFalse { correct }, AnswerDraft::TrueFalse(value)) => {
            *value == Some(*correct)
        }
        (
            QuestionKind::MultipleChoice { correct_index, .. },
            AnswerDraft::MultipleChoice(index),
        ) => {
            *index == Some(*correct_index)
        }
        (QuestionKind::Matching { correct_mapping, .. }, AnswerDraft::Matching(slots)) => {
            slots.len() == correct_mapping.len()
                && slots
                    .iter()
                    .zip(correct_mapping)
                    .all(|(slot, expected)| *slot == Some(*expected))
        }
        (QuestionKind::FillBlank { acceptable_answers }, AnswerDraft::FillBlank(text)) => {
            let candidate = text.trim().to_lowercase();
            !candidate.is_empty()
                && acceptable_answers
                    .iter()
                    .any(|answer| answer.trim().to_lowercase() == candidate)
        }
        (QuestionKind::ShortQuestion { keywords }, AnswerDraft::ShortQuestion(text)) => {
            let candidate = text.to_lowercase();
            !candidate.trim().is_empty()
                && keywords
                    .iter()
                    .any(|keyword| candidate.contains(&keyword.trim().to_lowercase()))
        }
        _ => false,
    }
}

/// Whether `draft` is complete enough to submit for a question of `question_type`.
///
/// Checks shape and completeness only, never correctness.
#[must_use]
pub fn is_answer_provided(draft: &AnswerDraft, question_type: QuestionType) -> bool {
    if draft.question_type() != question_type {
        return false;
    }
    match draft {
        AnswerDraft::TrueFalse(value) => value.is_some(),
        AnswerDraft::MultipleChoice(index) => index.is_some(),
        AnswerDraft::Matching(slots) => !slots.is_empty() && slots.iter().all(Option::is_some),
        AnswerDraft::FillBlank(text) | AnswerDraft::ShortQuestion(text) => {
            !text.trim().is_empty()
        }
    }
}
