use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple choice needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("multiple choice option {index} is blank")]
    BlankOption { index: usize },

    #[error("correct option {index} is out of range for {len} options")]
    ChoiceOutOfRange { index: usize, len: usize },

    #[error("matching needs at least one item on each side")]
    EmptyMatching,

    #[error("matching has {left} left items but {mapping} mapping entries")]
    MappingLengthMismatch { left: usize, mapping: usize },

    #[error("mapping slot {slot} points at right item {index}, but only {len} exist")]
    MappingOutOfRange { slot: usize, index: usize, len: usize },

    #[error("fill-in-the-blank needs at least one acceptable answer")]
    NoAcceptableAnswers,

    #[error("acceptable answer {index} is blank")]
    BlankAcceptableAnswer { index: usize },

    #[error("short question needs at least one keyword")]
    NoKeywords,

    #[error("keyword {index} is blank")]
    BlankKeyword { index: usize },
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// Discriminant of a question, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    TrueFalse,
    MultipleChoice,
    Matching,
    FillBlank,
    ShortQuestion,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuestionType::TrueFalse => "true/false",
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::Matching => "matching",
            QuestionType::FillBlank => "fill in the blank",
            QuestionType::ShortQuestion => "short answer",
        };
        f.write_str(label)
    }
}

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// Type-specific payload of a question.
///
/// Each variant carries exactly what its correctness rule needs:
/// - `TrueFalse`: the expected boolean
/// - `MultipleChoice`: ordered options and the index of the right one
/// - `Matching`: both columns and, per left item, the index of its right item
/// - `FillBlank`: answers compared case-insensitively after trimming
/// - `ShortQuestion`: keywords, any of which must appear in the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum QuestionKind {
    TrueFalse {
        correct: bool,
    },
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    Matching {
        left_items: Vec<String>,
        right_items: Vec<String>,
        correct_mapping: Vec<usize>,
    },
    FillBlank {
        acceptable_answers: Vec<String>,
    },
    ShortQuestion {
        keywords: Vec<String>,
    },
}

impl QuestionKind {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::Matching { .. } => QuestionType::Matching,
            QuestionKind::FillBlank { .. } => QuestionType::FillBlank,
            QuestionKind::ShortQuestion { .. } => QuestionType::ShortQuestion,
        }
    }

    fn validate(&self) -> Result<(), QuestionError> {
        match self {
            QuestionKind::TrueFalse { .. } => Ok(()),
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            } => {
                if options.len() < 2 {
                    return Err(QuestionError::TooFewOptions { len: options.len() });
                }
                if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
                    return Err(QuestionError::BlankOption { index });
                }
                if *correct_index >= options.len() {
                    return Err(QuestionError::ChoiceOutOfRange {
                        index: *correct_index,
                        len: options.len(),
                    });
                }
                Ok(())
            }
            QuestionKind::Matching {
                left_items,
                right_items,
                correct_mapping,
            } => {
                if left_items.is_empty() || right_items.is_empty() {
                    return Err(QuestionError::EmptyMatching);
                }
                if correct_mapping.len() != left_items.len() {
                    return Err(QuestionError::MappingLengthMismatch {
                        left: left_items.len(),
                        mapping: correct_mapping.len(),
                    });
                }
                for (slot, &index) in correct_mapping.iter().enumerate() {
                    if index >= right_items.len() {
                        return Err(QuestionError::MappingOutOfRange {
                            slot,
                            index,
                            len: right_items.len(),
                        });
                    }
                }
                Ok(())
            }
            QuestionKind::FillBlank { acceptable_answers } => {
                if acceptable_answers.is_empty() {
                    return Err(QuestionError::NoAcceptableAnswers);
                }
                match acceptable_answers.iter().position(|a| a.trim().is_empty()) {
                    Some(index) => Err(QuestionError::BlankAcceptableAnswer { index }),
                    None => Ok(()),
                }
            }
            QuestionKind::ShortQuestion { keywords } => {
                if keywords.is_empty() {
                    return Err(QuestionError::NoKeywords);
                }
                match keywords.iter().position(|k| k.trim().is_empty()) {
                    Some(index) => Err(QuestionError::BlankKeyword { index }),
                    None => Ok(()),
                }
            }
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable, validated quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    explanation: String,
    kind: QuestionKind,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank or the kind payload is
    /// inconsistent (out-of-range indices, blank answers or keywords).
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        explanation: impl Into<String>,
        kind: QuestionKind,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        kind.validate()?;

        Ok(Self {
            id,
            prompt,
            explanation: explanation.into().trim().to_owned(),
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Human-readable form of the expected answer, shown as feedback.
    #[must_use]
    pub fn answer_hint(&self) -> String {
        match &self.kind {
            QuestionKind::TrueFalse { correct } => {
                String::from(if *correct { "True" } else { "False" })
            }
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            } => options.get(*correct_index).cloned().unwrap_or_default(),
            QuestionKind::Matching {
                left_items,
                right_items,
                correct_mapping,
            } => left_items
                .iter()
                .zip(correct_mapping)
                .map(|(left, &right)| {
                    let right = right_items.get(right).map_or("?", String::as_str);
                    format!("{left} → {right}")
                })
                .collect::<Vec<_>>()
                .join(", "),
            QuestionKind::FillBlank { acceptable_answers } => {
                acceptable_answers.first().cloned().unwrap_or_default()
            }
            QuestionKind::ShortQuestion { keywords } => keywords.join(", "),
        }
    }
}

/// Unvalidated question as it appears in a catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub id: u64,
    pub prompt: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError` if the draft does not form a valid question.
    pub fn validate(self) -> Result<Question, QuestionError> {
        Question::new(
            QuestionId::new(self.id),
            self.prompt,
            self.explanation,
            self.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn rejects_blank_prompt() {
        let err = Question::new(
            QuestionId::new(1),
            "   ",
            "",
            QuestionKind::TrueFalse { correct: true },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_choice_out_of_range() {
        let err = Question::new(
            QuestionId::new(1),
            "Pick",
            "",
            QuestionKind::MultipleChoice {
                options: strings(&["a", "b"]),
                correct_index: 2,
            },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::ChoiceOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn rejects_mapping_length_mismatch() {
        let err = Question::new(
            QuestionId::new(1),
            "Match",
            "",
            QuestionKind::Matching {
                left_items: strings(&["a", "b", "c"]),
                right_items: strings(&["x", "y", "z"]),
                correct_mapping: vec![0, 1],
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::MappingLengthMismatch {
                left: 3,
                mapping: 2
            }
        );
    }

    #[test]
    fn rejects_mapping_out_of_range() {
        let err = Question::new(
            QuestionId::new(1),
            "Match",
            "",
            QuestionKind::Matching {
                left_items: strings(&["a", "b"]),
                right_items: strings(&["x", "y"]),
                correct_mapping: vec![1, 5],
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::MappingOutOfRange {
                slot: 1,
                index: 5,
                len: 2
            }
        );
    }

    #[test]
    fn rejects_blank_keyword() {
        let err = Question::new(
            QuestionId::new(1),
            "Why?",
            "",
            QuestionKind::ShortQuestion {
                keywords: strings(&["sleep", " "]),
            },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::BlankKeyword { index: 1 });
    }

    #[test]
    fn rejects_blank_acceptable_answer() {
        let err = Question::new(
            QuestionId::new(1),
            "Capital?",
            "",
            QuestionKind::FillBlank {
                acceptable_answers: vec![String::new()],
            },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::BlankAcceptableAnswer { index: 0 });
    }

    #[test]
    fn draft_deserializes_tagged_kind() {
        let json = r#"{
            "id": 3,
            "type": "matching",
            "prompt": "Match the vitamin to its source",
            "explanation": "Sources vary.",
            "leftItems": ["Vitamin C", "Vitamin D"],
            "rightItems": ["Sunlight", "Oranges"],
            "correctMapping": [1, 0]
        }"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        let question = draft.validate().unwrap();

        assert_eq!(question.id(), QuestionId::new(3));
        assert_eq!(question.question_type(), QuestionType::Matching);
        assert_eq!(
            question.answer_hint(),
            "Vitamin C → Oranges, Vitamin D → Sunlight"
        );
    }

    #[test]
    fn draft_explanation_defaults_to_empty() {
        let json = r#"{ "id": 1, "type": "trueFalse", "prompt": "Water is wet", "correct": true }"#;
        let question = serde_json::from_str::<QuestionDraft>(json)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(question.explanation(), "");
        assert_eq!(question.answer_hint(), "True");
    }
}
