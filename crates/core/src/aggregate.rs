use chrono::{DateTime, Utc};

use crate::model::{Category, PlayerName, QuestionOutcome, ScoreRecord, ScoreRecordError};

/// Fold per-question outcomes into the record for a completed session.
///
/// The score is the number of correct outcomes; there is no bonus.
///
/// # Errors
///
/// Returns `ScoreRecordError` if the outcomes do not fit the category (for
/// example, more correct answers than questions).
pub fn finalize(
    outcomes: &[QuestionOutcome],
    category: &Category,
    player: &PlayerName,
    elapsed_seconds: u32,
    completed_at: DateTime<Utc>,
) -> Result<ScoreRecord, ScoreRecordError> {
    let score = outcomes.iter().filter(|o| o.correct).count();
    let score = u32::try_from(score).unwrap_or(u32::MAX);
    let total = u32::try_from(category.len()).unwrap_or(u32::MAX);

    ScoreRecord::from_persisted(
        player.clone(),
        category.id().clone(),
        category.name(),
        score,
        total,
        elapsed_seconds,
        completed_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, Question, QuestionId, QuestionKind};
    use crate::time::fixed_now;

    fn category(len: u64) -> Category {
        let questions = (1..=len)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    "",
                    QuestionKind::TrueFalse { correct: true },
                )
                .unwrap()
            })
            .collect();
        Category::new(CategoryId::new("basics"), "Basics", "", questions).unwrap()
    }

    fn outcome(id: u64, correct: bool) -> QuestionOutcome {
        QuestionOutcome {
            question_id: QuestionId::new(id),
            correct,
            timed_out: false,
            seconds_spent: 5,
        }
    }

    #[test]
    fn counts_correct_outcomes() {
        let player = PlayerName::new("Thida").unwrap();
        let outcomes = [outcome(1, true), outcome(2, false), outcome(3, true)];

        let record = finalize(&outcomes, &category(3), &player, 42, fixed_now()).unwrap();

        assert_eq!(record.score(), 2);
        assert_eq!(record.total(), 3);
        assert_eq!(record.elapsed_seconds(), 42);
        assert_eq!(record.completed_at(), fixed_now());
        assert_eq!(record.category_name(), "Basics");
    }

    #[test]
    fn too_many_correct_outcomes_is_an_error() {
        let player = PlayerName::new("Thida").unwrap();
        let outcomes = [outcome(1, true), outcome(2, true)];

        let err = finalize(&outcomes, &category(1), &player, 0, fixed_now()).unwrap_err();
        assert_eq!(err, ScoreRecordError::ScoreAboveTotal { score: 2, total: 1 });
    }
}
