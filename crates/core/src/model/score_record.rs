use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};
use crate::model::player::PlayerName;
use crate::model::rank::{RankTier, percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("score record must cover at least one question")]
    EmptyTotal,

    #[error("score {score} exceeds total {total}")]
    ScoreAboveTotal { score: u32, total: u32 },

    #[error("category name cannot be empty")]
    EmptyCategoryName,
}

/// Outcome of a single answered (or timed-out) question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    /// Submitted by the timer rather than the player.
    pub timed_out: bool,
    pub seconds_spent: u32,
}

/// Result of one completed session, as handed to the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ScoreRecordDraft")]
pub struct ScoreRecord {
    player_name: PlayerName,
    category_id: CategoryId,
    category_name: String,
    score: u32,
    total: u32,
    elapsed_seconds: u32,
    completed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRecordDraft {
    player_name: PlayerName,
    category_id: CategoryId,
    category_name: String,
    score: u32,
    total: u32,
    elapsed_seconds: u32,
    completed_at: DateTime<Utc>,
}

impl TryFrom<ScoreRecordDraft> for ScoreRecord {
    type Error = ScoreRecordError;

    fn try_from(draft: ScoreRecordDraft) -> Result<Self, Self::Error> {
        Self::from_persisted(
            draft.player_name,
            draft.category_id,
            draft.category_name,
            draft.score,
            draft.total,
            draft.elapsed_seconds,
            draft.completed_at,
        )
    }
}

impl ScoreRecord {
    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the counts are inconsistent.
    pub fn from_persisted(
        player_name: PlayerName,
        category_id: CategoryId,
        category_name: impl Into<String>,
        score: u32,
        total: u32,
        elapsed_seconds: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScoreRecordError> {
        if total == 0 {
            return Err(ScoreRecordError::EmptyTotal);
        }
        if score > total {
            return Err(ScoreRecordError::ScoreAboveTotal { score, total });
        }
        let category_name = category_name.into();
        if category_name.trim().is_empty() {
            return Err(ScoreRecordError::EmptyCategoryName);
        }

        Ok(Self {
            player_name,
            category_id,
            category_name,
            score,
            total,
            elapsed_seconds,
            completed_at,
        })
    }

    #[must_use]
    pub fn player_name(&self) -> &PlayerName {
        &self.player_name
    }

    #[must_use]
    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    #[must_use]
    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    #[must_use]
    pub fn rank(&self) -> RankTier {
        RankTier::from_score(self.score, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn player() -> PlayerName {
        PlayerName::new("Kyaw").unwrap()
    }

    #[test]
    fn rejects_score_above_total() {
        let err = ScoreRecord::from_persisted(
            player(),
            CategoryId::new("diet"),
            "Diet",
            6,
            5,
            30,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ScoreRecordError::ScoreAboveTotal { score: 6, total: 5 });
    }

    #[test]
    fn rejects_empty_total() {
        let err = ScoreRecord::from_persisted(
            player(),
            CategoryId::new("diet"),
            "Diet",
            0,
            0,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ScoreRecordError::EmptyTotal);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = ScoreRecord::from_persisted(
            player(),
            CategoryId::new("diet"),
            "Diet",
            4,
            5,
            95,
            fixed_now(),
        )
        .unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["playerName"], "Kyaw");
        assert_eq!(value["categoryId"], "diet");
        assert_eq!(value["elapsedSeconds"], 95);
        assert_eq!(record.percentage(), 80);
        assert_eq!(record.rank(), RankTier::Champion);
    }

    #[test]
    fn deserializing_validates_counts() {
        let json = r#"{
            "playerName": "Kyaw",
            "categoryId": "diet",
            "categoryName": "",
            "score": 9,
            "total": 0,
            "elapsedSeconds": 12,
            "completedAt": "2025-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<ScoreRecord>(json).is_err());

        let over = json.replace(r#""total": 0"#, r#""total": 5"#);
        assert!(serde_json::from_str::<ScoreRecord>(&over).is_err());

        let valid = over
            .replace(r#""score": 9"#, r#""score": 3"#)
            .replace(r#""categoryName": """#, r#""categoryName": "Diet""#);
        let record: ScoreRecord = serde_json::from_str(&valid).unwrap();
        assert_eq!(record.score(), 3);
        assert_eq!(record.total(), 5);
        assert_eq!(record.category_name(), "Diet");
    }
}
