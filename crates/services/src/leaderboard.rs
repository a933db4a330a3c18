use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{CategoryId, RankTier, ScoreRecord};
use storage::repository::{ScoreRepository, ScoreRow};

use crate::error::QuizServiceError;

/// Number of entries shown when no limit is given.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

/// One ranked leaderboard line.
///
/// Carries raw values only; formatting is left to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub position: usize,
    pub id: i64,
    pub player_name: String,
    pub category_id: String,
    pub category_name: String,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub rank: RankTier,
    pub elapsed_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    fn from_row(position: usize, row: &ScoreRow) -> Self {
        let record = &row.record;
        Self {
            position,
            id: row.id,
            player_name: record.player_name().as_str().to_owned(),
            category_id: record.category_id().as_str().to_owned(),
            category_name: record.category_name().to_owned(),
            score: record.score(),
            total: record.total(),
            percentage: record.percentage(),
            rank: record.rank(),
            elapsed_seconds: record.elapsed_seconds(),
            completed_at: record.completed_at(),
        }
    }
}

/// Best result first: higher score ratio, then faster, then earlier.
///
/// Ratios are compared exactly by cross-multiplying.
fn compare_rows(a: &ScoreRow, b: &ScoreRow) -> Ordering {
    compare_records(&a.record, &b.record).then_with(|| a.id.cmp(&b.id))
}

fn compare_records(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    let lhs = u64::from(a.score()) * u64::from(b.total());
    let rhs = u64::from(b.score()) * u64::from(a.total());
    rhs.cmp(&lhs)
        .then_with(|| a.elapsed_seconds().cmp(&b.elapsed_seconds()))
        .then_with(|| a.completed_at().cmp(&b.completed_at()))
}

/// Read-only leaderboard over stored score records.
#[derive(Clone)]
pub struct LeaderboardService {
    scores: Arc<dyn ScoreRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    /// The best `limit` records across all categories.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, QuizServiceError> {
        let rows = self.scores.list_scores().await?;
        Ok(rank_rows(rows, limit))
    }

    /// The best `limit` records for one category.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn top_in_category(
        &self,
        category_id: &CategoryId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, QuizServiceError> {
        let rows = self
            .scores
            .list_scores()
            .await?
            .into_iter()
            .filter(|row| row.record.category_id() == category_id)
            .collect();
        Ok(rank_rows(rows, limit))
    }
}

fn rank_rows(mut rows: Vec<ScoreRow>, limit: usize) -> Vec<LeaderboardEntry> {
    rows.sort_by(compare_rows);
    rows.iter()
        .take(limit)
        .enumerate()
        .map(|(i, row)| LeaderboardEntry::from_row(i + 1, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::PlayerName;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn record(player: &str, category: &str, score: u32, total: u32, elapsed: u32) -> ScoreRecord {
        ScoreRecord::from_persisted(
            PlayerName::new(player).unwrap(),
            CategoryId::new(category),
            category,
            score,
            total,
            elapsed,
            fixed_now(),
        )
        .unwrap()
    }

    async fn service_with(records: &[ScoreRecord]) -> LeaderboardService {
        let repo = InMemoryRepository::new();
        for record in records {
            repo.append_score(record).await.unwrap();
        }
        LeaderboardService::new(Arc::new(repo))
    }

    fn names(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.player_name.as_str()).collect()
    }

    #[tokio::test]
    async fn orders_by_percentage_then_time() {
        let svc = service_with(&[
            record("Slow", "a", 4, 5, 90),
            record("Fast", "a", 4, 5, 30),
            record("Best", "a", 5, 5, 200),
            record("Low", "a", 1, 5, 10),
        ])
        .await;

        let entries = svc.top(DEFAULT_LEADERBOARD_LIMIT).await.unwrap();

        assert_eq!(names(&entries), vec!["Best", "Fast", "Slow", "Low"]);
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].percentage, 100);
        assert_eq!(entries[0].rank, RankTier::Scholar);
        assert_eq!(entries[3].position, 4);
    }

    #[tokio::test]
    async fn compares_ratios_exactly() {
        // 2/3 and 67/100 both display as 67%.
        let svc = service_with(&[record("Two", "a", 2, 3, 10), record("Pct", "b", 67, 100, 50)])
            .await;

        let entries = svc.top(10).await.unwrap();

        assert_eq!(names(&entries), vec!["Pct", "Two"]);
        assert_eq!(entries[0].percentage, entries[1].percentage);
    }

    #[tokio::test]
    async fn earlier_completion_breaks_full_ties() {
        let repo = InMemoryRepository::new();
        let later = ScoreRecord::from_persisted(
            PlayerName::new("Later").unwrap(),
            CategoryId::new("a"),
            "A",
            3,
            4,
            20,
            fixed_now() + Duration::minutes(5),
        )
        .unwrap();
        repo.append_score(&later).await.unwrap();
        repo.append_score(&record("Earlier", "a", 3, 4, 20))
            .await
            .unwrap();
        let svc = LeaderboardService::new(Arc::new(repo));

        let entries = svc.top(10).await.unwrap();
        assert_eq!(names(&entries), vec!["Earlier", "Later"]);
    }

    #[tokio::test]
    async fn respects_limit_and_category_filter() {
        let svc = service_with(&[
            record("A1", "a", 5, 5, 10),
            record("B1", "b", 4, 5, 10),
            record("A2", "a", 3, 5, 10),
        ])
        .await;

        assert_eq!(names(&svc.top(2).await.unwrap()), vec!["A1", "B1"]);

        let only_a = svc
            .top_in_category(&CategoryId::new("a"), 10)
            .await
            .unwrap();
        assert_eq!(names(&only_a), vec!["A1", "A2"]);
        assert_eq!(only_a[1].position, 2);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_board() {
        let svc = service_with(&[]).await;
        assert!(svc.top(DEFAULT_LEADERBOARD_LIMIT).await.unwrap().is_empty());
    }
}
