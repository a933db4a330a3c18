use async_trait::async_trait;
use quiz_core::model::{PlayerName, ScoreRecord};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Default cap on stored score records; the oldest are dropped first.
pub const DEFAULT_MAX_SCORE_RECORDS: usize = 500;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted score record with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub id: i64,
    pub record: ScoreRecord,
}

impl ScoreRow {
    #[must_use]
    pub fn new(id: i64, record: ScoreRecord) -> Self {
        Self { id, record }
    }
}

/// Append-only store of completed-session records.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Append a record and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing (including records dropped
    /// by retention), or other storage errors.
    async fn get_score(&self, id: i64) -> Result<ScoreRecord, StorageError>;

    /// All retained records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError>;

    /// Number of retained records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the count cannot be read.
    async fn count_scores(&self) -> Result<u64, StorageError>;
}

/// Remembers the display name between runs.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the name cannot be stored.
    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the stored name cannot be read or is invalid.
    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError>;
}

#[derive(Default)]
struct ScoreLog {
    next_id: i64,
    rows: Vec<ScoreRow>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<ScoreLog>>,
    player: Arc<Mutex<Option<PlayerName>>>,
    max_records: Option<usize>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scores: Arc::new(Mutex::new(ScoreLog::default())),
            player: Arc::new(Mutex::new(None)),
            max_records: Some(DEFAULT_MAX_SCORE_RECORDS),
        }
    }

    /// Keep at most `max_records` scores; `None` keeps everything.
    #[must_use]
    pub fn with_retention(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = guard.next_id;
        guard.rows.push(ScoreRow::new(id, record.clone()));

        if let Some(max) = self.max_records {
            let excess = guard.rows.len().saturating_sub(max);
            if excess > 0 {
                log::warn!("score retention: dropping {excess} oldest record(s)");
                guard.rows.drain(..excess);
            }
        }
        Ok(id)
    }

    async fn get_score(&self, id: i64) -> Result<ScoreRecord, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.rows.clone())
    }

    async fn count_scores(&self) -> Result<u64, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.rows.len() as u64)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryRepository {
    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError> {
        let mut guard = self
            .player
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(name.clone());
        Ok(())
    }

    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError> {
        let guard = self
            .player
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
    pub players: Arc<dyn PlayerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let scores: Arc<dyn ScoreRepository> = Arc::new(repo.clone());
        let players: Arc<dyn PlayerRepository> = Arc::new(repo);
        Self { scores, players }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::CategoryId;
    use quiz_core::time::fixed_now;

    fn record(score: u32) -> ScoreRecord {
        ScoreRecord::from_persisted(
            PlayerName::new("Nilar").unwrap(),
            CategoryId::new("hygiene"),
            "Hygiene",
            score,
            5,
            40,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn appends_and_fetches_scores() {
        let repo = InMemoryRepository::new();
        let first = repo.append_score(&record(3)).await.unwrap();
        let second = repo.append_score(&record(4)).await.unwrap();

        assert!(second > first);
        assert_eq!(repo.get_score(second).await.unwrap().score(), 4);
        assert_eq!(repo.count_scores().await.unwrap(), 2);

        let rows = repo.list_scores().await.unwrap();
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[1].id, second);
    }

    #[tokio::test]
    async fn retention_drops_oldest() {
        let repo = InMemoryRepository::new().with_retention(Some(2));
        let oldest = repo.append_score(&record(1)).await.unwrap();
        repo.append_score(&record(2)).await.unwrap();
        repo.append_score(&record(3)).await.unwrap();

        assert_eq!(repo.count_scores().await.unwrap(), 2);
        assert!(matches!(
            repo.get_score(oldest).await,
            Err(StorageError::NotFound)
        ));
        let scores: Vec<u32> = repo
            .list_scores()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.record.score())
            .collect();
        assert_eq!(scores, vec![2, 3]);
    }

    #[tokio::test]
    async fn remembers_player_name() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_player_name().await.unwrap().is_none());

        repo.save_player_name(&PlayerName::new("Zaw").unwrap())
            .await
            .unwrap();

        assert_eq!(
            repo.load_player_name().await.unwrap().unwrap().as_str(),
            "Zaw"
        );
    }
}
