use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::PlayerName;
use sqlx::Row;

use crate::repository::{PlayerRepository, StorageError};

use super::SqliteRepository;
use super::mapping::ser;

#[async_trait]
impl PlayerRepository for SqliteRepository {
    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO player_profile (id, player_name, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                player_name = excluded.player_name,
                updated_at = excluded.updated_at
            ",
        )
        .bind(name.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError> {
        let row = sqlx::query("SELECT player_name FROM player_profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("player_name").map_err(ser)?;
        PlayerName::new(raw).map(Some).map_err(ser)
    }
}
