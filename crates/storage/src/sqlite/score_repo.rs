use async_trait::async_trait;
use quiz_core::model::ScoreRecord;
use sqlx::Row;

use crate::repository::{ScoreRepository, ScoreRow, StorageError};

use super::SqliteRepository;
use super::mapping::{map_score_row, ser, u32_to_i64};

#[async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query(
            r"
            INSERT INTO scores (
                player_name, category_id, category_name,
                score, total, elapsed_seconds, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(record.player_name().as_str())
        .bind(record.category_id().as_str())
        .bind(record.category_name())
        .bind(u32_to_i64(record.score()))
        .bind(u32_to_i64(record.total()))
        .bind(u32_to_i64(record.elapsed_seconds()))
        .bind(record.completed_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = res.last_insert_rowid();

        if let Some(max) = self.max_records {
            let keep = i64::try_from(max).map_err(ser)?;
            let trimmed = sqlx::query(
                r"
                DELETE FROM scores
                WHERE id NOT IN (
                    SELECT id FROM scores ORDER BY id DESC LIMIT ?1
                )
                ",
            )
            .bind(keep)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .rows_affected();
            if trimmed > 0 {
                log::warn!("score retention: dropped {trimmed} oldest record(s)");
            }
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(id)
    }

    async fn get_score(&self, id: i64) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, player_name, category_id, category_name,
                   score, total, elapsed_seconds, completed_at
            FROM scores
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_score_row(&row).map(|r| r.record)
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, player_name, category_id, category_name,
                   score, total, elapsed_seconds, completed_at
            FROM scores
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        // A corrupt row should not hide every other record.
        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            match map_score_row(row) {
                Ok(score) => scores.push(score),
                Err(err) => {
                    let id: Option<i64> = row.try_get("id").ok();
                    log::warn!("skipping unreadable score row {id:?}: {err}");
                }
            }
        }
        Ok(scores)
    }

    async fn count_scores(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM scores")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(ser)
    }
}
