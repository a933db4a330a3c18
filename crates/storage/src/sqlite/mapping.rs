use quiz_core::model::{CategoryId, PlayerName, ScoreRecord};
use sqlx::Row;

use crate::repository::{ScoreRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range: {v}")))
}

pub(crate) fn u32_to_i64(v: u32) -> i64 {
    i64::from(v)
}

pub(crate) fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let player_name: String = row.try_get("player_name").map_err(ser)?;
    let category_id: String = row.try_get("category_id").map_err(ser)?;
    let category_name: String = row.try_get("category_name").map_err(ser)?;
    let score = u32_from_i64("score", row.try_get("score").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get("total").map_err(ser)?)?;
    let elapsed_seconds =
        u32_from_i64("elapsed_seconds", row.try_get("elapsed_seconds").map_err(ser)?)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    let record = ScoreRecord::from_persisted(
        PlayerName::new(player_name).map_err(ser)?,
        CategoryId::new(category_id),
        category_name,
        score,
        total,
        elapsed_seconds,
        completed_at,
    )
    .map_err(ser)?;

    Ok(ScoreRow::new(id, record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_rejected() {
        assert!(matches!(
            u32_from_i64("score", -1),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(u32_from_i64("score", 7).unwrap(), 7);
    }
}
