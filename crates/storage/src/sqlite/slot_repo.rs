use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{Slot, SlotStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl SlotStore for SqliteRepository {
    async fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT payload FROM quiz_slots WHERE slot = ?1")
            .bind(slot.key())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(payload))
    }

    async fn write(&self, slot: Slot, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_slots (slot, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(slot.key())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_slots WHERE slot = ?1")
            .bind(slot.key())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
