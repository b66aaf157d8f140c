//! Slot repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use meetsync_core::error::{AppError, ErrorKind};
use meetsync_core::result::AppResult;
use meetsync_entity::slot::{Slot, SlotStatus};

use crate::store::SlotStore;

/// Repository for slot reads and the narrow set of core-owned writes.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    /// Create a new slot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for SlotRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Slot>> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load slot", e))
    }

    async fn find_active(&self) -> AppResult<Vec<Slot>> {
        sqlx::query_as::<_, Slot>(
            "SELECT * FROM slots WHERE status IN ('upcoming', 'ongoing') ORDER BY meeting_date",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active slots", e))
    }

    async fn update_status(&self, id: Uuid, status: SlotStatus) -> AppResult<()> {
        sqlx::query("UPDATE slots SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update slot status", e)
            })?;
        Ok(())
    }

    async fn update_last_reminder(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE slots SET last_reminder_sent_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update reminder time", e)
            })?;
        Ok(())
    }

    async fn update_engagement(&self, id: Uuid, rate: i32) -> AppResult<()> {
        sqlx::query("UPDATE slots SET engagement_rate = $2 WHERE id = $1")
            .bind(id)
            .bind(rate)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update engagement rate", e)
            })?;
        Ok(())
    }

    async fn update_trend_score(&self, id: Uuid, score: i32) -> AppResult<()> {
        sqlx::query("UPDATE slots SET trend_score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update trend score", e)
            })?;
        Ok(())
    }
}
