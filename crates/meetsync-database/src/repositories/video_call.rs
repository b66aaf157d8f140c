//! Video call repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use meetsync_core::error::{AppError, ErrorKind};
use meetsync_core::result::AppResult;
use meetsync_entity::video_call::{Participant, VideoCall};

use crate::store::CallStore;

/// Repository for video call CRUD operations.
#[derive(Debug, Clone)]
pub struct VideoCallRepository {
    pool: PgPool,
}

impl VideoCallRepository {
    /// Create a new video call repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallStore for VideoCallRepository {
    async fn find_by_meeting(&self, meeting_id: Uuid) -> AppResult<Option<VideoCall>> {
        sqlx::query_as::<_, VideoCall>("SELECT * FROM video_calls WHERE meeting_id = $1")
            .bind(meeting_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load call", e))
    }

    async fn find_unfinished(&self) -> AppResult<Vec<VideoCall>> {
        sqlx::query_as::<_, VideoCall>(
            "SELECT * FROM video_calls WHERE status IN ('waiting', 'active')",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list unfinished calls", e)
        })
    }

    async fn create(&self, call: &VideoCall) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO video_calls \
             (id, meeting_id, host_id, status, start_time, end_time, participants, waiting_participants, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(call.id)
        .bind(call.meeting_id)
        .bind(call.host_id)
        .bind(call.status)
        .bind(call.start_time)
        .bind(call.end_time)
        .bind(&call.participants)
        .bind(&call.waiting_participants)
        .bind(call.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create call", e))?;
        Ok(())
    }

    async fn save_participants(&self, call_id: Uuid, participants: &[Participant]) -> AppResult<()> {
        sqlx::query("UPDATE video_calls SET participants = $2 WHERE id = $1")
            .bind(call_id)
            .bind(sqlx::types::Json(participants))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to save participants", e)
            })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM video_calls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete call", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_meeting(&self, meeting_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM video_calls WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete call", e))?;
        Ok(result.rows_affected() > 0)
    }
}
