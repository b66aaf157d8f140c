//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use meetsync_core::error::{AppError, ErrorKind};
use meetsync_core::result::AppResult;
use meetsync_entity::notification::Notification;

use crate::store::NotificationStore;

/// Repository for notification writes and TTL purging.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, kind, sender, receiver, slot_id, message, is_read, is_clicked, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(notification.id)
        .bind(notification.kind)
        .bind(notification.sender)
        .bind(notification.receiver)
        .bind(notification.slot_id)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.is_clicked)
        .bind(notification.created_at)
        .bind(notification.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })?;
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge notifications", e)
            })?;
        Ok(result.rows_affected())
    }
}
