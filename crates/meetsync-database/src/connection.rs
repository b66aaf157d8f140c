//! PostgreSQL connection pool management.
//!
//! Startup connects with a bounded exponential backoff; exhausting the
//! retries is the only unrecoverable failure in the system.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use meetsync_core::config::DatabaseConfig;
use meetsync_core::error::{AppError, ErrorKind};

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: PgPool,
}

impl DatabasePool {
    /// Connect once using the configured pool limits and timeouts.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Connect with bounded exponential backoff.
    ///
    /// Attempt `n` waits `base * 2^(n-1)` before retrying. The final
    /// error is returned once `connect_retries` attempts are exhausted.
    pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<Self, AppError> {
        let attempts = config.connect_retries.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match Self::connect(config).await {
                Ok(db) => {
                    info!(attempt, "Connected to PostgreSQL");
                    return Ok(db);
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Database connection attempt failed");
                    last_err = Some(e);
                    if attempt < attempts {
                        let backoff = config.connect_retry_base_delay_ms * 2u64.pow(attempt - 1);
                        info!(backoff_ms = backoff, "Retrying database connection");
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AppError::database("Database connection retries exhausted")))
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
