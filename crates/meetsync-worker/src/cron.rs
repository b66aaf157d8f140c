//! Cron registration for the periodic workers.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::info;

use meetsync_core::config::scheduler::SchedulerConfig;
use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;
use meetsync_service::NotificationDispatcher;

use crate::scheduler::LifecycleScheduler;
use crate::sweeper::CleanupSweeper;

/// Owns the cron scheduler and the periodic task registrations.
pub struct CronRunner {
    scheduler: JobScheduler,
    config: SchedulerConfig,
}

impl std::fmt::Debug for CronRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronRunner").finish()
    }
}

impl CronRunner {
    /// Create a new cron runner.
    pub async fn new(config: SchedulerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, config })
    }

    /// Register the lifecycle tick, the cleanup sweep, and the
    /// notification purge.
    pub async fn register_default_tasks(
        &self,
        lifecycle: Arc<LifecycleScheduler>,
        sweeper: Arc<CleanupSweeper>,
        notifier: Arc<NotificationDispatcher>,
    ) -> AppResult<()> {
        self.register_slot_tick(lifecycle).await?;
        self.register_cleanup_tick(sweeper).await?;
        self.register_notification_purge(notifier).await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        info!("Cron scheduler shut down");
        Ok(())
    }

    async fn register_slot_tick(&self, lifecycle: Arc<LifecycleScheduler>) -> AppResult<()> {
        let cron = self.config.slot_tick_cron.clone();
        let job = CronJob::new_async(cron.as_str(), move |_uuid, _lock| {
            let lifecycle = Arc::clone(&lifecycle);
            Box::pin(async move {
                lifecycle.tick().await;
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create slot_tick schedule: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add slot_tick schedule: {}", e)))?;

        info!(cron = %cron, "Registered: slot_tick");
        Ok(())
    }

    async fn register_cleanup_tick(&self, sweeper: Arc<CleanupSweeper>) -> AppResult<()> {
        let cron = self.config.cleanup_tick_cron.clone();
        let job = CronJob::new_async(cron.as_str(), move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                sweeper.tick().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create cleanup_tick schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add cleanup_tick schedule: {}", e))
        })?;

        info!(cron = %cron, "Registered: cleanup_tick");
        Ok(())
    }

    async fn register_notification_purge(
        &self,
        notifier: Arc<NotificationDispatcher>,
    ) -> AppResult<()> {
        let cron = self.config.notification_purge_cron.clone();
        let job = CronJob::new_async(cron.as_str(), move |_uuid, _lock| {
            let notifier = Arc::clone(&notifier);
            Box::pin(async move {
                if let Err(e) = notifier.purge_expired().await {
                    tracing::error!(error = %e, "Notification purge failed");
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create notification_purge schedule: {}",
                e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add notification_purge schedule: {}", e))
        })?;

        info!(cron = %cron, "Registered: notification_purge");
        Ok(())
    }
}
