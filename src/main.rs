//! MeetSync server: meeting slot lifecycle, realtime signaling, and
//! the HTTP trigger surface wired into one process.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use meetsync_core::config::AppConfig;
use meetsync_core::error::AppError;
use meetsync_core::traits::mailer::Mailer;
use meetsync_database::repositories::{
    NotificationRepository, SlotRepository, UserRepository, VideoCallRepository,
};
use meetsync_database::{CallStore, DatabasePool, NotificationStore, SlotStore, UserStore};
use meetsync_realtime::hub::LocalHub;
use meetsync_realtime::presence::{Namespace, PresenceRegistry};
use meetsync_realtime::relay::SignalingRelay;
use meetsync_service::{HttpMailer, NotificationDispatcher, VideoCallOrchestrator};
use meetsync_worker::{CleanupSweeper, CronRunner, LifecycleScheduler};

#[tokio::main]
async fn main() {
    let env = std::env::var("MEETSYNC_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing with the configured level and format.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MeetSync v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // Database: connect with backoff, then migrate. Startup is fatal
    // when the retries are exhausted.
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect_with_retry(&config.database).await?;
    meetsync_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // Stores.
    let slots: Arc<dyn SlotStore> = Arc::new(SlotRepository::new(db.pool().clone()));
    let calls: Arc<dyn CallStore> = Arc::new(VideoCallRepository::new(db.pool().clone()));
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.pool().clone()));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(NotificationRepository::new(db.pool().clone()));

    // Realtime plumbing.
    let hub = Arc::new(LocalHub::new());
    let chat = Arc::new(PresenceRegistry::new(Namespace::Chat));
    let video = Arc::new(PresenceRegistry::new(Namespace::Video));

    let notifier = Arc::new(NotificationDispatcher::new(
        notifications,
        chat.clone(),
        hub.clone(),
        config.realtime.notification_retention_days,
    ));
    let orchestrator = Arc::new(VideoCallOrchestrator::new(
        slots.clone(),
        calls.clone(),
        users.clone(),
        notifier.clone(),
        hub.clone(),
    ));
    let relay = Arc::new(SignalingRelay::new(
        chat,
        video,
        hub.clone(),
        orchestrator.clone(),
    ));

    // Workers.
    let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(config.mailer.clone())?);
    let lifecycle = Arc::new(LifecycleScheduler::new(
        slots.clone(),
        users.clone(),
        calls.clone(),
        orchestrator.clone(),
        notifier.clone(),
        mailer,
        config.scheduler.clone(),
    ));
    let sweeper = Arc::new(CleanupSweeper::new(
        calls,
        slots,
        users,
        orchestrator,
        config.scheduler.call_grace_seconds,
    ));

    let mut cron = CronRunner::new(config.scheduler.clone()).await?;
    if config.scheduler.enabled {
        cron.register_default_tasks(lifecycle, sweeper, notifier)
            .await?;
        cron.start().await?;
    } else {
        tracing::warn!("Scheduler disabled, slot lifecycle will not advance");
    }

    // HTTP surface.
    let state = meetsync_api::AppState {
        config: config.clone(),
        relay,
    };
    let router = meetsync_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server failed: {}", e)))?;

    tracing::info!("Shutting down");
    cron.shutdown().await?;
    db.close().await;
    Ok(())
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
