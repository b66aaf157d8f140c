//! Application state shared across all handlers.

use std::sync::Arc;

use meetsync_core::config::AppConfig;
use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;
use meetsync_realtime::relay::SignalingRelay;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Realtime signaling relay, also the way to the presence
    /// registries.
    pub relay: Arc<SignalingRelay>,
}

impl AppState {
    /// Check the pre-shared secret presented in `x-api-key`.
    pub fn check_api_secret(&self, presented: Option<&str>) -> AppResult<()> {
        match presented {
            Some(key) if key == self.config.server.api_secret => Ok(()),
            _ => Err(AppError::authorization("Invalid or missing API key")),
        }
    }
}
