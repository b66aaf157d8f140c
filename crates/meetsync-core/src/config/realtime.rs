//! Realtime presence and notification configuration.

use serde::{Deserialize, Serialize};

/// Real-time presence/signaling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size for per-connection outbound event channels.
    #[serde(default = "default_buffer")]
    pub channel_buffer_size: usize,
    /// Days a persisted notification is retained before the purge
    /// removes it.
    #[serde(default = "default_retention")]
    pub notification_retention_days: i64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_buffer(),
            notification_retention_days: default_retention(),
        }
    }
}

fn default_buffer() -> usize {
    64
}

fn default_retention() -> i64 {
    30
}
