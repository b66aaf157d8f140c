//! Slot lifecycle scheduler and cleanup sweeper configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the periodic lifecycle scheduler and cleanup sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the periodic tasks run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the slot status tick (default: every minute).
    #[serde(default = "default_slot_tick")]
    pub slot_tick_cron: String,
    /// Cron expression for the expired-call sweep (default: every 2 minutes).
    #[serde(default = "default_cleanup_tick")]
    pub cleanup_tick_cron: String,
    /// Cron expression for the notification purge (default: daily at 2 AM).
    #[serde(default = "default_purge_tick")]
    pub notification_purge_cron: String,
    /// Seconds past a call's computed end before the sweeper deletes it.
    #[serde(default = "default_grace")]
    pub call_grace_seconds: i64,
    /// Minimum seconds between two reminder emails for the same slot.
    #[serde(default = "default_cooldown")]
    pub reminder_cooldown_seconds: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slot_tick_cron: default_slot_tick(),
            cleanup_tick_cron: default_cleanup_tick(),
            notification_purge_cron: default_purge_tick(),
            call_grace_seconds: default_grace(),
            reminder_cooldown_seconds: default_cooldown(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_slot_tick() -> String {
    "0 * * * * *".to_string()
}

fn default_cleanup_tick() -> String {
    "0 */2 * * * *".to_string()
}

fn default_purge_tick() -> String {
    "0 0 2 * * *".to_string()
}

fn default_grace() -> i64 {
    180
}

fn default_cooldown() -> i64 {
    60
}
