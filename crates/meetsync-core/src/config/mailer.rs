//! Outbound mail relay configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP mail relay used for reminder emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Whether outbound mail is enabled. When disabled, sends are
    /// logged and dropped.
    #[serde(default)]
    pub enabled: bool,
    /// Mail relay endpoint URL.
    #[serde(default)]
    pub endpoint: String,
    /// API key sent to the relay.
    #[serde(default)]
    pub api_key: String,
    /// Sender address for all outbound mail.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Request timeout in seconds for relay calls.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: String::new(),
            from_address: default_from(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_from() -> String {
    "no-reply@meetsync.local".to_string()
}

fn default_timeout() -> u64 {
    10
}
