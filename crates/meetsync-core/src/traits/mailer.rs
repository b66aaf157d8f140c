//! Outbound mail capability.

use async_trait::async_trait;

use crate::result::AppResult;

/// Black-box "send mail" capability.
///
/// The scheduler only needs to hand off a recipient, a subject, and a
/// rendered HTML body; delivery details (SMTP, API relay) live behind
/// this trait. A send failure is reported as an error so callers can
/// log and move on; it must never abort a scheduler tick.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single HTML email.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()>;
}
