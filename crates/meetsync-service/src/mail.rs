//! Outbound email over an HTTP mail provider.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use meetsync_core::config::mailer::MailerConfig;
use meetsync_core::error::{AppError, ErrorKind};
use meetsync_core::result::AppResult;
use meetsync_core::traits::mailer::Mailer;

/// [`Mailer`] backed by a JSON HTTP endpoint.
///
/// When mailing is disabled in config, sends are logged and dropped
/// so the reminder path works without provider credentials.
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build mail HTTP client",
                    e,
                )
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        if !self.config.enabled {
            info!(to, subject, "Mailer disabled, dropping email");
            return Ok(());
        }

        let body = json!({
            "from": self.config.from_address,
            "to": to,
            "subject": subject,
            "html": html_body,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Mail provider request failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Mail provider returned status {}",
                response.status()
            )));
        }

        debug!(to, subject, "Email sent");
        Ok(())
    }
}
