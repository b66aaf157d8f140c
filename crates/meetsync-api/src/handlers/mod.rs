//! HTTP handlers grouped by concern.

pub mod health;
pub mod presence;
pub mod trigger;

use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;
use meetsync_realtime::presence::Namespace;

/// Parse a namespace name from a request, defaulting to `default`.
pub(crate) fn parse_namespace(value: Option<&str>, default: Namespace) -> AppResult<Namespace> {
    match value {
        None => Ok(default),
        Some("chat") => Ok(Namespace::Chat),
        Some("video") => Ok(Namespace::Video),
        Some(other) => Err(AppError::validation(format!(
            "Unknown namespace \"{other}\", expected \"chat\" or \"video\""
        ))),
    }
}
