//! User entity model. Read-only for the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user. The core only reads users, to resolve the slot
/// owner's timezone, email address, and avatar.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Email address for reminder delivery, if known.
    pub email: Option<String>,
    /// Fixed UTC offset string in the form `"UTC+06:00"`.
    pub time_zone: Option<String>,
    /// Avatar URL attached to relayed notifications.
    pub image: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
