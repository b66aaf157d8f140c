//! Notification entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle event kinds that generate notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to the slot owner when the meeting window opens.
    MeetingTimeStarted,
    /// Sent to each booked user when the call is created.
    MeetingStarted,
    /// Broadcast to the room when the call is torn down.
    MeetingEnded,
}

/// A notification persisted for a user and best-effort relayed to
/// their live connection. Never updated by the core after creation;
/// rows past `expires_at` are removed by the purge job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The event kind.
    pub kind: NotificationKind,
    /// Who triggered the notification.
    pub sender: Uuid,
    /// Who receives it.
    pub receiver: Uuid,
    /// The slot this notification refers to, if any.
    pub slot_id: Option<Uuid>,
    /// Human-readable content.
    pub message: String,
    /// Whether the user has seen it.
    pub is_read: bool,
    /// Whether the user clicked through.
    pub is_clicked: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification expires and may be purged.
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    /// Build a new unread notification expiring `retention_days` from now.
    pub fn new(
        kind: NotificationKind,
        sender: Uuid,
        receiver: Uuid,
        slot_id: Option<Uuid>,
        message: impl Into<String>,
        retention_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            sender,
            receiver,
            slot_id,
            message: message.into(),
            is_read: false,
            is_clicked: false,
            created_at: now,
            expires_at: now + Duration::days(retention_days),
        }
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_expires_after_retention() {
        let n = Notification::new(
            NotificationKind::MeetingStarted,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            "Get ready! The meeting is about to start.",
            30,
        );
        assert!(!n.is_read);
        assert!(!n.is_clicked);
        assert_eq!(n.expires_at - n.created_at, Duration::days(30));
        assert!(!n.is_expired());
    }
}
