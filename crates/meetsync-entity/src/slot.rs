//! Slot entity model: a schedulable meeting record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a slot.
///
/// Transitions are one-directional; `Completed` and `Expired` are
/// terminal and never re-evaluated by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "slot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// The meeting window has not started yet.
    Upcoming,
    /// Now is inside the meeting window.
    Ongoing,
    /// The window ended and the call recorded at least two participants.
    Completed,
    /// The window ended without enough participants.
    Expired,
}

impl SlotStatus {
    /// Check if the slot is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled meeting slot.
///
/// Created externally with `status = Upcoming`. The core only mutates
/// `status`, `last_reminder_sent_at`, `engagement_rate`, and
/// `trend_score`; it never deletes a slot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slot {
    /// Unique slot identifier.
    pub id: Uuid,
    /// User who created this slot.
    pub owner_id: Uuid,
    /// Meeting title, used in reminder emails.
    pub title: String,
    /// Calendar date of the meeting, in the owner's local zone.
    pub meeting_date: NaiveDate,
    /// Local start time-of-day string, e.g. `"1:30 PM"`.
    pub duration_from: String,
    /// Local end time-of-day string.
    pub duration_to: String,
    /// Current lifecycle status.
    pub status: SlotStatus,
    /// When the last reminder email was sent, if any.
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    /// Engagement score 0–100 derived from call sessions.
    pub engagement_rate: i32,
    /// Time-decayed engagement score used for ranking.
    pub trend_score: i32,
    /// Users booked onto this slot.
    pub booked_users: Vec<Uuid>,
    /// When the slot was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(SlotStatus::Completed.is_terminal());
        assert!(SlotStatus::Expired.is_terminal());
        assert!(!SlotStatus::Upcoming.is_terminal());
        assert!(!SlotStatus::Ongoing.is_terminal());
    }
}
