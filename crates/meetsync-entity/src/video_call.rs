//! Video call entity model: the realtime session aggregate tied 1:1
//! to an active slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status of a video call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "video_call_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VideoCallStatus {
    /// Created but the host has not joined yet.
    Waiting,
    /// The host joined and the call is live.
    Active,
    /// The call has ended.
    Ended,
}

/// A single attendance interval for a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    /// When the participant joined.
    pub joined_at: DateTime<Utc>,
    /// When the participant left; open while `None`.
    pub left_at: Option<DateTime<Utc>>,
}

/// A participant in a video call, with their attendance sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// The participating user.
    pub user_id: Uuid,
    /// Attendance intervals, in join order.
    pub sessions: Vec<CallSession>,
    /// Whether the participant is currently connected.
    pub is_active: bool,
}

impl Participant {
    /// Close the most recent open session, if any, at `at`.
    ///
    /// Returns `true` when a session was closed.
    pub fn close_open_session(&mut self, at: DateTime<Utc>) -> bool {
        if let Some(session) = self.sessions.iter_mut().rev().find(|s| s.left_at.is_none()) {
            session.left_at = Some(at);
            true
        } else {
            false
        }
    }
}

/// A user waiting for host admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingParticipant {
    /// The waiting user.
    pub user_id: Uuid,
    /// When admission was requested.
    pub requested_at: DateTime<Utc>,
}

/// The realtime video call aggregate. At most one live call exists
/// per slot; `start_time`/`end_time` are computed once at creation
/// from the slot's resolved window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoCall {
    /// Unique call identifier.
    pub id: Uuid,
    /// The slot this call belongs to.
    pub meeting_id: Uuid,
    /// The slot owner hosting the call.
    pub host_id: Uuid,
    /// Current call status.
    pub status: VideoCallStatus,
    /// Absolute UTC start of the call window.
    pub start_time: Option<DateTime<Utc>>,
    /// Absolute UTC end of the call window (cross-midnight adjusted).
    pub end_time: Option<DateTime<Utc>>,
    /// Participants with their attendance sessions.
    pub participants: sqlx::types::Json<Vec<Participant>>,
    /// Users waiting for host admission.
    pub waiting_participants: sqlx::types::Json<Vec<WaitingParticipant>>,
    /// When the call record was created.
    pub created_at: DateTime<Utc>,
}

impl VideoCall {
    /// Build a fresh `Waiting` call for a slot.
    pub fn for_slot(
        meeting_id: Uuid,
        host_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            meeting_id,
            host_id,
            status: VideoCallStatus::Waiting,
            start_time: Some(start_time),
            end_time: Some(end_time),
            participants: sqlx::types::Json(Vec::new()),
            waiting_participants: sqlx::types::Json(Vec::new()),
            created_at: Utc::now(),
        }
    }

    /// Number of participants recorded on the call.
    pub fn participant_count(&self) -> usize {
        self.participants.0.len()
    }

    /// Mutable reference to a participant, if present.
    pub fn participant_mut(&mut self, user_id: Uuid) -> Option<&mut Participant> {
        self.participants.0.iter_mut().find(|p| p.user_id == user_id)
    }

    /// Whether `user_id` is the call host.
    pub fn is_host(&self, user_id: Uuid) -> bool {
        self.host_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn close_open_session_picks_latest_open() {
        let t0 = Utc::now();
        let mut p = Participant {
            user_id: Uuid::new_v4(),
            sessions: vec![
                CallSession {
                    joined_at: t0,
                    left_at: Some(t0 + Duration::minutes(5)),
                },
                CallSession {
                    joined_at: t0 + Duration::minutes(10),
                    left_at: None,
                },
            ],
            is_active: true,
        };

        let closed_at = t0 + Duration::minutes(20);
        assert!(p.close_open_session(closed_at));
        assert_eq!(p.sessions[1].left_at, Some(closed_at));
        // No open session left
        assert!(!p.close_open_session(closed_at));
    }
}
