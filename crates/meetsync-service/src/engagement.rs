//! Engagement scoring from participant session intervals.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use meetsync_core::result::AppResult;
use meetsync_database::SlotStore;
use meetsync_entity::video_call::VideoCall;

/// Derive a 0–100 engagement score from a call's sessions.
///
/// Per non-host participant, session time is clipped to the call
/// window (a missing `left_at` counts as the call end) and the
/// participant contributes `min(1, time/duration)`, counted only
/// when their total overlap is positive. The score is the rounded
/// mean over counted participants, or 0 when none qualify.
///
/// Returns `None` when the call has no usable window (missing
/// instants or non-positive duration), in which case nothing should
/// be persisted.
pub fn engagement_rate(call: &VideoCall) -> Option<i32> {
    let start = call.start_time?;
    let end = call.end_time?;
    let total = end - start;
    if total <= Duration::zero() {
        return None;
    }
    let total_ms = total.num_milliseconds() as f64;

    let mut accumulated = 0.0_f64;
    let mut counted = 0_u32;

    for participant in call.participants.0.iter() {
        if participant.user_id == call.host_id {
            continue;
        }

        let mut attended_ms = 0_i64;
        for session in &participant.sessions {
            let joined = session.joined_at.max(start);
            let left = session.left_at.unwrap_or(end).min(end);
            if left > joined {
                attended_ms += (left - joined).num_milliseconds();
            }
        }

        if attended_ms > 0 {
            accumulated += (attended_ms as f64 / total_ms).min(1.0);
            counted += 1;
        }
    }

    if counted == 0 {
        return Some(0);
    }
    Some((accumulated / f64::from(counted) * 100.0).round() as i32)
}

/// Persists recomputed engagement scores onto slots.
pub struct EngagementCalculator {
    slots: Arc<dyn SlotStore>,
}

impl EngagementCalculator {
    /// Create a calculator over the slot store.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Recompute a call's engagement and write it to the owning slot.
    ///
    /// A call without a usable window is skipped.
    pub async fn record(&self, call: &VideoCall) -> AppResult<()> {
        match engagement_rate(call) {
            Some(rate) => {
                debug!(meeting_id = %call.meeting_id, rate, "Persisting engagement rate");
                self.slots.update_engagement(call.meeting_id, rate).await
            }
            None => {
                debug!(meeting_id = %call.meeting_id, "Call has no usable window, skipping engagement");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use meetsync_entity::video_call::{CallSession, Participant, VideoCall};

    fn call_with(duration_min: i64) -> VideoCall {
        let start = Utc::now();
        VideoCall::for_slot(
            Uuid::new_v4(),
            Uuid::new_v4(),
            start,
            start + Duration::minutes(duration_min),
        )
    }

    fn attendee(joined_offset_min: i64, left_offset_min: Option<i64>, base: chrono::DateTime<Utc>) -> Participant {
        Participant {
            user_id: Uuid::new_v4(),
            sessions: vec![CallSession {
                joined_at: base + Duration::minutes(joined_offset_min),
                left_at: left_offset_min.map(|m| base + Duration::minutes(m)),
            }],
            is_active: false,
        }
    }

    #[test]
    fn full_duration_participants_score_100() {
        let call = call_with(30);
        let base = call.start_time.unwrap();
        let mut call = call;
        call.participants = sqlx::types::Json(vec![
            attendee(0, Some(30), base),
            attendee(0, None, base),
        ]);

        assert_eq!(engagement_rate(&call), Some(100));
    }

    #[test]
    fn half_duration_scores_50() {
        let call = call_with(60);
        let base = call.start_time.unwrap();
        let mut call = call;
        call.participants = sqlx::types::Json(vec![attendee(0, Some(30), base)]);

        assert_eq!(engagement_rate(&call), Some(50));
    }

    #[test]
    fn contribution_is_clamped_to_one() {
        let call = call_with(30);
        let base = call.start_time.unwrap();
        let mut call = call;
        // Joined before start and left after end; clips to the window.
        call.participants = sqlx::types::Json(vec![attendee(-20, Some(90), base)]);

        assert_eq!(engagement_rate(&call), Some(100));
    }

    #[test]
    fn host_is_excluded() {
        let call = call_with(30);
        let base = call.start_time.unwrap();
        let host = call.host_id;
        let mut call = call;
        call.participants = sqlx::types::Json(vec![Participant {
            user_id: host,
            sessions: vec![CallSession {
                joined_at: base,
                left_at: None,
            }],
            is_active: true,
        }]);

        assert_eq!(engagement_rate(&call), Some(0));
    }

    #[test]
    fn zero_when_no_positive_overlap() {
        let call = call_with(30);
        let base = call.start_time.unwrap();
        let mut call = call;
        // Session entirely after the call ended.
        call.participants = sqlx::types::Json(vec![attendee(40, Some(50), base)]);

        assert_eq!(engagement_rate(&call), Some(0));
    }

    #[test]
    fn unusable_window_yields_none() {
        let start = Utc::now();
        let mut call = VideoCall::for_slot(Uuid::new_v4(), Uuid::new_v4(), start, start);
        call.participants = sqlx::types::Json(vec![]);
        assert_eq!(engagement_rate(&call), None);

        call.end_time = None;
        assert_eq!(engagement_rate(&call), None);
    }

    #[test]
    fn multiple_sessions_accumulate() {
        let call = call_with(60);
        let base = call.start_time.unwrap();
        let mut call = call;
        call.participants = sqlx::types::Json(vec![Participant {
            user_id: Uuid::new_v4(),
            sessions: vec![
                CallSession {
                    joined_at: base,
                    left_at: Some(base + Duration::minutes(15)),
                },
                CallSession {
                    joined_at: base + Duration::minutes(30),
                    left_at: Some(base + Duration::minutes(45)),
                },
            ],
            is_active: false,
        }]);

        assert_eq!(engagement_rate(&call), Some(50));
    }
}
