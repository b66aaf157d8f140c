//! Video call orchestration: one live call per slot, created when the
//! slot goes ongoing and torn down when it ends.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;
use meetsync_database::{CallStore, SlotStore, UserStore};
use meetsync_entity::slot::Slot;
use meetsync_entity::video_call::VideoCall;
use meetsync_entity::notification::NotificationKind;
use meetsync_realtime::events::OutboundEvent;
use meetsync_realtime::presence::Namespace;
use meetsync_realtime::relay::RoomDirectory;
use meetsync_realtime::transport::RealtimeTransport;

use crate::engagement::EngagementCalculator;
use crate::notify::NotificationDispatcher;
use crate::time_window;

/// Owns the call lifecycle for slots: creation with the resolved
/// meeting window, participant session bookkeeping, and teardown with
/// engagement recording.
pub struct VideoCallOrchestrator {
    slots: Arc<dyn SlotStore>,
    calls: Arc<dyn CallStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<NotificationDispatcher>,
    transport: Arc<dyn RealtimeTransport>,
    engagement: EngagementCalculator,
}

impl VideoCallOrchestrator {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        calls: Arc<dyn CallStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<NotificationDispatcher>,
        transport: Arc<dyn RealtimeTransport>,
    ) -> Self {
        let engagement = EngagementCalculator::new(slots.clone());
        Self {
            slots,
            calls,
            users,
            notifier,
            transport,
            engagement,
        }
    }

    /// Create the call for a slot, if one does not exist yet.
    ///
    /// Idempotent: a second call for the same slot returns the
    /// existing record untouched. The call window is the slot's
    /// local-time window resolved in the host's time zone. Each
    /// booked user gets a meeting-started notification; a failed
    /// notification is logged and does not fail creation.
    pub async fn create_for_slot(&self, slot_id: Uuid) -> AppResult<VideoCall> {
        if let Some(existing) = self.calls.find_by_meeting(slot_id).await? {
            return Ok(existing);
        }

        let slot = self
            .slots
            .find_by_id(slot_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Slot {slot_id} not found")))?;
        let host = self
            .users
            .find_by_id(slot.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Host {} not found", slot.owner_id)))?;

        let offset = time_window::parse_utc_offset(host.time_zone.as_deref());
        let window =
            time_window::resolve(slot.meeting_date, &slot.duration_from, &slot.duration_to, offset)?;

        let call = VideoCall::for_slot(slot.id, slot.owner_id, window.start, window.end);
        self.calls.create(&call).await?;
        info!(slot_id = %slot.id, call_id = %call.id, "Video call created");

        self.announce_start(&slot, &host.image).await;
        Ok(call)
    }

    async fn announce_start(&self, slot: &Slot, host_image: &Option<String>) {
        for user_id in &slot.booked_users {
            let result = self
                .notifier
                .dispatch(
                    NotificationKind::MeetingStarted,
                    slot.owner_id,
                    *user_id,
                    Some(slot.id),
                    "Get ready! The meeting is about to start.",
                    json!({
                        "slot_id": slot.id,
                        "host_image": host_image,
                    }),
                )
                .await;
            if let Err(e) = result {
                warn!(slot_id = %slot.id, user_id = %user_id, error = %e, "Failed to notify booked user");
            }
        }
    }

    /// Tear down a slot's call.
    ///
    /// Drops the host from the participant list, closes every still
    /// open session at the call's end time (or now if the window is
    /// incomplete), records engagement from the final sessions, then
    /// deletes the call and tells the room the meeting ended.
    ///
    /// Returns `true` when a call existed.
    pub async fn delete_for_slot(&self, slot_id: Uuid) -> AppResult<bool> {
        let Some(mut call) = self.calls.find_by_meeting(slot_id).await? else {
            return Ok(false);
        };

        let close_at = call.end_time.unwrap_or_else(Utc::now);
        let host_id = call.host_id;
        call.participants.0.retain(|p| p.user_id != host_id);
        for participant in call.participants.0.iter_mut() {
            participant.is_active = false;
            for session in participant.sessions.iter_mut() {
                if session.left_at.is_none() {
                    session.left_at = Some(close_at);
                }
            }
        }
        self.calls
            .save_participants(call.id, &call.participants.0)
            .await?;

        if let Err(e) = self.engagement.record(&call).await {
            warn!(slot_id = %slot_id, error = %e, "Failed to record engagement");
        }

        self.calls.delete_by_meeting(slot_id).await?;
        self.transport
            .emit_to_room(
                Namespace::Video,
                &slot_id.to_string(),
                &OutboundEvent::MeetingEnded,
            )
            .await;
        info!(slot_id = %slot_id, "Video call torn down");
        Ok(true)
    }
}

#[async_trait]
impl RoomDirectory for VideoCallOrchestrator {
    async fn users_in_room(&self, room_id: Uuid) -> AppResult<Vec<Uuid>> {
        let Some(call) = self.calls.find_by_meeting(room_id).await? else {
            return Ok(Vec::new());
        };
        Ok(call
            .participants
            .0
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.user_id)
            .collect())
    }

    async fn user_left(&self, user_id: Uuid, room_id: Uuid) -> AppResult<()> {
        let Some(mut call) = self.calls.find_by_meeting(room_id).await? else {
            return Ok(());
        };

        let is_host = call.is_host(user_id);
        let Some(participant) = call.participant_mut(user_id) else {
            return Ok(());
        };
        participant.is_active = false;
        // The host's total presence spans the whole call, so only
        // attendee sessions are closed on leave.
        if !is_host {
            participant.close_open_session(Utc::now());
        }

        self.calls
            .save_participants(call.id, &call.participants.0)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use meetsync_database::memory::MemoryStore;
    use meetsync_entity::slot::SlotStatus;
    use meetsync_entity::user::User;
    use meetsync_entity::video_call::{CallSession, Participant};
    use meetsync_realtime::hub::LocalHub;
    use meetsync_realtime::presence::PresenceRegistry;

    fn slot(owner_id: Uuid, booked: Vec<Uuid>) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            owner_id,
            title: "Design review".to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            duration_from: "10:00 AM".to_string(),
            duration_to: "11:00 AM".to_string(),
            status: SlotStatus::Ongoing,
            last_reminder_sent_at: None,
            engagement_rate: 0,
            trend_score: 0,
            booked_users: booked,
            created_at: Utc::now(),
        }
    }

    fn user(id: Uuid) -> User {
        User {
            id,
            username: "host".to_string(),
            email: Some("host@example.com".to_string()),
            time_zone: Some("UTC+02:00".to_string()),
            image: None,
            created_at: Utc::now(),
        }
    }

    fn orchestrator(store: Arc<MemoryStore>) -> VideoCallOrchestrator {
        let hub = Arc::new(LocalHub::new());
        let chat = Arc::new(PresenceRegistry::new(Namespace::Chat));
        let notifier = Arc::new(NotificationDispatcher::new(
            store.clone(),
            chat,
            hub.clone(),
            30,
        ));
        VideoCallOrchestrator::new(store.clone(), store.clone(), store, notifier, hub)
    }

    #[tokio::test]
    async fn create_is_idempotent_and_notifies_booked_users() {
        let store = Arc::new(MemoryStore::new());
        let host_id = Uuid::new_v4();
        let booked = vec![Uuid::new_v4(), Uuid::new_v4()];
        let s = slot(host_id, booked.clone());
        store.insert_slot(s.clone());
        store.insert_user(user(host_id));

        let orch = orchestrator(store.clone());
        let first = orch.create_for_slot(s.id).await.unwrap();
        let second = orch.create_for_slot(s.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.meeting_id, s.id);
        // Window resolved in the host's UTC+02:00 offset.
        assert_eq!(
            first.end_time.unwrap() - first.start_time.unwrap(),
            Duration::hours(1)
        );

        // One notification per booked user, not duplicated by the
        // second (idempotent) call.
        let notifications = store.notifications();
        assert_eq!(notifications.len(), booked.len());
        for n in &notifications {
            assert_eq!(n.kind, NotificationKind::MeetingStarted);
            assert!(booked.contains(&n.receiver));
        }
    }

    #[tokio::test]
    async fn create_for_missing_slot_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator(store);
        let err = orch.create_for_slot(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn teardown_closes_sessions_and_persists_engagement() {
        let store = Arc::new(MemoryStore::new());
        let host_id = Uuid::new_v4();
        let attendee_id = Uuid::new_v4();
        let s = slot(host_id, vec![attendee_id]);
        let slot_id = s.id;
        store.insert_slot(s);

        let start = Utc::now() - Duration::hours(1);
        let end = Utc::now();
        let mut call = VideoCall::for_slot(slot_id, host_id, start, end);
        call.participants = sqlx::types::Json(vec![
            Participant {
                user_id: host_id,
                sessions: vec![CallSession {
                    joined_at: start,
                    left_at: None,
                }],
                is_active: true,
            },
            Participant {
                user_id: attendee_id,
                sessions: vec![CallSession {
                    joined_at: start,
                    left_at: None,
                }],
                is_active: true,
            },
        ]);
        store.insert_call(call);

        let orch = orchestrator(store.clone());
        assert!(orch.delete_for_slot(slot_id).await.unwrap());

        // Call is gone, and the attendee's full-duration session
        // yields a 100 engagement rate on the slot.
        assert!(store.call_for_meeting(slot_id).is_none());
        assert_eq!(store.slot(slot_id).unwrap().engagement_rate, 100);

        // Second teardown finds nothing.
        assert!(!orch.delete_for_slot(slot_id).await.unwrap());
    }

    #[tokio::test]
    async fn user_left_closes_only_attendee_sessions() {
        let store = Arc::new(MemoryStore::new());
        let host_id = Uuid::new_v4();
        let attendee_id = Uuid::new_v4();
        let slot_id = Uuid::new_v4();

        let start = Utc::now() - Duration::minutes(10);
        let mut call = VideoCall::for_slot(slot_id, host_id, start, start + Duration::hours(1));
        call.participants = sqlx::types::Json(vec![
            Participant {
                user_id: host_id,
                sessions: vec![CallSession {
                    joined_at: start,
                    left_at: None,
                }],
                is_active: true,
            },
            Participant {
                user_id: attendee_id,
                sessions: vec![CallSession {
                    joined_at: start,
                    left_at: None,
                }],
                is_active: true,
            },
        ]);
        store.insert_call(call);

        let orch = orchestrator(store.clone());
        orch.user_left(attendee_id, slot_id).await.unwrap();
        orch.user_left(host_id, slot_id).await.unwrap();

        let call = store.call_for_meeting(slot_id).unwrap();
        let attendee = call
            .participants
            .0
            .iter()
            .find(|p| p.user_id == attendee_id)
            .unwrap();
        let host = call.participants.0.iter().find(|p| p.user_id == host_id).unwrap();

        assert!(!attendee.is_active);
        assert!(attendee.sessions[0].left_at.is_some());
        // Host session stays open until teardown.
        assert!(!host.is_active);
        assert!(host.sessions[0].left_at.is_none());

        // Both inactive, so nobody is reported in the room.
        assert!(orch.users_in_room(slot_id).await.unwrap().is_empty());
    }
}
