//! Cleanup sweep for calls whose meeting window has lapsed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use meetsync_core::result::AppResult;
use meetsync_database::{CallStore, SlotStore, UserStore};
use meetsync_entity::video_call::VideoCall;
use meetsync_service::call::VideoCallOrchestrator;
use meetsync_service::time_window;
use meetsync_service::TrendScorer;

/// Deletes calls that outlived their meeting window.
///
/// The scheduler normally tears calls down when the slot transitions,
/// but a call can survive it: its slot row may be gone, or a
/// transition tick may have failed mid-way. The sweeper walks every
/// unfinished call, removes orphans immediately, and removes the rest
/// once a grace period past the window end has elapsed.
pub struct CleanupSweeper {
    calls: Arc<dyn CallStore>,
    slots: Arc<dyn SlotStore>,
    users: Arc<dyn UserStore>,
    orchestrator: Arc<VideoCallOrchestrator>,
    trend: TrendScorer,
    grace: Duration,
    running: AtomicBool,
}

impl CleanupSweeper {
    pub fn new(
        calls: Arc<dyn CallStore>,
        slots: Arc<dyn SlotStore>,
        users: Arc<dyn UserStore>,
        orchestrator: Arc<VideoCallOrchestrator>,
        grace_seconds: i64,
    ) -> Self {
        let trend = TrendScorer::new(slots.clone());
        Self {
            calls,
            slots,
            users,
            orchestrator,
            trend,
            grace: Duration::seconds(grace_seconds),
            running: AtomicBool::new(false),
        }
    }

    /// Run one sweep at the current instant. Skipped when the
    /// previous sweep is still in flight.
    pub async fn tick(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Previous cleanup sweep still running, skipping");
            return;
        }
        self.run_at(Utc::now()).await;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Sweep all unfinished calls as of `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) {
        let calls = match self.calls.find_unfinished().await {
            Ok(calls) => calls,
            Err(e) => {
                error!(error = %e, "Failed to load unfinished calls");
                return;
            }
        };
        debug!(count = calls.len(), "Cleanup sweep");

        for call in calls {
            let call_id = call.id;
            if let Err(e) = self.sweep_call(call, now).await {
                error!(call_id = %call_id, error = %e, "Call sweep failed");
            }
        }
    }

    async fn sweep_call(&self, call: VideoCall, now: DateTime<Utc>) -> AppResult<()> {
        let Some(slot) = self.slots.find_by_id(call.meeting_id).await? else {
            info!(call_id = %call.id, meeting_id = %call.meeting_id, "Deleting orphan call");
            self.calls.delete(call.id).await?;
            return Ok(());
        };

        let end = match self.resolve_end(&call, &slot).await? {
            Some(end) => end,
            None => {
                warn!(call_id = %call.id, "Call window unresolvable, skipping");
                return Ok(());
            }
        };

        if now < end + self.grace {
            return Ok(());
        }

        info!(call_id = %call.id, meeting_id = %call.meeting_id, "Sweeping lapsed call");
        self.orchestrator.delete_for_slot(call.meeting_id).await?;
        if let Err(e) = self.trend.recompute(slot.id).await {
            warn!(slot_id = %slot.id, error = %e, "Trend recompute failed");
        }
        Ok(())
    }

    /// Window end in the owner's time zone, falling back to the end
    /// instant computed at call creation.
    async fn resolve_end(
        &self,
        call: &VideoCall,
        slot: &meetsync_entity::slot::Slot,
    ) -> AppResult<Option<DateTime<Utc>>> {
        if let Some(owner) = self.users.find_by_id(slot.owner_id).await? {
            let offset = time_window::parse_utc_offset(owner.time_zone.as_deref());
            if let Ok(window) = time_window::resolve(
                slot.meeting_date,
                &slot.duration_from,
                &slot.duration_to,
                offset,
            ) {
                return Ok(Some(window.end));
            }
        }
        Ok(call.end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use meetsync_database::memory::MemoryStore;
    use meetsync_entity::slot::{Slot, SlotStatus};
    use meetsync_entity::user::User;
    use meetsync_realtime::hub::LocalHub;
    use meetsync_realtime::presence::{Namespace, PresenceRegistry};
    use meetsync_service::NotificationDispatcher;
    use uuid::Uuid;

    fn sweeper(store: Arc<MemoryStore>) -> CleanupSweeper {
        let hub = Arc::new(LocalHub::new());
        let chat = Arc::new(PresenceRegistry::new(Namespace::Chat));
        let notifier = Arc::new(NotificationDispatcher::new(
            store.clone(),
            chat,
            hub.clone(),
            30,
        ));
        let orchestrator = Arc::new(VideoCallOrchestrator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier,
            hub,
        ));
        CleanupSweeper::new(store.clone(), store.clone(), store, orchestrator, 180)
    }

    fn seed(store: &MemoryStore) -> Uuid {
        let owner_id = Uuid::new_v4();
        store.insert_user(User {
            id: owner_id,
            username: "owner".to_string(),
            email: None,
            time_zone: Some("UTC+00:00".to_string()),
            image: None,
            created_at: Utc::now(),
        });
        let slot_id = Uuid::new_v4();
        store.insert_slot(Slot {
            id: slot_id,
            owner_id,
            title: "Retro".to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            duration_from: "10:00 AM".to_string(),
            duration_to: "11:00 AM".to_string(),
            status: SlotStatus::Ongoing,
            last_reminder_sent_at: None,
            engagement_rate: 0,
            trend_score: 0,
            booked_users: vec![],
            created_at: Utc::now(),
        });
        store.insert_call(VideoCall::for_slot(
            slot_id,
            owner_id,
            Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 9, 1, 11, 0, 0).unwrap(),
        ));
        slot_id
    }

    fn end_plus(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 11, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    #[tokio::test]
    async fn call_inside_grace_survives() {
        let store = Arc::new(MemoryStore::new());
        let slot_id = seed(&store);
        let sweeper = sweeper(store.clone());

        sweeper.run_at(end_plus(179)).await;
        assert!(store.call_for_meeting(slot_id).is_some());
    }

    #[tokio::test]
    async fn call_past_grace_is_deleted() {
        let store = Arc::new(MemoryStore::new());
        let slot_id = seed(&store);
        let sweeper = sweeper(store.clone());

        sweeper.run_at(end_plus(181)).await;
        assert!(store.call_for_meeting(slot_id).is_none());
    }

    #[tokio::test]
    async fn orphan_call_is_deleted_immediately() {
        let store = Arc::new(MemoryStore::new());
        let meeting_id = Uuid::new_v4();
        store.insert_call(VideoCall::for_slot(
            meeting_id,
            Uuid::new_v4(),
            Utc::now(),
            Utc::now() + Duration::hours(1),
        ));
        let sweeper = sweeper(store.clone());

        sweeper.run_at(Utc::now()).await;
        assert!(store.call_for_meeting(meeting_id).is_none());
    }
}
