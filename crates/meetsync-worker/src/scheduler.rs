//! Minutely slot lifecycle tick: reminders, status transitions, call
//! creation and teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use meetsync_core::config::scheduler::SchedulerConfig;
use meetsync_core::result::AppResult;
use meetsync_core::traits::mailer::Mailer;
use meetsync_database::{CallStore, SlotStore, UserStore};
use meetsync_entity::notification::NotificationKind;
use meetsync_entity::slot::{Slot, SlotStatus};
use meetsync_entity::user::User;
use meetsync_service::call::VideoCallOrchestrator;
use meetsync_service::notify::NotificationDispatcher;
use meetsync_service::time_window::{self, TimeWindow};
use meetsync_service::{reminder, TrendScorer};

use crate::transition;

/// Drives every live slot through its lifecycle once per tick.
///
/// A tick loads the slots still in {Upcoming, Ongoing}, and for each
/// one resolves the meeting window in the owner's time zone, runs the
/// reminder check, then applies the status transition. Per-slot
/// failures are logged and never abort the batch; overlapping ticks
/// are collapsed to one.
pub struct LifecycleScheduler {
    slots: Arc<dyn SlotStore>,
    users: Arc<dyn UserStore>,
    calls: Arc<dyn CallStore>,
    orchestrator: Arc<VideoCallOrchestrator>,
    notifier: Arc<NotificationDispatcher>,
    trend: TrendScorer,
    mailer: Arc<dyn Mailer>,
    config: SchedulerConfig,
    running: AtomicBool,
}

impl LifecycleScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        slots: Arc<dyn SlotStore>,
        users: Arc<dyn UserStore>,
        calls: Arc<dyn CallStore>,
        orchestrator: Arc<VideoCallOrchestrator>,
        notifier: Arc<NotificationDispatcher>,
        mailer: Arc<dyn Mailer>,
        config: SchedulerConfig,
    ) -> Self {
        let trend = TrendScorer::new(slots.clone());
        Self {
            slots,
            users,
            calls,
            orchestrator,
            notifier,
            trend,
            mailer,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Run one tick at the current instant. Skipped when the previous
    /// tick is still in flight.
    pub async fn tick(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Previous lifecycle tick still running, skipping");
            return;
        }
        self.run_at(Utc::now()).await;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Process all live slots as of `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) {
        let slots = match self.slots.find_active().await {
            Ok(slots) => slots,
            Err(e) => {
                error!(error = %e, "Failed to load active slots");
                return;
            }
        };
        debug!(count = slots.len(), "Lifecycle tick");

        for slot in slots {
            let slot_id = slot.id;
            if let Err(e) = self.process_slot(slot, now).await {
                error!(slot_id = %slot_id, error = %e, "Slot lifecycle step failed");
            }
        }
    }

    async fn process_slot(&self, slot: Slot, now: DateTime<Utc>) -> AppResult<()> {
        let Some(owner) = self.users.find_by_id(slot.owner_id).await? else {
            warn!(slot_id = %slot.id, owner_id = %slot.owner_id, "Slot owner missing, skipping");
            return Ok(());
        };

        let offset = time_window::parse_utc_offset(owner.time_zone.as_deref());
        let window = match time_window::resolve(
            slot.meeting_date,
            &slot.duration_from,
            &slot.duration_to,
            offset,
        ) {
            Ok(window) => window,
            Err(e) => {
                warn!(slot_id = %slot.id, error = %e, "Unparseable slot window, skipping");
                return Ok(());
            }
        };

        if slot.status == SlotStatus::Upcoming {
            self.maybe_send_reminder(&slot, &owner, &window, now).await;
        }

        // The call is fetched before any teardown so the participant
        // count survives the deletion.
        let call = self.calls.find_by_meeting(slot.id).await?;
        let participant_count = call.as_ref().map(|c| c.participant_count()).unwrap_or(0);

        let next = transition::next_status(slot.status, now, &window, participant_count);
        if next == slot.status {
            return Ok(());
        }
        info!(slot_id = %slot.id, from = %slot.status, to = %next, "Slot transition");

        match next {
            SlotStatus::Ongoing => {
                self.orchestrator.create_for_slot(slot.id).await?;
                if let Err(e) = self
                    .notifier
                    .notify(
                        NotificationKind::MeetingTimeStarted,
                        slot.owner_id,
                        slot.owner_id,
                        Some(slot.id),
                        "*** It's time to start your meeting ***",
                    )
                    .await
                {
                    warn!(slot_id = %slot.id, error = %e, "Failed to notify owner of meeting start");
                }
            }
            SlotStatus::Completed | SlotStatus::Expired => {
                if call.is_some() {
                    self.orchestrator.delete_for_slot(slot.id).await?;
                }
            }
            SlotStatus::Upcoming => {}
        }

        self.slots.update_status(slot.id, next).await?;
        if let Err(e) = self.trend.recompute(slot.id).await {
            warn!(slot_id = %slot.id, error = %e, "Trend recompute failed");
        }
        Ok(())
    }

    async fn maybe_send_reminder(
        &self,
        slot: &Slot,
        owner: &User,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) {
        if !reminder::reminder_due(
            now,
            window.start,
            slot.last_reminder_sent_at,
            self.config.reminder_cooldown_seconds,
        ) {
            return;
        }

        let Some(email) = owner.email.as_deref() else {
            warn!(slot_id = %slot.id, "Owner has no email address, skipping reminder");
            return;
        };

        let subject = reminder::reminder_subject(slot);
        let body = reminder::reminder_html(slot, window.start);
        if let Err(e) = self.mailer.send(email, &subject, &body).await {
            warn!(slot_id = %slot.id, error = %e, "Reminder email failed");
            return;
        }

        info!(slot_id = %slot.id, "Reminder sent");
        if let Err(e) = self.slots.update_last_reminder(slot.id, now).await {
            warn!(slot_id = %slot.id, error = %e, "Failed to persist reminder timestamp");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use meetsync_database::memory::MemoryStore;
    use meetsync_entity::video_call::{CallSession, Participant, VideoCall, VideoCallStatus};
    use meetsync_realtime::hub::LocalHub;
    use meetsync_realtime::presence::{Namespace, PresenceRegistry};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, _html_body: &str) -> AppResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        scheduler: LifecycleScheduler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
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
            notifier.clone(),
            hub,
        ));
        let mailer = Arc::new(RecordingMailer::new());
        let scheduler = LifecycleScheduler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            orchestrator,
            notifier,
            mailer.clone(),
            SchedulerConfig::default(),
        );
        Fixture {
            store,
            mailer,
            scheduler,
        }
    }

    fn seed_user(store: &MemoryStore) -> Uuid {
        let id = Uuid::new_v4();
        store.insert_user(User {
            id,
            username: "owner".to_string(),
            email: Some("owner@example.com".to_string()),
            time_zone: Some("UTC+00:00".to_string()),
            created_at: Utc::now(),
            image: None,
        });
        id
    }

    fn seed_slot(store: &MemoryStore, owner_id: Uuid, status: SlotStatus) -> Uuid {
        let id = Uuid::new_v4();
        store.insert_slot(Slot {
            id,
            owner_id,
            title: "Standup".to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            duration_from: "10:00 AM".to_string(),
            duration_to: "11:00 AM".to_string(),
            status,
            last_reminder_sent_at: None,
            engagement_rate: 0,
            trend_score: 0,
            booked_users: vec![Uuid::new_v4()],
            created_at: Utc::now(),
        });
        id
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn upcoming_slot_goes_ongoing_with_call_and_notifications() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Upcoming);

        f.scheduler.run_at(at(10, 30)).await;

        let slot = f.store.slot(slot_id).unwrap();
        assert_eq!(slot.status, SlotStatus::Ongoing);

        let call = f.store.call_for_meeting(slot_id).unwrap();
        assert_eq!(call.status, VideoCallStatus::Waiting);
        assert_eq!(call.start_time.unwrap(), at(10, 0));
        assert_eq!(call.end_time.unwrap(), at(11, 0));

        // One MeetingStarted per booked user, one MeetingTimeStarted
        // for the owner.
        let kinds: Vec<_> = f.store.notifications().iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NotificationKind::MeetingStarted));
        assert!(kinds.contains(&NotificationKind::MeetingTimeStarted));
        assert_eq!(kinds.len(), 2);
    }

    #[tokio::test]
    async fn before_window_nothing_changes() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Upcoming);

        f.scheduler.run_at(at(8, 17)).await;

        assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Upcoming);
        assert!(f.store.call_for_meeting(slot_id).is_none());
        assert!(f.store.notifications().is_empty());
    }

    #[tokio::test]
    async fn past_window_without_attendees_expires() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Ongoing);

        f.scheduler.run_at(at(12, 0)).await;

        assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Expired);
    }

    #[tokio::test]
    async fn past_window_with_two_participants_completes_and_tears_down() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Ongoing);

        let start = at(10, 0);
        let mut call = VideoCall::for_slot(slot_id, owner, start, at(11, 0));
        call.participants = sqlx::types::Json(
            [owner, Uuid::new_v4()]
                .into_iter()
                .map(|user_id| Participant {
                    user_id,
                    sessions: vec![CallSession {
                        joined_at: start,
                        left_at: None,
                    }],
                    is_active: true,
                })
                .collect(),
        );
        f.store.insert_call(call);

        f.scheduler.run_at(at(12, 0)).await;

        assert_eq!(
            f.store.slot(slot_id).unwrap().status,
            SlotStatus::Completed
        );
        assert!(f.store.call_for_meeting(slot_id).is_none());
    }

    #[tokio::test]
    async fn terminal_slots_stay_terminal() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Upcoming);

        f.scheduler.run_at(at(12, 0)).await;
        assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Expired);

        // A later tick inside a (hypothetically re-opened) window must
        // not resurrect the slot.
        f.scheduler.run_at(at(10, 30)).await;
        assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Expired);
    }

    #[tokio::test]
    async fn reminder_fires_once_per_boundary() {
        let f = fixture();
        let owner = seed_user(&f.store);
        let slot_id = seed_slot(&f.store, owner, SlotStatus::Upcoming);

        // Exactly three hours before the 10:00 start.
        let boundary = at(7, 0);
        f.scheduler.run_at(boundary).await;
        assert_eq!(f.mailer.count(), 1);
        assert_eq!(
            f.store.slot(slot_id).unwrap().last_reminder_sent_at,
            Some(boundary)
        );

        // A retried tick 30 seconds later is inside the cooldown.
        f.scheduler.run_at(boundary + Duration::seconds(30)).await;
        assert_eq!(f.mailer.count(), 1);
    }

    #[tokio::test]
    async fn off_boundary_tick_sends_no_reminder() {
        let f = fixture();
        let owner = seed_user(&f.store);
        seed_slot(&f.store, owner, SlotStatus::Upcoming);

        f.scheduler.run_at(at(8, 30)).await;
        assert_eq!(f.mailer.count(), 0);
    }
}
