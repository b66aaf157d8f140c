//! Store traits consumed by the scheduler, sweeper, and services.
//!
//! The document store is an external collaborator: components only
//! depend on these narrow traits, injected at construction. The sqlx
//! repositories in [`crate::repositories`] are the production
//! implementations; [`crate::memory`] backs tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use meetsync_core::result::AppResult;
use meetsync_entity::notification::Notification;
use meetsync_entity::slot::{Slot, SlotStatus};
use meetsync_entity::user::User;
use meetsync_entity::video_call::{Participant, VideoCall};

/// Read/write access to slots.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Find a slot by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Slot>>;

    /// All slots still in play (`Upcoming` or `Ongoing`). Terminal
    /// slots are never returned, which keeps transitions monotonic.
    async fn find_active(&self) -> AppResult<Vec<Slot>>;

    /// Persist a status transition.
    async fn update_status(&self, id: Uuid, status: SlotStatus) -> AppResult<()>;

    /// Persist the reminder cooldown timestamp.
    async fn update_last_reminder(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Persist a recomputed engagement rate.
    async fn update_engagement(&self, id: Uuid, rate: i32) -> AppResult<()>;

    /// Persist a recomputed trend score.
    async fn update_trend_score(&self, id: Uuid, score: i32) -> AppResult<()>;
}

/// Read/write access to video calls.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// The live call for a slot, if one exists.
    async fn find_by_meeting(&self, meeting_id: Uuid) -> AppResult<Option<VideoCall>>;

    /// All calls still live (`Waiting` or `Active`), for the sweeper.
    async fn find_unfinished(&self) -> AppResult<Vec<VideoCall>>;

    /// Insert a new call.
    async fn create(&self, call: &VideoCall) -> AppResult<()>;

    /// Replace a call's participant list.
    async fn save_participants(&self, call_id: Uuid, participants: &[Participant]) -> AppResult<()>;

    /// Delete a call by id. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Delete the call attached to a slot. Returns `true` if removed.
    async fn delete_by_meeting(&self, meeting_id: Uuid) -> AppResult<bool>;
}

/// Write access to notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a notification.
    async fn create(&self, notification: &Notification) -> AppResult<()>;

    /// Remove notifications past their expiry. Returns rows removed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

/// Read access to users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}
