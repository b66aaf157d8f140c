//! In-memory store backing.
//!
//! Implements every store trait over `RwLock`-guarded maps. Used by
//! the scheduler and service test suites and usable as a
//! single-process development backend; nothing survives a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use meetsync_core::result::AppResult;
use meetsync_entity::notification::Notification;
use meetsync_entity::slot::{Slot, SlotStatus};
use meetsync_entity::user::User;
use meetsync_entity::video_call::{Participant, VideoCall, VideoCallStatus};

use crate::store::{CallStore, NotificationStore, SlotStore, UserStore};

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
    calls: RwLock<HashMap<Uuid, VideoCall>>,
    notifications: RwLock<Vec<Notification>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot.
    pub fn insert_slot(&self, slot: Slot) {
        self.slots.write().unwrap().insert(slot.id, slot);
    }

    /// Seed a user.
    pub fn insert_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    /// Seed a call.
    pub fn insert_call(&self, call: VideoCall) {
        self.calls.write().unwrap().insert(call.id, call);
    }

    /// Snapshot a slot for assertions.
    pub fn slot(&self, id: Uuid) -> Option<Slot> {
        self.slots.read().unwrap().get(&id).cloned()
    }

    /// Snapshot the call for a slot.
    pub fn call_for_meeting(&self, meeting_id: Uuid) -> Option<VideoCall> {
        self.calls
            .read()
            .unwrap()
            .values()
            .find(|c| c.meeting_id == meeting_id)
            .cloned()
    }

    /// Snapshot all persisted notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().unwrap().clone()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Slot>> {
        Ok(self.slots.read().unwrap().get(&id).cloned())
    }

    async fn find_active(&self) -> AppResult<Vec<Slot>> {
        Ok(self
            .slots
            .read()
            .unwrap()
            .values()
            .filter(|s| !s.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: SlotStatus) -> AppResult<()> {
        if let Some(slot) = self.slots.write().unwrap().get_mut(&id) {
            slot.status = status;
        }
        Ok(())
    }

    async fn update_last_reminder(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(slot) = self.slots.write().unwrap().get_mut(&id) {
            slot.last_reminder_sent_at = Some(at);
        }
        Ok(())
    }

    async fn update_engagement(&self, id: Uuid, rate: i32) -> AppResult<()> {
        if let Some(slot) = self.slots.write().unwrap().get_mut(&id) {
            slot.engagement_rate = rate;
        }
        Ok(())
    }

    async fn update_trend_score(&self, id: Uuid, score: i32) -> AppResult<()> {
        if let Some(slot) = self.slots.write().unwrap().get_mut(&id) {
            slot.trend_score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn find_by_meeting(&self, meeting_id: Uuid) -> AppResult<Option<VideoCall>> {
        Ok(self
            .calls
            .read()
            .unwrap()
            .values()
            .find(|c| c.meeting_id == meeting_id)
            .cloned())
    }

    async fn find_unfinished(&self) -> AppResult<Vec<VideoCall>> {
        Ok(self
            .calls
            .read()
            .unwrap()
            .values()
            .filter(|c| {
                matches!(c.status, VideoCallStatus::Waiting | VideoCallStatus::Active)
            })
            .cloned()
            .collect())
    }

    async fn create(&self, call: &VideoCall) -> AppResult<()> {
        self.calls.write().unwrap().insert(call.id, call.clone());
        Ok(())
    }

    async fn save_participants(&self, call_id: Uuid, participants: &[Participant]) -> AppResult<()> {
        if let Some(call) = self.calls.write().unwrap().get_mut(&call_id) {
            call.participants = sqlx::types::Json(participants.to_vec());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.calls.write().unwrap().remove(&id).is_some())
    }

    async fn delete_by_meeting(&self, meeting_id: Uuid) -> AppResult<bool> {
        let mut calls = self.calls.write().unwrap();
        let ids: Vec<Uuid> = calls
            .values()
            .filter(|c| c.meeting_id == meeting_id)
            .map(|c| c.id)
            .collect();
        for id in &ids {
            calls.remove(id);
        }
        Ok(!ids.is_empty())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, notification: &Notification) -> AppResult<()> {
        self.notifications
            .write()
            .unwrap()
            .push(notification.clone());
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut notifications = self.notifications.write().unwrap();
        let before = notifications.len();
        notifications.retain(|n| !n.is_expired());
        Ok((before - notifications.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }
}
