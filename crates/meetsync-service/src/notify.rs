//! Notification dispatch: persist first, then best-effort relay to
//! the receiver's live chat connection.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use meetsync_core::result::AppResult;
use meetsync_database::NotificationStore;
use meetsync_entity::notification::{Notification, NotificationKind};
use meetsync_realtime::events::OutboundEvent;
use meetsync_realtime::presence::PresenceRegistry;
use meetsync_realtime::transport::RealtimeTransport;

/// Persists notifications and relays them over the chat namespace
/// when the receiver is online. Relay is best-effort: an offline
/// receiver still gets the durable record.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    chat: Arc<PresenceRegistry>,
    transport: Arc<dyn RealtimeTransport>,
    retention_days: i64,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        chat: Arc<PresenceRegistry>,
        transport: Arc<dyn RealtimeTransport>,
        retention_days: i64,
    ) -> Self {
        Self {
            store,
            chat,
            transport,
            retention_days,
        }
    }

    /// Persist a notification and relay it, with no extra payload.
    pub async fn notify(
        &self,
        kind: NotificationKind,
        sender: Uuid,
        receiver: Uuid,
        slot_id: Option<Uuid>,
        message: impl Into<String>,
    ) -> AppResult<bool> {
        self.dispatch(kind, sender, receiver, slot_id, message, Value::Null)
            .await
    }

    /// Persist a notification, then relay it to the receiver's live
    /// connection with `extras` merged into the payload.
    ///
    /// Returns whether the receiver was online at relay time. The
    /// database write is the only fallible step.
    pub async fn dispatch(
        &self,
        kind: NotificationKind,
        sender: Uuid,
        receiver: Uuid,
        slot_id: Option<Uuid>,
        message: impl Into<String>,
        extras: Value,
    ) -> AppResult<bool> {
        let notification = Notification::new(
            kind,
            sender,
            receiver,
            slot_id,
            message,
            self.retention_days,
        );
        self.store.create(&notification).await?;

        let mut payload = serde_json::to_value(&notification).unwrap_or(Value::Null);
        if let (Value::Object(base), Value::Object(extra)) = (&mut payload, extras) {
            base.extend(extra);
        }

        let Some(connection_id) = self.chat.connection_for(receiver) else {
            debug!(%receiver, ?kind, "Receiver offline, notification persisted only");
            return Ok(false);
        };

        let event = OutboundEvent::Notification {
            kind,
            user_id: receiver,
            payload,
        };
        self.transport
            .emit_to_connection(self.chat.namespace(), &connection_id, &event)
            .await;
        debug!(%receiver, ?kind, "Notification relayed");
        Ok(true)
    }

    /// Delete notifications past their retention window.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let removed = self.store.delete_expired().await?;
        if removed > 0 {
            info!(removed, "Purged expired notifications");
        }
        Ok(removed)
    }
}
