//! In-process transport hub.
//!
//! Implements [`RealtimeTransport`] over per-connection mpsc channels
//! and a room membership map. The WebSocket layer attaches a sender
//! per accepted connection and drains the receiver into the socket;
//! tests attach channels directly.

use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc;

use async_trait::async_trait;

use crate::events::OutboundEvent;
use crate::presence::Namespace;
use crate::transport::RealtimeTransport;

/// Channel-backed transport for a single process.
#[derive(Debug, Default)]
pub struct LocalHub {
    /// (namespace, connection id) → outbound sender.
    senders: DashMap<(Namespace, String), mpsc::Sender<String>>,
    /// (namespace, room id) → member connection ids.
    rooms: DashMap<(Namespace, String), HashSet<String>>,
}

impl LocalHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection's outbound channel.
    pub fn attach(
        &self,
        namespace: Namespace,
        connection_id: impl Into<String>,
        sender: mpsc::Sender<String>,
    ) {
        self.senders
            .insert((namespace, connection_id.into()), sender);
    }

    /// Detach a connection: drop its sender and room memberships.
    pub fn detach(&self, namespace: Namespace, connection_id: &str) {
        self.senders
            .remove(&(namespace, connection_id.to_string()));
        for mut room in self.rooms.iter_mut() {
            if room.key().0 == namespace {
                room.value_mut().remove(connection_id);
            }
        }
    }

    /// Members of a room, for diagnostics.
    pub fn room_members(&self, namespace: Namespace, room_id: &str) -> Vec<String> {
        self.rooms
            .get(&(namespace, room_id.to_string()))
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn send(&self, namespace: Namespace, connection_id: &str, payload: &str) {
        let sender = self
            .senders
            .get(&(namespace, connection_id.to_string()))
            .map(|s| s.value().clone());

        match sender {
            Some(sender) => {
                if sender.send(payload.to_string()).await.is_err() {
                    tracing::debug!(
                        namespace = %namespace,
                        connection_id = %connection_id,
                        "Dropped event for closed connection"
                    );
                }
            }
            None => {
                tracing::trace!(
                    namespace = %namespace,
                    connection_id = %connection_id,
                    "No attached channel for connection"
                );
            }
        }
    }

    fn encode(event: &OutboundEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode outbound event");
                None
            }
        }
    }
}

#[async_trait]
impl RealtimeTransport for LocalHub {
    async fn emit_to_connection(
        &self,
        namespace: Namespace,
        connection_id: &str,
        event: &OutboundEvent,
    ) {
        if let Some(payload) = Self::encode(event) {
            self.send(namespace, connection_id, &payload).await;
        }
    }

    async fn emit_to_room(&self, namespace: Namespace, room_id: &str, event: &OutboundEvent) {
        let members = self.room_members(namespace, room_id);
        let Some(payload) = Self::encode(event) else {
            return;
        };
        for connection_id in members {
            self.send(namespace, &connection_id, &payload).await;
        }
    }

    async fn join_room(&self, namespace: Namespace, connection_id: &str, room_id: &str) {
        self.rooms
            .entry((namespace, room_id.to_string()))
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_room(&self, namespace: Namespace, connection_id: &str, room_id: &str) {
        if let Some(mut members) = self.rooms.get_mut(&(namespace, room_id.to_string())) {
            members.remove(connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn emit_to_room_reaches_only_members() {
        let hub = LocalHub::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);

        hub.attach(Namespace::Video, "a", tx_a);
        hub.attach(Namespace::Video, "b", tx_b);
        hub.join_room(Namespace::Video, "a", "room-1").await;

        let event = OutboundEvent::UserJoined {
            new_user_id: Uuid::new_v4(),
        };
        hub.emit_to_room(Namespace::Video, "room-1", &event).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn detach_removes_room_membership() {
        let hub = LocalHub::new();
        let (tx, _rx) = mpsc::channel(8);
        hub.attach(Namespace::Video, "a", tx);
        hub.join_room(Namespace::Video, "a", "room-1").await;

        hub.detach(Namespace::Video, "a");
        assert!(hub.room_members(Namespace::Video, "room-1").is_empty());
    }

    #[tokio::test]
    async fn emit_to_unknown_connection_is_silent() {
        let hub = LocalHub::new();
        hub.emit_to_connection(Namespace::Chat, "ghost", &OutboundEvent::MeetingEnded)
            .await;
    }
}
