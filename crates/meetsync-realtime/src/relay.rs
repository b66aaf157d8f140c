//! Signaling relay: routes join/leave, WebRTC handshake, and trigger
//! events between participants.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use meetsync_core::result::AppResult;

use crate::events::OutboundEvent;
use crate::presence::{Namespace, PresenceRegistry};
use crate::transport::RealtimeTransport;

/// Room membership and session bookkeeping, implemented by the video
/// call orchestrator. Kept behind a trait so the relay does not
/// depend on the service layer.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// User ids recorded as participants of a room's call.
    async fn users_in_room(&self, room_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Mark a user inactive in a room's call and close their open
    /// session.
    async fn user_left(&self, user_id: Uuid, room_id: Uuid) -> AppResult<()>;
}

/// Routes realtime events using presence lookups.
///
/// All delivery is best-effort: a target with no live connection is a
/// silent drop, never an error to the caller.
pub struct SignalingRelay {
    chat: Arc<PresenceRegistry>,
    video: Arc<PresenceRegistry>,
    transport: Arc<dyn RealtimeTransport>,
    rooms: Arc<dyn RoomDirectory>,
}

impl SignalingRelay {
    /// Create a relay over the two namespace registries.
    pub fn new(
        chat: Arc<PresenceRegistry>,
        video: Arc<PresenceRegistry>,
        transport: Arc<dyn RealtimeTransport>,
        rooms: Arc<dyn RoomDirectory>,
    ) -> Self {
        Self {
            chat,
            video,
            transport,
            rooms,
        }
    }

    /// The chat namespace registry.
    pub fn chat_registry(&self) -> &Arc<PresenceRegistry> {
        &self.chat
    }

    /// The video namespace registry.
    pub fn video_registry(&self) -> &Arc<PresenceRegistry> {
        &self.video
    }

    /// Register a user's chat connection.
    pub fn register_chat(&self, user_id: Uuid, connection_id: &str) {
        self.chat.register(user_id, connection_id);
    }

    /// Handle a chat-namespace disconnect.
    pub fn disconnect_chat(&self, connection_id: &str) {
        self.chat.remove_by_connection(connection_id);
    }

    /// Handle a user joining a video room.
    ///
    /// Registers presence, replies to the joiner with the other
    /// participant ids already in the room, and broadcasts the join to
    /// the rest of the room. The joiner is added to the room last so
    /// the broadcast does not echo back.
    pub async fn join_room(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        connection_id: &str,
    ) -> AppResult<()> {
        self.video.register(user_id, connection_id);
        let room = room_id.to_string();

        let existing_users: Vec<Uuid> = self
            .rooms
            .users_in_room(room_id)
            .await?
            .into_iter()
            .filter(|id| *id != user_id)
            .collect();

        self.transport
            .emit_to_connection(
                Namespace::Video,
                connection_id,
                &OutboundEvent::ExistingUsers { existing_users },
            )
            .await;

        self.transport
            .emit_to_room(
                Namespace::Video,
                &room,
                &OutboundEvent::UserJoined {
                    new_user_id: user_id,
                },
            )
            .await;

        self.transport
            .join_room(Namespace::Video, connection_id, &room)
            .await;

        info!(user_id = %user_id, room_id = %room_id, "User joined room");
        Ok(())
    }

    /// Handle an explicit leave: drop room membership and tell the room.
    pub async fn leave_room(&self, room_id: Uuid, user_id: Uuid, connection_id: &str) {
        let room = room_id.to_string();
        self.transport
            .leave_room(Namespace::Video, connection_id, &room)
            .await;
        self.transport
            .emit_to_room(Namespace::Video, &room, &OutboundEvent::UserLeft { user_id })
            .await;
        info!(user_id = %user_id, room_id = %room_id, "User left room");
    }

    /// Route a WebRTC offer to a specific peer.
    pub async fn offer(&self, from_user_id: Uuid, target_user_id: Uuid, offer: Value) {
        self.route_to_peer(
            target_user_id,
            OutboundEvent::ReceiveOffer {
                from_user_id,
                offer,
            },
        )
        .await;
    }

    /// Route a WebRTC answer to a specific peer.
    pub async fn answer(&self, from_user_id: Uuid, target_user_id: Uuid, answer: Value) {
        self.route_to_peer(
            target_user_id,
            OutboundEvent::ReceiveAnswer {
                from_user_id,
                answer,
            },
        )
        .await;
    }

    /// Route an ICE candidate to a specific peer.
    pub async fn ice_candidate(&self, from_user_id: Uuid, target_user_id: Uuid, candidate: Value) {
        self.route_to_peer(
            target_user_id,
            OutboundEvent::ReceiveIceCandidate {
                from_user_id,
                candidate,
            },
        )
        .await;
    }

    /// Handle an abrupt video-namespace disconnect.
    ///
    /// Resolves the user from the connection, removes presence, closes
    /// their call session, and tells the room they left. Out-of-order
    /// disconnects for already-removed connections are no-ops.
    pub async fn disconnect_video(&self, connection_id: &str, room_id: Option<Uuid>) {
        let Some(user_id) = self.video.remove_by_connection(connection_id) else {
            debug!(connection_id = %connection_id, "Disconnect for unknown connection");
            return;
        };

        if let Some(room_id) = room_id {
            if let Err(e) = self.rooms.user_left(user_id, room_id).await {
                warn!(user_id = %user_id, room_id = %room_id, error = %e, "Session bookkeeping failed on disconnect");
            }

            let room = room_id.to_string();
            self.transport
                .leave_room(Namespace::Video, connection_id, &room)
                .await;
            self.transport
                .emit_to_room(Namespace::Video, &room, &OutboundEvent::UserLeft { user_id })
                .await;
        }

        info!(user_id = %user_id, connection_id = %connection_id, "Video connection closed");
    }

    /// Forward an externally triggered event to a user's chat
    /// connection. Returns whether a live connection was found.
    pub async fn trigger_user_event(&self, user_id: Uuid, name: String, payload: Value) -> bool {
        let Some(connection_id) = self.chat.connection_for(user_id) else {
            debug!(user_id = %user_id, "No live connection for triggered event");
            return false;
        };

        self.transport
            .emit_to_connection(
                Namespace::Chat,
                &connection_id,
                &OutboundEvent::Custom { name, payload },
            )
            .await;
        true
    }

    /// Forward an externally triggered event to a room.
    pub async fn trigger_room_event(
        &self,
        namespace: Namespace,
        room_id: Uuid,
        name: String,
        payload: Value,
    ) {
        self.transport
            .emit_to_room(
                namespace,
                &room_id.to_string(),
                &OutboundEvent::Custom { name, payload },
            )
            .await;
    }

    /// Broadcast a meeting-ended event to a room.
    pub async fn broadcast_meeting_ended(&self, room_id: Uuid) {
        self.transport
            .emit_to_room(
                Namespace::Video,
                &room_id.to_string(),
                &OutboundEvent::MeetingEnded,
            )
            .await;
    }

    async fn route_to_peer(&self, target_user_id: Uuid, event: OutboundEvent) {
        let Some(connection_id) = self.video.connection_for(target_user_id) else {
            // Best-effort signaling: no queuing, no retry.
            debug!(user_id = %target_user_id, "Signaling target offline, dropping");
            return;
        };
        self.transport
            .emit_to_connection(Namespace::Video, &connection_id, &event)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::LocalHub;
    use tokio::sync::mpsc;

    struct StaticRooms {
        members: Vec<Uuid>,
    }

    #[async_trait]
    impl RoomDirectory for StaticRooms {
        async fn users_in_room(&self, _room_id: Uuid) -> AppResult<Vec<Uuid>> {
            Ok(self.members.clone())
        }

        async fn user_left(&self, _user_id: Uuid, _room_id: Uuid) -> AppResult<()> {
            Ok(())
        }
    }

    fn relay_with(members: Vec<Uuid>) -> (Arc<LocalHub>, SignalingRelay) {
        let hub = Arc::new(LocalHub::new());
        let relay = SignalingRelay::new(
            Arc::new(PresenceRegistry::new(Namespace::Chat)),
            Arc::new(PresenceRegistry::new(Namespace::Video)),
            hub.clone(),
            Arc::new(StaticRooms { members }),
        );
        (hub, relay)
    }

    #[tokio::test]
    async fn join_replies_with_existing_users_and_notifies_room() {
        let host = Uuid::new_v4();
        let joiner = Uuid::new_v4();
        let room = Uuid::new_v4();
        let (hub, relay) = relay_with(vec![host, joiner]);

        let (tx_host, mut rx_host) = mpsc::channel(8);
        let (tx_join, mut rx_join) = mpsc::channel(8);
        hub.attach(Namespace::Video, "host-conn", tx_host);
        hub.attach(Namespace::Video, "join-conn", tx_join);

        relay.join_room(room, host, "host-conn").await.unwrap();
        rx_host.try_recv().unwrap(); // host's own ExistingUsers reply

        relay.join_room(room, joiner, "join-conn").await.unwrap();

        let to_joiner: OutboundEvent =
            serde_json::from_str(&rx_join.try_recv().unwrap()).unwrap();
        assert_eq!(
            to_joiner,
            OutboundEvent::ExistingUsers {
                existing_users: vec![host],
            }
        );

        let to_host: OutboundEvent = serde_json::from_str(&rx_host.try_recv().unwrap()).unwrap();
        assert_eq!(to_host, OutboundEvent::UserJoined { new_user_id: joiner });
        // The joiner does not receive their own join broadcast.
        assert!(rx_join.try_recv().is_err());
    }

    #[tokio::test]
    async fn offer_to_offline_target_is_dropped() {
        let (_hub, relay) = relay_with(vec![]);
        relay
            .offer(Uuid::new_v4(), Uuid::new_v4(), serde_json::json!({"sdp": "x"}))
            .await;
    }

    #[tokio::test]
    async fn offer_routes_to_target_connection() {
        let from = Uuid::new_v4();
        let target = Uuid::new_v4();
        let (hub, relay) = relay_with(vec![]);

        let (tx, mut rx) = mpsc::channel(8);
        hub.attach(Namespace::Video, "t-conn", tx);
        relay.video_registry().register(target, "t-conn");

        relay.offer(from, target, serde_json::json!({"sdp": "v=0"})).await;

        let event: OutboundEvent = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        match event {
            OutboundEvent::ReceiveOffer { from_user_id, .. } => assert_eq!(from_user_id, from),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disconnect_unknown_connection_is_noop() {
        let (_hub, relay) = relay_with(vec![]);
        relay.disconnect_video("ghost", Some(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn trigger_user_event_reports_delivery() {
        let user = Uuid::new_v4();
        let (hub, relay) = relay_with(vec![]);

        assert!(
            !relay
                .trigger_user_event(user, "ping".into(), Value::Null)
                .await
        );

        let (tx, mut rx) = mpsc::channel(8);
        hub.attach(Namespace::Chat, "c1", tx);
        relay.register_chat(user, "c1");

        assert!(
            relay
                .trigger_user_event(user, "ping".into(), Value::Null)
                .await
        );
        assert!(rx.try_recv().is_ok());
    }
}
