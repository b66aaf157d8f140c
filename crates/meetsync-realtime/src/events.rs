//! Outbound realtime event types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use meetsync_entity::notification::NotificationKind;

/// An event emitted to a connection or room.
///
/// Serialized as `{"event": ..., "data": ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Reply to a joiner listing the other participants in the room.
    ExistingUsers {
        /// Other user ids already in the room.
        existing_users: Vec<Uuid>,
    },
    /// Broadcast to a room when someone joins.
    UserJoined {
        /// The user that joined.
        new_user_id: Uuid,
    },
    /// Broadcast to a room when someone leaves or disconnects.
    UserLeft {
        /// The user that left.
        user_id: Uuid,
    },
    /// WebRTC offer routed to a specific peer.
    ReceiveOffer {
        /// The offering peer.
        from_user_id: Uuid,
        /// SDP offer payload, passed through untouched.
        offer: Value,
    },
    /// WebRTC answer routed to a specific peer.
    ReceiveAnswer {
        /// The answering peer.
        from_user_id: Uuid,
        /// SDP answer payload.
        answer: Value,
    },
    /// ICE candidate routed to a specific peer.
    ReceiveIceCandidate {
        /// The originating peer.
        from_user_id: Uuid,
        /// Candidate payload.
        candidate: Value,
    },
    /// A persisted notification relayed to its receiver.
    Notification {
        /// The lifecycle event kind.
        kind: NotificationKind,
        /// The receiving user.
        user_id: Uuid,
        /// The serialized notification record plus any extras.
        payload: Value,
    },
    /// Broadcast to the room when a call is torn down.
    MeetingEnded,
    /// An externally triggered event, forwarded verbatim from the
    /// HTTP trigger surface.
    Custom {
        /// Event name chosen by the caller.
        name: String,
        /// Opaque payload.
        payload: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag_and_data() {
        let event = OutboundEvent::UserJoined {
            new_user_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "user_joined");
        assert_eq!(
            json["data"]["new_user_id"],
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn unit_variant_round_trips() {
        let json = serde_json::to_string(&OutboundEvent::MeetingEnded).unwrap();
        let back: OutboundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OutboundEvent::MeetingEnded);
    }
}
