//! Realtime presence and signaling for MeetSync.
//!
//! Tracks which connected transport endpoint belongs to which user
//! (per namespace), relays WebRTC handshake messages between specific
//! participants, and broadcasts room-level events. Media never flows
//! through this service; everything here is signaling metadata and
//! best-effort delivery.

pub mod events;
pub mod hub;
pub mod presence;
pub mod relay;
pub mod transport;

pub use events::OutboundEvent;
pub use hub::LocalHub;
pub use presence::{Namespace, PresenceRegistry};
pub use relay::{RoomDirectory, SignalingRelay};
pub use transport::RealtimeTransport;
