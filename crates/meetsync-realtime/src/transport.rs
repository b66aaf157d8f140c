//! Transport seam consumed by the relay and dispatchers.

use async_trait::async_trait;

use crate::events::OutboundEvent;
use crate::presence::Namespace;

/// Per-namespace pub/sub primitives of the underlying realtime
/// transport.
///
/// The actual WebSocket layer lives outside the core; everything here
/// is best-effort delivery, so the methods report nothing; a closed
/// or missing endpoint is logged by the implementation and otherwise
/// ignored.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Emit an event to a single connection.
    async fn emit_to_connection(
        &self,
        namespace: Namespace,
        connection_id: &str,
        event: &OutboundEvent,
    );

    /// Emit an event to every connection in a room.
    async fn emit_to_room(&self, namespace: Namespace, room_id: &str, event: &OutboundEvent);

    /// Add a connection to a room.
    async fn join_room(&self, namespace: Namespace, connection_id: &str, room_id: &str);

    /// Remove a connection from a room.
    async fn leave_room(&self, namespace: Namespace, connection_id: &str, room_id: &str);
}
