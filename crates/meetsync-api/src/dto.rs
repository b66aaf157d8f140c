//! Request and response DTOs for the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Generic API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// POST /api/trigger-event request body.
///
/// Fields are optional at the serde level so an incomplete body maps
/// to a 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerEventRequest {
    /// Target user.
    pub user_id: Option<Uuid>,
    /// Event name forwarded verbatim.
    pub event: Option<String>,
    /// Opaque payload forwarded verbatim.
    #[serde(default)]
    pub payload: Value,
}

/// POST /api/trigger-room-event request body.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRoomEventRequest {
    /// Target room.
    pub room_id: Option<Uuid>,
    /// Event name forwarded verbatim.
    pub event: Option<String>,
    /// Opaque payload forwarded verbatim.
    #[serde(default)]
    pub payload: Value,
    /// Target namespace, "chat" or "video" (default).
    pub namespace: Option<String>,
}

/// Result of a trigger call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEventResponse {
    /// Whether a live connection received the event. A persisted-only
    /// delivery is still a success.
    pub delivered: bool,
}

/// Query parameters for GET /api/socket-map.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketMapQuery {
    /// Namespace to dump, "chat" or "video".
    pub namespace: Option<String>,
}

/// One presence registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketMapEntry {
    /// The registered user.
    pub user_id: Uuid,
    /// Their live connection id.
    pub connection_id: String,
}

/// GET /api/health response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}
