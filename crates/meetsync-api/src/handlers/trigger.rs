//! Secret-gated trigger endpoints for pushing events from outside
//! the socket layer.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use meetsync_core::error::AppError;
use meetsync_realtime::presence::Namespace;

use crate::dto::{ApiResponse, TriggerEventRequest, TriggerEventResponse, TriggerRoomEventRequest};
use crate::error::ApiError;
use crate::handlers::parse_namespace;
use crate::state::AppState;

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

/// POST /api/trigger-event
///
/// Forwards a named event to one user's live chat connection. An
/// offline target is still a 200; `delivered` tells the caller
/// whether anyone was listening.
pub async fn trigger_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TriggerEventRequest>,
) -> Result<Json<ApiResponse<TriggerEventResponse>>, ApiError> {
    state.check_api_secret(api_key(&headers))?;

    let user_id = body
        .user_id
        .ok_or_else(|| AppError::validation("user_id is required"))?;
    let event = body
        .event
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("event is required"))?;

    info!(user_id = %user_id, event = %event, "Trigger event");
    let delivered = state
        .relay
        .trigger_user_event(user_id, event, body.payload)
        .await;

    Ok(Json(ApiResponse::ok(TriggerEventResponse { delivered })))
}

/// POST /api/trigger-room-event
///
/// Broadcasts a named event to every connection in a room.
pub async fn trigger_room_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TriggerRoomEventRequest>,
) -> Result<Json<ApiResponse<TriggerEventResponse>>, ApiError> {
    state.check_api_secret(api_key(&headers))?;

    let room_id = body
        .room_id
        .ok_or_else(|| AppError::validation("room_id is required"))?;
    let event = body
        .event
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("event is required"))?;
    let namespace = parse_namespace(body.namespace.as_deref(), Namespace::Video)?;

    info!(room_id = %room_id, event = %event, namespace = %namespace, "Trigger room event");
    state
        .relay
        .trigger_room_event(namespace, room_id, event, body.payload)
        .await;

    // Room broadcasts have no per-target delivery signal.
    Ok(Json(ApiResponse::ok(TriggerEventResponse {
        delivered: true,
    })))
}
