//! Presence registry debug dump.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use meetsync_realtime::presence::Namespace;

use crate::dto::{ApiResponse, SocketMapEntry, SocketMapQuery};
use crate::error::ApiError;
use crate::handlers::parse_namespace;
use crate::state::AppState;

/// GET /api/socket-map?namespace=chat|video
///
/// Secret-gated dump of the user-to-connection map for one
/// namespace, for operational debugging.
pub async fn socket_map(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SocketMapQuery>,
) -> Result<Json<ApiResponse<Vec<SocketMapEntry>>>, ApiError> {
    let presented = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    state.check_api_secret(presented)?;

    let namespace = parse_namespace(query.namespace.as_deref(), Namespace::Chat)?;
    let registry = match namespace {
        Namespace::Chat => state.relay.chat_registry(),
        Namespace::Video => state.relay.video_registry(),
    };

    let entries = registry
        .snapshot()
        .into_iter()
        .map(|(user_id, connection_id)| SocketMapEntry {
            user_id,
            connection_id,
        })
        .collect();

    Ok(Json(ApiResponse::ok(entries)))
}
