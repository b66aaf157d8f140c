//! Route definitions for the MeetSync HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/trigger-event", post(handlers::trigger::trigger_event))
        .route(
            "/trigger-room-event",
            post(handlers::trigger::trigger_room_event),
        )
        .route("/socket-map", get(handlers::presence::socket_map))
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
