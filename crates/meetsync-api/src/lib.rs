//! # meetsync-api
//!
//! HTTP API layer for MeetSync built on Axum: the secret-gated
//! trigger surface, the presence debug dump, and health.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
