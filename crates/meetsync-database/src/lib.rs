//! # meetsync-database
//!
//! PostgreSQL connection lifecycle, the store traits consumed by the
//! scheduler and services, and the concrete repository
//! implementations. An in-memory store backing is provided for tests
//! and single-process development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{CallStore, NotificationStore, SlotStore, UserStore};
