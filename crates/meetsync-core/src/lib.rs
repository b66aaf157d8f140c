//! Shared foundation for MeetSync: configuration schemas, the unified
//! application error type, and traits for external collaborators.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
