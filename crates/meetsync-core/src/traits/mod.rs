//! Traits for external collaborators consumed by the core.

pub mod mailer;

pub use mailer::Mailer;
