//! Concrete sqlx repository implementations of the store traits.

pub mod notification;
pub mod slot;
pub mod user;
pub mod video_call;

pub use notification::NotificationRepository;
pub use slot::SlotRepository;
pub use user::UserRepository;
pub use video_call::VideoCallRepository;
