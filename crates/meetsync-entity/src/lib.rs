//! Domain entity models for MeetSync: slots, video calls,
//! notifications, and users.

pub mod notification;
pub mod slot;
pub mod user;
pub mod video_call;
