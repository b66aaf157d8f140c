//! Domain services for MeetSync: time window resolution, video call
//! orchestration, engagement and trend scoring, notification
//! dispatch, reminder emails.

pub mod call;
pub mod engagement;
pub mod mail;
pub mod notify;
pub mod reminder;
pub mod time_window;
pub mod trend;

pub use call::VideoCallOrchestrator;
pub use engagement::EngagementCalculator;
pub use mail::HttpMailer;
pub use notify::NotificationDispatcher;
pub use time_window::TimeWindow;
pub use trend::TrendScorer;
