//! Background workers for MeetSync: the minutely slot lifecycle
//! scheduler, the expired-call cleanup sweeper, and the cron wiring
//! that drives both.

pub mod cron;
pub mod scheduler;
pub mod sweeper;
pub mod transition;

pub use cron::CronRunner;
pub use scheduler::LifecycleScheduler;
pub use sweeper::CleanupSweeper;
