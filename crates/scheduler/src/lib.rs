//! Notification scheduling and call-reminder engine for Cadence.
//!
//! The engine runs as discrete batch passes driven by an external hourly
//! trigger. Each pass re-derives everything from the store: local-time
//! eligibility, the dedup guard over existing notification records, and
//! call-reminder staleness against the authoritative call, so retried or
//! duplicate invocations are safe by construction.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use database::Database;
//! use scheduler::{orchestrator, sender::LoggingGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite:cadence.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let stats = orchestrator::run_notification_pass(
//!     &db,
//!     &LoggingGateway,
//!     Utc::now(),
//!     orchestrator::DEFAULT_USER_PAGE_SIZE,
//! )
//! .await;
//! println!("sent {} notifications", stats.sent);
//! # Ok(())
//! # }
//! ```

pub mod dedup;
pub mod dispatcher;
pub mod eligibility;
pub mod error;
pub mod localtime;
pub mod orchestrator;
pub mod reminders;
pub mod sender;
pub mod stats;

pub use eligibility::{Eligibility, NotificationKind};
pub use error::{Result, SchedulerError};
pub use localtime::LocalTime;
pub use orchestrator::{run_notification_pass, run_reminder_pass};
pub use stats::{NotificationRunStats, ReminderRunStats};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
