//! SQLite persistence layer for Cadence.
//!
//! This crate provides async database operations for users, check-in
//! records, notification records, squads, calls, and reminder jobs using
//! SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::User, user};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:cadence.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a user
//!     let user = User {
//!         id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!         name: "Bob".to_string(),
//!         timezone: Some("America/Chicago".to_string()),
//!         onboarding_completed: true,
//!         billing_status: Some("active".to_string()),
//!         current_period_end: None,
//!     };
//!     user::create_user(db.pool(), &user).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod call;
pub mod checkin;
pub mod error;
pub mod models;
pub mod notification;
pub mod reminder;
pub mod squad;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{
    CallRecord, DailyCheckin, NotificationRecord, ReminderJob, Squad, User, WeeklyReflection,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// High enough to handle a full batch pass with concurrent handler traffic.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{call_status, job_source};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn test_user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Alice".to_string(),
            timezone: Some("America/New_York".to_string()),
            onboarding_completed: true,
            billing_status: Some("active".to_string()),
            current_period_end: None,
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        let user = test_user("user-1");
        user::create_user(db.pool(), &user).await.unwrap();

        let fetched = user::get_user(db.pool(), "user-1").await.unwrap();
        assert_eq!(fetched.name, "Alice");
        assert!(fetched.onboarding_completed);

        // Duplicate insert is rejected
        let result = user::create_user(db.pool(), &user).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));

        // Billing webhook path
        user::update_billing(db.pool(), "user-1", Some("canceled"), Some("2026-09-01T00:00:00Z"))
            .await
            .unwrap();
        let fetched = user::get_user(db.pool(), "user-1").await.unwrap();
        assert_eq!(fetched.billing_status.as_deref(), Some("canceled"));

        let onboarded = user::list_onboarded_users(db.pool(), 100).await.unwrap();
        assert_eq!(onboarded.len(), 1);
    }

    #[tokio::test]
    async fn test_checkin_completion() {
        let db = test_db().await;
        user::create_user(db.pool(), &test_user("user-1")).await.unwrap();

        let done = checkin::daily_completed(
            db.pool(),
            "user-1",
            "2026-08-06",
            checkin::checkin_kind::MORNING,
        )
        .await
        .unwrap();
        assert!(!done);

        checkin::complete_daily(
            db.pool(),
            "user-1",
            "2026-08-06",
            checkin::checkin_kind::MORNING,
            "2026-08-06T11:30:00Z",
        )
        .await
        .unwrap();

        let done = checkin::daily_completed(
            db.pool(),
            "user-1",
            "2026-08-06",
            checkin::checkin_kind::MORNING,
        )
        .await
        .unwrap();
        assert!(done);

        // Evening on the same day is independent
        let done = checkin::daily_completed(
            db.pool(),
            "user-1",
            "2026-08-06",
            checkin::checkin_kind::EVENING,
        )
        .await
        .unwrap();
        assert!(!done);
    }

    #[tokio::test]
    async fn test_notification_window_query() {
        let db = test_db().await;
        user::create_user(db.pool(), &test_user("user-1")).await.unwrap();

        let record = NotificationRecord {
            id: "n1".to_string(),
            user_id: "user-1".to_string(),
            kind: "evening_checkin_tasks_completed".to_string(),
            title: "Nice work".to_string(),
            body: "All tasks done today".to_string(),
            action_route: "/checkin/evening".to_string(),
            created_at: "2026-08-06T21:00:00Z".to_string(),
            is_read: false,
        };
        notification::create_notification(db.pool(), &record).await.unwrap();

        // Either evening kind satisfies the window query
        let exists = notification::exists_in_window(
            db.pool(),
            "user-1",
            &[
                "evening_checkin_incomplete_tasks",
                "evening_checkin_tasks_completed",
            ],
            "2026-08-06T04:00:00Z",
            "2026-08-07T04:00:00Z",
        )
        .await
        .unwrap();
        assert!(exists);

        // Outside the window, no match
        let exists = notification::exists_in_window(
            db.pool(),
            "user-1",
            &["evening_checkin_tasks_completed"],
            "2026-08-07T04:00:00Z",
            "2026-08-08T04:00:00Z",
        )
        .await
        .unwrap();
        assert!(!exists);

        notification::mark_read(db.pool(), "n1").await.unwrap();
        assert_eq!(notification::count_unread(db.pool(), "user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reminder_due_query() {
        let db = test_db().await;

        let job = ReminderJob {
            id: "squad-1".to_string(),
            squad_id: "squad-1".to_string(),
            source: job_source::CALL_REF.to_string(),
            call_id: Some("call-1".to_string()),
            call_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
            chat_channel_id: Some("channel-1".to_string()),
            reminder_time_utc: "2026-08-06T17:00:00Z".to_string(),
            sent: false,
            sent_at: None,
            error: None,
            last_error_at: None,
        };
        reminder::upsert_job(db.pool(), &job).await.unwrap();

        // Not due yet
        let due = reminder::due_jobs(db.pool(), "2026-08-06T16:59:00Z", 50).await.unwrap();
        assert!(due.is_empty());

        // Due now
        let due = reminder::due_jobs(db.pool(), "2026-08-06T17:00:00Z", 50).await.unwrap();
        assert_eq!(due.len(), 1);

        // Sent jobs drop out of the due set
        reminder::mark_sent(db.pool(), "squad-1", "2026-08-06T17:01:00Z", None)
            .await
            .unwrap();
        let due = reminder::due_jobs(db.pool(), "2026-08-06T18:00:00Z", 50).await.unwrap();
        assert!(due.is_empty());
    }

    #[tokio::test]
    async fn test_call_reschedule_and_status() {
        let db = test_db().await;

        let squad = Squad {
            id: "squad-1".to_string(),
            name: "Early birds".to_string(),
            premium: false,
            chat_channel_id: Some("channel-1".to_string()),
            call_datetime_utc: None,
            call_timezone: None,
            call_location: None,
            call_title: None,
        };
        squad::create_squad(db.pool(), &squad).await.unwrap();

        let call = CallRecord {
            id: "call-1".to_string(),
            squad_id: "squad-1".to_string(),
            status: call_status::CONFIRMED.to_string(),
            start_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
        };
        call::create_call(db.pool(), &call).await.unwrap();

        call::reschedule_call(db.pool(), "call-1", "2026-08-06T19:00:00Z").await.unwrap();
        let fetched = call::find_call(db.pool(), "call-1").await.unwrap().unwrap();
        assert_eq!(fetched.start_datetime_utc, "2026-08-06T19:00:00Z");

        call::set_call_status(db.pool(), "call-1", call_status::CANCELED).await.unwrap();
        let fetched = call::find_call(db.pool(), "call-1").await.unwrap().unwrap();
        assert_eq!(fetched.status, call_status::CANCELED);

        assert!(call::find_call(db.pool(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_call_drops_its_reminder_jobs() {
        let db = test_db().await;

        let squad = Squad {
            id: "squad-1".to_string(),
            name: "Early birds".to_string(),
            premium: false,
            chat_channel_id: Some("channel-1".to_string()),
            call_datetime_utc: None,
            call_timezone: None,
            call_location: None,
            call_title: None,
        };
        squad::create_squad(db.pool(), &squad).await.unwrap();

        let call = CallRecord {
            id: "call-1".to_string(),
            squad_id: "squad-1".to_string(),
            status: call_status::CONFIRMED.to_string(),
            start_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
        };
        call::create_call(db.pool(), &call).await.unwrap();

        let job = ReminderJob {
            id: "squad-1".to_string(),
            squad_id: "squad-1".to_string(),
            source: job_source::CALL_REF.to_string(),
            call_id: Some("call-1".to_string()),
            call_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
            chat_channel_id: Some("channel-1".to_string()),
            reminder_time_utc: "2026-08-06T17:00:00Z".to_string(),
            sent: false,
            sent_at: None,
            error: None,
            last_error_at: None,
        };
        reminder::upsert_job(db.pool(), &job).await.unwrap();

        call::cancel_call(db.pool(), "call-1").await.unwrap();

        let fetched = call::find_call(db.pool(), "call-1").await.unwrap().unwrap();
        assert_eq!(fetched.status, call_status::CANCELED);
        assert!(reminder::find_job(db.pool(), "squad-1").await.unwrap().is_none());
        assert_eq!(reminder::pending_count(db.pool()).await.unwrap(), 0);
    }
}
