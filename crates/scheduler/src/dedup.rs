//! The dedup guard.
//!
//! The document store is the only dedup state that survives across runs,
//! so every decision is re-derived from persisted notification records:
//! "does a record of an equivalent kind already exist for this user's
//! current local day (or week)?" This guard is the sole mechanism keeping
//! retried or duplicate trigger invocations from double-sending, and it
//! must run strictly before any write.

use chrono::{DateTime, Utc};
use database::{notification, Database, User};

use crate::eligibility::NotificationKind;
use crate::error::Result;
use crate::localtime::{rfc3339, LocalTime};

/// Whether an equivalent notification already exists for the user's
/// current period. "Satisfied" is a normal skip, never an error.
pub async fn already_notified(
    db: &Database,
    user: &User,
    kind: NotificationKind,
    now: DateTime<Utc>,
) -> Result<bool> {
    let local = LocalTime::resolve(user.timezone.as_deref(), now);

    let (start, end) = if kind.is_weekly() {
        local.week_window_utc()
    } else {
        local.day_window_utc()
    };

    let exists = notification::exists_in_window(
        db.pool(),
        &user.id,
        kind.equivalence_class(),
        &rfc3339(&start),
        &rfc3339(&end),
    )
    .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use database::models::NotificationRecord;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn test_user(id: &str, tz: &str) -> User {
        User {
            id: id.to_string(),
            name: "Alice".to_string(),
            timezone: Some(tz.to_string()),
            onboarding_completed: true,
            billing_status: Some("active".to_string()),
            current_period_end: None,
        }
    }

    async fn insert_notification(db: &Database, user_id: &str, kind: &str, created_at: &str) {
        let record = NotificationRecord {
            id: format!("{kind}-{created_at}"),
            user_id: user_id.to_string(),
            kind: kind.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            action_route: "/".to_string(),
            created_at: created_at.to_string(),
            is_read: false,
        };
        notification::create_notification(db.pool(), &record).await.unwrap();
    }

    #[tokio::test]
    async fn test_evening_kinds_are_mutually_exclusive_per_day() {
        let db = test_db().await;
        let user = test_user("user-1", "America/New_York");
        database::user::create_user(db.pool(), &user).await.unwrap();

        // A "tasks completed" record exists for today (17:30 local = 21:30 UTC)
        insert_notification(
            &db,
            "user-1",
            "evening_checkin_tasks_completed",
            "2026-08-06T21:30:00Z",
        )
        .await;

        // The "incomplete tasks" kind is satisfied by it
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 22, 0, 0).unwrap();
        let satisfied = already_notified(
            &db,
            &user,
            NotificationKind::EveningCheckinIncompleteTasks,
            now,
        )
        .await
        .unwrap();
        assert!(satisfied);

        // But the morning kind is not
        let satisfied = already_notified(&db, &user, NotificationKind::MorningCheckin, now)
            .await
            .unwrap();
        assert!(!satisfied);
    }

    #[tokio::test]
    async fn test_window_is_the_users_local_day() {
        let db = test_db().await;
        let user = test_user("user-1", "America/New_York");
        database::user::create_user(db.pool(), &user).await.unwrap();

        // 03:00 UTC on Aug 6 is still Aug 5 in New York
        insert_notification(&db, "user-1", "morning_checkin", "2026-08-06T03:00:00Z").await;

        // Evaluated during the local day of Aug 6, that record is yesterday's
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 11, 0, 0).unwrap();
        let satisfied = already_notified(&db, &user, NotificationKind::MorningCheckin, now)
            .await
            .unwrap();
        assert!(!satisfied);

        // Evaluated during the local day of Aug 5, it counts
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 3, 30, 0).unwrap();
        let satisfied = already_notified(&db, &user, NotificationKind::MorningCheckin, now)
            .await
            .unwrap();
        assert!(satisfied);
    }

    #[tokio::test]
    async fn test_weekly_window_spans_the_week() {
        let db = test_db().await;
        let user = test_user("user-1", "UTC");
        database::user::create_user(db.pool(), &user).await.unwrap();

        // Sent on Saturday of the week of Monday 2026-08-03
        insert_notification(&db, "user-1", "weekly_reflection", "2026-08-08T09:00:00Z").await;

        // Sunday the same week: satisfied
        let now = Utc.with_ymd_and_hms(2026, 8, 9, 9, 0, 0).unwrap();
        let satisfied = already_notified(&db, &user, NotificationKind::WeeklyReflection, now)
            .await
            .unwrap();
        assert!(satisfied);

        // Saturday the following week: a fresh period
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 9, 0, 0).unwrap();
        let satisfied = already_notified(&db, &user, NotificationKind::WeeklyReflection, now)
            .await
            .unwrap();
        assert!(!satisfied);
    }
}
