//! The batch passes.
//!
//! Each pass is one discrete, bounded run over an independent candidate
//! set: onboarded users for notifications, due jobs for call reminders.
//! Per-item failures are counted and logged, never propagated: one bad
//! user or job must not block the rest of the batch. Runs are stateless
//! and safe to re-invoke: the dedup guard and the job `sent` flag are the
//! only correctness mechanisms, and both live in the store.

use chrono::{DateTime, Utc};
use database::{reminder, user, Database, User};
use tracing::{error, info, warn};

use crate::dedup;
use crate::dispatcher::{self, NotificationPayload};
use crate::eligibility::{
    self, Eligibility, NotificationKind, EVENING_HOUR, MORNING_HOUR, WEEKLY_HOUR,
};
use crate::localtime::{rfc3339, LocalTime};
use crate::reminders::{self, JobOutcome};
use crate::sender::{ChannelSender, PushGateway};
use crate::stats::{NotificationRunStats, ReminderRunStats};

/// Page size for one batch of notification candidates.
pub const DEFAULT_USER_PAGE_SIZE: i64 = 500;

/// Evaluate every onboarded user against the current tick and dispatch
/// what is due.
pub async fn run_notification_pass(
    db: &Database,
    gateway: &dyn PushGateway,
    now: DateTime<Utc>,
    user_limit: i64,
) -> NotificationRunStats {
    let mut stats = NotificationRunStats::default();

    let users = match user::list_onboarded_users(db.pool(), user_limit).await {
        Ok(users) => users,
        Err(e) => {
            error!(error = %e, "Failed to load notification candidates");
            stats.errors += 1;
            return stats;
        }
    };

    for user in users {
        stats.processed += 1;

        let local = LocalTime::resolve(user.timezone.as_deref(), now);
        let Some(kind) = kind_for_local_hour(&local) else {
            stats.record_skip(Eligibility::WrongTime);
            continue;
        };

        match process_user(db, gateway, &user, kind, now).await {
            Ok(UserOutcome::Sent) => stats.sent += 1,
            Ok(UserOutcome::AlreadyNotified) => stats.skipped_already_notified += 1,
            Ok(UserOutcome::Skipped(reason)) => stats.record_skip(reason),
            Err(e) => {
                stats.errors += 1;
                warn!(user_id = %user.id, error = %e, "Notification processing failed");
            }
        }
    }

    info!(
        processed = stats.processed,
        sent = stats.sent,
        errors = stats.errors,
        "Notification pass complete"
    );
    stats
}

/// Process one page of due reminder jobs.
pub async fn run_reminder_pass(
    db: &Database,
    chat: &dyn ChannelSender,
    now: DateTime<Utc>,
    page_size: i64,
) -> ReminderRunStats {
    let mut stats = ReminderRunStats::default();

    let jobs = match reminder::due_jobs(db.pool(), &rfc3339(&now), page_size).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!(error = %e, "Failed to load due reminder jobs");
            stats.errors += 1;
            return stats;
        }
    };

    for job in jobs {
        stats.processed += 1;

        match reminders::process_job(db, chat, &job, now).await {
            Ok(JobOutcome::Sent) => stats.sent += 1,
            Ok(JobOutcome::Discarded) => stats.discarded_stale += 1,
            Err(e) => {
                stats.errors += 1;
                warn!(job_id = %job.id, error = %e, "Reminder processing failed");
                if let Err(store_err) =
                    reminder::record_error(db.pool(), &job.id, &e.to_string(), &rfc3339(&now)).await
                {
                    error!(job_id = %job.id, error = %store_err, "Failed to record reminder error");
                }
            }
        }
    }

    info!(
        processed = stats.processed,
        sent = stats.sent,
        discarded = stats.discarded_stale,
        errors = stats.errors,
        "Reminder pass complete"
    );
    stats
}

/// Pick the kind whose schedule hour matches the user's local clock.
///
/// The three hours are disjoint, so at most one kind can be due per tick
/// and each user lands in exactly one stats bucket per run.
fn kind_for_local_hour(local: &LocalTime) -> Option<NotificationKind> {
    match local.hour {
        MORNING_HOUR => Some(NotificationKind::MorningCheckin),
        EVENING_HOUR => Some(NotificationKind::EveningCheckinIncompleteTasks),
        WEEKLY_HOUR => Some(NotificationKind::WeeklyReflection),
        _ => None,
    }
}

enum UserOutcome {
    Sent,
    AlreadyNotified,
    Skipped(Eligibility),
}

async fn process_user(
    db: &Database,
    gateway: &dyn PushGateway,
    user: &User,
    kind: NotificationKind,
    now: DateTime<Utc>,
) -> crate::error::Result<UserOutcome> {
    match eligibility::evaluate(db, user, kind, now).await? {
        Eligibility::Due => {}
        other => return Ok(UserOutcome::Skipped(other)),
    }

    // Guard pre-check; dispatch re-checks immediately before the write.
    if dedup::already_notified(db, user, kind, now).await? {
        return Ok(UserOutcome::AlreadyNotified);
    }

    let payload = NotificationPayload::for_kind(kind);
    match dispatcher::dispatch(db, gateway, user, kind, &payload, now).await? {
        Some(_) => Ok(UserOutcome::Sent),
        None => Ok(UserOutcome::AlreadyNotified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::reminders::DEFAULT_PAGE_SIZE;
    use crate::sender::{NoOpChannelSender, NoOpGateway};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use database::models::{call_status, job_source, Squad};
    use database::{checkin, notification, CallRecord, ReminderJob};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn eastern_user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Alice".to_string(),
            timezone: Some("America/New_York".to_string()),
            onboarding_completed: true,
            billing_status: Some("active".to_string()),
            current_period_end: None,
        }
    }

    /// 17:00 Thursday in New York.
    fn eastern_evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 21, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_pass_is_idempotent_within_the_hour() {
        let db = test_db().await;
        database::user::create_user(db.pool(), &eastern_user("user-1")).await.unwrap();

        let first = run_notification_pass(&db, &NoOpGateway, eastern_evening(), 100).await;
        assert_eq!(first.sent, 1);
        assert_eq!(first.errors, 0);

        // Duplicate trigger invocation in the same hour
        let second = run_notification_pass(&db, &NoOpGateway, eastern_evening(), 100).await;
        assert_eq!(second.sent, 0);
        assert_eq!(second.skipped_already_notified, 1);

        let records = notification::list_for_user(db.pool(), "user-1").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_hour_and_weekend_buckets() {
        let db = test_db().await;
        database::user::create_user(db.pool(), &eastern_user("user-1")).await.unwrap();

        // 13:00 local: no schedule matches
        let noonish = Utc.with_ymd_and_hms(2026, 8, 6, 17, 0, 0).unwrap();
        let stats = run_notification_pass(&db, &NoOpGateway, noonish, 100).await;
        assert_eq!(stats.skipped_wrong_time, 1);
        assert_eq!(stats.sent, 0);

        // Saturday 07:00 local: the morning kind is suppressed
        let weekend_morning = Utc.with_ymd_and_hms(2026, 8, 8, 11, 0, 0).unwrap();
        let stats = run_notification_pass(&db, &NoOpGateway, weekend_morning, 100).await;
        assert_eq!(stats.skipped_weekend, 1);
        assert_eq!(stats.sent, 0);
    }

    #[tokio::test]
    async fn test_grace_period_billing() {
        let db = test_db().await;

        let mut graced = eastern_user("graced");
        graced.billing_status = Some("canceled".to_string());
        graced.current_period_end = Some("2026-08-08T21:00:00Z".to_string());
        database::user::create_user(db.pool(), &graced).await.unwrap();

        let mut expired = eastern_user("expired");
        expired.billing_status = Some("canceled".to_string());
        expired.current_period_end = Some("2026-08-06T20:00:00Z".to_string());
        database::user::create_user(db.pool(), &expired).await.unwrap();

        let stats = run_notification_pass(&db, &NoOpGateway, eastern_evening(), 100).await;
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.skipped_no_subscription, 1);

        assert_eq!(
            notification::list_for_user(db.pool(), "graced").await.unwrap().len(),
            1
        );
        assert!(notification::list_for_user(db.pool(), "expired").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_checkin_suppresses_notification() {
        let db = test_db().await;
        database::user::create_user(db.pool(), &eastern_user("user-1")).await.unwrap();

        checkin::complete_daily(
            db.pool(),
            "user-1",
            "2026-08-06",
            checkin::checkin_kind::EVENING,
            "2026-08-06T20:30:00Z",
        )
        .await
        .unwrap();

        let stats = run_notification_pass(&db, &NoOpGateway, eastern_evening(), 100).await;
        assert_eq!(stats.skipped_already_done, 1);
        assert_eq!(stats.sent, 0);
    }

    /// Fails sends to one specific channel, succeeds elsewhere.
    struct FlakyChannel {
        fail_channel: &'static str,
    }

    #[async_trait]
    impl ChannelSender for FlakyChannel {
        async fn ensure_sender(&self) -> Result<(), SchedulerError> {
            Ok(())
        }

        async fn send_to_channel(
            &self,
            channel_id: &str,
            _text: &str,
        ) -> Result<(), SchedulerError> {
            if channel_id == self.fail_channel {
                Err(SchedulerError::Delivery("provider timeout".to_string()))
            } else {
                Ok(())
            }
        }
    }

    async fn seed_squad_with_call(db: &Database, n: u32) -> ReminderJob {
        let squad_id = format!("squad-{n}");
        let call_id = format!("call-{n}");
        let channel_id = format!("channel-{n}");

        let squad = Squad {
            id: squad_id.clone(),
            name: format!("Squad {n}"),
            premium: false,
            chat_channel_id: Some(channel_id.clone()),
            call_datetime_utc: None,
            call_timezone: None,
            call_location: None,
            call_title: None,
        };
        database::squad::create_squad(db.pool(), &squad).await.unwrap();

        let call = CallRecord {
            id: call_id.clone(),
            squad_id: squad_id.clone(),
            status: call_status::CONFIRMED.to_string(),
            start_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
        };
        database::call::create_call(db.pool(), &call).await.unwrap();

        let job = ReminderJob {
            id: squad_id.clone(),
            squad_id,
            source: job_source::CALL_REF.to_string(),
            call_id: Some(call_id),
            call_datetime_utc: "2026-08-06T18:00:00Z".to_string(),
            timezone: "America/New_York".to_string(),
            location: None,
            title: "Weekly call".to_string(),
            chat_channel_id: Some(channel_id),
            reminder_time_utc: "2026-08-06T17:00:00Z".to_string(),
            sent: false,
            sent_at: None,
            error: None,
            last_error_at: None,
        };
        database::reminder::upsert_job(db.pool(), &job).await.unwrap();
        job
    }

    #[tokio::test]
    async fn test_one_failing_job_does_not_block_the_batch() {
        let db = test_db().await;
        seed_squad_with_call(&db, 1).await;
        seed_squad_with_call(&db, 2).await;
        seed_squad_with_call(&db, 3).await;

        let now = Utc.with_ymd_and_hms(2026, 8, 6, 17, 0, 0).unwrap();
        let chat = FlakyChannel {
            fail_channel: "channel-2",
        };
        let stats = run_reminder_pass(&db, &chat, now, DEFAULT_PAGE_SIZE).await;

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.errors, 1);

        for (id, expect_sent) in [("squad-1", true), ("squad-2", false), ("squad-3", true)] {
            let job = database::reminder::find_job(db.pool(), id).await.unwrap().unwrap();
            assert_eq!(job.sent, expect_sent, "job {id}");
        }

        // The failing job keeps its error and stays eligible for the next run
        let failed = database::reminder::find_job(db.pool(), "squad-2").await.unwrap().unwrap();
        assert!(failed.error.as_deref().unwrap_or("").contains("provider timeout"));
        assert!(failed.last_error_at.is_some());

        // Next run with a healthy provider drains it
        let stats = run_reminder_pass(&db, &NoOpChannelSender, now, DEFAULT_PAGE_SIZE).await;
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.sent, 1);
    }

    #[tokio::test]
    async fn test_reminder_pass_respects_page_size() {
        let db = test_db().await;
        seed_squad_with_call(&db, 1).await;
        seed_squad_with_call(&db, 2).await;
        seed_squad_with_call(&db, 3).await;

        let now = Utc.with_ymd_and_hms(2026, 8, 6, 17, 0, 0).unwrap();
        let stats = run_reminder_pass(&db, &NoOpChannelSender, now, 2).await;
        assert_eq!(stats.processed, 2);

        let stats = run_reminder_pass(&db, &NoOpChannelSender, now, 2).await;
        assert_eq!(stats.processed, 1);
    }
}
