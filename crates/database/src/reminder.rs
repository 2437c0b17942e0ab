//! Reminder job operations.
//!
//! One job per squad/client per scheduled call. The due query and the two
//! terminal transitions (mark sent, delete) are the only writes the batch
//! processor performs.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ReminderJob;

/// Create (or replace) the reminder job for a squad. A squad has at most
/// one pending reminder, so confirming a new call overwrites the old job.
pub async fn upsert_job(pool: &SqlitePool, job: &ReminderJob) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reminder_jobs
            (id, squad_id, source, call_id, call_datetime_utc, timezone, location,
             title, chat_channel_id, reminder_time_utc, sent, sent_at, error, last_error_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            squad_id = excluded.squad_id,
            source = excluded.source,
            call_id = excluded.call_id,
            call_datetime_utc = excluded.call_datetime_utc,
            timezone = excluded.timezone,
            location = excluded.location,
            title = excluded.title,
            chat_channel_id = excluded.chat_channel_id,
            reminder_time_utc = excluded.reminder_time_utc,
            sent = excluded.sent,
            sent_at = excluded.sent_at,
            error = excluded.error,
            last_error_at = excluded.last_error_at
        "#,
    )
    .bind(&job.id)
    .bind(&job.squad_id)
    .bind(&job.source)
    .bind(&job.call_id)
    .bind(&job.call_datetime_utc)
    .bind(&job.timezone)
    .bind(&job.location)
    .bind(&job.title)
    .bind(&job.chat_channel_id)
    .bind(&job.reminder_time_utc)
    .bind(job.sent)
    .bind(&job.sent_at)
    .bind(&job.error)
    .bind(&job.last_error_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up a reminder job by ID.
pub async fn find_job(pool: &SqlitePool, id: &str) -> Result<Option<ReminderJob>> {
    let job = sqlx::query_as::<_, ReminderJob>(
        r#"
        SELECT id, squad_id, source, call_id, call_datetime_utc, timezone, location,
               title, chat_channel_id, reminder_time_utc, sent, sent_at, error, last_error_at
        FROM reminder_jobs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// Page of unsent jobs whose fire time has passed, oldest first.
pub async fn due_jobs(pool: &SqlitePool, now: &str, limit: i64) -> Result<Vec<ReminderJob>> {
    let jobs = sqlx::query_as::<_, ReminderJob>(
        r#"
        SELECT id, squad_id, source, call_id, call_datetime_utc, timezone, location,
               title, chat_channel_id, reminder_time_utc, sent, sent_at, error, last_error_at
        FROM reminder_jobs
        WHERE sent = 0 AND reminder_time_utc <= ?
        ORDER BY reminder_time_utc
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// Count unsent jobs, due or not.
pub async fn pending_count(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM reminder_jobs
        WHERE sent = 0
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Mark a job sent. `error` carries a terminal note when delivery was
/// skipped (e.g. no channel to message) rather than performed.
pub async fn mark_sent(
    pool: &SqlitePool,
    id: &str,
    sent_at: &str,
    error: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE reminder_jobs
        SET sent = 1, sent_at = ?, error = ?
        WHERE id = ?
        "#,
    )
    .bind(sent_at)
    .bind(error)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ReminderJob",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Record a delivery failure, leaving the job eligible for the next run.
pub async fn record_error(
    pool: &SqlitePool,
    id: &str,
    error: &str,
    last_error_at: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE reminder_jobs
        SET error = ?, last_error_at = ?
        WHERE id = ?
        "#,
    )
    .bind(error)
    .bind(last_error_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ReminderJob",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a job outright. Used when the job is found stale at fire time.
pub async fn delete_job(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM reminder_jobs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ReminderJob",
            id: id.to_string(),
        });
    }

    Ok(())
}
