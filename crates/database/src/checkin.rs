//! Check-in and reflection completion records.
//!
//! Rows are keyed by (user, local date, kind) for dailies and
//! (user, ISO Monday week id) for weeklies. A row with a NULL
//! `completed_at` means the check-in was opened but not finished; the
//! scheduler only cares whether `completed_at` is set.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{DailyCheckin, WeeklyReflection};

/// Daily check-in kinds stored in the `kind` column.
pub mod checkin_kind {
    pub const MORNING: &str = "morning_checkin";
    pub const EVENING: &str = "evening_checkin";
}

/// Record a completed daily check-in (idempotent upsert).
pub async fn complete_daily(
    pool: &SqlitePool,
    user_id: &str,
    local_date: &str,
    kind: &str,
    completed_at: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_checkins (user_id, local_date, kind, completed_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id, local_date, kind)
        DO UPDATE SET completed_at = excluded.completed_at
        "#,
    )
    .bind(user_id)
    .bind(local_date)
    .bind(kind)
    .bind(completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the daily check-in record for one user/date/kind, if any.
pub async fn get_daily(
    pool: &SqlitePool,
    user_id: &str,
    local_date: &str,
    kind: &str,
) -> Result<Option<DailyCheckin>> {
    let record = sqlx::query_as::<_, DailyCheckin>(
        r#"
        SELECT user_id, local_date, kind, completed_at
        FROM daily_checkins
        WHERE user_id = ? AND local_date = ? AND kind = ?
        "#,
    )
    .bind(user_id)
    .bind(local_date)
    .bind(kind)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Whether the daily check-in for this user/date/kind is completed.
pub async fn daily_completed(
    pool: &SqlitePool,
    user_id: &str,
    local_date: &str,
    kind: &str,
) -> Result<bool> {
    let result = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT 1
        FROM daily_checkins
        WHERE user_id = ? AND local_date = ? AND kind = ?
          AND completed_at IS NOT NULL
        "#,
    )
    .bind(user_id)
    .bind(local_date)
    .bind(kind)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}

/// Record a completed weekly reflection (idempotent upsert).
pub async fn complete_weekly(
    pool: &SqlitePool,
    user_id: &str,
    week_id: &str,
    completed_at: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO weekly_reflections (user_id, week_id, completed_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, week_id)
        DO UPDATE SET completed_at = excluded.completed_at
        "#,
    )
    .bind(user_id)
    .bind(week_id)
    .bind(completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the weekly reflection record for one user/week, if any.
pub async fn get_weekly(
    pool: &SqlitePool,
    user_id: &str,
    week_id: &str,
) -> Result<Option<WeeklyReflection>> {
    let record = sqlx::query_as::<_, WeeklyReflection>(
        r#"
        SELECT user_id, week_id, completed_at
        FROM weekly_reflections
        WHERE user_id = ? AND week_id = ?
        "#,
    )
    .bind(user_id)
    .bind(week_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Whether the weekly reflection for this user/week is completed.
pub async fn weekly_completed(pool: &SqlitePool, user_id: &str, week_id: &str) -> Result<bool> {
    let result = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT 1
        FROM weekly_reflections
        WHERE user_id = ? AND week_id = ?
          AND completed_at IS NOT NULL
        "#,
    )
    .bind(user_id)
    .bind(week_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}
