//! Notification record operations.
//!
//! Records are immutable after creation except for the read flag. The
//! window query below is the storage side of the scheduler's dedup guard.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::NotificationRecord;

/// Create a notification record.
pub async fn create_notification(pool: &SqlitePool, record: &NotificationRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO notification_records (id, user_id, kind, title, body, action_route, created_at, is_read)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.kind)
    .bind(&record.title)
    .bind(&record.body)
    .bind(&record.action_route)
    .bind(&record.created_at)
    .bind(record.is_read)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "NotificationRecord",
                    id: record.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Whether any record with one of `kinds` exists for the user with
/// `created_at` in `[window_start, window_end)`.
///
/// `kinds` is the equivalence class of the kind being considered, so at
/// most a handful of values; the IN list is built dynamically.
pub async fn exists_in_window(
    pool: &SqlitePool,
    user_id: &str,
    kinds: &[&str],
    window_start: &str,
    window_end: &str,
) -> Result<bool> {
    if kinds.is_empty() {
        return Ok(false);
    }

    let placeholders = vec!["?"; kinds.len()].join(", ");
    let sql = format!(
        r#"
        SELECT 1
        FROM notification_records
        WHERE user_id = ? AND created_at >= ? AND created_at < ?
          AND kind IN ({placeholders})
        LIMIT 1
        "#,
    );

    let mut query = sqlx::query_scalar::<_, i32>(&sql)
        .bind(user_id)
        .bind(window_start)
        .bind(window_end);
    for kind in kinds {
        query = query.bind(*kind);
    }

    Ok(query.fetch_optional(pool).await?.is_some())
}

/// List all notifications for a user, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<NotificationRecord>> {
    let records = sqlx::query_as::<_, NotificationRecord>(
        r#"
        SELECT id, user_id, kind, title, body, action_route, created_at, is_read
        FROM notification_records
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// List unread notifications for a user, newest first.
pub async fn list_unread(pool: &SqlitePool, user_id: &str) -> Result<Vec<NotificationRecord>> {
    let records = sqlx::query_as::<_, NotificationRecord>(
        r#"
        SELECT id, user_id, kind, title, body, action_route, created_at, is_read
        FROM notification_records
        WHERE user_id = ? AND is_read = 0
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Count unread notifications for a user.
pub async fn count_unread(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM notification_records
        WHERE user_id = ? AND is_read = 0
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Mark a notification as read.
pub async fn mark_read(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE notification_records
        SET is_read = 1
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "NotificationRecord",
            id: id.to_string(),
        });
    }

    Ok(())
}
