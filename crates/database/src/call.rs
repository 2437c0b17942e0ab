//! Call record operations.
//!
//! Calls are the authoritative schedule. Reminder jobs snapshot a call at
//! confirmation time and must re-validate against these rows at fire time.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::CallRecord;

/// Create a new call record.
pub async fn create_call(pool: &SqlitePool, call: &CallRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO calls (id, squad_id, status, start_datetime_utc, timezone, location, title)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&call.id)
    .bind(&call.squad_id)
    .bind(&call.status)
    .bind(&call.start_datetime_utc)
    .bind(&call.timezone)
    .bind(&call.location)
    .bind(&call.title)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "CallRecord",
                    id: call.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Look up a call by ID. Returns `None` when missing; a dangling
/// reminder-job pointer is a staleness condition, not an error.
pub async fn find_call(pool: &SqlitePool, id: &str) -> Result<Option<CallRecord>> {
    let call = sqlx::query_as::<_, CallRecord>(
        r#"
        SELECT id, squad_id, status, start_datetime_utc, timezone, location, title
        FROM calls
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(call)
}

/// Cancel a call and drop any reminder job still pointing at it, in one
/// transaction. Used by the product's cancel flow so the batch processor
/// never has to observe the stale job at all.
pub async fn cancel_call(pool: &SqlitePool, id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = 'canceled'
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "CallRecord",
            id: id.to_string(),
        });
    }

    sqlx::query(
        r#"
        DELETE FROM reminder_jobs
        WHERE call_id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Update a call's status (pending, confirmed, canceled).
pub async fn set_call_status(pool: &SqlitePool, id: &str, status: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = ?
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "CallRecord",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Move a call to a new start instant. Any reminder job still holding the
/// old snapshot becomes stale and is discarded by the next batch run.
pub async fn reschedule_call(pool: &SqlitePool, id: &str, start_datetime_utc: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET start_datetime_utc = ?
        WHERE id = ?
        "#,
    )
    .bind(start_datetime_utc)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "CallRecord",
            id: id.to_string(),
        });
    }

    Ok(())
}
