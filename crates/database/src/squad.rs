//! Squad operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Squad;

/// Create a new squad.
pub async fn create_squad(pool: &SqlitePool, squad: &Squad) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO squads
            (id, name, premium, chat_channel_id,
             call_datetime_utc, call_timezone, call_location, call_title)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&squad.id)
    .bind(&squad.name)
    .bind(squad.premium)
    .bind(&squad.chat_channel_id)
    .bind(&squad.call_datetime_utc)
    .bind(&squad.call_timezone)
    .bind(&squad.call_location)
    .bind(&squad.call_title)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Squad",
                    id: squad.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Look up a squad by ID. Returns `None` when missing; the reminder
/// processor treats a vanished squad as a normal discard, not an error.
pub async fn find_squad(pool: &SqlitePool, id: &str) -> Result<Option<Squad>> {
    let squad = sqlx::query_as::<_, Squad>(
        r#"
        SELECT id, name, premium, chat_channel_id,
               call_datetime_utc, call_timezone, call_location, call_title
        FROM squads
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(squad)
}

/// Attach a chat provider channel to a squad.
pub async fn set_chat_channel(pool: &SqlitePool, id: &str, chat_channel_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE squads
        SET chat_channel_id = ?
        WHERE id = ?
        "#,
    )
    .bind(chat_channel_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Squad",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Replace a premium squad's inline call schedule. Any reminder job still
/// holding the previous snapshot becomes stale.
pub async fn set_call_schedule(
    pool: &SqlitePool,
    id: &str,
    call_datetime_utc: &str,
    call_timezone: &str,
    call_location: Option<&str>,
    call_title: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE squads
        SET call_datetime_utc = ?, call_timezone = ?, call_location = ?, call_title = ?
        WHERE id = ?
        "#,
    )
    .bind(call_datetime_utc)
    .bind(call_timezone)
    .bind(call_location)
    .bind(call_title)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Squad",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a squad.
pub async fn delete_squad(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM squads
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Squad",
            id: id.to_string(),
        });
    }

    Ok(())
}
