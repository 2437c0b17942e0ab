//! User read/write operations.
//!
//! The scheduler treats users as read-only; the create/update functions here
//! exist for the product handlers (auth sync, billing webhooks) and tests.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, timezone, onboarding_completed, billing_status, current_period_end)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.timezone)
    .bind(user.onboarding_completed)
    .bind(&user.billing_status)
    .bind(&user.current_period_end)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: user.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, timezone, onboarding_completed, billing_status, current_period_end
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// List users who completed onboarding, the candidate set for a
/// notification pass. Bounded so a single run stays finite.
pub async fn list_onboarded_users(pool: &SqlitePool, limit: i64) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, timezone, onboarding_completed, billing_status, current_period_end
        FROM users
        WHERE onboarding_completed = 1
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Replace a user's billing snapshot (called by the billing webhook handler).
pub async fn update_billing(
    pool: &SqlitePool,
    id: &str,
    billing_status: Option<&str>,
    current_period_end: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET billing_status = ?, current_period_end = ?
        WHERE id = ?
        "#,
    )
    .bind(billing_status)
    .bind(current_period_end)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Mark onboarding as completed.
pub async fn set_onboarding_completed(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET onboarding_completed = 1
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
