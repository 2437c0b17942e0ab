//! Cron trigger routes.
//!
//! Each handler authenticates the trigger, runs one bounded batch pass,
//! and returns the pass's stats as the response body. The stats object is
//! the engine's whole external observability surface.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use scheduler::orchestrator::{self, DEFAULT_USER_PAGE_SIZE};
use scheduler::reminders::DEFAULT_PAGE_SIZE;
use scheduler::{NotificationRunStats, ReminderRunStats};

use crate::auth;
use crate::error::Result;
use crate::state::AppState;

/// Response for a completed trigger run.
#[derive(Serialize)]
pub struct CronResponse<S> {
    pub success: bool,
    pub stats: S,
}

/// Run one notification pass over all onboarded users.
pub async fn notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CronResponse<NotificationRunStats>>> {
    auth::authorize(&headers, &state.cron_secret)?;

    info!("Notification cron triggered");
    let stats = orchestrator::run_notification_pass(
        &state.db,
        state.gateway.as_ref(),
        Utc::now(),
        DEFAULT_USER_PAGE_SIZE,
    )
    .await;

    Ok(Json(CronResponse {
        success: true,
        stats,
    }))
}

/// Queue depth and candidate counts, for operational checks.
#[derive(Serialize)]
pub struct StatusResponse {
    pub users: i64,
    pub pending_reminders: i64,
}

/// Report candidate-set sizes without running a pass.
pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>> {
    auth::authorize(&headers, &state.cron_secret)?;

    let users = database::user::count_users(state.db.pool()).await?;
    let pending_reminders = database::reminder::pending_count(state.db.pool()).await?;

    Ok(Json(StatusResponse {
        users,
        pending_reminders,
    }))
}

/// Process one page of due call-reminder jobs.
pub async fn call_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CronResponse<ReminderRunStats>>> {
    auth::authorize(&headers, &state.cron_secret)?;

    info!("Call-reminder cron triggered");
    let stats =
        orchestrator::run_reminder_pass(&state.db, &state.chat, Utc::now(), DEFAULT_PAGE_SIZE)
            .await;

    Ok(Json(CronResponse {
        success: true,
        stats,
    }))
}
