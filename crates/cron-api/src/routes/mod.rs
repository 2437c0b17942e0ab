//! Route handlers for the cron API.

pub mod cron;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
///
/// Both trigger endpoints accept GET and POST: some scheduler transports
/// can only issue GETs, and the handlers are idempotent either way.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/cron/notifications",
            get(cron::notifications).post(cron::notifications),
        )
        .route(
            "/api/cron/call-reminders",
            get(cron::call_reminders).post(cron::call_reminders),
        )
        .route("/api/cron/status", get(cron::status))
}
