//! Error types for the cron API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors that can occur in the cron API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Trigger secret missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for cron API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
