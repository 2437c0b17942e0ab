//! Error types for the chat provider client.

use thiserror::Error;

/// Errors that can occur when talking to the chat provider.
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the provider.
    #[error("provider error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
