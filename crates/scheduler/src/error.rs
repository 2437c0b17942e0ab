//! Error types for scheduler operations.

use thiserror::Error;

/// Errors that can occur while evaluating or delivering scheduled work.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Chat provider call failed.
    #[error("chat error: {0}")]
    Chat(#[from] chat_client::ChatError),

    /// Delivery through a gateway failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
