//! Chat provider client library.
//!
//! This crate provides a Rust client for the external chat/video provider's
//! server-side HTTP API. It supports:
//!
//! - Idempotent user upsert (including the engine's bot user)
//! - Idempotent channel membership adds
//! - Posting messages to squad channels
//!
//! # Example
//!
//! ```no_run
//! use chat_client::{ChatClient, ChatConfig};
//!
//! # async fn example() -> Result<(), chat_client::ChatError> {
//! let config = ChatConfig::new("https://chat.example.com", "api-key", "cadence-bot");
//! let client = ChatClient::new(config)?;
//!
//! client.ensure_bot_user().await?;
//! let message_id = client.send_message("squad-1", "Call in one hour!").await?;
//! println!("Sent message {}", message_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ChatClient;
pub use config::ChatConfig;
pub use error::ChatError;
pub use types::{ChatUser, SendMessageResponse};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
