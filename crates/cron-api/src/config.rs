//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Cron API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Shared secret the trigger transport must present.
    pub cron_secret: String,
    /// Chat provider base URL.
    pub chat_api_url: String,
    /// Chat provider server-side API key.
    pub chat_api_key: String,
    /// User id the engine posts reminders as.
    pub chat_bot_user_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CRON_ADDR` | Server bind address | `127.0.0.1:8787` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:cadence.db?mode=rwc` |
    /// | `CRON_SECRET` | Trigger shared secret | (required) |
    /// | `CHAT_API_URL` | Chat provider base URL | `http://127.0.0.1:8080` |
    /// | `CHAT_API_KEY` | Chat provider API key | (required) |
    /// | `CHAT_BOT_USER_ID` | Bot user id | `cadence-bot` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CRON_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:cadence.db?mode=rwc".to_string());

        let cron_secret = env::var("CRON_SECRET").map_err(|_| ConfigError::MissingCronSecret)?;
        if cron_secret.is_empty() {
            return Err(ConfigError::MissingCronSecret);
        }

        let chat_api_url = env::var("CHAT_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let chat_api_key = env::var("CHAT_API_KEY").map_err(|_| ConfigError::MissingChatApiKey)?;

        let chat_bot_user_id =
            env::var("CHAT_BOT_USER_ID").unwrap_or_else(|_| "cadence-bot".to_string());

        Ok(Self {
            addr,
            database_url,
            cron_secret,
            chat_api_url,
            chat_api_key,
            chat_bot_user_id,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CRON_ADDR format")]
    InvalidAddr,

    #[error("CRON_SECRET environment variable is required")]
    MissingCronSecret,

    #[error("CHAT_API_KEY environment variable is required")]
    MissingChatApiKey,
}
