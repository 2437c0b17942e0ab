//! Configuration types for the chat provider client.

/// Configuration for the chat provider HTTP API.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the provider API (e.g., "https://chat.example.com").
    pub base_url: String,
    /// Server-side API key.
    pub api_key: String,
    /// User id the engine posts as (the reminder bot).
    pub bot_user_id: String,
}

impl ChatConfig {
    /// Create a new configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bot_user_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bot_user_id: bot_user_id.into(),
        }
    }

    /// User upsert endpoint URL.
    pub fn users_url(&self) -> String {
        format!("{}/api/v1/users", self.base_url)
    }

    /// Channel membership endpoint URL.
    pub fn members_url(&self, channel_id: &str) -> String {
        format!("{}/api/v1/channels/{}/members", self.base_url, channel_id)
    }

    /// Channel message endpoint URL.
    pub fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/api/v1/channels/{}/messages", self.base_url, channel_id)
    }
}
