//! Chat provider HTTP client.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::types::{
    AddMemberRequest, ApiErrorBody, ChatUser, SendMessageRequest, SendMessageResponse,
};

/// Client for the chat/video provider's server-side API.
///
/// Every operation is safe to retry: user upsert is a PUT, membership adds
/// treat "already a member" as success, and duplicate message sends are
/// accepted at-least-once by contract.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    config: ChatConfig,
}

impl ChatClient {
    /// Build a client for the given provider configuration.
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        if config.api_key.is_empty() {
            return Err(ChatError::Config("chat API key is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ChatError::Http)?;

        Ok(Self { http, config })
    }

    /// Create or update a provider user. Idempotent PUT.
    pub async fn upsert_user(&self, user: &ChatUser) -> Result<(), ChatError> {
        debug!(user_id = %user.id, "Upserting chat user");

        let response = self
            .http
            .put(self.config.users_url())
            .bearer_auth(&self.config.api_key)
            .json(user)
            .send()
            .await?;

        self.check_status(response).await?;
        Ok(())
    }

    /// Ensure the engine's bot user exists. Idempotent.
    pub async fn ensure_bot_user(&self) -> Result<(), ChatError> {
        self.upsert_user(&ChatUser::bot(&self.config.bot_user_id)).await
    }

    /// Add a user to a channel. "Already a member" responses are success.
    pub async fn add_channel_member(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(), ChatError> {
        debug!(channel_id = %channel_id, user_id = %user_id, "Adding channel member");

        let body = AddMemberRequest {
            user_id: user_id.to_string(),
        };

        let response = self
            .http
            .post(self.config.members_url(channel_id))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            debug!(channel_id = %channel_id, user_id = %user_id, "Already a member");
            return Ok(());
        }

        self.check_status(response).await?;
        Ok(())
    }

    /// Post a message to a channel as the bot user.
    pub async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, ChatError> {
        let body = SendMessageRequest {
            sender_id: self.config.bot_user_id.clone(),
            text: text.to_string(),
        };

        let response = self
            .http
            .post(self.config.messages_url(channel_id))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = self.check_status(response).await?;
        let sent: SendMessageResponse = response.json().await?;

        info!(channel_id = %channel_id, message_id = %sent.message_id, "Message sent");
        Ok(sent.message_id)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Map non-success responses to `ChatError::Api` with the provider's
    /// error body when one is present.
    async fn check_status(&self, response: Response) -> Result<Response, ChatError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            Ok(body) => body.code,
            Err(_) => String::new(),
        };

        Err(ChatError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.config.base_url)
            .field("bot_user_id", &self.config.bot_user_id)
            .finish()
    }
}
