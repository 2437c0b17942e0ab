//! Delivery seams.
//!
//! Abstracted to support different transports (the chat provider, the push
//! fan-out service, tests). Both seams carry at-least-once semantics: a
//! duplicate external delivery is acceptable, so implementations are free
//! to retry.

use async_trait::async_trait;
use chat_client::ChatClient;

use crate::error::SchedulerError;

/// Sends call reminders into squad chat channels.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Ensure the posting identity (the bot user) exists. Idempotent.
    async fn ensure_sender(&self) -> Result<(), SchedulerError>;

    /// Post one message to a channel.
    async fn send_to_channel(&self, channel_id: &str, text: &str) -> Result<(), SchedulerError>;
}

#[async_trait]
impl ChannelSender for ChatClient {
    async fn ensure_sender(&self) -> Result<(), SchedulerError> {
        self.ensure_bot_user().await.map_err(SchedulerError::from)
    }

    async fn send_to_channel(&self, channel_id: &str, text: &str) -> Result<(), SchedulerError> {
        self.send_message(channel_id, text).await?;
        Ok(())
    }
}

/// Hands a created notification to the external push/email fan-out.
///
/// The fan-out itself is a collaborator outside this engine; what matters
/// here is that it is invoked after the record write and that its failures
/// are per-item.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver one notification to one user's devices.
    async fn deliver(&self, user_id: &str, title: &str, body: &str)
        -> Result<(), SchedulerError>;
}

/// A no-op gateway for tests that discards all deliveries.
#[derive(Debug, Clone, Default)]
pub struct NoOpGateway;

#[async_trait]
impl PushGateway for NoOpGateway {
    async fn deliver(
        &self,
        _user_id: &str,
        _title: &str,
        _body: &str,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// A gateway that logs deliveries. Used when no push provider is wired up.
#[derive(Debug, Clone, Default)]
pub struct LoggingGateway;

#[async_trait]
impl PushGateway for LoggingGateway {
    async fn deliver(
        &self,
        user_id: &str,
        title: &str,
        _body: &str,
    ) -> Result<(), SchedulerError> {
        tracing::info!(user_id = %user_id, title = %title, "Delivering notification");
        Ok(())
    }
}

/// A no-op channel sender for tests.
#[derive(Debug, Clone, Default)]
pub struct NoOpChannelSender;

#[async_trait]
impl ChannelSender for NoOpChannelSender {
    async fn ensure_sender(&self) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn send_to_channel(
        &self,
        _channel_id: &str,
        _text: &str,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }
}
