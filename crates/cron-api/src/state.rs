//! Application state shared across handlers.

use std::sync::Arc;

use chat_client::ChatClient;
use database::Database;
use scheduler::sender::PushGateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Chat provider client.
    pub chat: ChatClient,
    /// Push fan-out gateway for notification delivery.
    pub gateway: Arc<dyn PushGateway>,
    /// Trigger shared secret.
    pub cron_secret: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        chat: ChatClient,
        gateway: Arc<dyn PushGateway>,
        cron_secret: String,
    ) -> Self {
        Self {
            db,
            chat,
            gateway,
            cron_secret,
        }
    }
}
