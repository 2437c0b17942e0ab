//! Cron trigger HTTP surface for the Cadence scheduler.
//!
//! An external periodic trigger (platform cron, uptime pinger) hits the
//! endpoints here with a shared secret; each hit runs one bounded batch
//! pass and returns aggregate stats.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use chat_client::{ChatClient, ChatConfig};
use database::Database;
use scheduler::sender::LoggingGateway;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting cron API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Chat provider client
    let chat_config = ChatConfig::new(
        &config.chat_api_url,
        &config.chat_api_key,
        &config.chat_bot_user_id,
    );
    let chat = ChatClient::new(chat_config)?;

    // Push fan-out is an external collaborator; until one is wired in,
    // notification deliveries are logged.
    let gateway = Arc::new(LoggingGateway);

    // Build application state
    let state = AppState::new(db, chat, gateway, config.cron_secret.clone());

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Cron API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
