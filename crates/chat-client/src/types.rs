//! Request and response payloads for the chat provider API.

use serde::{Deserialize, Serialize};

/// A chat provider user, upserted before posting as them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    /// Provider user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role shown in the channel (e.g., "bot").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ChatUser {
    /// Build the engine's bot user.
    pub fn bot(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Cadence".to_string(),
            role: Some("bot".to_string()),
        }
    }
}

/// Body for a channel membership add.
#[derive(Debug, Serialize)]
pub struct AddMemberRequest {
    /// User to add to the channel.
    pub user_id: String,
}

/// Body for a message send.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    /// User the message is posted as.
    pub sender_id: String,
    /// Message text.
    pub text: String,
}

/// Response from a message send.
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    /// Provider-assigned message id.
    pub message_id: String,
}

/// Error body the provider returns on non-success status codes.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "member_exists").
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}
