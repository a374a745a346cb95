//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Event type discriminator for outbound events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    DeleteMessage,
    Typing,
}

/// First message on a new connection: `{"room": "<string>"}`
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub room: String,
}

/// `{"type": "delete_message", "message_id": <int>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMessageBroadcast {
    pub r#type: MessageType,
    pub message_id: i64,
}

/// `{"type": "typing", "sender_id": <int>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingBroadcast {
    pub r#type: MessageType,
    pub sender_id: i64,
}
