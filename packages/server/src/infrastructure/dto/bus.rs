//! Message bus payload DTO.

use serde::{Deserialize, Serialize};

/// Chat message published on the bus and forwarded verbatim to the target room.
///
/// Only `room` is required; the other fields default to empty/zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMessage {
    pub room: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_id: i64,
    #[serde(default)]
    pub receiver_id: i64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub sender_nickname: String,
    #[serde(default)]
    pub sender_profile_image: String,
}
