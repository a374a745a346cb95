//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Registered room entry for the debug endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredRoomDto {
    pub room: String,
    pub connection_id: String,
    /// RFC 3339
    pub connected_at: String,
}

/// Response for `POST /api/publish`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponseDto {
    pub topic: String,
    /// Number of bus subscribers the payload reached
    pub subscribers: usize,
}
