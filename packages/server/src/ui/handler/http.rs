//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    domain::MessageId,
    infrastructure::dto::{
        bus::BusMessage,
        http::{PublishResponseDto, RegisteredRoomDto},
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing the rooms that currently have a connection
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RegisteredRoomDto>> {
    let rooms = state.list_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RegisteredRoomDto::from).collect())
}

/// Publish a message to the bus topic the relay listens on
pub async fn publish_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<BusMessage>,
) -> Result<(StatusCode, Json<PublishResponseDto>), StatusCode> {
    // DTO から Domain Model への変換
    let room = message.room_id().map_err(|e| {
        tracing::warn!("Rejected publish request: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    let json_message = serde_json::to_string(&message).map_err(|e| {
        tracing::error!("Failed to encode publish request: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match state
        .publish_message_usecase
        .execute(&room, MessageId::new(message.message_id), json_message)
        .await
    {
        Ok(subscribers) => Ok((
            StatusCode::ACCEPTED,
            Json(PublishResponseDto {
                topic: state.publish_message_usecase.topic().to_string(),
                subscribers,
            }),
        )),
        Err(e) => {
            tracing::error!("Failed to publish message: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
