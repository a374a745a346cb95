//! WebSocket connection handlers.
//!
//! Each accepted connection runs one session: admission → join handshake →
//! receive loop → unregister. Outbound frames for the connection are written by
//! a separate pusher task fed by the connection handle's channel.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use roomrelay_shared::time::get_timestamp_millis;
use serde::Deserialize;

use crate::{
    domain::{
        AdmissionCheck, AdmissionError, ConnectionHandle, OutboundFrame, OutboundReceiver, RoomId,
        UserId,
    },
    infrastructure::dto::conversion::{encode_broadcast, parse_inbound_event, parse_join_request},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let token = extract_token(query.token, &headers);

    let user_id = match admit(state.admission.as_ref(), token.as_deref()) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!("Rejected WebSocket connection: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::info!("User {} admitted, awaiting join", user_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Take the credential from `?token=` or, failing that, `Authorization: Bearer`.
fn extract_token(query_token: Option<String>, headers: &HeaderMap) -> Option<String> {
    query_token.filter(|token| !token.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
}

fn admit(check: &dyn AdmissionCheck, token: Option<&str>) -> Result<UserId, AdmissionError> {
    check.verify(token.unwrap_or_default())
}

/// Spawns a task that writes outbound frames from the connection handle to the WebSocket.
///
/// The task ends after a `Close` frame or when the socket write fails; either way the
/// receiver is dropped so later deliveries to this connection fail and get reaped.
fn pusher_loop(
    mut rx: OutboundReceiver,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

/// Text carried by a data frame. Binary frames count when they hold UTF-8.
fn frame_text(message: &Message) -> Option<&str> {
    match message {
        Message::Text(text) => Some(text.as_str()),
        Message::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        _ => None,
    }
}

/// Wait for the join message, skipping ping/pong. `None` ends the session.
async fn await_join(receiver: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                tracing::info!("Connection closed before join");
                return None;
            }
            Ok(message) => {
                let text = frame_text(&message).map(str::to_string);
                if text.is_none() {
                    tracing::warn!("Join message is not valid UTF-8");
                }
                return text;
            }
            Err(e) => {
                tracing::warn!("WebSocket error before join: {}", e);
                return None;
            }
        }
    }
    None
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (mut sender, mut receiver) = socket.split();

    let Some(join_message) = await_join(&mut receiver).await else {
        let _ = sender.send(Message::Close(None)).await;
        return;
    };

    // DTO から Domain Model への変換
    let room = match parse_join_request(&join_message) {
        Ok(room) => room,
        Err(e) => {
            tracing::warn!("Invalid join message from user {}: {}", user_id, e);
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let (connection, rx) = ConnectionHandle::channel(get_timestamp_millis());
    state
        .join_room_usecase
        .execute(room.clone(), connection.clone())
        .await;
    tracing::info!(
        "User {} joined room '{}' (connection {})",
        user_id,
        room,
        connection.id()
    );

    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = tokio::spawn(receive_loop(receiver, state.clone(), room.clone()));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if state.leave_room_usecase.execute(&room, &connection).await {
        tracing::info!("Room '{}' unregistered after session end", room);
    } else {
        tracing::info!(
            "Session for room '{}' ended (connection {} was no longer registered)",
            room,
            connection.id()
        );
    }
}

async fn receive_loop(mut receiver: SplitStream<WebSocket>, state: Arc<AppState>, room: RoomId) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error in room '{}': {}", room, e);
                break;
            }
        };

        match msg {
            Message::Close(_) => {
                tracing::info!("Room '{}' requested close", room);
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                tracing::debug!("Received ping/pong");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            data => match frame_text(&data) {
                Some(text) => handle_event(&state, &room, text).await,
                None => tracing::warn!("Ignoring non-UTF-8 frame from room '{}'", room),
            },
        }
    }
}

/// Convert one client frame to a domain event and its broadcast, then dispatch it.
///
/// Invalid events are logged and skipped; the session keeps running.
async fn handle_event(state: &AppState, room: &RoomId, text: &str) {
    // DTO から Domain Model への変換
    let event = match parse_inbound_event(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring invalid event from room '{}': {}", room, e);
            return;
        }
    };

    let json_message = match encode_broadcast(&event) {
        Ok(Some(json_message)) => json_message,
        Ok(None) => {
            tracing::warn!("Unhandled event type '{}' from room '{}'", event.kind(), room);
            return;
        }
        Err(e) => {
            tracing::error!("Failed to encode '{}' broadcast: {}", event.kind(), e);
            return;
        }
    };

    let delivered = state
        .handle_inbound_event_usecase
        .execute(room, event, json_message)
        .await;
    tracing::debug!("Event from room '{}' delivered to {:?}", room, delivered);
}
