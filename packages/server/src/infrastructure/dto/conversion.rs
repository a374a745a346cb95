//! Conversion logic between DTOs and domain types.

use roomrelay_shared::time::timestamp_to_rfc3339;
use serde_json::{Map, Value};

use crate::domain::{InboundEvent, MessageId, ProtocolError, RegisteredRoom, RoomId, UserId};
use crate::infrastructure::dto::{
    bus::BusMessage,
    http::RegisteredRoomDto,
    websocket::{DeleteMessageBroadcast, JoinRequest, MessageType, TypingBroadcast},
};

// ========================================
// DTO → Domain
// ========================================

/// Parse the join handshake into the room to register.
pub fn parse_join_request(text: &str) -> Result<RoomId, ProtocolError> {
    let request: JoinRequest =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    RoomId::new(request.room)
}

/// Parse a post-join frame into an [`InboundEvent`].
///
/// Required fields are checked per event type; an unrecognized `type` becomes
/// [`InboundEvent::Unknown`].
pub fn parse_inbound_event(text: &str) -> Result<InboundEvent, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ProtocolError::InvalidJson("expected a JSON object".to_string()));
    };

    let kind = match fields.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(_) => {
            return Err(ProtocolError::InvalidField {
                field: "type",
                expected: "string",
            });
        }
        None => return Err(ProtocolError::MissingField("type")),
    };

    match kind {
        "delete_message" => Ok(InboundEvent::DeleteMessage {
            message_id: MessageId::new(require_integer(&fields, "message_id")?),
            receiver_id: UserId::new(require_integer(&fields, "receiverId")?),
        }),
        "typing" => Ok(InboundEvent::Typing {
            sender_id: UserId::new(require_integer(&fields, "senderId")?),
            receiver_id: UserId::new(require_integer(&fields, "receiverId")?),
        }),
        other => Ok(InboundEvent::Unknown(other.to_string())),
    }
}

fn require_integer(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<i64, ProtocolError> {
    let value = fields.get(field).ok_or(ProtocolError::MissingField(field))?;
    value.as_i64().ok_or(ProtocolError::InvalidField {
        field,
        expected: "integer",
    })
}

/// Decode a bus payload, returning the target room alongside the message.
pub fn decode_bus_message(payload: &str) -> Result<(RoomId, BusMessage), ProtocolError> {
    let message: BusMessage =
        serde_json::from_str(payload).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    let room = message.room_id()?;
    Ok((room, message))
}

impl BusMessage {
    pub fn room_id(&self) -> Result<RoomId, ProtocolError> {
        RoomId::new(self.room.clone())
    }
}

// ========================================
// Domain → DTO
// ========================================

/// Encode the broadcast sent to target rooms for a client event.
///
/// Returns `Ok(None)` for event types that are not relayed.
pub fn encode_broadcast(event: &InboundEvent) -> Result<Option<String>, serde_json::Error> {
    let json = match event {
        InboundEvent::DeleteMessage { message_id, .. } => {
            serde_json::to_string(&DeleteMessageBroadcast::new(*message_id))?
        }
        InboundEvent::Typing { sender_id, .. } => {
            serde_json::to_string(&TypingBroadcast::new(*sender_id))?
        }
        InboundEvent::Unknown(_) => return Ok(None),
    };
    Ok(Some(json))
}

impl DeleteMessageBroadcast {
    pub fn new(message_id: MessageId) -> Self {
        Self {
            r#type: MessageType::DeleteMessage,
            message_id: message_id.value(),
        }
    }
}

impl TypingBroadcast {
    pub fn new(sender_id: UserId) -> Self {
        Self {
            r#type: MessageType::Typing,
            sender_id: sender_id.value(),
        }
    }
}

impl From<RegisteredRoom> for RegisteredRoomDto {
    fn from(model: RegisteredRoom) -> Self {
        Self {
            room: model.room.into_string(),
            connection_id: model.connection_id.to_string(),
            connected_at: timestamp_to_rfc3339(model.connected_at),
        }
    }
}
