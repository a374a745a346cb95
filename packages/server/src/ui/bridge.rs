//! Bus bridge: feeds payloads from the bus subscription into the relay use case.
//!
//! Payload decoding happens here so the use case only sees domain types.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::{
    domain::{BusSubscription, DeliveryError, MessageId, ProtocolError, RoomId, UserId},
    infrastructure::dto::conversion::decode_bus_message,
    usecase::RelayBusMessageUseCase,
};

/// Why a single bus payload was dropped
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Failed to decode bus payload: {0}")]
    Decode(#[from] ProtocolError),

    #[error("Failed to encode bus payload: {0}")]
    Encode(String),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Subscription loop for the relay's single bus topic
pub struct BusBridge {
    relay_bus_message_usecase: Arc<RelayBusMessageUseCase>,
}

impl BusBridge {
    pub fn new(relay_bus_message_usecase: Arc<RelayBusMessageUseCase>) -> Self {
        Self {
            relay_bus_message_usecase,
        }
    }

    /// Decode one payload and relay it to its room
    pub async fn handle_payload(&self, payload: &str) -> Result<RoomId, RelayError> {
        let (room, message) = decode_bus_message(payload)?;
        let json_message =
            serde_json::to_string(&message).map_err(|e| RelayError::Encode(e.to_string()))?;

        self.relay_bus_message_usecase
            .execute(
                &room,
                MessageId::new(message.message_id),
                UserId::new(message.sender_id),
                json_message,
            )
            .await?;
        Ok(room)
    }

    /// Process payloads until the subscription ends
    pub async fn run(&self, mut subscription: BusSubscription) {
        while let Some(payload) = subscription.recv().await {
            match self.handle_payload(&payload).await {
                Ok(room) => tracing::debug!("Relayed bus message to room '{}'", room),
                Err(RelayError::Delivery(e)) => tracing::info!("Dropping bus message: {}", e),
                Err(e) => tracing::warn!("Dropping bus payload: {}", e),
            }
        }
        tracing::error!("Bus subscription terminated; bus messages are no longer relayed");
    }

    pub fn spawn(self: Arc<Self>, subscription: BusSubscription) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(subscription).await })
    }
}
