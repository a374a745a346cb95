//! UseCase: メッセージの発行
//!
//! 外部の発行者が HTTP 経由でメッセージをバスに載せるための入口。
//! ペイロードの検証と JSON 化は UI 層（DTO 変換）が行う。

use std::sync::Arc;

use crate::domain::{BusError, MessageBus, MessageId, RoomId};

/// メッセージ発行のユースケース
pub struct PublishMessageUseCase {
    bus: Arc<dyn MessageBus>,
    topic: String,
}

impl PublishMessageUseCase {
    /// 新しい PublishMessageUseCase を作成
    pub fn new(bus: Arc<dyn MessageBus>, topic: String) -> Self {
        Self { bus, topic }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// メッセージを発行し、届いた購読者数を返す
    ///
    /// # Arguments
    ///
    /// * `room` - 宛先ルーム（ログ用）
    /// * `message_id` - メッセージ ID（ログ用）
    /// * `json_message` - 発行する JSON メッセージ（DTO 層で生成されたもの）
    pub async fn execute(
        &self,
        room: &RoomId,
        message_id: MessageId,
        json_message: String,
    ) -> Result<usize, BusError> {
        let subscribers = self.bus.publish(&self.topic, json_message).await?;
        tracing::info!(
            "Published message {} for room '{}' to topic '{}'",
            message_id,
            room,
            self.topic
        );
        Ok(subscribers)
    }
}
