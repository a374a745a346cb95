//! UseCase: バスメッセージの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayBusMessageUseCase::execute() メソッド
//! - バスから届いたメッセージを `room` の接続へそのまま転送する処理
//!
//! ### なぜこのテストが必要か
//! - 未接続ルーム宛てのメッセージは破棄される（再送はない）
//! - 書き込みに失敗した接続は Registry から除去される
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中ルームへの転送
//! - 異常系：未接続ルーム、書き込み失敗

use std::sync::Arc;

use crate::domain::{DeliveryError, MessageId, RoomId, UserId};

use super::deliver_to_room::DeliverToRoomUseCase;

/// バスから受信したメッセージを中継するユースケース
pub struct RelayBusMessageUseCase {
    delivery: Arc<DeliverToRoomUseCase>,
}

impl RelayBusMessageUseCase {
    /// 新しい RelayBusMessageUseCase を作成
    pub fn new(delivery: Arc<DeliverToRoomUseCase>) -> Self {
        Self { delivery }
    }

    /// メッセージ 1 件を宛先ルームへ転送する
    ///
    /// # Arguments
    ///
    /// * `room` - 宛先ルーム（Domain Model）
    /// * `message_id` - メッセージ ID（ログ用）
    /// * `sender_id` - 送信者（ログ用）
    /// * `json_message` - 転送する JSON メッセージ（DTO 層で生成されたもの）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 転送成功
    /// * `Err(DeliveryError)` - 宛先なし・書き込み失敗（メッセージは破棄）
    pub async fn execute(
        &self,
        room: &RoomId,
        message_id: MessageId,
        sender_id: UserId,
        json_message: String,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            "Bus message {} for room '{}' (sender {})",
            message_id,
            room,
            sender_id
        );
        self.delivery.execute(room, json_message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionError, ConnectionHandle, ConnectionRegistry, OutboundFrame},
        infrastructure::registry::InMemoryConnectionRegistry,
    };

    const MESSAGE_JSON: &str = r#"{"room":"user_9","content":"hello","message_id":11}"#;

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    fn setup() -> (Arc<InMemoryConnectionRegistry>, RelayBusMessageUseCase) {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let delivery = Arc::new(DeliverToRoomUseCase::new(registry.clone()));
        (registry, RelayBusMessageUseCase::new(delivery))
    }

    async fn relay(usecase: &RelayBusMessageUseCase, name: &str) -> Result<(), DeliveryError> {
        usecase
            .execute(
                &room(name),
                MessageId::new(11),
                UserId::new(3),
                MESSAGE_JSON.to_string(),
            )
            .await
    }

    #[tokio::test]
    async fn test_relay_forwards_message_verbatim() {
        // テスト項目: 接続中ルーム宛てのメッセージがそのまま届く
        // given (前提条件):
        let (registry, usecase) = setup();
        let (conn, mut rx) = ConnectionHandle::channel(0);
        registry.register(room("user_9"), conn).await;

        // when (操作):
        let result = relay(&usecase, "user_9").await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(
            rx.recv().await,
            Some(OutboundFrame::Text(MESSAGE_JSON.to_string()))
        );
    }

    #[tokio::test]
    async fn test_relay_to_absent_room_is_dropped() {
        // テスト項目: 未接続ルーム宛てのメッセージは破棄される
        // given (前提条件):
        let (_registry, usecase) = setup();

        // when (操作):
        let result = relay(&usecase, "user_9").await;

        // then (期待する結果):
        assert_eq!(result, Err(DeliveryError::RoomNotFound("user_9".to_string())));
    }

    #[tokio::test]
    async fn test_relay_write_failure_reaps_connection() {
        // テスト項目: 書き込み失敗でその接続が Registry から除去される
        // given (前提条件):
        let (registry, usecase) = setup();
        let (conn, rx) = ConnectionHandle::channel(0);
        registry.register(room("user_9"), conn).await;
        drop(rx);

        // when (操作):
        let result = relay(&usecase, "user_9").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DeliveryError::WriteFailed {
                room: "user_9".to_string(),
                source: ConnectionError::WriterGone,
            })
        );
        assert!(registry.lookup(&room("user_9")).await.is_none());
    }
}
