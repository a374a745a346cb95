//! UseCase: join 後の受信イベント処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HandleInboundEventUseCase::execute() メソッド
//! - イベント種別ごとの宛先ルームの決定と配信
//!
//! ### なぜこのテストが必要か
//! - delete_message は受信者と送信者自身のルームの両方に届く必要がある
//! - 宛先が未接続・切断済みでも送信元にはエラーを返さない
//!
//! ### どのような状況を想定しているか
//! - 正常系：delete_message（二重配信）、typing
//! - 異常系：未対応の type、書き込み失敗
//! - エッジケース：宛先がどちらも未接続

use std::sync::Arc;

use crate::domain::{InboundEvent, RoomId, UserId};

use super::deliver_to_room::DeliverToRoomUseCase;

/// 受信イベント処理のユースケース
pub struct HandleInboundEventUseCase {
    /// 配信経路
    delivery: Arc<DeliverToRoomUseCase>,
    /// typing を送信者自身のルームにもエコーするか
    echo_typing: bool,
}

impl HandleInboundEventUseCase {
    /// 新しい HandleInboundEventUseCase を作成
    pub fn new(delivery: Arc<DeliverToRoomUseCase>, echo_typing: bool) -> Self {
        Self {
            delivery,
            echo_typing,
        }
    }

    /// 受信イベントを宛先ルームへ配信する
    ///
    /// # Arguments
    ///
    /// * `own_room` - このセッションが参加しているルーム
    /// * `event` - 受信イベント（Domain Model）
    /// * `json_message` - 配信する JSON メッセージ（DTO 層で生成されたもの）
    ///
    /// # Returns
    ///
    /// 実際に配信できたルーム（未接続・書き込み失敗の宛先は含まない）
    pub async fn execute(
        &self,
        own_room: &RoomId,
        event: InboundEvent,
        json_message: String,
    ) -> Vec<RoomId> {
        tracing::debug!("Received '{}' event from room '{}'", event.kind(), own_room);

        let targets = match event {
            // 受信者のルームと、自分のルーム（他のタブ・端末向け）の両方に通知する
            InboundEvent::DeleteMessage { receiver_id, .. } => {
                vec![receiver_id.room(), own_room.clone()]
            }
            InboundEvent::Typing {
                sender_id,
                receiver_id,
            } => self.typing_targets(sender_id, receiver_id),
            InboundEvent::Unknown(kind) => {
                tracing::warn!("Unhandled event type '{}' from room '{}'", kind, own_room);
                return Vec::new();
            }
        };

        self.deliver_all(&targets, json_message).await
    }

    fn typing_targets(&self, sender_id: UserId, receiver_id: UserId) -> Vec<RoomId> {
        let mut targets = vec![receiver_id.room()];
        if self.echo_typing {
            targets.push(sender_id.room());
        }
        targets
    }

    async fn deliver_all(&self, targets: &[RoomId], json_message: String) -> Vec<RoomId> {
        let mut delivered = Vec::with_capacity(targets.len());
        for room in targets {
            match self.delivery.execute(room, json_message.clone()).await {
                Ok(()) => delivered.push(room.clone()),
                Err(e) => tracing::debug!("Skipped delivery: {}", e),
            }
        }
        delivered
    }
}
