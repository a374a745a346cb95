//! UseCase: ルームへの配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DeliverToRoomUseCase::execute() メソッド
//! - lookup → 書き込み、および書き込み失敗時の自己修復（stale 接続の除去）
//!
//! ### なぜこのテストが必要か
//! - セッションループとバスブリッジの両方がこの配信経路を使う
//! - 書き込みに失敗した接続が Registry に残り続けないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中のルームへの配信
//! - 異常系：未接続ルーム（破棄）、切断済み接続（除去）
//! - エッジケース：除去前に別の接続へ置き換わっていた場合

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, DeliveryError, RoomId};

/// ルームへの配信のユースケース
pub struct DeliverToRoomUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
}

impl DeliverToRoomUseCase {
    /// 新しい DeliverToRoomUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// ルームの現在の接続にペイロードを書き込む
    ///
    /// 書き込みはロックの外で行う。失敗した場合、その接続を閉じて Registry から除去する。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 配信成功
    /// * `Err(DeliveryError::RoomNotFound)` - 接続なし（ペイロードは破棄）
    /// * `Err(DeliveryError::WriteFailed)` - 書き込み失敗（接続は除去済み）
    pub async fn execute(&self, room: &RoomId, payload: String) -> Result<(), DeliveryError> {
        let Some(connection) = self.registry.lookup(room).await else {
            tracing::info!("No connection for room '{}', dropping payload", room);
            return Err(DeliveryError::RoomNotFound(room.as_str().to_string()));
        };

        match connection.send_text(payload) {
            Ok(()) => {
                tracing::debug!("Delivered payload to room '{}'", room);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    "Failed to write to room '{}' (connection {}): {}",
                    room,
                    connection.id(),
                    source
                );
                if self
                    .registry
                    .unregister_connection(room, connection.id())
                    .await
                {
                    tracing::info!(
                        "Reaped stale connection {} from room '{}'",
                        connection.id(),
                        room
                    );
                }
                // 既に置き換わっていた場合も古い接続は閉じておく
                connection.close();
                Err(DeliveryError::WriteFailed {
                    room: room.as_str().to_string(),
                    source,
                })
            }
        }
    }
}
