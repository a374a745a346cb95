//! UseCase: ルームへの参加（join ハンドシェイク）
//!
//! join メッセージから取り出したルームに、接続を Registry 経由で登録する。
//! join メッセージの解析は UI 層（DTO 変換）が行う。

use std::sync::Arc;

use crate::domain::{ConnectionHandle, ConnectionRegistry, RoomId};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続をルームに登録する
    ///
    /// 既存の登録は上書きされ、置き換えられた接続は閉じない。
    ///
    /// # Arguments
    ///
    /// * `room` - 参加するルーム（Domain Model）
    /// * `connection` - このセッションの接続ハンドル
    pub async fn execute(&self, room: RoomId, connection: ConnectionHandle) {
        self.registry.register(room, connection).await;
    }
}
