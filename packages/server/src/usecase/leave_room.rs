//! UseCase: セッション終了時の登録解除
//!
//! 受信の失敗・切断・外部からの close のどれでセッションが終わっても、
//! ここを 1 回呼べば接続は閉じられ、まだ自分の登録であれば Registry から外れる。

use std::sync::Arc;

use crate::domain::{ConnectionHandle, ConnectionRegistry, RoomId};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を閉じて登録を解除する
    ///
    /// # Returns
    ///
    /// Registry から実際に解除した場合は `true`。既に解除済み・別の接続に
    /// 置き換わっていた場合は `false`。
    pub async fn execute(&self, room: &RoomId, connection: &ConnectionHandle) -> bool {
        let removed = self
            .registry
            .unregister_connection(room, connection.id())
            .await;
        connection.close();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry::InMemoryConnectionRegistry;

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_leave_unregisters_once() {
        // テスト項目: 退出で登録が解除され、2 回目は何もしない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = LeaveRoomUseCase::new(registry.clone());
        let (conn, _rx) = ConnectionHandle::channel(0);
        registry.register(room("lobby"), conn.clone()).await;

        // when (操作):
        let first = usecase.execute(&room("lobby"), &conn).await;
        let second = usecase.execute(&room("lobby"), &conn).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(conn.is_closed());
        assert!(registry.lookup(&room("lobby")).await.is_none());
    }

    #[tokio::test]
    async fn test_leave_after_rejoin_keeps_new_connection() {
        // テスト項目: 同じルームに別の接続が再参加していれば、その登録は残る
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = LeaveRoomUseCase::new(registry.clone());
        let (old, _old_rx) = ConnectionHandle::channel(0);
        let (new, _new_rx) = ConnectionHandle::channel(0);
        registry.register(room("user_3"), old.clone()).await;
        registry.register(room("user_3"), new.clone()).await;

        // when (操作):
        let removed = usecase.execute(&room("user_3"), &old).await;

        // then (期待する結果):
        assert!(!removed);
        assert!(old.is_closed());
        assert_eq!(
            registry.lookup(&room("user_3")).await.map(|c| c.id()),
            Some(new.id())
        );
    }
}
