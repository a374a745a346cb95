//! InMemory Connection Registry 実装
//!
//! ## 責務
//!
//! - ルーム → 接続ハンドルの対応表を `Mutex<HashMap>` で保持
//! - register / unregister / lookup を同じロックで直列化
//!
//! ## 設計ノート
//!
//! ロック中は対応表の操作のみ行う。接続を閉じる処理（Close フレームの送信）は
//! エントリを取り除いてロックを解放した後に行う。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionHandle, ConnectionId, ConnectionRegistry, RegisteredRoom, RoomId};

/// インメモリ Connection Registry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: RoomId, Value: 現在の接続
    connections: Mutex<HashMap<RoomId, ConnectionHandle>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, room: RoomId, connection: ConnectionHandle) {
        let connection_id = connection.id();
        let replaced = {
            let mut connections = self.connections.lock().await;
            connections.insert(room.clone(), connection)
        };

        match replaced {
            Some(previous) => tracing::debug!(
                "Room '{}' re-registered to connection {} (previous {} left open)",
                room,
                connection_id,
                previous.id()
            ),
            None => tracing::debug!("Room '{}' registered to connection {}", room, connection_id),
        }
    }

    async fn unregister(&self, room: &RoomId) {
        let removed = {
            let mut connections = self.connections.lock().await;
            connections.remove(room)
        };

        if let Some(connection) = removed {
            connection.close();
            tracing::debug!(
                "Room '{}' unregistered, connection {} closed",
                room,
                connection.id()
            );
        }
    }

    async fn unregister_connection(&self, room: &RoomId, connection_id: ConnectionId) -> bool {
        let removed = {
            let mut connections = self.connections.lock().await;
            match connections.get(room) {
                Some(current) if current.id() == connection_id => connections.remove(room),
                _ => None,
            }
        };

        match removed {
            Some(connection) => {
                connection.close();
                tracing::debug!(
                    "Room '{}' unregistered, connection {} closed",
                    room,
                    connection_id
                );
                true
            }
            None => false,
        }
    }

    async fn lookup(&self, room: &RoomId) -> Option<ConnectionHandle> {
        let connections = self.connections.lock().await;
        connections.get(room).cloned()
    }

    async fn rooms(&self) -> Vec<RegisteredRoom> {
        let mut rooms: Vec<RegisteredRoom> = {
            let connections = self.connections.lock().await;
            connections
                .iter()
                .map(|(room, connection)| RegisteredRoom {
                    room: room.clone(),
                    connection_id: connection.id(),
                    connected_at: connection.connected_at(),
                })
                .collect()
        };
        rooms.sort_by(|a, b| a.room.cmp(&b.room));
        rooms
    }
}
