//! Connection Registry trait 定義
//!
//! ルーム → 接続ハンドルの対応を管理するインターフェース。
//! セッションループとバスブリッジはこの trait を通してのみ対応表を読み書きする。

use async_trait::async_trait;

use super::{
    connection::{ConnectionHandle, ConnectionId},
    value_object::RoomId,
};

/// 登録中のルームのスナップショット（デバッグ用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRoom {
    pub room: RoomId,
    pub connection_id: ConnectionId,
    pub connected_at: i64,
}

/// Connection Registry trait
///
/// 1 ルームにつき接続は高々 1 つ。全操作は同じ排他制御の下で行い、
/// ロック保持中にネットワーク I/O を行ってはならない。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// ルームに接続を登録する
    ///
    /// 既存の登録は上書きされる。上書きされた接続は閉じない。
    async fn register(&self, room: RoomId, connection: ConnectionHandle);

    /// ルームの登録を解除し、その接続を閉じる
    ///
    /// 未登録のルームに対しては何もしない。
    async fn unregister(&self, room: &RoomId);

    /// 指定した接続がまだ登録されている場合のみ解除して閉じる
    ///
    /// 解除した場合は `true` を返す。別の接続に置き換わっていれば何もしない。
    async fn unregister_connection(&self, room: &RoomId, connection_id: ConnectionId) -> bool;

    /// ルームの現在の接続を取得する
    async fn lookup(&self, room: &RoomId) -> Option<ConnectionHandle>;

    /// 登録中の全ルームを取得する（ルーム名順）
    async fn rooms(&self) -> Vec<RegisteredRoom>;
}
