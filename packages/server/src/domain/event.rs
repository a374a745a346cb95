//! クライアントから受信するイベント

use super::value_object::{MessageId, UserId};

/// join 後にクライアントから届くイベント
///
/// 既知の種別と、ログ用に生の `type` を保持する `Unknown` からなる。
/// JSON からの変換は `infrastructure::dto::conversion` を参照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// メッセージ削除の通知
    DeleteMessage {
        message_id: MessageId,
        receiver_id: UserId,
    },
    /// 入力中インジケータ
    Typing { sender_id: UserId, receiver_id: UserId },
    /// 未対応の種別
    Unknown(String),
}

impl InboundEvent {
    /// ログ出力用の種別名
    pub fn kind(&self) -> &str {
        match self {
            Self::DeleteMessage { .. } => "delete_message",
            Self::Typing { .. } => "typing",
            Self::Unknown(kind) => kind,
        }
    }
}
