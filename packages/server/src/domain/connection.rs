//! 接続ハンドル
//!
//! 1 本の WebSocket 接続を表します。実際のソケット書き込みは UI 層の
//! writer タスクが行い、ハンドルはそこへ `OutboundFrame` を送るチャンネルを保持します。
//! writer タスクが終了している（= リモートが切断済み）場合、送信は失敗します。

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::ConnectionError;

/// writer タスクに渡すフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// テキストフレーム（JSON）
    Text(String),
    /// Close フレームを送信して writer を終了する
    Close,
}

/// writer タスク側の受信チャンネル
pub type OutboundReceiver = mpsc::UnboundedReceiver<OutboundFrame>;

/// 接続ごとの一意な ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 接続ハンドル
///
/// clone しても同じ接続を指す。`close()` は何度呼んでも Close フレームを 1 回だけ送る。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<OutboundFrame>,
    closed: Arc<AtomicBool>,
    /// 接続時刻（Unix ミリ秒）
    connected_at: i64,
}

impl ConnectionHandle {
    /// 新しい接続ハンドルと、writer タスク用の受信チャンネルを作成
    pub fn channel(connected_at: i64) -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: ConnectionId::generate(),
            sender,
            closed: Arc::new(AtomicBool::new(false)),
            connected_at,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_closed()
    }

    /// テキストを送信
    ///
    /// writer タスクが既に終了していればエラーを返す。
    pub fn send_text(&self, payload: String) -> Result<(), ConnectionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::Closed);
        }
        self.sender
            .send(OutboundFrame::Text(payload))
            .map_err(|_| ConnectionError::WriterGone)
    }

    /// 接続を閉じる
    ///
    /// 初回呼び出し時のみ Close フレームを送り `true` を返す。
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        // writer が既に終了していても問題ない
        let _ = self.sender.send(OutboundFrame::Close);
        true
    }
}
