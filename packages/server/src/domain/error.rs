//! ドメイン層のエラー型

use thiserror::Error;

/// プロトコルエラー（join メッセージ・受信イベントの検証失敗）
///
/// join 以外では致命的ではなく、ログに記録してセッションを継続する。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// JSON として解析できない
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    /// 必須フィールドが存在しない
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// フィールドの型が不正
    #[error("Invalid field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// ルーム識別子が不正
    #[error("Invalid room id: '{0}'")]
    InvalidRoomId(String),
}

/// 配信エラー
///
/// 送信元には伝播しない。ログ出力と自己修復（stale 接続の除去）のために使う。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// 宛先ルームに接続が登録されていない
    #[error("Room '{0}' has no registered connection")]
    RoomNotFound(String),

    /// 宛先接続への書き込みに失敗した
    #[error("Failed to write to room '{room}': {source}")]
    WriteFailed {
        room: String,
        #[source]
        source: ConnectionError,
    },
}

/// 接続ハンドルへの送信エラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// `close()` 済みの接続
    #[error("Connection is closed")]
    Closed,

    /// writer タスクが終了している（リモートが切断済み）
    #[error("Connection writer has stopped")]
    WriterGone,
}

/// 接続前のトークン検証エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Token is missing")]
    Missing,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token uses an unexpected signing algorithm")]
    WrongAlgorithm,

    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,
}

/// メッセージバスのエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// バスが停止している
    #[error("Message bus is closed")]
    Closed,
}
