//! 接続前のトークン検証

use super::{error::AdmissionError, value_object::UserId};

/// Bearer トークンを検証してユーザー ID を返す
///
/// セッションが join 待ちに入る前の前提条件として使う。
#[cfg_attr(test, mockall::automock)]
pub trait AdmissionCheck: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AdmissionError>;
}
