//! メッセージバス trait 定義

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::BusError;

/// 購読者が受け取るペイロードのストリーム
///
/// バスが停止すると `recv()` が `None` を返す。
pub type BusSubscription = mpsc::UnboundedReceiver<String>;

/// Publish/Subscribe メッセージバス
///
/// ペイロードは不透明な文字列。購読者ごとに発行順で届く。
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// トピックにペイロードを発行し、届いた購読者数を返す
    async fn publish(&self, topic: &str, payload: String) -> Result<usize, BusError>;

    /// トピックを購読する
    async fn subscribe(&self, topic: &str) -> Result<BusSubscription, BusError>;
}
