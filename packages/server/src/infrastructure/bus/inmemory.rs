//! InMemory メッセージバス実装
//!
//! トピックごとに購読者の `UnboundedSender` を保持し、publish 時に全購読者へ送る。
//! 購読者ごとの到着順は publish 順と一致する。受信側を drop した購読者は
//! 次の publish で取り除かれる。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{BusError, BusSubscription, MessageBus};

#[derive(Default)]
struct Topics {
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<String>>>,
    shut_down: bool,
}

/// インメモリ Pub/Sub バス
#[derive(Default)]
pub struct InMemoryMessageBus {
    topics: Mutex<Topics>,
}

impl InMemoryMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// バスを停止する
    ///
    /// 全購読者のストリームが終了し、以降の publish / subscribe は `BusError::Closed` になる。
    pub async fn shutdown(&self) {
        let mut topics = self.topics.lock().await;
        topics.shut_down = true;
        topics.subscribers.clear();
        tracing::info!("Message bus shut down");
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<usize, BusError> {
        let mut topics = self.topics.lock().await;
        if topics.shut_down {
            return Err(BusError::Closed);
        }

        let Some(subscribers) = topics.subscribers.get_mut(topic) else {
            tracing::debug!("Published to topic '{}' with no subscribers", topic);
            return Ok(0);
        };

        subscribers.retain(|subscriber| subscriber.send(payload.clone()).is_ok());
        let delivered = subscribers.len();
        tracing::debug!(
            "Published to topic '{}' ({} subscribers)",
            topic,
            delivered
        );
        Ok(delivered)
    }

    async fn subscribe(&self, topic: &str) -> Result<BusSubscription, BusError> {
        let mut topics = self.topics.lock().await;
        if topics.shut_down {
            return Err(BusError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        topics
            .subscribers
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        tracing::info!("Subscribed to topic '{}'", topic);
        Ok(rx)
    }
}
