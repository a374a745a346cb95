//! メッセージバスの実装
//!
//! - `inmemory`: プロセス内のチャンネルを使った実装

pub mod inmemory;

pub use inmemory::InMemoryMessageBus;
