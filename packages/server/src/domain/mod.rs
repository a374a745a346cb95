//! ドメイン層
//!
//! 値オブジェクト、接続ハンドル、受信イベント、エラー型と、
//! Infrastructure 層が実装する trait（Registry, Bus, Admission）を定義します。

pub mod admission;
pub mod bus;
pub mod connection;
pub mod error;
pub mod event;
pub mod registry;
pub mod value_object;

pub use admission::AdmissionCheck;
pub use bus::{BusSubscription, MessageBus};
pub use connection::{ConnectionHandle, ConnectionId, OutboundFrame, OutboundReceiver};
pub use error::{AdmissionError, BusError, ConnectionError, DeliveryError, ProtocolError};
pub use event::InboundEvent;
pub use registry::{ConnectionRegistry, RegisteredRoom};
pub use value_object::{MessageId, RoomId, UserId};
