//! HTTP and WebSocket handlers.

pub mod http;
pub mod websocket;

pub use http::{health_check, list_rooms, publish_message};
pub use websocket::websocket_handler;
