//! WebSocket relay server implementation.

mod bridge;
mod handler;
mod server;
mod signal;
pub mod state;

pub use bridge::{BusBridge, RelayError};
pub use server::{Server, ServerConfig};
