//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket handshake and outbound event DTOs
//! - `bus`: message bus payload DTO
//! - `http`: HTTP API response DTOs

pub mod bus;
pub mod conversion;
pub mod http;
pub mod websocket;
