//! Room-addressed WebSocket relay library.
//!
//! Clients join a room over a WebSocket; messages published on the bus and
//! events sent by other clients are forwarded to whichever connection is
//! currently registered for the target room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
