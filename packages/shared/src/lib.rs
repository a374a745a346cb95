//! Utilities shared by the relay crates.

pub mod logger;
pub mod time;
