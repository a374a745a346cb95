//! Infrastructure 層
//!
//! ドメイン層の trait の具体的な実装と、ワイヤフォーマットの DTO を提供します。

pub mod auth;
pub mod bus;
pub mod dto;
pub mod registry;
