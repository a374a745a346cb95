//! トークン検証の実装
//!
//! - `jwt`: HMAC 署名の JWT を検証する実装

pub mod jwt;

pub use jwt::{JwtAdmissionCheck, JwtClaims, JwtConfigError};
