//! JWT を使った AdmissionCheck 実装
//!
//! クレーム `user_id` を持つ HMAC 署名のトークンを検証する。有効期限は
//! 注入された `Clock` の現在時刻と比較する。

use std::{str::FromStr, sync::Arc};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use roomrelay_shared::time::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AdmissionCheck, AdmissionError, UserId};

/// トークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// ユーザー ID
    pub user_id: i64,
    /// 有効期限（Unix 秒）
    pub exp: i64,
}

/// JWT 検証器の設定エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtConfigError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("Unsupported JWT algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
}

/// JWT を検証する AdmissionCheck
pub struct JwtAdmissionCheck {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtAdmissionCheck {
    /// 新しい JwtAdmissionCheck を作成
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC の共有鍵
    /// * `algorithm` - 署名アルゴリズム名（HS256 / HS384 / HS512）
    /// * `clock` - 有効期限の判定に使う時計
    pub fn new(
        secret: &[u8],
        algorithm: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JwtConfigError> {
        if secret.is_empty() {
            return Err(JwtConfigError::EmptySecret);
        }

        let algorithm = match Algorithm::from_str(algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => return Err(JwtConfigError::UnsupportedAlgorithm(algorithm.to_string())),
        };

        let mut validation = Validation::new(algorithm);
        // 有効期限は Clock で判定する
        validation.validate_exp = false;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        })
    }
}

impl AdmissionCheck for JwtAdmissionCheck {
    fn verify(&self, token: &str) -> Result<UserId, AdmissionError> {
        if token.is_empty() {
            return Err(AdmissionError::Missing);
        }

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT verification failed: {}", e);
                match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => AdmissionError::Malformed,
                    ErrorKind::InvalidAlgorithm => AdmissionError::WrongAlgorithm,
                    ErrorKind::ExpiredSignature => AdmissionError::Expired,
                    _ => AdmissionError::Invalid,
                }
            })?;

        let claims = token_data.claims;
        if claims.exp < self.clock.now_secs() {
            return Err(AdmissionError::Expired);
        }

        Ok(UserId::new(claims.user_id))
    }
}
