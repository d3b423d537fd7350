//! Bearer credential issue and verification (HMAC-signed JWT).
//! The signing secret, algorithm and lifetime come from `Settings` and are
//! fixed for the life of the process.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::error::AccessError;
use crate::tprintln;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    /// Profile snapshot taken at issue time. Informational only; access
    /// decisions always re-read the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(settings: &Settings) -> Self {
        Self::from_secret(settings.secret_key.as_bytes(), settings.algorithm, settings.token_ttl())
    }

    pub fn from_secret(secret: &[u8], algorithm: Algorithm, ttl: chrono::Duration) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        TokenService {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration { self.ttl }

    pub fn issue(&self, subject: &str, role: &str, user: Option<Value>) -> Result<String, TokenError> {
        self.issue_at(subject, role, user, Utc::now())
    }

    /// Issue as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, role: &str, user: Option<Value>, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            role: Some(role.to_string()),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            user,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with the process key.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let token = encode(&Header::new(self.algorithm), claims, &self.encoding)?;
        tprintln!("token.issue sub={} role={:?} exp={}", claims.sub, claims.role, claims.exp);
        Ok(token)
    }

    /// Check signature, algorithm and expiry. Every failure is
    /// `InvalidCredential`; the reason is not exposed.
    pub fn verify(&self, token: &str) -> Result<Claims, AccessError> {
        let data = decode::<Claims>(token.trim(), &self.decoding, &self.validation).map_err(|e| {
            tprintln!("token.verify rejected: {}", e);
            AccessError::InvalidCredential
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AccessError::InvalidCredential);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod token_tests;
