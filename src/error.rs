//! Unified application error model and mapping helpers.
//! Domain modules raise their own `thiserror` enums; the HTTP surface converts
//! them into `AppError`, which carries a stable machine code, a user-facing
//! message and a fixed HTTP status.
//!
//! `AccessError` is the request-authorization taxonomy shared by the
//! credential verifier, identity resolver, moderation gate and access
//! controller.

use std::fmt::{Display, Formatter};

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::directory::{RegistrationError, RepositoryError};
use crate::identity::{LoginError, TokenError};
use crate::moderation::ModerationError;

/// Why a request could not be attributed to an authorized principal.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Missing, malformed, badly signed or expired credential.
    #[error("could not validate credentials")]
    InvalidCredential,
    /// Structurally valid credential whose subject no longer exists.
    #[error("mentor not found")]
    NotFound,
    #[error("mentor profile not approved")]
    NotApproved,
    /// Admin check failed. Never distinguishes "no such admin" from "not an admin".
    #[error("admin access required")]
    NotAdmin,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone)]
pub enum AppError {
    UserInput { code: String, message: String },
    Validation { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn validation(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn not_found(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn auth(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn io(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Validation { .. } => 422,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Auth { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::Io { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }

    pub fn mentor_not_found() -> Self { AppError::not_found("mentor_not_found", "Mentor not found") }

    /// Generic 500; the cause is logged here and never returned to the client.
    fn infrastructure(cause: &dyn std::error::Error) -> Self {
        error!(target: "bamn::error", error = %cause, "infrastructure failure");
        AppError::internal("internal_error", "Internal server error")
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(target: "bamn::error", error = %err, "unhandled error");
        AppError::internal("internal_error", "Internal server error")
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::DuplicateEmail => AppError::user("email_taken", "Email already registered"),
            RepositoryError::DuplicateProviderId(_) => AppError::user("provider_id_taken", err.to_string()),
            RepositoryError::IdentityCollision(_) => AppError::conflict("identity_collision", err.to_string()),
            RepositoryError::VersionConflict(_) => {
                AppError::conflict("version_conflict", "Profile was modified concurrently; reload and retry")
            }
            RepositoryError::MissingMentor(_) => AppError::mentor_not_found(),
            RepositoryError::Persistence(_) => AppError::infrastructure(&err),
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidCredential => AppError::auth("invalid_credential", "Could not validate credentials"),
            AccessError::NotFound => AppError::mentor_not_found(),
            AccessError::NotApproved => AppError::forbidden("not_approved", "Mentor profile not approved"),
            AccessError::NotAdmin => AppError::forbidden("not_admin", "Not authorized to access admin resources"),
            AccessError::Repository(e) => e.into(),
        }
    }
}

impl From<ModerationError> for AppError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::NotFound => AppError::mentor_not_found(),
            ModerationError::Validation(e) => AppError::validation("validation_error", e.to_string()),
            ModerationError::Repository(e) => e.into(),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(e) => AppError::validation("validation_error", e.to_string()),
            RegistrationError::WeakPassword | RegistrationError::MissingProviderId => AppError::user("invalid_registration", err.to_string()),
            RegistrationError::Repository(e) => e.into(),
            RegistrationError::Hashing(_) => AppError::infrastructure(&err),
        }
    }
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials | LoginError::NotRegistered(_) | LoginError::ProviderToken(_) => AppError::auth("invalid_login", err.to_string()),
            LoginError::NotApproved => AppError::forbidden("not_approved", err.to_string()),
            LoginError::Token(e) => AppError::infrastructure(&e),
            LoginError::Repository(e) => e.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self { AppError::infrastructure(&err) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "detail": self.message(), "code": self.code_str() }));
        let mut resp = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            resp.headers_mut().insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
