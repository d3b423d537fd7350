use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::principal::MENTOR_ROLE;
use super::token::{TokenError, TokenService};
use crate::directory::{normalize_email, AuthProvider, MentorProfile, MentorRepository, MentorResponse, RepositoryError, ADMIN_ROLE};
use crate::security;
use crate::tprintln;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

impl LoginResponse {
    fn bearer(access_token: String) -> Self { LoginResponse { access_token, token_type: "bearer".to_string() } }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("{} account not registered", .0.label())]
    NotRegistered(AuthProvider),
    #[error("{} token could not be verified", .0.label())]
    ProviderToken(AuthProvider),
    #[error("Account not approved. Please wait for administrator verification.")]
    NotApproved,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Turns the token a client presents for an external provider into that
/// provider's subject id (Google `sub`, ORCID iD). Real deployments verify
/// the token with the provider here: issuer, audience and expiry for Google
/// ID tokens, the token exchange for ORCID.
#[async_trait]
pub trait ProviderVerifier: Send + Sync {
    async fn subject(&self, provider: AuthProvider, token: &str) -> Result<String, LoginError>;
}

/// Takes the presented value as the subject id unchecked. Only sound when a
/// gateway in front of the server has already verified it with the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedSubject;

#[async_trait]
impl ProviderVerifier for TrustedSubject {
    async fn subject(&self, provider: AuthProvider, token: &str) -> Result<String, LoginError> {
        let subject = token.trim();
        if subject.is_empty() {
            return Err(LoginError::ProviderToken(provider));
        }
        Ok(subject.to_string())
    }
}

/// Issues bearer credentials for admins and mentors.
#[derive(Clone)]
pub struct LoginService {
    repo: Arc<dyn MentorRepository>,
    tokens: Arc<TokenService>,
    verifier: Arc<dyn ProviderVerifier>,
}

impl LoginService {
    pub fn new(repo: Arc<dyn MentorRepository>, tokens: Arc<TokenService>) -> Self { LoginService { repo, tokens, verifier: Arc::new(TrustedSubject) } }

    /// Replace the external provider check used by `login_oauth`.
    pub fn with_verifier(mut self, verifier: Arc<dyn ProviderVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Email + password. Admin accounts are tried first; mentors must be
    /// password-registered and approved.
    pub async fn login_password(&self, req: &LoginRequest) -> Result<LoginResponse, LoginError> {
        let email = normalize_email(&req.username);
        if let Some(admin) = self.repo.find_admin_by_email(&email).await? {
            if admin.is_admin() && security::verify_password(admin.password_hash(), &req.password) {
                let snapshot = serde_json::json!({
                    "id": admin.id(),
                    "email": admin.email(),
                    "full_name": admin.full_name,
                    "role": ADMIN_ROLE,
                });
                let token = self.tokens.issue(&admin.id().to_string(), ADMIN_ROLE, Some(snapshot))?;
                info!(admin_id = %admin.id(), "admin login");
                return Ok(LoginResponse::bearer(token));
            }
        }

        let Some(mentor) = self.repo.find_mentor_by_email(&email).await? else {
            return Err(LoginError::InvalidCredentials);
        };
        let verified = mentor.auth().password_hash().is_some_and(|h| security::verify_password(h, &req.password));
        if !verified {
            return Err(LoginError::InvalidCredentials);
        }
        self.mentor_token(&mentor)
    }

    /// Login with an external provider token, resolved to a subject id by
    /// the configured `ProviderVerifier`.
    pub async fn login_oauth(&self, provider: AuthProvider, provider_token: &str) -> Result<LoginResponse, LoginError> {
        if provider == AuthProvider::Email {
            return Err(LoginError::NotRegistered(provider));
        }
        let subject = self.verifier.subject(provider, provider_token).await?;
        let Some(mentor) = self.repo.find_mentor_by_provider_id(provider, &subject).await? else {
            return Err(LoginError::NotRegistered(provider));
        };
        self.mentor_token(&mentor)
    }

    fn mentor_token(&self, mentor: &MentorProfile) -> Result<LoginResponse, LoginError> {
        if !mentor.is_approved() {
            tprintln!("auth.login mentor={} refused: status={}", mentor.id(), mentor.moderation_status());
            return Err(LoginError::NotApproved);
        }
        let mut snapshot = serde_json::to_value(MentorResponse::from(mentor)).unwrap_or_default();
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("role".to_string(), serde_json::Value::from(MENTOR_ROLE));
        }
        let token = self.tokens.issue(&mentor.id().to_string(), MENTOR_ROLE, Some(snapshot))?;
        info!(mentor_id = %mentor.id(), provider = %mentor.auth_provider(), "mentor login");
        Ok(LoginResponse::bearer(token))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
