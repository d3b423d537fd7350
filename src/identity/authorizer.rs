//! Per-request access decisions: bearer string in, authorized principal (or
//! a typed refusal) out. Verification, resolution and the moderation gate
//! run in that order, each exactly once.

use std::sync::Arc;

use super::gate;
use super::principal::{Principal, RequiredKind};
use super::resolver::{anonymous_on, IdentityResolver};
use super::token::{Claims, TokenService};
use crate::directory::{AdminAccount, MentorProfile, MentorRepository};
use crate::error::AccessError;

#[derive(Clone)]
pub struct AccessController {
    tokens: Arc<TokenService>,
    resolver: IdentityResolver,
}

impl AccessController {
    pub fn new(tokens: Arc<TokenService>, repo: Arc<dyn MentorRepository>) -> Self {
        AccessController { tokens, resolver: IdentityResolver::new(repo) }
    }

    /// A missing bearer is treated like an unverifiable one.
    fn verify(&self, bearer: Option<&str>) -> Result<Claims, AccessError> {
        let token = bearer.ok_or(AccessError::InvalidCredential)?;
        self.tokens.verify(token)
    }

    /// Mentor identity without the moderation gate: 401 then 404.
    pub async fn require_mentor(&self, bearer: Option<&str>) -> Result<MentorProfile, AccessError> {
        let claims = self.verify(bearer)?;
        self.resolver.resolve_mentor(&claims).await
    }

    /// Approved mentor: 401, then 404, then 403.
    pub async fn require_approved_mentor(&self, bearer: Option<&str>) -> Result<MentorProfile, AccessError> {
        let mentor = self.require_mentor(bearer).await?;
        gate::authorize(&mentor)?;
        Ok(mentor)
    }

    /// Every admin-path failure, including a bad or missing credential, is
    /// the same `NotAdmin`.
    pub async fn require_admin(&self, bearer: Option<&str>) -> Result<AdminAccount, AccessError> {
        let claims = self.verify(bearer).map_err(|_| AccessError::NotAdmin)?;
        self.resolver.resolve_admin(&claims).await
    }

    /// Optional authentication. Credential and resolution failures yield
    /// `None`; only infrastructure errors surface.
    pub async fn try_resolve(&self, bearer: Option<&str>) -> Result<Option<Principal>, AccessError> {
        let claims = match self.verify(bearer) {
            Ok(c) => c,
            Err(e) => return anonymous_on(e),
        };
        self.resolver.resolve(&claims, RequiredKind::Any).await
    }

    pub async fn optional_mentor(&self, bearer: Option<&str>) -> Result<Option<MentorProfile>, AccessError> {
        Ok(self.try_resolve(bearer).await?.and_then(Principal::into_mentor))
    }
}
