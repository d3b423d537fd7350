//! Turns verified claims into a concrete principal. Every call re-reads the
//! repository; nothing is cached between requests.

use std::sync::Arc;

use tracing::debug;

use super::principal::{Principal, RequiredKind};
use super::token::Claims;
use crate::directory::{AdminAccount, AdminId, MentorId, MentorProfile, MentorRepository, ADMIN_ROLE};
use crate::error::AccessError;

#[derive(Clone)]
pub struct IdentityResolver {
    repo: Arc<dyn MentorRepository>,
}

impl IdentityResolver {
    pub fn new(repo: Arc<dyn MentorRepository>) -> Self { IdentityResolver { repo } }

    /// Resolve `claims` as `kind`. `Ok(None)` is only ever returned for
    /// `RequiredKind::Any`, meaning "anonymous".
    pub async fn resolve(&self, claims: &Claims, kind: RequiredKind) -> Result<Option<Principal>, AccessError> {
        match kind {
            RequiredKind::Admin => self.resolve_admin(claims).await.map(|a| Some(Principal::Admin(a))),
            RequiredKind::Mentor => self.resolve_mentor(claims).await.map(|m| Some(Principal::Mentor(m))),
            RequiredKind::Any => match self.resolve_mentor(claims).await {
                Ok(m) => Ok(Some(Principal::Mentor(m))),
                Err(e) => anonymous_on(e),
            },
        }
    }

    /// Role tag and an admin row are both required. Every miss is `NotAdmin`.
    pub async fn resolve_admin(&self, claims: &Claims) -> Result<AdminAccount, AccessError> {
        if claims.role.as_deref() != Some(ADMIN_ROLE) {
            return Err(AccessError::NotAdmin);
        }
        let Ok(id) = claims.sub.parse::<AdminId>() else {
            return Err(AccessError::NotAdmin);
        };
        match self.repo.find_admin_by_id(&id).await? {
            Some(admin) if admin.is_admin() => Ok(admin),
            _ => {
                debug!(subject = %claims.sub, "admin resolution denied");
                Err(AccessError::NotAdmin)
            }
        }
    }

    pub async fn resolve_mentor(&self, claims: &Claims) -> Result<MentorProfile, AccessError> {
        let id: MentorId = claims.sub.parse().map_err(|_| AccessError::InvalidCredential)?;
        self.repo.find_mentor_by_id(&id).await?.ok_or(AccessError::NotFound)
    }
}

/// Optional-auth failure policy. The four access kinds become "anonymous";
/// infrastructure failures still propagate.
pub(crate) fn anonymous_on(err: AccessError) -> Result<Option<Principal>, AccessError> {
    match err {
        AccessError::InvalidCredential | AccessError::NotFound | AccessError::NotApproved | AccessError::NotAdmin => Ok(None),
        AccessError::Repository(e) => Err(AccessError::Repository(e)),
    }
}
