//! Mentor self-registration. Every new profile starts `Pending` (see
//! `MentorProfile::register`); nothing here can create an approved account.

use chrono::Utc;
use tracing::info;

use super::model::{AuthMethod, AuthProvider, MentorProfile, NewMentor, ValidationError};
use super::repository::{MentorRepository, RepositoryError};
use crate::security;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Password must be at least 8 characters long and contain at least one number and one special character")]
    WeakPassword,
    #[error("OAuth registration requires auth_provider 'google' or 'orcid' with the matching provider id")]
    MissingProviderId,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Email + password registration.
pub async fn register_password(repo: &dyn MentorRepository, new: NewMentor, password: &str) -> Result<MentorProfile, RegistrationError> {
    new.validate()?;
    if repo.find_mentor_by_email(&new.email).await?.is_some() {
        return Err(RepositoryError::DuplicateEmail.into());
    }
    if !security::meets_password_policy(password) {
        return Err(RegistrationError::WeakPassword);
    }
    let password_hash = security::hash_password(password).map_err(|e| RegistrationError::Hashing(e.to_string()))?;
    let profile = MentorProfile::register(new, AuthMethod::Password { password_hash }, Utc::now());
    let saved = repo.insert_mentor(profile).await?;
    info!(mentor_id = %saved.id(), "created mentor {}", saved.email());
    Ok(saved)
}

/// Registration through an external identity provider. The provider-side
/// token exchange happens before this call; only the resulting subject id is
/// recorded.
pub async fn register_oauth(
    repo: &dyn MentorRepository,
    new: NewMentor,
    provider: AuthProvider,
    google_id: Option<String>,
    orcid_id: Option<String>,
) -> Result<MentorProfile, RegistrationError> {
    new.validate()?;
    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let auth = match (provider, non_empty(google_id), non_empty(orcid_id)) {
        (AuthProvider::Google, Some(google_id), _) => AuthMethod::Google { google_id },
        (AuthProvider::Orcid, _, Some(orcid_id)) => AuthMethod::Orcid { orcid_id },
        _ => return Err(RegistrationError::MissingProviderId),
    };
    if repo.find_mentor_by_email(&new.email).await?.is_some() {
        return Err(RepositoryError::DuplicateEmail.into());
    }
    let profile = MentorProfile::register(new, auth, Utc::now());
    let saved = repo.insert_mentor(profile).await?;
    info!(mentor_id = %saved.id(), provider = %provider, "created mentor {}", saved.email());
    Ok(saved)
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod registration_tests;
