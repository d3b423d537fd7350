//! Storage contract for mentor profiles and admin accounts.

use async_trait::async_trait;

use super::model::{AdminAccount, AdminId, AuthProvider, MentorId, MentorProfile};
use super::search::{Page, PageRequest, SearchFilters};
use crate::moderation::ModerationStatus;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{} account already registered", .0.label())]
    DuplicateProviderId(AuthProvider),
    #[error("identifier {0} already belongs to another account")]
    IdentityCollision(String),
    #[error("mentor {0} was modified concurrently")]
    VersionConflict(MentorId),
    #[error("mentor {0} does not exist")]
    MissingMentor(MentorId),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// Every method operates with at least read-committed isolation: a reader
/// never sees a half-applied write, and writes to one row serialize.
#[async_trait]
pub trait MentorRepository: Send + Sync {
    /// Get a mentor by id
    async fn find_mentor_by_id(&self, id: &MentorId) -> RepositoryResult<Option<MentorProfile>>;

    /// Get a mentor by (normalized) email
    async fn find_mentor_by_email(&self, email: &str) -> RepositoryResult<Option<MentorProfile>>;

    /// Get a mentor by OAuth subject
    async fn find_mentor_by_provider_id(&self, provider: AuthProvider, provider_id: &str) -> RepositoryResult<Option<MentorProfile>>;

    /// Get an admin by id
    async fn find_admin_by_id(&self, id: &AdminId) -> RepositoryResult<Option<AdminAccount>>;

    /// Get an admin by (normalized) email
    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminAccount>>;

    /// Store a new profile. Rejects a duplicate email or OAuth subject.
    async fn insert_mentor(&self, profile: MentorProfile) -> RepositoryResult<MentorProfile>;

    /// Atomically replace an existing profile, bumping its revision and
    /// `updated_at`. Fails with `VersionConflict` if the stored revision is
    /// not the one `profile` was read at.
    async fn save_mentor(&self, profile: MentorProfile) -> RepositoryResult<MentorProfile>;

    /// Store a new admin account.
    async fn insert_admin(&self, admin: AdminAccount) -> RepositoryResult<AdminAccount>;

    /// All profiles, optionally restricted to one status, oldest first.
    async fn list_mentors(&self, status: Option<ModerationStatus>) -> RepositoryResult<Vec<MentorProfile>>;

    /// Filtered, paginated search over approved profiles only.
    async fn search_approved(&self, filters: &SearchFilters, page: PageRequest) -> RepositoryResult<Page<MentorProfile>>;

    /// Interest tag lists of every approved profile.
    async fn approved_research_interests(&self) -> RepositoryResult<Vec<Vec<String>>>;
}
