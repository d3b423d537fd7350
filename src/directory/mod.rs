//! Mentor directory: profile model, storage contract, the shipped
//! file-backed repository, public search helpers and self-registration.

mod file;
mod model;
mod registration;
mod repository;
pub mod search;

pub use file::FileRepository;
pub use model::{
    normalize_email, AdminAccount, AdminId, AuthMethod, AuthProvider, GlobePoint, MentorId, MentorProfile, MentorResponse, NewMentor, ProfileUpdate,
    ValidationError, ADMIN_ROLE,
};
pub use registration::{register_oauth, register_password, RegistrationError};
pub use repository::{MentorRepository, RepositoryError, RepositoryResult};
pub use search::{Page, PageRequest, SearchFilters};

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
