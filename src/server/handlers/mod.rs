pub mod admin;
pub mod auth;
pub mod mentors;

use crate::directory::MentorId;
use crate::error::{AppError, AppResult};

/// Path ids that do not parse name no profile.
pub(crate) fn parse_mentor_id(raw: &str) -> AppResult<MentorId> {
    raw.parse::<MentorId>().map_err(|_| AppError::mentor_not_found())
}
