use crate::directory::MentorProfile;
use crate::error::AccessError;

/// Protected mentor operations require a vetted account.
pub fn authorize(profile: &MentorProfile) -> Result<(), AccessError> {
    if profile.is_approved() { Ok(()) } else { Err(AccessError::NotApproved) }
}
