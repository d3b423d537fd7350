//! Request extractors that run the access controller before a handler body.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use super::AppState;
use crate::directory::{AdminAccount, MentorProfile};
use crate::error::AppError;

/// Token from `Authorization: Bearer <token>`. Anything else counts as absent.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// An approved mentor (401 / 404 / 403 otherwise).
pub struct ApprovedMentor(pub MentorProfile);

/// An admin (uniform 403 otherwise).
pub struct Admin(pub AdminAccount);

/// The calling mentor, if any. Never rejects on credential problems.
pub struct MaybeMentor(pub Option<MentorProfile>);

impl FromRequestParts<AppState> for ApprovedMentor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let mentor = state.access.require_approved_mentor(bearer_token(parts)).await?;
        Ok(ApprovedMentor(mentor))
    }
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let admin = state.access.require_admin(bearer_token(parts)).await?;
        Ok(Admin(admin))
    }
}

impl FromRequestParts<AppState> for MaybeMentor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let mentor = state.access.optional_mentor(bearer_token(parts)).await?;
        Ok(MaybeMentor(mentor))
    }
}
