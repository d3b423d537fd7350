use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::parse_mentor_id;
use crate::directory::MentorResponse;
use crate::error::AppResult;
use crate::moderation::{self, ModerationStatus};
use crate::server::extract::Admin;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<ModerationStatus>,
}

// `Admin` is extracted before the path so an unauthorized caller never
// learns whether an id exists.

pub async fn list_mentors(State(state): State<AppState>, Admin(_admin): Admin, Query(filter): Query<StatusFilter>) -> AppResult<Json<Vec<MentorResponse>>> {
    let rows = state.repo.list_mentors(filter.status).await?;
    Ok(Json(rows.iter().map(MentorResponse::from).collect()))
}

pub async fn list_pending(State(state): State<AppState>, Admin(_admin): Admin) -> AppResult<Json<Vec<MentorResponse>>> {
    let rows = state.repo.list_mentors(Some(ModerationStatus::Pending)).await?;
    Ok(Json(rows.iter().map(MentorResponse::from).collect()))
}

pub async fn approve(State(state): State<AppState>, Admin(admin): Admin, Path(mentor_id): Path<String>) -> AppResult<Json<MentorResponse>> {
    let id = parse_mentor_id(&mentor_id)?;
    let saved = moderation::approve(state.repo.as_ref(), &id).await?;
    info!(admin_id = %admin.id(), mentor_id = %id, "mentor approved");
    Ok(Json(MentorResponse::from(&saved)))
}

pub async fn reject(State(state): State<AppState>, Admin(admin): Admin, Path(mentor_id): Path<String>) -> AppResult<Json<MentorResponse>> {
    let id = parse_mentor_id(&mentor_id)?;
    let saved = moderation::reject(state.repo.as_ref(), &id).await?;
    info!(admin_id = %admin.id(), mentor_id = %id, "mentor rejected");
    Ok(Json(MentorResponse::from(&saved)))
}
