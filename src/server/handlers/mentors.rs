use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::parse_mentor_id;
use crate::directory::search::{self, DEFAULT_PAGE_SIZE, DEFAULT_SUGGEST_LIMIT, MAX_SUGGEST_LIMIT};
use crate::directory::{GlobePoint, MentorResponse, Page, PageRequest, ProfileUpdate, SearchFilters};
use crate::error::{AppError, AppResult};
use crate::moderation;
use crate::server::extract::{ApprovedMentor, MaybeMentor};
use crate::server::AppState;

fn parse_count(name: &str, raw: &str, min: usize) -> AppResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= min => Ok(n),
        _ => Err(AppError::validation("validation_error", format!("{}: must be an integer >= {}", name, min))),
    }
}

fn non_blank(v: String) -> Option<String> { Some(v).filter(|s| !s.trim().is_empty()) }

/// `research_interests` may repeat, so the query string is taken as pairs.
fn search_request(params: Vec<(String, String)>) -> AppResult<(SearchFilters, PageRequest)> {
    let mut filters = SearchFilters::default();
    let (mut page, mut page_size) = (1, DEFAULT_PAGE_SIZE);
    for (key, value) in params {
        match key.as_str() {
            "keyword" => filters.keyword = non_blank(value),
            "research_interests" => filters.research_interests.extend(non_blank(value)),
            "continent" => filters.continent = non_blank(value),
            "country" => filters.country = non_blank(value),
            "city" => filters.city = non_blank(value),
            "page" => page = parse_count("page", &value, 1)?,
            // Out-of-range sizes are clamped by `PageRequest::new`.
            "page_size" => page_size = parse_count("page_size", &value, 0)?,
            _ => {}
        }
    }
    Ok((filters, PageRequest::new(page, page_size)))
}

pub async fn search(State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>) -> AppResult<Json<Page<MentorResponse>>> {
    let (filters, page) = search_request(params)?;
    let found = state.repo.search_approved(&filters, page).await?;
    Ok(Json(found.map(|m| MentorResponse::from(&m))))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub prefix: String,
    #[serde(default = "default_suggest_limit")]
    pub limit: usize,
}

fn default_suggest_limit() -> usize { DEFAULT_SUGGEST_LIMIT }

pub async fn suggest_tags(State(state): State<AppState>, Query(q): Query<SuggestParams>) -> AppResult<Json<Vec<String>>> {
    if q.prefix.trim().is_empty() {
        return Err(AppError::validation("validation_error", "prefix: must not be empty"));
    }
    if q.limit > MAX_SUGGEST_LIMIT {
        return Err(AppError::validation("validation_error", format!("limit: must be at most {}", MAX_SUGGEST_LIMIT)));
    }
    let tag_lists = state.repo.approved_research_interests().await?;
    Ok(Json(search::suggest_tags(&tag_lists, &q.prefix, q.limit)))
}

pub async fn globe(State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>) -> AppResult<Json<Vec<GlobePoint>>> {
    let tags: Vec<String> = params.into_iter().filter(|(k, _)| k == "research_interests").filter_map(|(_, v)| non_blank(v)).collect();
    let filters = SearchFilters { research_interests: tags, ..Default::default() };
    let points = state
        .repo
        .list_mentors(Some(moderation::ModerationStatus::Approved))
        .await?
        .iter()
        .filter(|m| search::matches(m, &filters))
        .map(GlobePoint::from)
        .collect();
    Ok(Json(points))
}

pub async fn own_profile(ApprovedMentor(mentor): ApprovedMentor) -> Json<MentorResponse> { Json(MentorResponse::from(&mentor)) }

/// Self-service edit; a substantive change sends the profile back to review.
pub async fn update_own_profile(State(state): State<AppState>, ApprovedMentor(mentor): ApprovedMentor, Json(update): Json<ProfileUpdate>) -> AppResult<Json<MentorResponse>> {
    let saved = moderation::apply_self_edit(state.repo.as_ref(), mentor, update).await?;
    Ok(Json(MentorResponse::from(&saved)))
}

/// Approved profiles are public. The owner can also see their own profile in
/// any status; everyone else gets 404.
pub async fn get_mentor(State(state): State<AppState>, MaybeMentor(viewer): MaybeMentor, Path(mentor_id): Path<String>) -> AppResult<Json<MentorResponse>> {
    let id = parse_mentor_id(&mentor_id)?;
    let visible = state
        .repo
        .find_mentor_by_id(&id)
        .await?
        .filter(|p| p.is_approved() || viewer.as_ref().is_some_and(|v| v.id() == p.id()));
    match visible {
        Some(p) => Ok(Json(MentorResponse::from(&p))),
        None => Err(AppError::mentor_not_found()),
    }
}
