use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;

use crate::directory::{self, AuthProvider, MentorResponse, NewMentor};
use crate::error::AppResult;
use crate::identity::{LoginRequest, LoginResponse};
use crate::server::AppState;

/// OAuth2 password-grant style form: `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Json<LoginResponse>> {
    let req = LoginRequest { username: form.username, password: form.password };
    Ok(Json(state.logins.login_password(&req).await?))
}

#[derive(Debug, Deserialize)]
pub struct PasswordRegistration {
    #[serde(flatten)]
    pub profile: NewMentor,
    pub password: String,
}

pub async fn register(State(state): State<AppState>, Json(body): Json<PasswordRegistration>) -> AppResult<(StatusCode, Json<MentorResponse>)> {
    let created = directory::register_password(state.repo.as_ref(), body.profile, &body.password).await?;
    Ok((StatusCode::CREATED, Json(MentorResponse::from(&created))))
}

#[derive(Debug, Deserialize)]
pub struct OAuthRegistration {
    #[serde(flatten)]
    pub profile: NewMentor,
    pub auth_provider: AuthProvider,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub orcid_id: Option<String>,
}

pub async fn register_oauth(State(state): State<AppState>, Json(body): Json<OAuthRegistration>) -> AppResult<(StatusCode, Json<MentorResponse>)> {
    let created = directory::register_oauth(state.repo.as_ref(), body.profile, body.auth_provider, body.google_id, body.orcid_id).await?;
    Ok((StatusCode::CREATED, Json(MentorResponse::from(&created))))
}

#[derive(Debug, Deserialize)]
pub struct GoogleLogin {
    pub google_token: String,
}

#[derive(Debug, Deserialize)]
pub struct OrcidLogin {
    pub orcid_token: String,
}

pub async fn google_login(State(state): State<AppState>, Json(body): Json<GoogleLogin>) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.logins.login_oauth(AuthProvider::Google, &body.google_token).await?))
}

pub async fn orcid_login(State(state): State<AppState>, Json(body): Json<OrcidLogin>) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.logins.login_oauth(AuthProvider::Orcid, &body.orcid_token).await?))
}
