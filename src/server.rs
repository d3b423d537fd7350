//!
//! bamn HTTP server
//! ----------------
//! Axum-based HTTP API for the mentor directory.
//!
//! Responsibilities:
//! - Stateless bearer authentication: every request verifies its own token
//!   and re-reads the repository through the `identity` access controller.
//! - Public directory search, tag suggestions and map points (approved rows only).
//! - Mentor self-service (own profile read and edit) behind the moderation gate.
//! - Admin moderation endpoints (list, approve, reject).
//! - Registration and login for password and OAuth mentors.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::directory::{FileRepository, MentorRepository};
use crate::identity::{AccessController, LoginService, TokenService};
use crate::security;

pub mod extract;
pub mod handlers;

/// Shared server state injected into all handlers.
///
/// Everything here is immutable or internally synchronized; there is no
/// per-session state.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub repo: Arc<dyn MentorRepository>,
    pub access: AccessController,
    pub logins: LoginService,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, repo: Arc<dyn MentorRepository>) -> Self {
        let tokens = Arc::new(TokenService::new(&settings));
        AppState {
            access: AccessController::new(tokens.clone(), repo.clone()),
            logins: LoginService::new(repo.clone(), tokens),
            settings,
            repo,
        }
    }
}

/// Build the full router (API routes under the configured prefix, plus
/// `/health`).
pub fn router(state: AppState) -> Router {
    use handlers::{admin, auth, mentors};

    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/oauth/register", post(auth::register_oauth))
        .route("/auth/oauth/google/login", post(auth::google_login))
        .route("/auth/oauth/orcid/login", post(auth::orcid_login))
        .route("/mentors", get(mentors::search))
        .route("/mentors/tags/suggest", get(mentors::suggest_tags))
        .route("/mentors/globe", get(mentors::globe))
        .route("/mentors/me", get(mentors::own_profile).put(mentors::update_own_profile))
        .route("/mentors/{mentor_id}", get(mentors::get_mentor))
        .route("/admin/mentors", get(admin::list_mentors))
        .route("/admin/mentors/pending", get(admin::list_pending))
        .route("/admin/mentors/{mentor_id}/approve", put(admin::approve))
        .route("/admin/mentors/{mentor_id}/reject", put(admin::reject));

    let cors = cors_layer(&state.settings.cors_origins);
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest(&state.settings.api_prefix, api)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(target: "startup", origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return CorsLayer::new();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

/// Failed API requests are always logged; successful ones only in debug mode.
async fn log_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    if !path.starts_with(&state.settings.api_prefix) {
        return resp;
    }
    let status = resp.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status >= 400 {
        warn!(target: "bamn::http", %method, %path, status, elapsed_ms, "request failed");
    } else if state.settings.debug {
        info!(target: "bamn::http", %method, %path, status, elapsed_ms, "request");
    }
    resp
}

/// Start the bamn HTTP server.
///
/// Opens the repository snapshot, seeds the configured admin account when
/// one is set and absent, then serves until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let settings = Arc::new(settings);
    info!(target: "startup", "{} starting: environment={}, data_file={}, api_prefix={}", settings.project_name, settings.environment, settings.data_file.display(), settings.api_prefix);

    let repo = FileRepository::open(&settings.data_file).with_context(|| format!("While opening repository {}", settings.data_file.display()))?;
    let repo: Arc<dyn MentorRepository> = Arc::new(repo);
    if let (Some(email), Some(password)) = (&settings.admin_email, &settings.admin_password) {
        security::ensure_default_admin(repo.as_ref(), email, "Administrator", password)
            .await
            .with_context(|| format!("While ensuring default admin {}", email))?;
    }

    let app = router(AppState::new(settings.clone(), repo));

    let addr: SocketAddr = format!("0.0.0.0:{}", settings.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(target: "startup", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
