use super::*;
use crate::directory::{AuthProvider, MentorId};

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
    assert_eq!(AppError::validation("validation_error", "too short").http_status(), 422);
    assert_eq!(AppError::not_found("not_found", "missing").http_status(), 404);
    assert_eq!(AppError::conflict("conflict", "dup").http_status(), 409);
    assert_eq!(AppError::auth("auth", "no").http_status(), 401);
    assert_eq!(AppError::forbidden("forbidden", "blocked").http_status(), 403);
    assert_eq!(AppError::io("io", "io").http_status(), 503);
    assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
}

#[test]
fn access_error_statuses() {
    assert_eq!(AppError::from(AccessError::InvalidCredential).http_status(), 401);
    assert_eq!(AppError::from(AccessError::NotFound).http_status(), 404);
    assert_eq!(AppError::from(AccessError::NotApproved).http_status(), 403);
    assert_eq!(AppError::from(AccessError::NotAdmin).http_status(), 403);
    let infra = AccessError::Repository(RepositoryError::Persistence("disk full".into()));
    assert_eq!(AppError::from(infra).http_status(), 500);
}

#[test]
fn infrastructure_detail_is_not_leaked() {
    let err = AppError::from(RepositoryError::Persistence("/var/lib/bamn.json: permission denied".into()));
    assert_eq!(err.message(), "Internal server error");
    assert!(!err.to_string().contains("permission denied"));
}

#[test]
fn repository_error_statuses() {
    let dup = AppError::from(RepositoryError::DuplicateEmail);
    assert_eq!(dup.http_status(), 400);
    assert_eq!(dup.message(), "Email already registered");
    assert_eq!(AppError::from(RepositoryError::DuplicateProviderId(AuthProvider::Google)).http_status(), 400);
    assert_eq!(AppError::from(RepositoryError::VersionConflict(MentorId::generate())).http_status(), 409);
}

#[tokio::test]
async fn unauthorized_response_carries_bearer_challenge() {
    let resp = AppError::from(AccessError::InvalidCredential).into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()), Some("Bearer"));

    let forbidden = AppError::from(AccessError::NotAdmin).into_response();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert!(forbidden.headers().get(header::WWW_AUTHENTICATE).is_none());

    let body = axum::body::to_bytes(forbidden.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["code"], "not_admin");
    assert!(v["detail"].is_string());
}
