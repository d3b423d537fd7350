use std::collections::HashMap;

use chrono::Duration;
use jsonwebtoken::Algorithm;

use super::*;
use crate::directory::test_support::new_mentor;
use crate::directory::{self, FileRepository};
use crate::moderation;

/// Accepts only tokens it was told about, like a provider's token endpoint.
struct KnownTokens(HashMap<String, String>);

#[async_trait]
impl ProviderVerifier for KnownTokens {
    async fn subject(&self, provider: AuthProvider, token: &str) -> Result<String, LoginError> {
        self.0.get(token).cloned().ok_or(LoginError::ProviderToken(provider))
    }
}

async fn service_with_approved_google_mentor() -> (LoginService, Arc<TokenService>, MentorProfile) {
    let repo = Arc::new(FileRepository::in_memory());
    let tokens = Arc::new(TokenService::from_secret(b"login-tests", Algorithm::HS256, Duration::minutes(5)));
    let m = directory::register_oauth(repo.as_ref(), new_mentor("g@example.org"), AuthProvider::Google, Some("google-sub-1".into()), None).await.unwrap();
    let m = moderation::approve(repo.as_ref(), &m.id()).await.unwrap();
    (LoginService::new(repo, tokens.clone()), tokens, m)
}

#[tokio::test]
async fn default_verifier_takes_the_subject_as_given() {
    let (logins, tokens, m) = service_with_approved_google_mentor().await;
    let resp = logins.login_oauth(AuthProvider::Google, " google-sub-1 ").await.unwrap();
    assert_eq!(tokens.verify(&resp.access_token).unwrap().sub, m.id().to_string());
    assert!(matches!(logins.login_oauth(AuthProvider::Google, "  ").await, Err(LoginError::ProviderToken(AuthProvider::Google))));
}

#[tokio::test]
async fn custom_verifier_maps_tokens_to_subjects() {
    let (logins, tokens, m) = service_with_approved_google_mentor().await;
    let known = KnownTokens(HashMap::from([("id-token-abc".to_string(), "google-sub-1".to_string())]));
    let logins = logins.with_verifier(Arc::new(known));

    let resp = logins.login_oauth(AuthProvider::Google, "id-token-abc").await.unwrap();
    assert_eq!(tokens.verify(&resp.access_token).unwrap().sub, m.id().to_string());

    // The raw subject is no longer accepted as a credential.
    assert!(matches!(logins.login_oauth(AuthProvider::Google, "google-sub-1").await, Err(LoginError::ProviderToken(AuthProvider::Google))));
}

#[tokio::test]
async fn email_is_not_an_oauth_provider() {
    let (logins, _, _) = service_with_approved_google_mentor().await;
    assert!(matches!(logins.login_oauth(AuthProvider::Email, "google-sub-1").await, Err(LoginError::NotRegistered(AuthProvider::Email))));
}
