use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use tracing::info;

use crate::directory::{normalize_email, AdminAccount, MentorRepository};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

/// At least 8 characters with one digit and one non-alphanumeric character.
pub fn meets_password_policy(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// Provision an admin account unless one with this email already exists.
/// Returns whether an account was created.
pub async fn ensure_default_admin(repo: &dyn MentorRepository, email: &str, full_name: &str, password: &str) -> Result<bool> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(anyhow!("admin email and password must be non-empty"));
    }
    if repo.find_admin_by_email(&email).await?.is_some() {
        return Ok(false);
    }
    let hash = hash_password(password)?;
    let admin = repo.insert_admin(AdminAccount::new(&email, full_name, hash)).await?;
    info!(target: "startup", admin_id = %admin.id(), "created admin account {}", admin.email());
    Ok(true)
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod security_tests;
