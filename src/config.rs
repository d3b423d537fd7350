//!
//! bamn settings
//! -------------
//! Process-wide configuration, read once from the environment at startup and
//! shared as `Arc<Settings>`. Nothing mutates it afterwards. Binaries may
//! override a few values from the command line before the server starts.

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use jsonwebtoken::Algorithm;

pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_DATA_FILE: &str = "data/bamn.json";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
/// Seven days.
pub const DEFAULT_TOKEN_MINUTES: i64 = 60 * 24 * 7;

#[derive(Clone)]
pub struct Settings {
    pub project_name: String,
    pub environment: String,
    pub debug: bool,
    pub api_prefix: String,
    pub http_port: u16,
    pub data_file: PathBuf,
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub cors_origins: Vec<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("project_name", &self.project_name)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("api_prefix", &self.api_prefix)
            .field("http_port", &self.http_port)
            .field("data_file", &self.data_file)
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("cors_origins", &self.cors_origins)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self> {
        let var = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret_key = var("SECRET_KEY").ok_or_else(|| anyhow!("SECRET_KEY must be set to a non-empty value"))?;
        let algorithm = match var("ALGORITHM") {
            Some(a) => parse_algorithm(&a)?,
            None => Algorithm::HS256,
        };
        let access_token_expire_minutes = match var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v.parse::<i64>().with_context(|| format!("ACCESS_TOKEN_EXPIRE_MINUTES: invalid number '{}'", v))?,
            None => DEFAULT_TOKEN_MINUTES,
        };
        if access_token_expire_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }
        let http_port = match var("BAMN_HTTP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("BAMN_HTTP_PORT: invalid port '{}'", v))?,
            None => DEFAULT_HTTP_PORT,
        };
        let debug = match var("DEBUG") {
            Some(v) => parse_bool(&v).ok_or_else(|| anyhow!("DEBUG: expected a boolean, got '{}'", v))?,
            None => true,
        };
        let api_prefix = normalize_prefix(&var("API_V1_STR").unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()))?;
        let cors_origins = match var("BACKEND_CORS_ORIGINS") {
            Some(v) => parse_origins(&v)?,
            None => Vec::new(),
        };

        Ok(Settings {
            project_name: var("PROJECT_NAME").unwrap_or_else(|| "BAMN Mentor Directory".to_string()),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            debug,
            api_prefix,
            http_port,
            data_file: var("BAMN_DATA_FILE").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            secret_key,
            algorithm,
            access_token_expire_minutes,
            cors_origins,
            admin_email: var("ADMIN_EMAIL"),
            admin_password: var("ADMIN_PASSWORD"),
        })
    }

    /// Defaults with the given signing secret; everything else as if the
    /// environment were empty.
    pub fn with_secret(secret: &str) -> Self {
        Settings {
            project_name: "BAMN Mentor Directory".to_string(),
            environment: "development".to_string(),
            debug: true,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            secret_key: secret.to_string(),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: DEFAULT_TOKEN_MINUTES,
            cors_origins: Vec::new(),
            admin_email: None,
            admin_password: None,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration { chrono::Duration::minutes(self.access_token_expire_minutes) }
}

pub fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Only HMAC algorithms are accepted; the signing key is a shared secret.
pub fn parse_algorithm(v: &str) -> Result<Algorithm> {
    match v.trim().to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => bail!("ALGORITHM: unsupported '{}' (expected HS256, HS384 or HS512)", other),
    }
}

/// Either a JSON array of strings or a comma separated list.
pub fn parse_origins(v: &str) -> Result<Vec<String>> {
    let v = v.trim();
    let raw: Vec<String> = if v.starts_with('[') {
        serde_json::from_str(v).with_context(|| "BACKEND_CORS_ORIGINS: invalid JSON array")?
    } else {
        v.split(',').map(|s| s.to_string()).collect()
    };
    Ok(raw.into_iter().map(|s| s.trim().trim_end_matches('/').to_string()).filter(|s| !s.is_empty()).collect())
}

fn normalize_prefix(p: &str) -> Result<String> {
    let p = p.trim().trim_end_matches('/');
    if !p.starts_with('/') || p.len() < 2 {
        bail!("API_V1_STR must be a non-root path starting with '/', got '{}'", p);
    }
    Ok(p.to_string())
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

pub fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

pub fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    parse_value_arg(args, flag).and_then(|v| v.parse::<u16>().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
