use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moderation::{ModerationStatus, INITIAL_STATUS};

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self { $name(Uuid::new_v4()) }
            pub fn as_uuid(&self) -> &Uuid { &self.0 }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
        }

        impl FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::parse_str(s.trim()).map($name) }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self { $name(u) }
        }
    };
}

uuid_id!(MentorId);
uuid_id!(AdminId);

/// Wire label of an authentication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
    Orcid,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
            AuthProvider::Orcid => "orcid",
        }
    }

    /// Human label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            AuthProvider::Email => "Email",
            AuthProvider::Google => "Google",
            AuthProvider::Orcid => "ORCID",
        }
    }
}

impl Display for AuthProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// How a mentor signs in. Each method carries exactly its own credential, so a
/// password hash and an OAuth subject can never coexist on one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum AuthMethod {
    #[serde(rename = "email")]
    Password { password_hash: String },
    Google { google_id: String },
    Orcid { orcid_id: String },
}

impl AuthMethod {
    pub fn provider(&self) -> AuthProvider {
        match self {
            AuthMethod::Password { .. } => AuthProvider::Email,
            AuthMethod::Google { .. } => AuthProvider::Google,
            AuthMethod::Orcid { .. } => AuthProvider::Orcid,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match self {
            AuthMethod::Password { password_hash } => Some(password_hash.as_str()),
            _ => None,
        }
    }

    /// External subject for OAuth methods.
    pub fn provider_id(&self) -> Option<&str> {
        match self {
            AuthMethod::Google { google_id } => Some(google_id.as_str()),
            AuthMethod::Orcid { orcid_id } => Some(orcid_id.as_str()),
            AuthMethod::Password { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self { ValidationError { field, message: message.into() } }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String { email.trim().to_ascii_lowercase() }

fn check_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) { Ok(()) } else { Err(ValidationError::new("email", "value is not a valid email address")) }
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let n = value.trim().chars().count();
    if n < min {
        return Err(ValidationError::new(field, format!("must be at least {} characters", min)));
    }
    if n > max {
        return Err(ValidationError::new(field, format!("must be at most {} characters", max)));
    }
    Ok(())
}

fn check_max(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> { check_len(field, value, 0, max) }

fn check_list(field: &'static str, items: &[String], min_items: usize, max_items: Option<usize>, min: usize, max: usize) -> Result<(), ValidationError> {
    if items.len() < min_items {
        return Err(ValidationError::new(field, format!("must contain at least {} item(s)", min_items)));
    }
    if let Some(cap) = max_items {
        if items.len() > cap {
            return Err(ValidationError::new(field, format!("must contain at most {} items", cap)));
        }
    }
    for item in items {
        check_len(field, item, min, max)?;
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (lo..=hi).contains(&value) { Ok(()) } else { Err(ValidationError::new(field, format!("must be between {} and {}", lo, hi))) }
}

/// Profile attributes supplied at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMentor {
    pub email: String,
    pub full_name: String,
    pub current_role: String,
    pub institution: String,
    pub department: String,
    pub degrees: Vec<String>,
    pub research_interests: Vec<String>,
    pub continent: String,
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl NewMentor {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_email(&self.email)?;
        check_len("full_name", &self.full_name, 3, 100)?;
        check_len("current_role", &self.current_role, 2, 100)?;
        check_len("institution", &self.institution, 2, 200)?;
        check_len("department", &self.department, 2, 200)?;
        check_list("degrees", &self.degrees, 1, None, 2, 200)?;
        check_list("research_interests", &self.research_interests, 1, Some(10), 2, 100)?;
        check_len("continent", &self.continent, 2, 50)?;
        check_len("country", &self.country, 2, 100)?;
        check_len("city", &self.city, 2, 100)?;
        check_range("latitude", self.latitude, -90.0, 90.0)?;
        check_range("longitude", self.longitude, -180.0, 180.0)?;
        if let Some(url) = &self.linkedin_url {
            check_max("linkedin_url", url, 200)?;
        }
        if let Some(url) = &self.profile_picture_url {
            check_max("profile_picture_url", url, 500)?;
        }
        Ok(())
    }
}

/// Present-but-null decodes to `Some(None)`; an absent key stays `None` via
/// `#[serde(default)]`.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Partial self-service edit. `None` leaves the field as it is. The two
/// optional links are double options: `"linkedin_url": null` clears the link.
/// Email, auth method and moderation status are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub current_role: Option<String>,
    pub institution: Option<String>,
    pub department: Option<String>,
    pub degrees: Option<Vec<String>>,
    pub research_interests: Option<Vec<String>>,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool { *self == ProfileUpdate::default() }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(v) = &self.full_name { check_len("full_name", v, 3, 100)?; }
        if let Some(v) = &self.current_role { check_len("current_role", v, 2, 100)?; }
        if let Some(v) = &self.institution { check_len("institution", v, 2, 200)?; }
        if let Some(v) = &self.department { check_len("department", v, 2, 200)?; }
        if let Some(v) = &self.degrees { check_list("degrees", v, 1, None, 2, 200)?; }
        if let Some(v) = &self.research_interests { check_list("research_interests", v, 1, Some(10), 2, 100)?; }
        if let Some(v) = &self.continent { check_len("continent", v, 2, 50)?; }
        if let Some(v) = &self.country { check_len("country", v, 2, 100)?; }
        if let Some(v) = &self.city { check_len("city", v, 2, 100)?; }
        if let Some(v) = self.latitude { check_range("latitude", v, -90.0, 90.0)?; }
        if let Some(v) = self.longitude { check_range("longitude", v, -180.0, 180.0)?; }
        if let Some(Some(v)) = &self.linkedin_url { check_max("linkedin_url", v, 200)?; }
        if let Some(Some(v)) = &self.profile_picture_url { check_max("profile_picture_url", v, 500)?; }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorProfile {
    id: MentorId,
    email: String,
    auth: AuthMethod,
    pub full_name: String,
    pub current_role: String,
    pub institution: String,
    pub department: String,
    pub degrees: Vec<String>,
    pub research_interests: Vec<String>,
    pub continent: String,
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub linkedin_url: Option<String>,
    pub profile_picture_url: Option<String>,
    moderation_status: ModerationStatus,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    version: u64,
}

impl MentorProfile {
    /// Build a not-yet-stored profile. It always starts in the initial
    /// moderation status.
    pub fn register(new: NewMentor, auth: AuthMethod, now: DateTime<Utc>) -> Self {
        MentorProfile {
            id: MentorId::generate(),
            email: normalize_email(&new.email),
            auth,
            full_name: new.full_name.trim().to_string(),
            current_role: new.current_role,
            institution: new.institution,
            department: new.department,
            degrees: new.degrees,
            research_interests: new.research_interests,
            continent: new.continent,
            country: new.country,
            city: new.city,
            latitude: new.latitude,
            longitude: new.longitude,
            linkedin_url: new.linkedin_url,
            profile_picture_url: new.profile_picture_url,
            moderation_status: INITIAL_STATUS,
            created_at: now,
            updated_at: None,
            version: 0,
        }
    }

    pub fn id(&self) -> MentorId { self.id }
    pub fn email(&self) -> &str { &self.email }
    pub fn auth(&self) -> &AuthMethod { &self.auth }
    pub fn auth_provider(&self) -> AuthProvider { self.auth.provider() }
    pub fn moderation_status(&self) -> ModerationStatus { self.moderation_status }
    pub fn is_approved(&self) -> bool { self.moderation_status.is_approved() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }

    /// Revision the row was read at; repositories compare it on save.
    pub fn version(&self) -> u64 { self.version }

    pub(crate) fn set_moderation_status(&mut self, status: ModerationStatus) { self.moderation_status = status; }

    pub(crate) fn apply_update(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            full_name,
            current_role,
            institution,
            department,
            degrees,
            research_interests,
            continent,
            country,
            city,
            latitude,
            longitude,
            linkedin_url,
            profile_picture_url,
        } = update;
        if let Some(v) = full_name { self.full_name = v.trim().to_string(); }
        if let Some(v) = current_role { self.current_role = v; }
        if let Some(v) = institution { self.institution = v; }
        if let Some(v) = department { self.department = v; }
        if let Some(v) = degrees { self.degrees = v; }
        if let Some(v) = research_interests { self.research_interests = v; }
        if let Some(v) = continent { self.continent = v; }
        if let Some(v) = country { self.country = v; }
        if let Some(v) = city { self.city = v; }
        if let Some(v) = latitude { self.latitude = v; }
        if let Some(v) = longitude { self.longitude = v; }
        if let Some(v) = linkedin_url { self.linkedin_url = v; }
        if let Some(v) = profile_picture_url { self.profile_picture_url = v; }
    }

    /// Mark a committed write. Called by repositories inside their write
    /// critical section; `updated_at` is left unset for the initial insert.
    pub fn stamp_revision(&mut self, updated_at: Option<DateTime<Utc>>) {
        self.version += 1;
        if updated_at.is_some() {
            self.updated_at = updated_at;
        }
    }
}

pub const ADMIN_ROLE: &str = "admin";

/// Operator account, provisioned out of band. Its id space never overlaps
/// mentor ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    id: AdminId,
    email: String,
    pub full_name: String,
    password_hash: String,
    role: String,
}

impl AdminAccount {
    pub fn new(email: &str, full_name: &str, password_hash: String) -> Self {
        AdminAccount {
            id: AdminId::generate(),
            email: normalize_email(email),
            full_name: full_name.trim().to_string(),
            password_hash,
            role: ADMIN_ROLE.to_string(),
        }
    }

    pub fn id(&self) -> AdminId { self.id }
    pub fn email(&self) -> &str { &self.email }
    pub fn password_hash(&self) -> &str { &self.password_hash }
    pub fn role(&self) -> &str { &self.role }
    pub fn is_admin(&self) -> bool { self.role == ADMIN_ROLE }
}

/// Public view of a profile. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorResponse {
    pub id: MentorId,
    pub email: String,
    pub full_name: String,
    pub current_role: String,
    pub institution: String,
    pub department: String,
    pub degrees: Vec<String>,
    pub research_interests: Vec<String>,
    pub continent: String,
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub linkedin_url: Option<String>,
    pub profile_picture_url: Option<String>,
    pub auth_provider: AuthProvider,
    pub moderation_status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&MentorProfile> for MentorResponse {
    fn from(p: &MentorProfile) -> Self {
        MentorResponse {
            id: p.id,
            email: p.email.clone(),
            full_name: p.full_name.clone(),
            current_role: p.current_role.clone(),
            institution: p.institution.clone(),
            department: p.department.clone(),
            degrees: p.degrees.clone(),
            research_interests: p.research_interests.clone(),
            continent: p.continent.clone(),
            country: p.country.clone(),
            city: p.city.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            linkedin_url: p.linkedin_url.clone(),
            profile_picture_url: p.profile_picture_url.clone(),
            auth_provider: p.auth_provider(),
            moderation_status: p.moderation_status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Minimal point for the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobePoint {
    pub id: MentorId,
    pub full_name: String,
    pub research_interests: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&MentorProfile> for GlobePoint {
    fn from(p: &MentorProfile) -> Self {
        GlobePoint {
            id: p.id,
            full_name: p.full_name.clone(),
            research_interests: p.research_interests.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}
