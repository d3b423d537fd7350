//! Moderation workflow for mentor profiles.
//! -----------------------------------------
//! A profile is always in exactly one of `Pending`, `Approved` or `Rejected`.
//! Only two paths move it: an admin decision (`approve` / `reject`) and the
//! mentor's own profile edit (`apply_self_edit`). Both go through
//! `next_status`, which is the single transition table for the system.
//!
//! Self-edit policy: every substantive edit sends the profile back to
//! `Pending` for re-review. A self-edit can never produce `Approved` or
//! `Rejected`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::directory::{MentorId, MentorProfile, MentorRepository, ProfileUpdate, RepositoryError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    pub fn is_approved(&self) -> bool { matches!(self, ModerationStatus::Approved) }
}

impl Display for ModerationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(format!("unknown moderation status '{}'", other)),
        }
    }
}

/// Status every newly registered profile starts in, whatever its auth method.
pub const INITIAL_STATUS: ModerationStatus = ModerationStatus::Pending;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationEvent {
    /// Admin approval; legal from any state.
    Approve,
    /// Admin rejection; legal from any state.
    Reject,
    /// The mentor changed their own profile fields.
    SelfEdit,
}

/// Transition table.
pub fn next_status(from: ModerationStatus, event: ModerationEvent) -> ModerationStatus {
    let to = match event {
        ModerationEvent::Approve => ModerationStatus::Approved,
        ModerationEvent::Reject => ModerationStatus::Rejected,
        ModerationEvent::SelfEdit => ModerationStatus::Pending,
    };
    debug!(from = %from, to = %to, event = ?event, "moderation.transition");
    to
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("mentor not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Admin approval. Re-approving an approved profile still commits (and bumps
/// `updated_at`).
pub async fn approve(repo: &dyn MentorRepository, id: &MentorId) -> Result<MentorProfile, ModerationError> {
    admin_transition(repo, id, ModerationEvent::Approve).await
}

/// Admin rejection. Same commit semantics as `approve`.
pub async fn reject(repo: &dyn MentorRepository, id: &MentorId) -> Result<MentorProfile, ModerationError> {
    admin_transition(repo, id, ModerationEvent::Reject).await
}

/// An admin decision is an absolute set, so a row that moved between read and
/// save (a concurrent self-edit) is re-read and the decision applied once more.
async fn admin_transition(repo: &dyn MentorRepository, id: &MentorId, event: ModerationEvent) -> Result<MentorProfile, ModerationError> {
    match try_admin_transition(repo, id, event).await {
        Err(ModerationError::Repository(RepositoryError::VersionConflict(_))) => {
            debug!(mentor_id = %id, event = ?event, "moderation.admin_transition retry after version conflict");
            try_admin_transition(repo, id, event).await
        }
        other => other,
    }
}

async fn try_admin_transition(repo: &dyn MentorRepository, id: &MentorId, event: ModerationEvent) -> Result<MentorProfile, ModerationError> {
    let Some(mut profile) = repo.find_mentor_by_id(id).await? else {
        return Err(ModerationError::NotFound);
    };
    let from = profile.moderation_status();
    profile.set_moderation_status(next_status(from, event));
    let saved = match repo.save_mentor(profile).await {
        Err(RepositoryError::MissingMentor(_)) => return Err(ModerationError::NotFound),
        other => other?,
    };
    info!(mentor_id = %saved.id(), from = %from, to = %saved.moderation_status(), "moderation.admin_transition");
    Ok(saved)
}

/// Apply a mentor's edit of their own profile.
///
/// `current` is the row read when the caller was resolved; its revision is
/// what the repository checks on save, so an admin decision committed in the
/// meantime surfaces as `RepositoryError::VersionConflict` instead of being
/// overwritten. Field changes and the status change commit together.
pub async fn apply_self_edit(repo: &dyn MentorRepository, current: MentorProfile, update: ProfileUpdate) -> Result<MentorProfile, ModerationError> {
    update.validate()?;
    if update.is_empty() {
        return Ok(current);
    }
    let mut edited = current;
    let from = edited.moderation_status();
    edited.apply_update(update);
    edited.set_moderation_status(next_status(from, ModerationEvent::SelfEdit));
    let saved = repo.save_mentor(edited).await?;
    info!(mentor_id = %saved.id(), email = %saved.email(), from = %from, to = %saved.moderation_status(), "updated mentor");
    Ok(saved)
}

#[cfg(test)]
#[path = "moderation_tests.rs"]
mod moderation_tests;
