//! bamn file-backed repository
//! ---------------------------
//! Keeps every row in memory behind a single `parking_lot::RwLock` and
//! rewrites a JSON snapshot after each successful mutation. The snapshot is
//! written to a sibling temp file and renamed over the old one while the
//! write lock is still held, so readers and the file never observe a
//! half-applied write. A failed write is rolled back in memory.
//!
//! The in-memory tables are the only copy the process trusts, so one data
//! file has exactly one owner: `open` takes a `<file>.lock` beside it and
//! holds it until the repository is dropped. A second process (the admin
//! tool against a live server, or a second server) is refused at open.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use super::model::{normalize_email, AdminAccount, AdminId, AuthProvider, MentorId, MentorProfile};
use super::repository::{MentorRepository, RepositoryError, RepositoryResult};
use super::search::{self, Page, PageRequest, SearchFilters};
use crate::moderation::ModerationStatus;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    mentors: Vec<MentorProfile>,
    #[serde(default)]
    admins: Vec<AdminAccount>,
}

#[derive(Debug, Default)]
struct Tables {
    mentors: HashMap<MentorId, MentorProfile>,
    admins: HashMap<AdminId, AdminAccount>,
}

impl Tables {
    fn from_snapshot(snap: Snapshot) -> Self {
        Tables {
            mentors: snap.mentors.into_iter().map(|m| (m.id(), m)).collect(),
            admins: snap.admins.into_iter().map(|a| (a.id(), a)).collect(),
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut mentors: Vec<MentorProfile> = self.mentors.values().cloned().collect();
        sort_oldest_first(&mut mentors);
        let mut admins: Vec<AdminAccount> = self.admins.values().cloned().collect();
        admins.sort_by(|a, b| a.email().cmp(b.email()));
        Snapshot { mentors, admins }
    }

    fn id_in_use(&self, uuid: &uuid::Uuid) -> bool {
        self.mentors.contains_key(&MentorId::from(*uuid)) || self.admins.contains_key(&AdminId::from(*uuid))
    }

    fn approved(&self) -> impl Iterator<Item = &MentorProfile> { self.mentors.values().filter(|m| m.is_approved()) }
}

fn sort_oldest_first(rows: &mut [MentorProfile]) { rows.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(&b.id()))); }

/// Exclusive ownership of a data file, released (and removed) on drop.
struct DataFileLock {
    path: PathBuf,
    _file: File,
}

impl DataFileLock {
    fn lock_path(data: &Path) -> PathBuf {
        let mut name = data.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "bamn".into());
        name.push(".lock");
        data.with_file_name(name)
    }

    fn acquire(data: &Path) -> anyhow::Result<Self> {
        let path = Self::lock_path(data);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                bail!(
                    "{} is in use by another bamn process (lock file {}); stop that process first, or remove the lock if it is stale",
                    data.display(),
                    path.display()
                )
            }
            Err(e) => return Err(e).with_context(|| format!("creating lock {}", path.display())),
        };
        writeln!(file, "{}", std::process::id()).with_context(|| format!("writing lock {}", path.display()))?;
        Ok(DataFileLock { path, _file: file })
    }
}

impl Drop for DataFileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(target: "bamn::directory", lock = %self.path.display(), error = %e, "failed to release data file lock");
        }
    }
}

/// Run blocking file IO without stalling a multi-threaded runtime's worker.
/// Current-thread runtimes (and plain threads) run it inline.
fn blocking_io<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(h) if h.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}

pub struct FileRepository {
    path: Option<PathBuf>,
    tables: RwLock<Tables>,
    _lock: Option<DataFileLock>,
}

impl FileRepository {
    /// Repository with no backing file.
    pub fn in_memory() -> Self { FileRepository { path: None, tables: RwLock::new(Tables::default()), _lock: None } }

    /// Open (or start) the snapshot at `path` and take ownership of it. A
    /// missing file is an empty directory; an unreadable or malformed one, or
    /// one already held by another repository, is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let lock = DataFileLock::acquire(&path)?;
        let tables = if path.exists() {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let snap: Snapshot = if raw.trim().is_empty() { Snapshot::default() } else { serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))? };
            Tables::from_snapshot(snap)
        } else {
            Tables::default()
        };
        info!(target: "bamn::directory", path = %path.display(), mentors = tables.mentors.len(), admins = tables.admins.len(), "opened mentor repository");
        Ok(FileRepository { path: Some(path), tables: RwLock::new(tables), _lock: Some(lock) })
    }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    fn persist(&self, tables: &Tables) -> RepositoryResult<()> {
        let Some(path) = &self.path else { return Ok(()) };
        let snap = tables.to_snapshot();
        blocking_io(|| write_snapshot(path, &snap)).map_err(|e| RepositoryError::Persistence(format!("{}: {}", path.display(), e)))
    }

    /// Put `row` in place of `previous` and persist, restoring `previous` if
    /// the snapshot cannot be written.
    fn commit_mentor(&self, tables: &mut Tables, row: MentorProfile, previous: Option<MentorProfile>) -> RepositoryResult<MentorProfile> {
        let id = row.id();
        tables.mentors.insert(id, row.clone());
        if let Err(e) = self.persist(tables) {
            match previous {
                Some(p) => { tables.mentors.insert(id, p); }
                None => { tables.mentors.remove(&id); }
            }
            return Err(e);
        }
        Ok(row)
    }
}

fn write_snapshot(path: &Path, snap: &Snapshot) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(snap).map_err(std::io::Error::other)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[async_trait]
impl MentorRepository for FileRepository {
    async fn find_mentor_by_id(&self, id: &MentorId) -> RepositoryResult<Option<MentorProfile>> {
        Ok(self.tables.read().mentors.get(id).cloned())
    }

    async fn find_mentor_by_email(&self, email: &str) -> RepositoryResult<Option<MentorProfile>> {
        let email = normalize_email(email);
        Ok(self.tables.read().mentors.values().find(|m| m.email() == email).cloned())
    }

    async fn find_mentor_by_provider_id(&self, provider: AuthProvider, provider_id: &str) -> RepositoryResult<Option<MentorProfile>> {
        let t = self.tables.read();
        Ok(t.mentors.values().find(|m| m.auth_provider() == provider && m.auth().provider_id() == Some(provider_id)).cloned())
    }

    async fn find_admin_by_id(&self, id: &AdminId) -> RepositoryResult<Option<AdminAccount>> {
        Ok(self.tables.read().admins.get(id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminAccount>> {
        let email = normalize_email(email);
        Ok(self.tables.read().admins.values().find(|a| a.email() == email).cloned())
    }

    async fn insert_mentor(&self, mut profile: MentorProfile) -> RepositoryResult<MentorProfile> {
        let mut t = self.tables.write();
        if t.id_in_use(profile.id().as_uuid()) {
            return Err(RepositoryError::IdentityCollision(profile.id().to_string()));
        }
        if t.mentors.values().any(|m| m.email() == profile.email()) {
            return Err(RepositoryError::DuplicateEmail);
        }
        if let Some(pid) = profile.auth().provider_id() {
            let provider = profile.auth_provider();
            if t.mentors.values().any(|m| m.auth_provider() == provider && m.auth().provider_id() == Some(pid)) {
                return Err(RepositoryError::DuplicateProviderId(provider));
            }
        }
        profile.stamp_revision(None);
        let saved = self.commit_mentor(&mut t, profile, None)?;
        debug!(mentor_id = %saved.id(), "inserted mentor row");
        Ok(saved)
    }

    async fn save_mentor(&self, mut profile: MentorProfile) -> RepositoryResult<MentorProfile> {
        let mut t = self.tables.write();
        let id = profile.id();
        let Some(stored) = t.mentors.get(&id).cloned() else {
            return Err(RepositoryError::MissingMentor(id));
        };
        if stored.version() != profile.version() {
            return Err(RepositoryError::VersionConflict(id));
        }
        profile.stamp_revision(Some(Utc::now()));
        self.commit_mentor(&mut t, profile, Some(stored))
    }

    async fn insert_admin(&self, admin: AdminAccount) -> RepositoryResult<AdminAccount> {
        let mut t = self.tables.write();
        if t.id_in_use(admin.id().as_uuid()) {
            return Err(RepositoryError::IdentityCollision(admin.id().to_string()));
        }
        if t.admins.values().any(|a| a.email() == admin.email()) {
            return Err(RepositoryError::DuplicateEmail);
        }
        let id = admin.id();
        t.admins.insert(id, admin.clone());
        if let Err(e) = self.persist(&t) {
            t.admins.remove(&id);
            return Err(e);
        }
        Ok(admin)
    }

    async fn list_mentors(&self, status: Option<ModerationStatus>) -> RepositoryResult<Vec<MentorProfile>> {
        let mut rows: Vec<MentorProfile> = {
            let t = self.tables.read();
            t.mentors.values().filter(|m| status.map_or(true, |s| m.moderation_status() == s)).cloned().collect()
        };
        sort_oldest_first(&mut rows);
        Ok(rows)
    }

    async fn search_approved(&self, filters: &SearchFilters, page: PageRequest) -> RepositoryResult<Page<MentorProfile>> {
        let mut rows: Vec<MentorProfile> = {
            let t = self.tables.read();
            t.approved().filter(|m| search::matches(m, filters)).cloned().collect()
        };
        sort_oldest_first(&mut rows);
        Ok(search::paginate(rows, page))
    }

    async fn approved_research_interests(&self) -> RepositoryResult<Vec<Vec<String>>> {
        Ok(self.tables.read().approved().map(|m| m.research_interests.clone()).collect())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod file_tests;
