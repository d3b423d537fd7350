use super::*;
use crate::directory::test_support::{google_profile, stored_with_status};
use crate::directory::ProfileUpdate;

#[tokio::test]
async fn insert_stamps_first_revision() {
    let repo = FileRepository::in_memory();
    let saved = repo.insert_mentor(google_profile("a@example.org", "g-a")).await.unwrap();
    assert_eq!(saved.version(), 1);
    assert!(saved.updated_at().is_none());
    assert_eq!(repo.find_mentor_by_id(&saved.id()).await.unwrap(), Some(saved.clone()));
    assert_eq!(repo.find_mentor_by_email("A@Example.org").await.unwrap().map(|m| m.id()), Some(saved.id()));
    assert_eq!(repo.find_mentor_by_provider_id(AuthProvider::Google, "g-a").await.unwrap().map(|m| m.id()), Some(saved.id()));
    assert!(repo.find_mentor_by_provider_id(AuthProvider::Orcid, "g-a").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicates_are_rejected() {
    let repo = FileRepository::in_memory();
    repo.insert_mentor(google_profile("a@example.org", "g-a")).await.unwrap();
    let dup_email = repo.insert_mentor(google_profile("a@example.org", "g-b")).await.unwrap_err();
    assert!(matches!(dup_email, RepositoryError::DuplicateEmail));
    let dup_subject = repo.insert_mentor(google_profile("b@example.org", "g-a")).await.unwrap_err();
    assert!(matches!(dup_subject, RepositoryError::DuplicateProviderId(AuthProvider::Google)));
}

#[tokio::test]
async fn save_bumps_revision_and_timestamp() {
    let repo = FileRepository::in_memory();
    let mut p = repo.insert_mentor(google_profile("a@example.org", "g-a")).await.unwrap();
    p.apply_update(ProfileUpdate { city: Some("Rajshahi".into()), ..Default::default() });
    let saved = repo.save_mentor(p).await.unwrap();
    assert_eq!(saved.version(), 2);
    assert!(saved.updated_at().is_some());
    assert_eq!(repo.find_mentor_by_id(&saved.id()).await.unwrap().unwrap().city, "Rajshahi");
}

#[tokio::test]
async fn stale_save_is_a_version_conflict() {
    let repo = FileRepository::in_memory();
    let original = repo.insert_mentor(google_profile("a@example.org", "g-a")).await.unwrap();
    let stale = original.clone();

    let mut first = original;
    first.set_moderation_status(ModerationStatus::Rejected);
    repo.save_mentor(first).await.unwrap();

    let err = repo.save_mentor(stale).await.unwrap_err();
    assert!(matches!(err, RepositoryError::VersionConflict(_)));
    let stored = repo.list_mentors(None).await.unwrap();
    assert_eq!(stored[0].moderation_status(), ModerationStatus::Rejected);
}

#[tokio::test]
async fn saving_an_unknown_profile_fails() {
    let repo = FileRepository::in_memory();
    let err = repo.save_mentor(google_profile("a@example.org", "g-a")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::MissingMentor(_)));
}

#[tokio::test]
async fn listing_and_search_see_the_right_rows() {
    let repo = FileRepository::in_memory();
    let approved = stored_with_status(&repo, "ok@example.org", ModerationStatus::Approved).await;
    stored_with_status(&repo, "wait@example.org", ModerationStatus::Pending).await;
    stored_with_status(&repo, "no@example.org", ModerationStatus::Rejected).await;

    assert_eq!(repo.list_mentors(None).await.unwrap().len(), 3);
    let pending = repo.list_mentors(Some(ModerationStatus::Pending)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email(), "wait@example.org");

    let page = repo.search_approved(&SearchFilters::default(), PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id(), approved.id());

    assert_eq!(repo.approved_research_interests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn admin_and_mentor_ids_stay_disjoint() {
    let repo = FileRepository::in_memory();
    let admin = repo.insert_admin(AdminAccount::new("root@example.org", "Root", "h".into())).await.unwrap();
    assert!(repo.find_mentor_by_id(&MentorId::from(*admin.id().as_uuid())).await.unwrap().is_none());
    let dup = repo.insert_admin(AdminAccount::new("ROOT@example.org", "Root 2", "h".into())).await.unwrap_err();
    assert!(matches!(dup, RepositoryError::DuplicateEmail));
}

#[tokio::test]
async fn snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bamn.json");
    let id = {
        let repo = FileRepository::open(&path).unwrap();
        let p = stored_with_status(&repo, "a@example.org", ModerationStatus::Approved).await;
        repo.insert_admin(AdminAccount::new("root@example.org", "Root", "h".into())).await.unwrap();
        p.id()
    };
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = FileRepository::open(&path).unwrap();
    let p = reopened.find_mentor_by_id(&id).await.unwrap().unwrap();
    assert_eq!(p.moderation_status(), ModerationStatus::Approved);
    assert_eq!(p.version(), 2);
    assert!(reopened.find_admin_by_email("root@example.org").await.unwrap().is_some());
}

#[test]
fn malformed_snapshot_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bamn.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(FileRepository::open(&path).is_err());
}

#[tokio::test]
async fn data_file_has_a_single_owner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bamn.json");
    let lock = dir.path().join("bamn.json.lock");

    let server = FileRepository::open(&path).unwrap();
    assert!(lock.exists());
    let refused = FileRepository::open(&path).err().expect("second open must fail");
    assert!(refused.to_string().contains("in use"), "{}", refused);

    stored_with_status(&server, "a@example.org", ModerationStatus::Pending).await;
    drop(server);
    assert!(!lock.exists());

    // Once the owner is gone the provisioning path works and nothing is lost.
    let tool = FileRepository::open(&path).unwrap();
    tool.insert_admin(AdminAccount::new("root@example.org", "Root", "h".into())).await.unwrap();
    drop(tool);

    let server = FileRepository::open(&path).unwrap();
    stored_with_status(&server, "b@example.org", ModerationStatus::Pending).await;
    drop(server);

    let reopened = FileRepository::open(&path).unwrap();
    assert!(reopened.find_admin_by_email("root@example.org").await.unwrap().is_some());
    assert_eq!(reopened.list_mentors(None).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn writes_persist_on_a_multi_thread_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bamn.json");
    let id = {
        let repo = FileRepository::open(&path).unwrap();
        stored_with_status(&repo, "a@example.org", ModerationStatus::Approved).await.id()
    };
    let reopened = FileRepository::open(&path).unwrap();
    assert_eq!(reopened.find_mentor_by_id(&id).await.unwrap().unwrap().moderation_status(), ModerationStatus::Approved);
}
