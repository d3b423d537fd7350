use super::test_support::new_mentor;
use super::*;
use crate::moderation::ModerationStatus;
use chrono::Utc;

#[test]
fn new_profiles_start_pending_for_every_method() {
    let methods = [
        AuthMethod::Password { password_hash: "$argon2id$stub".into() },
        AuthMethod::Google { google_id: "g-1".into() },
        AuthMethod::Orcid { orcid_id: "0000-0002-1825-0097".into() },
    ];
    for auth in methods {
        let p = MentorProfile::register(new_mentor("a@b.org"), auth, Utc::now());
        assert_eq!(p.moderation_status(), ModerationStatus::Pending);
        assert_eq!(p.version(), 0);
        assert!(p.updated_at().is_none());
    }
}

#[test]
fn auth_method_credentials_are_exclusive() {
    let pw = AuthMethod::Password { password_hash: "h".into() };
    assert_eq!(pw.password_hash(), Some("h"));
    assert_eq!(pw.provider_id(), None);
    assert_eq!(pw.provider(), AuthProvider::Email);

    let orcid = AuthMethod::Orcid { orcid_id: "o".into() };
    assert_eq!(orcid.password_hash(), None);
    assert_eq!(orcid.provider_id(), Some("o"));
}

#[test]
fn auth_method_wire_shape() {
    let v = serde_json::to_value(AuthMethod::Password { password_hash: "h".into() }).unwrap();
    assert_eq!(v["provider"], "email");
    let v = serde_json::to_value(AuthMethod::Orcid { orcid_id: "o".into() }).unwrap();
    assert_eq!(v["provider"], "orcid");
    assert_eq!(v["orcid_id"], "o");
}

#[test]
fn email_is_normalized() {
    let p = MentorProfile::register(new_mentor("  Nusrat@Example.ORG "), AuthMethod::Google { google_id: "g".into() }, Utc::now());
    assert_eq!(p.email(), "nusrat@example.org");
}

#[test]
fn ids_parse_and_reject_garbage() {
    let id = MentorId::generate();
    assert_eq!(id.to_string().parse::<MentorId>().unwrap(), id);
    assert!("not-a-uuid".parse::<MentorId>().is_err());
    assert!("".parse::<AdminId>().is_err());
}

#[test]
fn registration_validation() {
    assert!(new_mentor("a@b.org").validate().is_ok());

    let mut m = new_mentor("not-an-email");
    assert_eq!(m.validate().unwrap_err().field, "email");

    m = new_mentor("a@b.org");
    m.full_name = "Al".into();
    assert_eq!(m.validate().unwrap_err().field, "full_name");

    m = new_mentor("a@b.org");
    m.degrees.clear();
    assert_eq!(m.validate().unwrap_err().field, "degrees");

    m = new_mentor("a@b.org");
    m.research_interests = (0..11).map(|i| format!("topic {}", i)).collect();
    assert_eq!(m.validate().unwrap_err().field, "research_interests");

    m = new_mentor("a@b.org");
    m.latitude = 91.0;
    assert_eq!(m.validate().unwrap_err().field, "latitude");

    m = new_mentor("a@b.org");
    m.longitude = f64::NAN;
    assert_eq!(m.validate().unwrap_err().field, "longitude");

    m = new_mentor("a@b.org");
    m.linkedin_url = Some("x".repeat(201));
    assert_eq!(m.validate().unwrap_err().field, "linkedin_url");
}

#[test]
fn update_validation_and_emptiness() {
    assert!(ProfileUpdate::default().is_empty());
    assert!(ProfileUpdate::default().validate().is_ok());

    let u = ProfileUpdate { city: Some("Chattogram".into()), ..Default::default() };
    assert!(!u.is_empty());
    assert!(u.validate().is_ok());

    let bad = ProfileUpdate { research_interests: Some(vec![]), ..Default::default() };
    assert_eq!(bad.validate().unwrap_err().field, "research_interests");
}

#[test]
fn apply_update_touches_only_given_fields() {
    let mut p = MentorProfile::register(new_mentor("a@b.org"), AuthMethod::Google { google_id: "g".into() }, Utc::now());
    p.apply_update(ProfileUpdate { institution: Some("BUET".into()), latitude: Some(22.0), ..Default::default() });
    assert_eq!(p.institution, "BUET");
    assert_eq!(p.latitude, 22.0);
    assert_eq!(p.city, "Dhaka");
    assert_eq!(p.email(), "a@b.org");
}

#[test]
fn null_link_clears_and_absent_link_keeps() {
    let mut n = new_mentor("a@b.org");
    n.linkedin_url = Some("https://linkedin.com/in/nusrat".into());
    n.profile_picture_url = Some("https://example.org/p.png".into());
    let mut p = MentorProfile::register(n, AuthMethod::Google { google_id: "g".into() }, Utc::now());

    let keep: ProfileUpdate = serde_json::from_value(serde_json::json!({ "city": "Sylhet" })).unwrap();
    assert_eq!(keep.linkedin_url, None);
    p.apply_update(keep);
    assert_eq!(p.linkedin_url.as_deref(), Some("https://linkedin.com/in/nusrat"));

    let clear: ProfileUpdate = serde_json::from_value(serde_json::json!({ "linkedin_url": null })).unwrap();
    assert_eq!(clear.linkedin_url, Some(None));
    assert!(!clear.is_empty());
    assert!(clear.validate().is_ok());
    p.apply_update(clear);
    assert!(p.linkedin_url.is_none());
    assert_eq!(p.profile_picture_url.as_deref(), Some("https://example.org/p.png"));

    let too_long = ProfileUpdate { profile_picture_url: Some(Some("x".repeat(501))), ..Default::default() };
    assert_eq!(too_long.validate().unwrap_err().field, "profile_picture_url");
}

#[test]
fn response_omits_credentials() {
    let p = MentorProfile::register(new_mentor("a@b.org"), AuthMethod::Password { password_hash: "$argon2id$secret".into() }, Utc::now());
    let v = serde_json::to_value(MentorResponse::from(&p)).unwrap();
    assert_eq!(v["auth_provider"], "email");
    assert_eq!(v["moderation_status"], "pending");
    assert!(!v.to_string().contains("argon2"));
}

#[test]
fn admin_accounts_carry_admin_role() {
    let a = AdminAccount::new(" Root@Example.org", "Root", "h".into());
    assert!(a.is_admin());
    assert_eq!(a.role(), ADMIN_ROLE);
    assert_eq!(a.email(), "root@example.org");
}
