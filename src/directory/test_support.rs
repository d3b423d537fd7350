use chrono::Utc;

use super::{AuthMethod, MentorProfile, MentorRepository, NewMentor};
use crate::moderation::ModerationStatus;

pub(crate) fn new_mentor(email: &str) -> NewMentor {
    NewMentor {
        email: email.to_string(),
        full_name: "Nusrat Jahan".to_string(),
        current_role: "Associate Professor".to_string(),
        institution: "University of Dhaka".to_string(),
        department: "Computer Science".to_string(),
        degrees: vec!["PhD Computer Science".to_string()],
        research_interests: vec!["Machine Learning".to_string(), "NLP".to_string()],
        continent: "Asia".to_string(),
        country: "Bangladesh".to_string(),
        city: "Dhaka".to_string(),
        latitude: 23.81,
        longitude: 90.41,
        linkedin_url: None,
        profile_picture_url: None,
    }
}

pub(crate) fn google_profile(email: &str, google_id: &str) -> MentorProfile {
    MentorProfile::register(new_mentor(email), AuthMethod::Google { google_id: google_id.to_string() }, Utc::now())
}

/// Insert a profile and drive it into `status` through the repository.
pub(crate) async fn stored_with_status(repo: &dyn MentorRepository, email: &str, status: ModerationStatus) -> MentorProfile {
    let mut p = repo.insert_mentor(google_profile(email, &format!("g-{}", email))).await.unwrap();
    if status != p.moderation_status() {
        p.set_moderation_status(status);
        p = repo.save_mentor(p).await.unwrap();
    }
    p
}
