use crate::directory::{AdminAccount, MentorProfile, ADMIN_ROLE};

/// Role tag carried by mentor tokens.
pub const MENTOR_ROLE: &str = "mentor";

/// What kind of caller an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredKind {
    Mentor,
    Admin,
    /// Optional authentication: a failed resolution means "anonymous".
    Any,
}

/// A resolved caller. Both variants hold the row as read for this request.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Admin(AdminAccount),
    Mentor(MentorProfile),
}

impl Principal {
    pub fn id(&self) -> String {
        match self {
            Principal::Admin(a) => a.id().to_string(),
            Principal::Mentor(m) => m.id().to_string(),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Principal::Admin(_) => ADMIN_ROLE,
            Principal::Mentor(_) => MENTOR_ROLE,
        }
    }

    pub fn as_mentor(&self) -> Option<&MentorProfile> {
        match self {
            Principal::Mentor(m) => Some(m),
            Principal::Admin(_) => None,
        }
    }

    pub fn into_mentor(self) -> Option<MentorProfile> {
        match self {
            Principal::Mentor(m) => Some(m),
            Principal::Admin(_) => None,
        }
    }
}
