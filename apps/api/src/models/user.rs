use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the credential mapping: password digest plus the mutable
/// profile fields. Skills and interests are stored comma-joined, exactly as
/// the user typed them; splitting happens only when building the webhook
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub password_hash: String,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub interests: String,
    /// Absent in records written before this field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The mutable, non-secret part of a [`UserRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub interests: String,
}

impl UserRecord {
    pub fn profile(&self) -> ProfileFields {
        ProfileFields {
            gmail: self.gmail.clone(),
            skills: self.skills.clone(),
            education: self.education.clone(),
            interests: self.interests.clone(),
        }
    }
}
