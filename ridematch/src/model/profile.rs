use serde::{Deserialize, Serialize};

use super::{OfferId, ProfileId, RequestId};

/// a single piece of post-trip feedback left on a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trust {
    /// the profile that left this feedback
    pub truster: ProfileId,
    /// the ride the feedback is about
    pub offer: OfferId,
    pub message: String,
}

/// the marketplace view of a user. credentials and sessions live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub trust: Vec<Trust>,
    #[serde(default)]
    pub offers: Vec<OfferId>,
    #[serde(default)]
    pub requests: Vec<RequestId>,
}

impl UserProfile {
    pub fn new(id: &str, first_name: &str, last_name: &str, email: &str) -> UserProfile {
        UserProfile {
            id: ProfileId::from(id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone_number: None,
            trust: vec![],
            offers: vec![],
            requests: vec![],
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
