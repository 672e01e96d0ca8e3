use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

/// The logged-in user's own profile (`GET /profile/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub blocked_users: Vec<PublicProfile>,
}

impl Profile {
    pub fn interest_names(&self) -> Vec<&str> {
        self.interests.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn interests_display(&self) -> String {
        join_interests(&self.interests)
    }

    /// Case-insensitive, matching how the server resolves interest names
    pub fn has_interest(&self, name: &str) -> bool {
        self.interests
            .iter()
            .any(|i| i.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    pub fn role_display(&self) -> &str {
        if self.role.is_empty() {
            "Attendee"
        } else {
            &self.role
        }
    }
}

/// Another attendee as listed in the "who's here" directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub interests: Vec<Interest>,
}

impl PublicProfile {
    pub fn role_display(&self) -> &str {
        if self.role.is_empty() {
            "Attendee"
        } else {
            &self.role
        }
    }

    pub fn interests_display(&self) -> String {
        join_interests(&self.interests)
    }

    /// Interests this attendee shares with `profile`
    pub fn shared_interests<'a>(&'a self, profile: &Profile) -> Vec<&'a str> {
        self.interests
            .iter()
            .filter(|i| profile.has_interest(&i.name))
            .map(|i| i.name.as_str())
            .collect()
    }
}

/// Body of `PUT /profile/`.
#[derive(Debug, Clone, Serialize)]
pub struct InterestUpdate {
    pub interest_names: Vec<String>,
}

fn join_interests(interests: &[Interest]) -> String {
    if interests.is_empty() {
        return "None".to_string();
    }
    interests
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        serde_json::from_str(
            r#"{"id": 7, "username": "alice", "role": "Mentor",
                "interests": [{"id": 1, "name": "Rust"}, {"id": 2, "name": "Django"}],
                "blocked_users": []}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_profile() {
        let profile = sample_profile();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.role_display(), "Mentor");
        assert_eq!(profile.interest_names(), vec!["Rust", "Django"]);
        assert_eq!(profile.interests_display(), "Rust, Django");
    }

    #[test]
    fn test_parse_minimal_profile() {
        let profile: Profile =
            serde_json::from_str(r#"{"username": "bob", "interests": [{"name": "Go"}]}"#).unwrap();
        assert_eq!(profile.id, None);
        assert_eq!(profile.role_display(), "Attendee");
        assert!(profile.blocked_users.is_empty());
        assert_eq!(profile.interests[0].id, None);
    }

    #[test]
    fn test_has_interest_ignores_case() {
        let profile = sample_profile();
        assert!(profile.has_interest("rust"));
        assert!(profile.has_interest(" DJANGO "));
        assert!(!profile.has_interest("React"));
    }

    #[test]
    fn test_shared_interests() {
        let other: PublicProfile = serde_json::from_str(
            r#"{"username": "carol", "role": "Mentee", "interests": [{"name": "react"}, {"name": "rust"}]}"#,
        )
        .unwrap();
        assert_eq!(other.shared_interests(&sample_profile()), vec!["rust"]);
        assert_eq!(other.interests_display(), "react, rust");
        assert_eq!(other.role_display(), "Mentee");
    }

    #[test]
    fn test_public_profile_blank_role_reads_as_attendee() {
        let other: PublicProfile =
            serde_json::from_str(r#"{"username": "dave", "interests": []}"#).unwrap();
        assert_eq!(other.role_display(), "Attendee");
    }

    #[test]
    fn test_interest_update_body() {
        let body = InterestUpdate {
            interest_names: vec!["Rust".to_string(), "Tokio".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"interest_names": ["Rust", "Tokio"]})
        );
    }
}
