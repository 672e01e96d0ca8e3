use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user reference as embedded in meeting payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Meeting endpoints have shipped attendees both as nested user objects
/// and as plain usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attendee {
    User(MeetingUser),
    Username(String),
}

impl Attendee {
    pub fn username(&self) -> &str {
        match self {
            Attendee::User(user) => &user.username,
            Attendee::Username(name) => name,
        }
    }

    /// Full name when the server provided one, otherwise the username
    pub fn display_name(&self) -> String {
        if let Attendee::User(user) = self {
            let full = [user.first_name.as_deref(), user.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !full.is_empty() {
                return full;
            }
        }
        self.username().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub attendee1: Attendee,
    pub attendee2: Attendee,
    pub meeting_time: DateTime<Utc>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Calendar (iCal) export link, absolute or relative to the API base
    #[serde(default)]
    pub calendar_url: Option<String>,
}

impl Meeting {
    pub fn involves(&self, username: &str) -> bool {
        self.attendee1.username() == username || self.attendee2.username() == username
    }

    /// The attendee who is not `username`. Returns None if `username` is
    /// not part of this meeting.
    pub fn other_attendee(&self, username: &str) -> Option<&Attendee> {
        if self.attendee1.username() == username {
            Some(&self.attendee2)
        } else if self.attendee2.username() == username {
            Some(&self.attendee1)
        } else {
            None
        }
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.meeting_time >= now
    }
}
