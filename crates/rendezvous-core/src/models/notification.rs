use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    MeetingCancelled,
    ProposalReceived,
    ProposalAccepted,
    ProposalRejected,
    Other,
}

impl NotificationKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "MTG_CNL" => NotificationKind::MeetingCancelled,
            "PRP_RCV" => NotificationKind::ProposalReceived,
            "PRP_ACC" => NotificationKind::ProposalAccepted,
            "PRP_REJ" => NotificationKind::ProposalRejected,
            _ => NotificationKind::Other,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::MeetingCancelled => write!(f, "Meeting Cancelled"),
            NotificationKind::ProposalReceived => write!(f, "Proposal Received"),
            NotificationKind::ProposalAccepted => write!(f, "Proposal Accepted"),
            NotificationKind::ProposalRejected => write!(f, "Proposal Rejected"),
            NotificationKind::Other => write!(f, "Notice"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub event_type: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from_code(&self.event_type)
    }
}

/// `GET /health-check/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
