use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Authentication(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Invalid response: {0}")]
    Validation(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token store error: {0}")]
    Store(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Generic login failure message when the server gives no detail
pub const GENERIC_LOGIN_FAILURE: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    #[serde(default)]
    non_field_errors: Vec<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of a DRF-style error body
    /// (`{"detail": ...}` or `{"non_field_errors": [...]}`).
    pub fn server_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .detail
            .or_else(|| parsed.non_field_errors.into_iter().next())
            .filter(|message| !message.trim().is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            code => ApiError::Rejected {
                status: code,
                message: Self::server_detail(body).unwrap_or(truncated),
            },
        }
    }

    /// Map a rejected login attempt to an authentication failure, keeping
    /// the server's message when it sent one.
    pub fn login_rejected(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 401 | 403 => ApiError::Authentication(
                Self::server_detail(body).unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string()),
            ),
            _ => Self::from_status(status, body),
        }
    }

    pub fn store(err: anyhow::Error) -> Self {
        ApiError::Store(format!("{:#}", err))
    }
}
