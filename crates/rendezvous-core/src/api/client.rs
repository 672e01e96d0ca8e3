//! Typed endpoints of the event platform API.
//!
//! All calls except login and the health check go through the
//! `AuthPipeline`, so token attachment and refresh are handled there.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::session::TokenPair;
use crate::auth::Session;
use crate::models::{
    HealthStatus, InterestUpdate, Meeting, Notification, Page, Profile, PublicProfile,
};

use super::{ApiError, ApiRequest, AuthPipeline};

// ============================================================================
// Constants
// ============================================================================

/// Token issuance endpoint
const TOKEN_PATH: &str = "token/";
const PROFILE_PATH: &str = "profile/";
const MEETINGS_PATH: &str = "meetings/";
const PUBLIC_PROFILES_PATH: &str = "public-profiles/";
const NOTIFICATIONS_PATH: &str = "notifications/";
const HEALTH_PATH: &str = "health-check/";

/// Upper bound on pages followed for one list. At the server's page size of
/// 25 this covers far more meetings than an event schedules per attendee.
const MAX_PAGES: usize = 40;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// API client for the event platform.
/// Clone is cheap - the pipeline is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<AuthPipeline>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ApiError> {
        Ok(Self::from_pipeline(Arc::new(AuthPipeline::new(base_url, session)?)))
    }

    pub fn from_pipeline(pipeline: Arc<AuthPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    pub fn session(&self) -> &Arc<Session> {
        self.pipeline.session()
    }

    // ===== Authentication =====

    /// Exchange credentials for an access/refresh token pair. Sent without
    /// the pipeline: there is no token to attach or refresh yet.
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let response = self
            .pipeline
            .http()
            .post(self.pipeline.url(TOKEN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::login_rejected(status, &body));
        }

        AuthPipeline::decode_json(response, TOKEN_PATH).await
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        self.pipeline.send_json(ApiRequest::get(PROFILE_PATH)).await
    }

    /// Replace the user's interests. The server creates unknown interests
    /// and matches existing ones case-insensitively.
    pub async fn update_interests(&self, interest_names: &[String]) -> Result<Profile, ApiError> {
        let body = InterestUpdate {
            interest_names: interest_names.to_vec(),
        };
        let request = ApiRequest::put(PROFILE_PATH).with_json(&body)?;
        let profile: Profile = self.pipeline.send_json(request).await?;

        if self.session().is_logged_in() {
            self.session().set_profile(profile.clone());
        }
        Ok(profile)
    }

    // ===== Meetings =====

    pub async fn fetch_meetings(&self) -> Result<Vec<Meeting>, ApiError> {
        let mut meetings: Vec<Meeting> = self.fetch_all(MEETINGS_PATH).await?;
        meetings.sort_by_key(|m| m.meeting_time);
        Ok(meetings)
    }

    /// Download the iCal export for a meeting. Returns None when the
    /// meeting has no export link.
    pub async fn fetch_meeting_calendar(&self, meeting: &Meeting) -> Result<Option<String>, ApiError> {
        let Some(link) = meeting.calendar_url.as_deref() else {
            return Ok(None);
        };

        let request = ApiRequest::get(link).with_header("Accept", "text/calendar")?;
        let response = AuthPipeline::check_response(self.pipeline.send(request).await?).await?;
        Ok(Some(response.text().await?))
    }

    // ===== Directory =====

    /// Checked-in attendees ("who's here")
    pub async fn fetch_whos_here(&self) -> Result<Vec<PublicProfile>, ApiError> {
        self.fetch_all(PUBLIC_PROFILES_PATH).await
    }

    // ===== Notifications =====

    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.fetch_all(NOTIFICATIONS_PATH).await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("{}{}/mark_as_read/", NOTIFICATIONS_PATH, id);
        AuthPipeline::check_response(self.pipeline.send(ApiRequest::post(path)).await?).await?;
        Ok(())
    }

    // ===== Service =====

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .pipeline
            .http()
            .get(self.pipeline.url(HEALTH_PATH))
            .send()
            .await?;
        let response = AuthPipeline::check_response(response).await?;
        AuthPipeline::decode_json(response, HEALTH_PATH).await
    }

    /// Fetch every item of a list endpoint, following `next` links
    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                warn!(path, max_pages = MAX_PAGES, "Stopped following pagination links");
                break;
            }

            let page: Page<T> = self.pipeline.send_json(ApiRequest::get(url)).await?;
            next = page.next_page().map(str::to_string);
            items.extend(page.into_items());
        }

        debug!(path, count = items.len(), pages, "Fetched list");
        Ok(items)
    }
}
