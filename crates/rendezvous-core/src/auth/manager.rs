use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Profile;

use super::{Session, SessionStatus};

/// Login, logout and start-up restore over a shared `Session`.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.api.session()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Log in with username and password. On rejection the session is left
    /// untouched and the error carries the server's message.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Authentication(
                "Username and password required".to_string(),
            ));
        }

        let tokens = match self.api.obtain_tokens(username, password).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(username, error = %e, "Login failed");
                return Err(e);
            }
        };

        self.session().store_tokens(&tokens)?;
        self.session().mark_logged_in(None)?;
        info!(username, "Login successful");

        // Profile is cached opportunistically; login has already succeeded
        match self.api.fetch_profile().await {
            Ok(profile) => self.session().set_profile(profile),
            Err(e) => debug!(error = %e, "Could not cache profile after login"),
        }
        Ok(())
    }

    pub fn logout(&self) {
        self.session().logout();
    }

    /// Run once at start-up. With a stored access token, check the profile
    /// endpoint; success logs the session in, any failure logs it out.
    /// Without a stored token nothing is sent. A session the pipeline already
    /// expired keeps its `Expired` status so watchers still see it.
    pub async fn restore_session(&self) -> Result<Option<Profile>, ApiError> {
        if self.session().access_token()?.is_none() {
            debug!("No stored access token, staying logged out");
            return Ok(None);
        }

        match self.api.fetch_profile().await {
            Ok(profile) => {
                self.session().mark_logged_in(Some(profile.clone()))?;
                info!(username = %profile.username, "Session restored");
                Ok(Some(profile))
            }
            Err(e) => {
                warn!(error = %e, "Stored session is no longer valid");
                if self.session().status() != SessionStatus::Expired {
                    self.logout();
                }
                Ok(None)
            }
        }
    }
}
