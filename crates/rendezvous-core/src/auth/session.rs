use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::Profile;

use super::store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Observable login state. `Expired` means the pipeline ended the session
/// because the refresh token was rejected; the UI should send the user back
/// to the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    LoggedOut,
    LoggedIn,
    Expired,
}

/// Tokens issued by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub is_logged_in: bool,
    pub profile: Option<Profile>,
}

/// Client-side session: persisted tokens plus login status and the cached
/// profile. One instance is created at start-up and shared via `Arc`.
pub struct Session {
    store: Arc<dyn TokenStore>,
    data: RwLock<SessionData>,
    status: watch::Sender<SessionStatus>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (status, _) = watch::channel(SessionStatus::LoggedOut);
        Self {
            store,
            data: RwLock::new(SessionData::default()),
            status,
        }
    }

    pub fn access_token(&self) -> Result<Option<String>, ApiError> {
        self.read_token(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, ApiError> {
        self.read_token(REFRESH_TOKEN_KEY)
    }

    fn read_token(&self, key: &str) -> Result<Option<String>, ApiError> {
        let token = self.store.get(key).map_err(ApiError::store)?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// Persist a freshly issued token pair. Any cached profile belongs to
    /// the previous tokens and is dropped.
    pub fn store_tokens(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .profile = None;
        self.store
            .set(ACCESS_TOKEN_KEY, &tokens.access)
            .map_err(ApiError::store)?;
        self.store
            .set(REFRESH_TOKEN_KEY, &tokens.refresh)
            .map_err(ApiError::store)?;
        Ok(())
    }

    /// Replace the access token after a refresh. The refresh token is only
    /// replaced when the server rotated it.
    pub fn store_refreshed(&self, access: &str, rotated_refresh: Option<&str>) -> Result<(), ApiError> {
        self.store
            .set(ACCESS_TOKEN_KEY, access)
            .map_err(ApiError::store)?;
        if let Some(refresh) = rotated_refresh {
            self.store
                .set(REFRESH_TOKEN_KEY, refresh)
                .map_err(ApiError::store)?;
        }
        Ok(())
    }

    /// Mark the session logged in. Requires a stored access token.
    pub fn mark_logged_in(&self, profile: Option<Profile>) -> Result<(), ApiError> {
        if self.access_token()?.is_none() {
            return Err(ApiError::Authentication(
                "Cannot log in without an access token".to_string(),
            ));
        }
        {
            let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
            data.is_logged_in = true;
            if profile.is_some() {
                data.profile = profile;
            }
        }
        self.status.send_replace(SessionStatus::LoggedIn);
        Ok(())
    }

    pub fn set_profile(&self, profile: Profile) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.profile = Some(profile);
    }

    pub fn profile(&self) -> Option<Profile> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.profile.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.is_logged_in
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Watch for login state changes, e.g. to redirect on expiry
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Clear both tokens and the cached profile. Always succeeds; store
    /// failures are logged. Safe to call when already logged out.
    pub fn logout(&self) {
        let was_logged_in = self.clear();
        self.status.send_replace(SessionStatus::LoggedOut);
        if was_logged_in {
            info!("Logged out");
        } else {
            debug!("Logout on an inactive session");
        }
    }

    /// End the session after an unrecoverable refresh failure
    pub fn expire(&self, reason: &str) {
        self.clear();
        self.status.send_replace(SessionStatus::Expired);
        warn!(reason, "Session expired");
    }

    fn clear(&self) -> bool {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to clear stored token");
            }
        }
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let was_logged_in = data.is_logged_in;
        *data = SessionData::default();
        was_logged_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    fn profile() -> Profile {
        serde_json::from_str(r#"{"username": "alice", "role": "Attendee", "interests": []}"#).unwrap()
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_tokens("a", "r")));
        assert!(!session.is_logged_in());
        assert_eq!(session.status(), SessionStatus::LoggedOut);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_mark_logged_in_requires_access_token() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(matches!(
            session.mark_logged_in(None),
            Err(ApiError::Authentication(_))
        ));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_login_then_logout_clears_everything() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::new(store.clone());
        session
            .store_tokens(&TokenPair {
                access: "a".to_string(),
                refresh: "r".to_string(),
            })
            .unwrap();
        session.mark_logged_in(Some(profile())).unwrap();
        assert!(session.is_logged_in());
        assert_eq!(session.profile().unwrap().username, "alice");

        session.logout();
        assert!(!session.is_logged_in());
        assert!(session.profile().is_none());
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).unwrap().is_none());

        // idempotent
        session.logout();
        assert_eq!(session.status(), SessionStatus::LoggedOut);
    }

    #[test]
    fn test_new_tokens_drop_previous_profile() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_tokens("a", "r")));
        session.mark_logged_in(Some(profile())).unwrap();

        session
            .store_tokens(&TokenPair {
                access: "b".to_string(),
                refresh: "r2".to_string(),
            })
            .unwrap();
        session.mark_logged_in(None).unwrap();
        assert!(session.is_logged_in());
        assert!(session.profile().is_none());
    }

    #[test]
    fn test_store_refreshed_keeps_refresh_token_unless_rotated() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_tokens("old", "r1")));
        session.store_refreshed("new", None).unwrap();
        assert_eq!(session.access_token().unwrap().as_deref(), Some("new"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("r1"));

        session.store_refreshed("newer", Some("r2")).unwrap();
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("r2"));
    }

    #[test]
    fn test_expire_notifies_subscribers() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_tokens("a", "r")));
        session.mark_logged_in(None).unwrap();
        let mut rx = session.subscribe();
        assert_eq!(*rx.borrow_and_update(), SessionStatus::LoggedIn);

        session.expire("refresh rejected");
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionStatus::Expired);
        assert!(!session.is_logged_in());
        assert!(session.access_token().unwrap().is_none());
    }

    #[test]
    fn test_empty_token_reads_as_absent() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "").unwrap();
        let session = Session::new(store);
        assert!(session.access_token().unwrap().is_none());
    }
}
