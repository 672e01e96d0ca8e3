//! Authenticated request pipeline.
//!
//! Every call is sent with the stored access token. When the server answers
//! 401 the pipeline refreshes the access token once and replays the call;
//! if the refresh itself fails the session is expired and the failure is
//! returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::Session;

use super::request::{ApiRequest, PendingRequest};
use super::ApiError;

/// Token refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "token/refresh/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the server rotates refresh tokens
    #[serde(default)]
    refresh: Option<String>,
}

pub struct AuthPipeline {
    client: Client,
    base_url: String,
    session: Arc<Session>,
    // serializes refreshes so simultaneous 401s share one refresh call
    refresh_gate: Mutex<()>,
}

impl AuthPipeline {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, base_url, session))
    }

    /// Build on an existing client, sharing its connection pool
    pub fn with_client(client: Client, base_url: &str, session: Arc<Session>) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client,
            base_url,
            session,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unauthenticated client, for calls that must not carry a token
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Resolve an API path against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Whether a resolved URL points under the API base URL. Only these
    /// carry the access token.
    pub fn is_api_url(&self, url: &str) -> bool {
        url.starts_with(self.base_url.as_str())
    }

    fn is_refresh_request(&self, request: &ApiRequest) -> bool {
        let path = request.path();
        let relative = path.strip_prefix(self.base_url.as_str()).unwrap_or(path);
        relative.trim_matches('/') == REFRESH_PATH.trim_matches('/')
    }

    /// Send a request with the stored bearer token, refreshing and replaying
    /// once on 401. Non-401 responses are returned as-is, whatever their
    /// status. URLs outside the API base are sent without credentials and
    /// never trigger a refresh.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let url = self.url(request.path());
        if !self.is_api_url(&url) {
            debug!(url = %url, "Sending off-origin request without credentials");
            return self.dispatch(&request, None).await;
        }

        let mut pending = PendingRequest::new(request);

        loop {
            let token = self.session.access_token()?;
            let response = self.dispatch(pending.request(), token.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || self.is_refresh_request(pending.request())
            {
                return Ok(response);
            }

            if !pending.mark_retried() {
                warn!(
                    path = pending.request().path(),
                    "Request rejected again after token refresh"
                );
                self.session.expire("refreshed access token was rejected");
                return Ok(response);
            }

            debug!(path = pending.request().path(), "Access token rejected, refreshing");
            self.refresh_access_token(token.as_deref()).await?;
        }
    }

    /// Send a request and decode a successful JSON response
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path().to_string();
        let response = Self::check_response(self.send(request).await?).await?;
        Self::decode_json(response, &path).await
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let url = self.url(request.path());
        debug!(method = %request.method(), url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.send().await?)
    }

    /// Refresh the access token unless a concurrent request already did.
    /// `stale` is the token the rejected request was sent with.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.session.access_token()? {
            if Some(current.as_str()) != stale {
                debug!("Access token already refreshed by another request");
                return Ok(current);
            }
        }

        match self.request_new_access_token().await {
            Ok(refreshed) => {
                self.session
                    .store_refreshed(&refreshed.access, refreshed.refresh.as_deref())?;
                info!(rotated = refreshed.refresh.is_some(), "Access token refreshed");
                Ok(refreshed.access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.session.expire("token refresh failed");
                Err(ApiError::SessionExpired(e.to_string()))
            }
        }
    }

    async fn request_new_access_token(&self) -> Result<RefreshResponse, ApiError> {
        let refresh = self
            .session
            .refresh_token()?
            .ok_or_else(|| ApiError::Authentication("No refresh token stored".to_string()))?;

        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::decode_json(response, REFRESH_PATH).await
    }

    /// Check if response is successful, returning an error with body if not.
    pub async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a JSON body. Transport failures stay `Network`; a body that
    /// does not match the expected shape is a `Validation` error.
    pub async fn decode_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Validation(format!("Failed to parse response from {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    fn pipeline(base: &str) -> AuthPipeline {
        let session = Arc::new(Session::new(Arc::new(MemoryTokenStore::new())));
        AuthPipeline::with_client(Client::new(), base, session)
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let p = pipeline("http://127.0.0.1:8000/api");
        assert_eq!(p.base_url(), "http://127.0.0.1:8000/api/");
        assert_eq!(p.url("/profile/"), "http://127.0.0.1:8000/api/profile/");
        assert_eq!(p.url("meetings/"), "http://127.0.0.1:8000/api/meetings/");
        assert_eq!(
            p.url("https://cal.example.com/m/1.ics"),
            "https://cal.example.com/m/1.ics"
        );
    }

    #[test]
    fn test_only_base_url_is_api_url() {
        let p = pipeline("http://127.0.0.1:8000/api/");
        assert!(p.is_api_url(&p.url("meetings/")));
        assert!(p.is_api_url("http://127.0.0.1:8000/api/meetings/?page=2"));
        assert!(!p.is_api_url("http://127.0.0.1:8000.evil.test/api/meetings/"));
        assert!(!p.is_api_url("https://cal.example.com/m/1.ics"));
        assert!(!p.is_api_url("http://127.0.0.1:8000/admin/"));
    }

    #[test]
    fn test_refresh_endpoint_detection() {
        let p = pipeline("http://127.0.0.1:8000/api/");
        assert!(p.is_refresh_request(&ApiRequest::post("token/refresh/")));
        assert!(p.is_refresh_request(&ApiRequest::post("/token/refresh")));
        assert!(p.is_refresh_request(&ApiRequest::post(
            "http://127.0.0.1:8000/api/token/refresh/"
        )));
        assert!(!p.is_refresh_request(&ApiRequest::post("token/")));
        assert!(!p.is_refresh_request(&ApiRequest::get("profile/")));
    }
}
