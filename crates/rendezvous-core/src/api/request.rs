//! Replayable request descriptions.
//!
//! A `reqwest::RequestBuilder` is consumed when sent, so the pipeline keeps
//! its own description of each call and rebuilds the builder per attempt.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// An outbound API call relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Attach a JSON body. The body is serialized once up front so every
    /// replay sends identical bytes.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// A request in flight through the pipeline, with its retry flag.
#[derive(Debug)]
pub struct PendingRequest {
    request: ApiRequest,
    retried: bool,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Flag the request as retried. Returns false if it already was, in
    /// which case it must not be replayed again.
    pub fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_flag_flips_once() {
        let mut pending = PendingRequest::new(ApiRequest::get("meetings/"));
        assert!(!pending.is_retried());
        assert!(pending.mark_retried());
        assert!(pending.is_retried());
        assert!(!pending.mark_retried());
        assert!(pending.is_retried());
    }

    #[test]
    fn test_builder_keeps_body_and_query() {
        let request = ApiRequest::put("/profile/")
            .with_query("page", "2")
            .with_json(&json!({"interest_names": ["Rust"]}))
            .unwrap();

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.path(), "/profile/");
        assert_eq!(request.query(), &[("page".to_string(), "2".to_string())]);
        assert_eq!(request.body(), Some(&json!({"interest_names": ["Rust"]})));
    }

    #[test]
    fn test_with_header_rejects_invalid_values() {
        assert!(ApiRequest::get("x").with_header("Accept", "text/calendar").is_ok());
        assert!(matches!(
            ApiRequest::get("x").with_header("bad header", "v"),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            ApiRequest::get("x").with_header("X-Thing", "line\nbreak"),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
