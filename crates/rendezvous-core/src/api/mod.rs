//! REST API client module for the event platform.
//!
//! Every authenticated call goes through the `AuthPipeline`, which attaches
//! the stored bearer token and performs a single refresh-and-retry when the
//! server rejects an expired access token. `ApiClient` layers the typed
//! endpoints (profile, meetings, directory, notifications) on top of it.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use pipeline::AuthPipeline;
pub use request::{ApiRequest, PendingRequest};
