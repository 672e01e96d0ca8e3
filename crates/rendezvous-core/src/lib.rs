//! Core library for the rendezvous event-attendee client.
//!
//! - `api`: the authenticated request pipeline and typed endpoint client
//! - `auth`: session state, token stores and the login/restore flows
//! - `models`: profile, meeting and notification payloads
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, AuthPipeline};
pub use auth::{Session, SessionManager, SessionStatus, TokenStore};
pub use config::Config;
