//! Authentication module for managing the user session and its tokens.
//!
//! This module provides:
//! - `Session`: persisted tokens, login status and the cached profile
//! - `SessionManager`: login, logout and start-up session restore
//! - `TokenStore`: device-scoped token persistence (file, keyring, memory)

pub mod manager;
pub mod session;
pub mod store;

pub use manager::SessionManager;
pub use session::{Session, SessionStatus, TokenPair};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TokenStoreKind};
