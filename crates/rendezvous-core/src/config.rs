//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, the last used username and which token store to use.
//!
//! Configuration is stored at `~/.config/rendezvous/config.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, TokenStore, TokenStoreKind};

/// Application name used for config/data directory paths
const APP_NAME: &str = "rendezvous";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// API base URL used when neither config nor environment set one
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Environment variable overriding the configured API base URL
pub const API_URL_ENV: &str = "RENDEZVOUS_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    #[serde(default)]
    pub token_store: TokenStoreKind,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL, with the environment taking precedence over the file
    pub fn api_base_url(&self) -> String {
        Self::resolve_base_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    fn resolve_base_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| {
                configured
                    .filter(|url| !url.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Open the configured persistent token store
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_store {
            TokenStoreKind::File => Arc::new(FileTokenStore::new(self.data_dir()?.join(TOKEN_FILE))),
            TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(
            Config::resolve_base_url(Some("http://env/api/".to_string()), Some("http://file/api/")),
            "http://env/api/"
        );
        assert_eq!(
            Config::resolve_base_url(None, Some("http://file/api/")),
            "http://file/api/"
        );
        assert_eq!(
            Config::resolve_base_url(Some("  ".to_string()), None),
            DEFAULT_API_BASE_URL
        );
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: Config = serde_json::from_str(r#"{"last_username": "alice"}"#).unwrap();
        assert_eq!(config.last_username.as_deref(), Some("alice"));
        assert!(config.api_base_url.is_none());
        assert_eq!(config.token_store, TokenStoreKind::File);
    }
}
