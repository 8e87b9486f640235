//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the bootstrap policy, the request timeout,
//! the storage backend and the last used username.
//!
//! Configuration is stored at `~/.config/safeguard/config.json`. The
//! `SAFEGUARD_API_URL` environment variable overrides the stored base URL.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "safeguard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "SAFEGUARD_API_URL";

/// Default API base URL (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How the startup sequence decides whether a stored token is still good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapPolicy {
    /// Token must be present and accepted by an authenticated probe request
    #[default]
    Probe,
    /// Token presence alone is enough
    Local,
}

/// Where the durable key-value store lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub bootstrap: BootstrapPolicy,
    pub request_timeout_secs: u64,
    pub store: StoreBackend,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            bootstrap: BootstrapPolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            store: StoreBackend::default(),
            last_username: None,
        }
    }
}

impl Config {
    /// Load from disk (defaults if the file is missing), then apply env overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the durable store and log files
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"bootstrap": "local"}"#).unwrap();
        assert_eq!(config.bootstrap, BootstrapPolicy::Local);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.store, StoreBackend::File);
    }

    #[test]
    fn test_policy_and_backend_names() {
        let config: Config =
            serde_json::from_str(r#"{"bootstrap": "probe", "store": "keyring"}"#).unwrap();
        assert_eq!(config.bootstrap, BootstrapPolicy::Probe);
        assert_eq!(config.store, StoreBackend::Keyring);
        assert!(serde_json::from_str::<Config>(r#"{"bootstrap": "sometimes"}"#).is_err());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = Config {
            api_base_url: "http://10.0.0.5:8080/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://10.0.0.5:8080/api");
    }

    #[test]
    fn test_save_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            last_username: Some("ana".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let saved: Config = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.last_username.as_deref(), Some("ana"));
        assert_eq!(saved.bootstrap, BootstrapPolicy::Probe);
    }
}
