//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the backend base URL, the logout policy and an optional request
//! timeout.
//!
//! Configuration is stored at `~/.config/takeatask/config.json`. Session state
//! (durable store and cookie jar) lives under the platform data directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/state directory paths
const APP_NAME: &str = "takeatask";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8081";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "TAKEATASK_API_URL";

/// Environment variable overriding the session state directory.
pub const STATE_DIR_ENV: &str = "TAKEATASK_STATE_DIR";

/// What `end_session` removes besides the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutPolicy {
    /// Only the token is cleared. The display name and the remembered login
    /// survive, so a returning user is still greeted and prefilled.
    #[default]
    KeepProfile,
    /// Token, display name and remembered login are all cleared.
    ClearAll,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub logout_policy: LogoutPolicy,
    /// No client-side timeout unless set.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Directory holding the durable store and the cookie jar.
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend base URL: environment, then config file, then the default.
    pub fn api_url(&self) -> String {
        resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }
}

fn resolve_api_url(from_env: Option<String>, configured: Option<&str>) -> String {
    let chosen = from_env
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.filter(|v| !v.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    chosen.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_url_prefers_env() {
        assert_eq!(
            resolve_api_url(Some("http://api.example:9000/".into()), Some("http://other")),
            "http://api.example:9000"
        );
    }

    #[test]
    fn test_resolve_api_url_falls_back() {
        assert_eq!(resolve_api_url(None, Some("http://cfg:1/")), "http://cfg:1");
        assert_eq!(resolve_api_url(Some("  ".into()), None), DEFAULT_API_URL);
        assert_eq!(resolve_api_url(None, Some("")), DEFAULT_API_URL);
    }

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("http://tasks.local".into()),
            logout_policy: LogoutPolicy::ClearAll,
            request_timeout_secs: Some(15),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.logout_policy, LogoutPolicy::KeepProfile);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"logout_policy":"clear_all"}"#).unwrap();
        assert_eq!(config.logout_policy, LogoutPolicy::ClearAll);
        assert!(config.api_url.is_none());
    }
}
