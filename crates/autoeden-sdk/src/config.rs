//! Client configuration
//!
//! Resolved through [`ConfigLoader`]: defaults, then `autoeden.toml`, then
//! `AUTOEDEN_`-prefixed environment variables such as
//! `AUTOEDEN_API__BASE_URL=https://api.autoeden.co.zw`.

use autoeden_common::ConfigLoader;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default API URL when not specified
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pause between the session-expired notice and the redirect home
    pub redirect_delay_ms: u64,
    /// Where the auth record is kept; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            auth_file: None,
        }
    }
}

impl SessionConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl ConfigLoader for ClientConfig {
    const ENV_PREFIX: &'static str = "AUTOEDEN_";
    const DEFAULT_FILE: &'static str = "autoeden.toml";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.session.redirect_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "autoeden.toml",
                r#"
                [api]
                base_url = "https://staging.autoeden.example"
                timeout_secs = 5
                "#,
            )?;
            jail.set_env("AUTOEDEN_SESSION__REDIRECT_DELAY_MS", "250");

            let config = ClientConfig::load_from_file(Path::new("autoeden.toml"))
                .expect("config should load");
            assert_eq!(config.api.base_url, "https://staging.autoeden.example");
            assert_eq!(config.api.timeout_secs, 5);
            assert_eq!(config.api.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
            assert_eq!(config.session.redirect_delay_ms, 250);
            Ok(())
        });
    }
}
