//! Configuration management for the Auto Eden CLI
//!
//! The CLI keeps a `config.toml` under the platform config directory. Values
//! are resolved as defaults, then the file, then `AUTOEDEN_` environment
//! variables.

use crate::error::{CliError, Result};
use autoeden_common::{ConfigLoader, ConfigurationError};
use autoeden_sdk::config::{ApiConfig, ClientConfig, SessionConfig};
use etcetera::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.toml";

/// CLI configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

impl ConfigLoader for CliConfig {
    const ENV_PREFIX: &'static str = "AUTOEDEN_";
    const DEFAULT_FILE: &'static str = CONFIG_FILE;
}

impl CliConfig {
    /// Load from `path`, or the default location when `None`
    ///
    /// A missing file yields the defaults plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => expand_path(path),
            None => Self::default_path()?,
        };
        debug!("Loading configuration from: {}", path.display());

        let mut config = <Self as ConfigLoader>::load_from_file(&path)?;
        if let Some(auth_file) = config.session.auth_file.take() {
            config.session.auth_file = Some(expand_path(&auth_file));
        }
        Ok(config)
    }

    pub async fn save_to_path(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            ConfigurationError::ParseError {
                details: format!("Failed to serialize config: {e}"),
            }
        })?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Settings for the SDK client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api: self.api.clone(),
            session: self.session.clone(),
        }
    }

    /// Get configuration value by key
    pub fn get(&self, key: &str) -> Result<String> {
        self.to_map()
            .remove(canonical_key(key))
            .ok_or_else(|| unknown_key(key))
    }

    /// Set configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match canonical_key(key) {
            "api.base_url" => {
                url::Url::parse(value).map_err(|e| {
                    ConfigurationError::invalid_value(key, format!("not a valid URL: {e}"))
                })?;
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => self.api.timeout_secs = positive(key, value)?,
            "api.connect_timeout_secs" => self.api.connect_timeout_secs = positive(key, value)?,
            "session.redirect_delay_ms" => {
                self.session.redirect_delay_ms = value.parse().map_err(|_| {
                    ConfigurationError::invalid_value(key, "must be a whole number of milliseconds")
                })?;
            }
            "session.auth_file" => {
                self.session.auth_file = if value.is_empty() {
                    None
                } else {
                    Some(expand_path(Path::new(value)))
                };
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Get all configuration as key-value pairs
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("api.base_url", self.api.base_url.clone());
        map.insert("api.timeout_secs", self.api.timeout_secs.to_string());
        map.insert(
            "api.connect_timeout_secs",
            self.api.connect_timeout_secs.to_string(),
        );
        map.insert(
            "session.redirect_delay_ms",
            self.session.redirect_delay_ms.to_string(),
        );
        map.insert(
            "session.auth_file",
            self.session
                .auth_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        );
        map
    }

    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| {
            CliError::internal(format!("Failed to determine base directories: {e}"))
        })?;
        Ok(strategy.config_dir().join("autoeden"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}

/// Short aliases accepted on the command line
fn canonical_key(key: &str) -> &str {
    match key {
        "api-url" | "url" => "api.base_url",
        "timeout" => "api.timeout_secs",
        "auth-file" => "session.auth_file",
        other => other,
    }
}

fn unknown_key(key: &str) -> CliError {
    ConfigurationError::UnknownKey {
        key: key.to_string(),
    }
    .into()
}

fn positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigurationError::invalid_value(key, "must be a positive number").into()),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
        None => path.to_path_buf(),
    }
}
