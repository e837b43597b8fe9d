//! Layered configuration loading
//!
//! Every configuration struct in the workspace is resolved the same way:
//! serialized defaults, then an optional TOML file, then environment
//! variables carrying the struct's prefix (`__` separates nested keys, so
//! `AUTOEDEN_API__BASE_URL` sets `api.base_url`).

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Loader for configuration structs backed by figment
pub trait ConfigLoader: Serialize + DeserializeOwned + Default {
    /// Environment variable prefix, e.g. `AUTOEDEN_`
    const ENV_PREFIX: &'static str;

    /// File consulted when no explicit path is given
    const DEFAULT_FILE: &'static str;

    /// Load from `path` (or the default file) and the environment
    fn load(path: Option<PathBuf>) -> Result<Self, ConfigurationError> {
        let path = path.unwrap_or_else(|| PathBuf::from(Self::DEFAULT_FILE));
        Self::load_from_file(&path)
    }

    /// Load from a specific TOML file and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })
    }

    /// Re-apply environment overrides on top of an existing value
    fn apply_env_overrides(config: &mut Self) -> Result<(), ConfigurationError> {
        *config = Figment::from(Serialized::defaults(&*config))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })?;
        Ok(())
    }

    /// Render the defaults as a TOML example
    fn generate_example() -> Result<String, ConfigurationError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigurationError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Nested {
        retries: u32,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".to_string(),
                nested: Nested { retries: 3 },
            }
        }
    }

    impl ConfigLoader for Sample {
        const ENV_PREFIX: &'static str = "SAMPLE_";
        const DEFAULT_FILE: &'static str = "sample.toml";
    }

    #[test]
    fn test_defaults_when_file_missing() {
        figment::Jail::expect_with(|_jail| {
            let config = Sample::load(None).expect("defaults should load");
            assert_eq!(config, Sample::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                name = "from-file"
                [nested]
                retries = 7
                "#,
            )?;
            jail.set_env("SAMPLE_NESTED__RETRIES", "9");

            let config = Sample::load_from_file(Path::new("custom.toml"))
                .expect("config should load");
            assert_eq!(config.name, "from-file");
            assert_eq!(config.nested.retries, 9);
            Ok(())
        });
    }

    #[test]
    fn test_apply_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SAMPLE_NAME", "from-env");
            let mut config = Sample::default();
            Sample::apply_env_overrides(&mut config).expect("overrides should apply");
            assert_eq!(config.name, "from-env");
            assert_eq!(config.nested.retries, 3);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "name = [")?;
            let err = Sample::load_from_file(Path::new("broken.toml")).unwrap_err();
            assert!(matches!(err, ConfigurationError::ParseError { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_generate_example_round_trips() {
        let example = Sample::generate_example().unwrap();
        assert!(example.contains("name = \"default\""));
        assert!(example.contains("[nested]"));
    }
}
