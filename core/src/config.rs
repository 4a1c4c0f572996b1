//! Client configuration loaded with figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`FEEDBACK_BASE_URL`, `FEEDBACK_API_VERSION`)
//! 2. An optional TOML file passed to [`ClientConfig::load_from`]
//! 3. Built-in defaults

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "FEEDBACK_";

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Where the feedback API lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix, e.g. `https://api.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version segment inserted before the resource path, e.g. `v1`.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, api_version: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_version: api_version.to_string(),
        }
        .normalized()
    }

    /// Defaults overlaid with `FEEDBACK_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Defaults, then `path` (if it exists), then the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::extract(Self::figment_with_file(path.as_ref()))
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn figment_with_file(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Strip the trailing `/` from the base URL and surrounding `/` from the
    /// version.
    pub fn normalized(self) -> Self {
        Self {
            base_url: self.base_url.trim().trim_end_matches('/').to_string(),
            api_version: self.api_version.trim().trim_matches('/').to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.api_version.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_version".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `{base}/{version}/{resource}`.
    pub(crate) fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, resource.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_version, "v1");
    }

    #[test]
    fn new_normalizes_slashes() {
        let config = ClientConfig::new("http://shop.test/api/", "/v2/");
        assert_eq!(config.base_url, "http://shop.test/api");
        assert_eq!(config.api_version, "v2");
        assert_eq!(config.endpoint("feedback/feedback"), "http://shop.test/api/v2/feedback/feedback");
    }

    #[test]
    fn env_overrides_file_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "feedback.toml",
                r#"
                    base_url = "https://file.example/"
                    api_version = "v3"
                "#,
            )?;
            jail.set_env("FEEDBACK_API_VERSION", "v9");

            let config = ClientConfig::load_from("feedback.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.base_url, "https://file.example");
            assert_eq!(config.api_version, "v9");
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config = ClientConfig::load_from("absent.toml").map_err(|e| e.to_string())?;
            assert_eq!(config, ClientConfig::default());
            Ok(())
        });
    }

    #[test]
    fn empty_version_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("FEEDBACK_API_VERSION", "/");
            let err = ClientConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "api_version"));
            Ok(())
        });
    }
}
