//! Configuration Management
//!
//! Resolves the provider configuration for a run and handles the persisted
//! settings file for circlesync.
//!
//! Precedence for every option: explicit value > environment variable >
//! settings file > built-in default.

use crate::circleci::{Error, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const ENV_TOKEN: &str = "CIRCLECI_TOKEN";
pub const ENV_VCS_TYPE: &str = "CIRCLECI_VCS_TYPE";
pub const ENV_ORGANIZATION: &str = "CIRCLECI_ORGANIZATION";
pub const ENV_URL: &str = "CIRCLECI_URL";

pub const DEFAULT_VCS_TYPE: &str = "github";
pub const DEFAULT_URL: &str = "https://circleci.com/api/v2/";

/// Persisted, non-secret settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub vcs_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Settings {
    /// Get the settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("circlesync").join("config.json"))
    }

    /// Load settings from disk; a missing or unreadable file yields defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::path().context("No configuration directory on this platform")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(path)
    }
}

/// Values supplied explicitly by the caller (e.g. command-line flags)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_token: Option<String>,
    pub vcs_type: Option<String>,
    pub organization: Option<String>,
    pub url: Option<String>,
}

/// Validated configuration used to build the API client
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_token: String,
    pub vcs_type: String,
    pub organization: String,
    pub url: Url,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<redacted>")
            .field("vcs_type", &self.vcs_type)
            .field("organization", &self.organization)
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_token: &str, vcs_type: &str, organization: &str, url: &str) -> Result<Self> {
        if api_token.trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "api_token is required (set {} or pass --token)",
                ENV_TOKEN
            )));
        }
        if organization.trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "organization is required (set {} or pass --organization)",
                ENV_ORGANIZATION
            )));
        }
        if vcs_type.trim().is_empty() {
            return Err(Error::invalid_input("vcs_type must not be empty"));
        }

        let url = Url::parse(url)
            .map_err(|e| Error::invalid_input(format!("invalid url '{}': {}", url, e)))?;

        Ok(Self {
            api_token: api_token.to_string(),
            vcs_type: vcs_type.to_string(),
            organization: organization.to_string(),
            url,
        })
    }

    /// Resolve from overrides, the process environment and the settings file
    pub fn resolve(overrides: Overrides, settings: &Settings) -> Result<Self> {
        Self::resolve_with(overrides, settings, |key| std::env::var(key).ok())
    }

    /// Resolve using an explicit environment lookup
    pub fn resolve_with<F>(overrides: Overrides, settings: &Settings, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |explicit: Option<String>, key: &str, stored: &Option<String>| {
            explicit
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
                .or_else(|| stored.clone())
        };

        let api_token = lookup(overrides.api_token, ENV_TOKEN, &None).unwrap_or_default();
        let vcs_type = lookup(overrides.vcs_type, ENV_VCS_TYPE, &settings.vcs_type)
            .unwrap_or_else(|| DEFAULT_VCS_TYPE.to_string());
        let organization =
            lookup(overrides.organization, ENV_ORGANIZATION, &settings.organization)
                .unwrap_or_default();
        let url = lookup(overrides.url, ENV_URL, &settings.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        Self::new(&api_token, &vcs_type, &organization, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_required_values_given() {
        let config = ProviderConfig::resolve_with(
            Overrides::default(),
            &Settings::default(),
            env_of(&[(ENV_TOKEN, "tok"), (ENV_ORGANIZATION, "acme")]),
        )
        .unwrap();

        assert_eq!(config.api_token, "tok");
        assert_eq!(config.organization, "acme");
        assert_eq!(config.vcs_type, DEFAULT_VCS_TYPE);
        assert_eq!(config.url.as_str(), DEFAULT_URL);
    }

    #[test]
    fn test_explicit_beats_env_beats_settings() {
        let settings = Settings {
            organization: Some("from-file".into()),
            vcs_type: Some("bitbucket".into()),
            url: Some("https://file.example/api/v2/".into()),
        };
        let overrides = Overrides {
            organization: Some("from-flag".into()),
            ..Overrides::default()
        };
        let env = env_of(&[
            (ENV_TOKEN, "tok"),
            (ENV_ORGANIZATION, "from-env"),
            (ENV_URL, "https://env.example/api/v2/"),
        ]);

        let config = ProviderConfig::resolve_with(overrides, &settings, env).unwrap();
        assert_eq!(config.organization, "from-flag");
        assert_eq!(config.url.as_str(), "https://env.example/api/v2/");
        assert_eq!(config.vcs_type, "bitbucket");
    }

    #[test]
    fn test_missing_token_is_invalid_input() {
        let result = ProviderConfig::resolve_with(
            Overrides::default(),
            &Settings::default(),
            env_of(&[(ENV_ORGANIZATION, "acme")]),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_blank_organization_is_invalid_input() {
        let overrides = Overrides {
            api_token: Some("tok".into()),
            organization: Some("   ".into()),
            ..Overrides::default()
        };
        let result =
            ProviderConfig::resolve_with(overrides, &Settings::default(), env_of(&[]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_bad_url_is_invalid_input() {
        let result = ProviderConfig::new("tok", "github", "acme", "not a url");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig::new("super-secret", "github", "acme", DEFAULT_URL).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("acme"));
    }

    #[test]
    fn test_settings_round_trip_json() {
        let settings = Settings {
            organization: Some("acme".into()),
            vcs_type: None,
            url: None,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Settings::default());
    }
}
