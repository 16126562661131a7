//! Optional TOML settings file.
//!
//! ```toml
//! [resolver]
//! candidate_limit = 5
//! min_score = 70
//!
//! [spider]
//! radius_deg = 0.3
//!
//! [geocoder]
//! service = "photon"
//! user_agent = "my-org-incident-map/1.0"
//! ```
//!
//! Every section and key is optional. Command-line flags override the file,
//! and the file fills in anything the flags and environment leave unset.

use std::path::Path;

use cbrne_map_resolver::ResolverConfig;
use cbrne_map_spatial::SpiderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable selecting the geocoding service id.
pub const GEOCODER_ENV: &str = "CBRNE_MAP_GEOCODER";

/// Environment variable overriding the HTTP `User-Agent`.
pub const USER_AGENT_ENV: &str = "CBRNE_MAP_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub service: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub spider: SpiderConfig,
    pub geocoder: GeocoderSettings,
}

impl AppConfig {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input or unknown value
    /// types.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads settings from `path`, or returns defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config = Self::from_toml(&std::fs::read_to_string(path)?)?;
        log::debug!("Loaded settings from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Service id: flag, then `CBRNE_MAP_GEOCODER`, then the file.
    #[must_use]
    pub fn service_id(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| non_empty_env(GEOCODER_ENV))
            .or_else(|| self.geocoder.service.clone())
    }

    /// User agent: `CBRNE_MAP_USER_AGENT`, then the file, then the built-in
    /// default.
    #[must_use]
    pub fn user_agent(&self) -> String {
        non_empty_env(USER_AGENT_ENV)
            .or_else(|| self.geocoder.user_agent.clone())
            .unwrap_or_else(|| cbrne_map_geocoder::DEFAULT_USER_AGENT.to_string())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml(
            "[resolver]\nmin_score = 80\n\n[spider]\nradius_deg = 0.05\n",
        )
        .unwrap();

        assert_eq!(config.resolver.min_score, 80);
        assert_eq!(config.resolver.candidate_limit, 5);
        assert!((config.spider.radius_deg - 0.05).abs() < f64::EPSILON);
        assert!(config.geocoder.service.is_none());
    }

    #[test]
    fn rejects_wrong_value_types() {
        assert!(matches!(
            AppConfig::from_toml("[resolver]\nmin_score = \"high\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_path_is_defaults_and_missing_file_is_an_error() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());

        let path = std::env::temp_dir().join("cbrne_map_no_such_config.toml");
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn explicit_service_flag_wins() {
        let config = AppConfig {
            geocoder: GeocoderSettings {
                service: Some("photon".to_string()),
                user_agent: None,
            },
            ..AppConfig::default()
        };

        assert_eq!(
            config.service_id(Some("nominatim_local")).as_deref(),
            Some("nominatim_local")
        );
    }
}
