//! Notes feed configuration.
//!
//! Configuration is loaded from environment variables (`MAPNOTES_*`
//! prefixed), falling back to the defaults in `mapnotes_core::defaults`.
//!
//! # Example
//!
//! ```rust,no_run
//! use mapnotes_feed::config::FeedConfig;
//!
//! let config = FeedConfig::from_env();
//! config.validate().expect("invalid feed config");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::debug;

use mapnotes_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for mapnotes_core::Error {
    fn from(e: ConfigError) -> Self {
        mapnotes_core::Error::Config(e.to_string())
    }
}

/// Notes feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the notes service (without the `api/0.6` path).
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Zoom drift tolerated before the viewport cache refetches.
    pub zoom_threshold: i32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::API_URL.to_string(),
            timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            user_agent: defaults::USER_AGENT.to_string(),
            zoom_threshold: defaults::ZOOM_THRESHOLD,
        }
    }
}

impl FeedConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MAPNOTES_API_URL` | `https://api.openstreetmap.org` | Notes service base URL |
    /// | `MAPNOTES_FETCH_TIMEOUT_SECS` | `30` | Request timeout |
    /// | `MAPNOTES_USER_AGENT` | `mapnotes/<version>` | User-Agent header |
    /// | `MAPNOTES_ZOOM_THRESHOLD` | `1` | Cache zoom tolerance |
    pub fn from_env() -> Self {
        let api_url =
            env::var("MAPNOTES_API_URL").unwrap_or_else(|_| defaults::API_URL.to_string());

        let timeout_secs = env::var("MAPNOTES_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::FETCH_TIMEOUT_SECS);

        let user_agent =
            env::var("MAPNOTES_USER_AGENT").unwrap_or_else(|_| defaults::USER_AGENT.to_string());

        let zoom_threshold = env::var("MAPNOTES_ZOOM_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults::ZOOM_THRESHOLD)
            .max(0);

        debug!(api_url = %api_url, timeout_secs, zoom_threshold, "Loaded feed config");

        Self {
            api_url,
            timeout_secs,
            user_agent,
            zoom_threshold,
        }
    }

    /// Point the feed at a different service.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_url.is_empty() {
            return Err(ConfigError::Validation(
                "api_url cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api_url must start with http:// or https://, got: {}",
                self.api_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FeedConfig::default();
        assert_eq!(config.api_url, "https://api.openstreetmap.org");
        assert_eq!(config.zoom_threshold, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = FeedConfig::default().with_api_url("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = FeedConfig::default().with_api_url("ftp://example.org");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = FeedConfig::default().with_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_converts_to_core_error() {
        let err: mapnotes_core::Error = ConfigError::Validation("bad".to_string()).into();
        assert!(matches!(err, mapnotes_core::Error::Config(_)));
    }
}
