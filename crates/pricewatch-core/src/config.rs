//! Client configuration, built once at startup and shared read-only.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::ConfigError;

pub const ENV_API_BASE: &str = "PRICEWATCH_API_BASE";
pub const ENV_API_KEY: &str = "PRICEWATCH_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "PRICEWATCH_TIMEOUT_MS";

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HISTORY_REFRESH_DELAY: Duration = Duration::from_millis(1_500);

/// Header carrying the static credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Connection settings for the price service.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    request_timeout: Duration,
    history_refresh_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_refresh_delay: DEFAULT_HISTORY_REFRESH_DELAY,
        })
    }

    /// Reads `PRICEWATCH_API_BASE`, `PRICEWATCH_API_KEY` and
    /// `PRICEWATCH_TIMEOUT_MS`. Only a malformed value is an error; a missing
    /// key leaves requests unauthenticated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var(ENV_API_BASE).unwrap_or_else(|_| String::from(DEFAULT_API_BASE));
        let mut config = Self::new(base_url)?;

        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config = config.with_api_key(key);
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            config = config.with_request_timeout(parse_timeout_ms(&raw)?);
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(api_key)
        };
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_history_refresh_delay(mut self, delay: Duration) -> Self {
        self.history_refresh_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub const fn history_refresh_delay(&self) -> Duration {
        self.history_refresh_delay
    }

    /// Joins `path` onto the base url.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_API_BASE),
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_refresh_delay: DEFAULT_HISTORY_REFRESH_DELAY,
        }
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("history_refresh_delay", &self.history_refresh_delay)
            .finish()
    }
}

/// Parses a positive millisecond count.
pub fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_owned(),
        }),
    }
}

fn normalize_base_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl {
            value: trimmed.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_when_joining() {
        let config = ClientConfig::new("https://api.example.test/prod//").expect("valid");
        assert_eq!(
            config.endpoint("/crypto/price"),
            "https://api.example.test/prod/crypto/price"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        let err = ClientConfig::new("ftp://example").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
        assert_eq!(ClientConfig::new("  "), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::default().with_api_key("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let config = ClientConfig::default().with_api_key("   ");
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout_ms("2500"), Ok(Duration::from_millis(2_500)));
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("soon").is_err());
    }
}
