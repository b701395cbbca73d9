//! Client Configuration Settings
//!
//! Configuration types for the prediction client, loaded from environment
//! variables.

use std::time::Duration;

use reqwest::Url;

use crate::infrastructure::store::DEFAULT_UPDATE_CAPACITY;
use crate::infrastructure::stream::DEFAULT_MAX_RECORD_BYTES;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default path of the streaming prediction endpoint.
pub const DEFAULT_STREAM_PATH: &str = "/make_prediction";

/// Default path of the prediction list endpoint.
pub const DEFAULT_LIST_PATH: &str = "/predictions";

/// Backend endpoint settings.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    /// Absolute base URL of the backend.
    pub base_url: Url,
    /// Path of the streaming prediction endpoint.
    pub stream_path: String,
    /// Path of the prediction list endpoint.
    pub list_path: String,
}

impl Default for EndpointSettings {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            list_path: DEFAULT_LIST_PATH.to_string(),
        }
    }
}

impl EndpointSettings {
    /// Full URL of the streaming endpoint.
    #[must_use]
    pub fn stream_url(&self) -> String {
        join_url(&self.base_url, &self.stream_path)
    }

    /// Full URL of the prediction list endpoint.
    #[must_use]
    pub fn list_url(&self) -> String {
        join_url(&self.base_url, &self.list_path)
    }
}

/// Stream handling settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Largest single record accepted by the frame parser.
    pub max_record_bytes: usize,
    /// Per-observer buffer of the state update channel.
    pub update_capacity: usize,
    /// Bound on connection establishment only; `None` disables it.
    pub connect_timeout: Option<Duration>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            update_capacity: DEFAULT_UPDATE_CAPACITY,
            connect_timeout: None,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Backend endpoints.
    pub endpoints: EndpointSettings,
    /// Stream handling.
    pub stream: StreamSettings,
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PREDICTION_API_URL` is set but is not an
    /// absolute http(s) URL, or a path variable is set to an empty value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match std::env::var("PREDICTION_API_URL") {
            Ok(raw) => parse_base_url(&raw)?,
            Err(_) => EndpointSettings::default().base_url,
        };

        let endpoints = EndpointSettings {
            base_url,
            stream_path: parse_env_path("PREDICTION_STREAM_PATH", DEFAULT_STREAM_PATH)?,
            list_path: parse_env_path("PREDICTION_LIST_PATH", DEFAULT_LIST_PATH)?,
        };

        let stream = StreamSettings {
            max_record_bytes: parse_env_usize(
                "PREDICTION_MAX_RECORD_BYTES",
                StreamSettings::default().max_record_bytes,
            ),
            update_capacity: parse_env_usize(
                "PREDICTION_UPDATE_CAPACITY",
                StreamSettings::default().update_capacity,
            ),
            connect_timeout: std::env::var("PREDICTION_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
        };

        Ok(Self { endpoints, stream })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Base URL does not parse or is not http(s).
    #[error("invalid API URL '{0}': must be an absolute http(s) URL")]
    InvalidUrl(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

/// Parse and validate a backend base URL.
///
/// # Errors
///
/// Returns `ConfigError::InvalidUrl` for relative or non-http(s) URLs.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}

fn join_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_env_path(key: &str, default: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Ok(v) => Ok(v.trim().to_string()),
        Err(_) => Ok(default.to_string()),
    }
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints() {
        let endpoints = EndpointSettings::default();
        assert_eq!(endpoints.stream_url(), "http://localhost:5000/make_prediction");
        assert_eq!(endpoints.list_url(), "http://localhost:5000/predictions");
    }

    #[test]
    fn join_handles_slashes() {
        let base = parse_base_url("https://api.example.com/v1/").unwrap();
        assert_eq!(
            join_url(&base, "/make_prediction"),
            "https://api.example.com/v1/make_prediction"
        );
        assert_eq!(
            join_url(&base, "predictions"),
            "https://api.example.com/v1/predictions"
        );
    }

    #[test]
    fn base_url_validation() {
        assert!(parse_base_url("http://127.0.0.1:5000").is_ok());
        assert!(matches!(
            parse_base_url("localhost:5000/api"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_base_url("/relative"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn stream_settings_defaults() {
        let settings = StreamSettings::default();
        assert_eq!(settings.max_record_bytes, 1024 * 1024);
        assert_eq!(settings.update_capacity, 256);
        assert!(settings.connect_timeout.is_none());
    }
}
