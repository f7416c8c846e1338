//! Creatomate client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{CreatomateError, CreatomateResult};
use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.creatomate.com/v1";

/// Creatomate client configuration.
#[derive(Debug, Clone)]
pub struct CreatomateConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl CreatomateConfig {
    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> CreatomateResult<Self> {
        let api_key = std::env::var("CREATOMATE_API_KEY")
            .map_err(|_| CreatomateError::config("CREATOMATE_API_KEY must be set"))?;

        if api_key.trim().is_empty() {
            return Err(CreatomateError::config("CREATOMATE_API_KEY cannot be empty"));
        }

        let timeout_secs: u64 = std::env::var("CREATOMATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("CREATOMATE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let config = Self {
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            ..Self::new(api_key)
        }
        .with_base_url(
            std::env::var("CREATOMATE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        );

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> CreatomateResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            CreatomateError::config(format!("Invalid CREATOMATE_BASE_URL '{}': {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(CreatomateError::config(format!(
                "Unsupported CREATOMATE_BASE_URL scheme: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "CREATOMATE_API_KEY",
            "CREATOMATE_BASE_URL",
            "CREATOMATE_TIMEOUT_SECS",
            "CREATOMATE_CONNECT_TIMEOUT_SECS",
            "CREATOMATE_MAX_RETRIES",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear_env();
        let err = CreatomateConfig::from_env().unwrap_err();
        assert!(matches!(err, CreatomateError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("CREATOMATE_API_KEY", "key");

        let config = CreatomateConfig::from_env().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 2);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("CREATOMATE_API_KEY", "key");
        std::env::set_var("CREATOMATE_BASE_URL", "http://localhost:9000/v1/");
        std::env::set_var("CREATOMATE_TIMEOUT_SECS", "3");
        std::env::set_var("CREATOMATE_MAX_RETRIES", "0");

        let config = CreatomateConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry.max_retries, 0);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_base_url() {
        clear_env();
        std::env::set_var("CREATOMATE_API_KEY", "key");
        std::env::set_var("CREATOMATE_BASE_URL", "ftp://example.com");

        assert!(matches!(
            CreatomateConfig::from_env(),
            Err(CreatomateError::Config(_))
        ));

        clear_env();
    }
}
