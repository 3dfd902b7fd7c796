//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIDEPOOL_API_BASE_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `TIDEPOOL_API_TOKEN` - Account token for an already-authenticated
//!   session (normally attached later by the login flow)
//! - `TIDEPOOL_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront REST API.
    pub api_base_url: Url,
    /// Account token, if a session already exists.
    pub api_token: Option<SecretString>,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("TIDEPOOL_API_BASE_URL")?)?;
        let api_token = get_optional_env("TIDEPOOL_API_TOKEN").map(SecretString::from);
        let timeout_secs = get_env_or_default(
            "TIDEPOOL_REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TIDEPOOL_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create a configuration pointing at a known base URL, with defaults
    /// for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not a usable HTTP base.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate an API base URL.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidEnvVar("TIDEPOOL_API_BASE_URL".to_string(), e.to_string())
    })?;

    if url.cannot_be_a_base() || (url.scheme() != "http" && url.scheme() != "https") {
        return Err(ConfigError::InvalidEnvVar(
            "TIDEPOOL_API_BASE_URL".to_string(),
            format!("not a usable HTTP base URL: {value}"),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_accepts_https() {
        let url = parse_base_url("https://api.tidepool.shop/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.tidepool.shop/v1");
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("mailto:shop@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ClientConfig::for_base_url("https://api.tidepool.shop").unwrap();
        config.api_token = Some(SecretString::from("kx9!very-secret-token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-secret-token"));
    }
}
