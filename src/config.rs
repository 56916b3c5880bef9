//! Environment-driven configuration
//!
//! The API key, daily request ceiling, and origin base URL are read once at
//! startup into an explicit `Config` value that is passed to consumers,
//! keeping the rest of the crate free of environment access.

use std::env;

use thiserror::Error;

/// Environment variable holding the recipe API key.
pub const API_KEY_VAR: &str = "SPOONACULAR_API_KEY";

/// Environment variable overriding the daily request ceiling.
pub const DAILY_LIMIT_VAR: &str = "FORKFUL_DAILY_LIMIT";

/// Environment variable overriding the API origin. Mainly a test seam.
pub const BASE_URL_VAR: &str = "FORKFUL_BASE_URL";

/// Default ceiling on origin requests per calendar day.
pub const DEFAULT_DAILY_LIMIT: u32 = 20;

/// Default recipe API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key in the environment
    #[error("missing API key: set the SPOONACULAR_API_KEY environment variable")]
    MissingApiKey,

    /// The daily limit override is not a number
    #[error("invalid daily limit '{0}': expected a non-negative integer")]
    InvalidDailyLimit(String),
}

/// Runtime configuration for the recipe client
#[derive(Debug, Clone)]
pub struct Config {
    /// API key appended to every outbound request
    pub api_key: String,
    /// Origin the request paths are resolved against
    pub base_url: String,
    /// Maximum origin requests per calendar day
    pub daily_limit: u32,
}

impl Config {
    /// Creates a config with the default origin and daily limit.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            daily_limit: DEFAULT_DAILY_LIMIT,
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Returns
    /// * `Ok(Config)` when an API key is present and overrides parse
    /// * `Err(ConfigError)` otherwise
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::var(API_KEY_VAR).ok(),
            env::var(DAILY_LIMIT_VAR).ok(),
            env::var(BASE_URL_VAR).ok(),
        )
    }

    fn from_vars(
        api_key: Option<String>,
        daily_limit: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let daily_limit = match daily_limit {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidDailyLimit(raw))?,
            None => DEFAULT_DAILY_LIMIT,
        };

        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            daily_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_when_only_key_is_set() {
        let config = Config::from_vars(Some("abc123".to_string()), None, None).unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.daily_limit, DEFAULT_DAILY_LIMIT);
    }

    #[test]
    fn test_default_daily_limit_is_twenty() {
        assert_eq!(DEFAULT_DAILY_LIMIT, 20);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let result = Config::from_vars(None, None, None);
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_blank_key_is_an_error() {
        let result = Config::from_vars(Some("   ".to_string()), None, None);
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_daily_limit_override() {
        let config =
            Config::from_vars(Some("key".to_string()), Some("5".to_string()), None).unwrap();
        assert_eq!(config.daily_limit, 5);
    }

    #[test]
    fn test_invalid_daily_limit_is_an_error() {
        let result = Config::from_vars(Some("key".to_string()), Some("lots".to_string()), None);
        match result {
            Err(ConfigError::InvalidDailyLimit(raw)) => assert_eq!(raw, "lots"),
            other => panic!("Expected InvalidDailyLimit, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_override_trims_trailing_slash() {
        let config = Config::from_vars(
            Some("key".to_string()),
            None,
            Some("http://127.0.0.1:9000/".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }
}
