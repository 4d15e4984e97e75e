//! Configuration management for the storefront client.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::environment::DEFAULT_SEARCH_DEBOUNCE;
use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use storefront_api::DEFAULT_API_URL;

/// Default location of the durable credential file
pub const DEFAULT_STATE_PATH: &str = ".storefront/state.json";

/// Default time an operation may take before the caller gives up on it
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL (`API_URL`)
    pub api_url: String,
    /// Durable storage file (`STOREFRONT_STATE_PATH`)
    pub state_path: PathBuf,
    /// How long an operation waits for its result
    /// (`STOREFRONT_OPERATION_TIMEOUT_SECS`)
    pub operation_timeout: Duration,
    /// Quiet period before a filter change reloads the catalog
    /// (`STOREFRONT_SEARCH_DEBOUNCE_MS`)
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            state_path: lookup("STOREFRONT_STATE_PATH").map_or(defaults.state_path, PathBuf::from),
            operation_timeout: parse(&lookup, "STOREFRONT_OPERATION_TIMEOUT_SECS")?
                .map_or(defaults.operation_timeout, Duration::from_secs),
            search_debounce: parse(&lookup, "STOREFRONT_SEARCH_DEBOUNCE_MS")?
                .map_or(defaults.search_debounce, Duration::from_millis),
        })
    }

    /// Override the backend base URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the durable storage file
    #[must_use]
    pub fn with_state_path(mut self, state_path: impl Into<PathBuf>) -> Self {
        self.state_path = state_path.into();
        self
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}
