//! Client configuration.

use std::time::Duration;

use magicstream_core::error::InvalidInputError;
use magicstream_core::{ApiUrl, Result};

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "MAGICSTREAM_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "MAGICSTREAM_TIMEOUT_SECS";

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed settings shared by every request: where the backend lives, how long
/// to wait, and how the client identifies itself.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeout and user agent.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("magicstream/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(ApiUrl::new(base_url.trim())?);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| InvalidInputError::Other {
                message: format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, raw),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
