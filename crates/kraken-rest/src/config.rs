//! Client configuration

use crate::error::{RestError, RestResult};
use crate::transport::TransportConfig;
use kraken_auth::Credentials;
use std::time::Duration;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Path segment selecting the API version
pub const DEFAULT_API_VERSION: &str = "0";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "KRAKEN_API_URL";
/// Environment variable overriding the API version
pub const API_VERSION_ENV: &str = "KRAKEN_API_VERSION";
/// Environment variable overriding the timeout, in seconds
pub const TIMEOUT_ENV: &str = "KRAKEN_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (optional, required for private endpoints)
    pub credentials: Option<Credentials>,
    /// Base URL without trailing slash
    pub base_url: String,
    /// API version path segment
    pub api_version: String,
    /// Verify the server's TLS certificate
    pub verify_tls: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            verify_tls: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the environment
    ///
    /// Credentials are loaded when `KRAKEN_API_KEY` is set; a set key with a
    /// missing or malformed `KRAKEN_PRIVATE_KEY` is an error.
    pub fn from_env() -> RestResult<Self> {
        let mut config = Self::default();

        if std::env::var_os(kraken_auth::API_KEY_ENV).is_some() {
            config.credentials = Some(Credentials::from_env()?);
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(url);
        }
        if let Ok(version) = std::env::var(API_VERSION_ENV) {
            config = config.with_api_version(version);
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            let secs = secs.trim().parse().map_err(|_| {
                RestError::Configuration(format!("{} must be a whole number of seconds", TIMEOUT_ENV))
            })?;
            config = config.with_timeout(secs);
        }

        Ok(config)
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the base URL (e.g. a sandbox or proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API version path segment
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into().trim_matches('/').to_string();
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> RestResult<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(RestError::Configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.api_version.is_empty() {
            return Err(RestError::Configuration("API version is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RestError::Configuration("timeout must be at least one second".to_string()));
        }
        Ok(())
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            verify_tls: self.verify_tls,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| concat!("kraken-rest/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}
