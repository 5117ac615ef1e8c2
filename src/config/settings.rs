//! Configuration structures.
//!
//! These structures hold the values read from the environment, already
//! parsed and defaulted.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::provider::AmadeusConfig;
use crate::retry::RetryPolicy;

/// Root configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credentials and endpoint.
    pub amadeus: AmadeusSettings,

    /// Server identity and HTTP settings.
    pub server: ServerSettings,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Provider request rate hint.
    pub rate_limit_per_second: u32,

    /// Total attempts per provider call.
    pub max_retries: u32,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amadeus.client_id.trim().is_empty() {
            return Err(ConfigError::MissingVariable {
                name: "AMADEUS_CLIENT_ID",
            });
        }
        if self.amadeus.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingVariable {
                name: "AMADEUS_CLIENT_SECRET",
            });
        }
        if let Some(ref url) = self.amadeus.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "AMADEUS_BASE_URL '{url}' must start with http:// or https://"
                    ),
                });
            }
        }
        if self.rate_limit_per_second == 0 {
            return Err(ConfigError::ValidationError {
                message: "RATE_LIMIT_REQUESTS_PER_SECOND must be at least 1".to_string(),
            });
        }
        if !(1..=10).contains(&self.max_retries) {
            return Err(ConfigError::ValidationError {
                message: format!("MAX_RETRIES must be between 1 and 10, got {}", self.max_retries),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "PORT must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }

    /// Provider URL: the explicit override, else the environment's host.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.amadeus
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.amadeus.environment.base_url())
    }

    /// Minimum spacing between provider requests.
    #[must_use]
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate_limit_per_second.max(1)
    }

    /// Retry policy for provider calls.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_retries)
    }

    /// Connection settings for the provider client.
    #[must_use]
    pub fn amadeus_config(&self) -> AmadeusConfig {
        AmadeusConfig {
            client_id: self.amadeus.client_id.clone(),
            client_secret: self.amadeus.client_secret.clone(),
            base_url: self.base_url().to_string(),
            min_request_interval: self.min_request_interval(),
        }
    }
}

/// Which Amadeus environment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmadeusEnvironment {
    /// Free sandbox with cached data.
    #[default]
    Test,
    /// Live data.
    Production,
}

impl AmadeusEnvironment {
    /// Host for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Test => "https://test.api.amadeus.com",
            Self::Production => "https://api.amadeus.com",
        }
    }
}

impl std::str::FromStr for AmadeusEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(format!("'{other}' is not one of: test, production")),
        }
    }
}

/// Provider credentials.
#[derive(Clone)]
pub struct AmadeusSettings {
    /// API key.
    pub client_id: String,
    /// API secret. Never logged.
    pub client_secret: String,
    /// Target environment.
    pub environment: AmadeusEnvironment,
    /// Explicit base URL, overriding `environment`.
    pub base_url: Option<String>,
}

impl fmt::Debug for AmadeusSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmadeusSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Server identity and HTTP transport settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Name reported in `initialize`.
    pub name: String,
    /// Version reported in `initialize` and `/health`.
    pub version: String,
    /// HTTP listen port.
    pub port: u16,
    /// `Access-Control-Allow-Origin` value.
    pub cors_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            port: DEFAULT_PORT,
            cors_origin: "*".to_string(),
        }
    }
}

/// Default server name.
pub const DEFAULT_SERVER_NAME: &str = "flight-search-mcp";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default provider request rate.
pub const DEFAULT_RATE_LIMIT: u32 = 10;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
