//! Configuration loading from environment variables.
//!
//! # Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AMADEUS_CLIENT_ID` | required |
//! | `AMADEUS_CLIENT_SECRET` | required |
//! | `AMADEUS_ENVIRONMENT` | `test` |
//! | `AMADEUS_BASE_URL` | derived from the environment |
//! | `MCP_SERVER_NAME` | `flight-search-mcp` |
//! | `MCP_SERVER_VERSION` | crate version |
//! | `LOG_LEVEL` | `info` |
//! | `RATE_LIMIT_REQUESTS_PER_SECOND` | `10` |
//! | `MAX_RETRIES` | `3` |
//! | `PORT` | `3000` |
//! | `CORS_ORIGIN` | `*` |
//!
//! Empty values count as unset.

mod settings;

pub use settings::{
    AmadeusEnvironment, AmadeusSettings, Config, LoggingConfig, ServerSettings, DEFAULT_PORT,
    DEFAULT_RATE_LIMIT, DEFAULT_SERVER_NAME,
};

use std::str::FromStr;

use crate::error::ConfigError;
use crate::retry::DEFAULT_MAX_ATTEMPTS;

/// Loads the configuration from the process environment.
///
/// # Errors
///
/// Returns an error if:
/// - A required variable is missing
/// - A value cannot be parsed
/// - A value is out of range
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Loads the configuration through `lookup`, which maps a variable name to
/// its value.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    let required = |name: &'static str| get(name).ok_or(ConfigError::MissingVariable { name });

    let defaults = ServerSettings::default();
    let config = Config {
        amadeus: AmadeusSettings {
            client_id: required("AMADEUS_CLIENT_ID")?,
            client_secret: required("AMADEUS_CLIENT_SECRET")?,
            environment: parse_or(
                get("AMADEUS_ENVIRONMENT"),
                "AMADEUS_ENVIRONMENT",
                AmadeusEnvironment::Test,
            )?,
            base_url: get("AMADEUS_BASE_URL"),
        },
        server: ServerSettings {
            name: get("MCP_SERVER_NAME").unwrap_or(defaults.name),
            version: get("MCP_SERVER_VERSION").unwrap_or(defaults.version),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            cors_origin: get("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        },
        logging: LoggingConfig {
            level: get("LOG_LEVEL")
                .map(|level| level.trim().to_ascii_lowercase())
                .unwrap_or_else(|| LoggingConfig::default().level),
        },
        rate_limit_per_second: parse_or(
            get("RATE_LIMIT_REQUESTS_PER_SECOND"),
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            DEFAULT_RATE_LIMIT,
        )?,
        max_retries: parse_or(get("MAX_RETRIES"), "MAX_RETRIES", DEFAULT_MAX_ATTEMPTS)?,
    };

    config.validate()?;
    Ok(config)
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            message: format!("'{raw}': {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        load_config_from(|name| vars.get(name).cloned())
    }

    const CREDENTIALS: [(&str, &str); 2] = [
        ("AMADEUS_CLIENT_ID", "id"),
        ("AMADEUS_CLIENT_SECRET", "secret"),
    ];

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = load(&CREDENTIALS).unwrap();
        assert_eq!(config.amadeus.environment, AmadeusEnvironment::Test);
        assert_eq!(config.base_url(), "https://test.api.amadeus.com");
        assert_eq!(config.server.name, "flight-search-mcp");
        assert_eq!(config.server.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origin, "*");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.rate_limit_per_second, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = load(&[("AMADEUS_CLIENT_ID", "id")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: "AMADEUS_CLIENT_SECRET"
            }
        ));

        let err = load(&[("AMADEUS_CLIENT_ID", "  "), ("AMADEUS_CLIENT_SECRET", "s")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: "AMADEUS_CLIENT_ID"
            }
        ));
    }

    #[test]
    fn overrides_are_applied() {
        let mut vars = CREDENTIALS.to_vec();
        vars.extend([
            ("AMADEUS_ENVIRONMENT", "production"),
            ("MCP_SERVER_NAME", "flights"),
            ("LOG_LEVEL", "DEBUG"),
            ("RATE_LIMIT_REQUESTS_PER_SECOND", "5"),
            ("MAX_RETRIES", "5"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "https://app.example.com"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.base_url(), "https://api.amadeus.com");
        assert_eq!(config.server.name, "flights");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.rate_limit_per_second, 5);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origin, "https://app.example.com");
    }

    #[test]
    fn malformed_numbers_are_invalid_values() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("PORT", "eighty"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn unknown_environment_is_invalid() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("AMADEUS_ENVIRONMENT", "staging"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue {
                name: "AMADEUS_ENVIRONMENT",
                ..
            })
        ));
    }

    #[test]
    fn retries_out_of_range_fail_validation() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("MAX_RETRIES", "20"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
