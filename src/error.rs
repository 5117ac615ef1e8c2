//! Error types for flight-search-mcp.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include credentials.
//! Configuration errors name the offending variable, never its value when the
//! variable holds a secret.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur while loading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set (or is empty).
    #[error("missing required environment variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// An environment variable is set but its value is unusable.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Name of the offending variable.
        name: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors produced by the flight service pipeline.
///
/// The variant is the classification: retry decisions are a `match` on it,
/// never on message text.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The tool arguments failed validation. Never reaches the provider.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The provider answered with a non-2xx status.
    #[error("provider returned HTTP {status}: {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Vendor error code, when the body carried one.
        code: Option<String>,
        /// Vendor error title/detail.
        message: String,
    },

    /// Transport-level failure talking to the provider.
    #[error("network error: {message}")]
    Network {
        /// Description of the failure.
        message: String,
    },

    /// Anything that doesn't fit the categories above.
    #[error("{message}")]
    Unknown {
        /// Description of the failure.
        message: String,
    },
}

impl ServiceError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    /// Whether a retry may succeed where this attempt failed.
    ///
    /// Network failures and provider 5xx/429/408 responses are transient;
    /// everything else fails fast.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Provider { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Validation(_) | Self::Unknown { .. } => false,
        }
    }

    /// Convenience constructor for unclassified failures.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Unknown {
                message: format!("failed to decode provider response: {e}"),
            };
        }
        if let Some(status) = e.status() {
            return Self::Provider {
                status: status.as_u16(),
                code: None,
                message: e.to_string(),
            };
        }
        // connect, timeout, request and body errors all happen on the wire
        Self::Network {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Violation;

    fn provider(status: u16) -> ServiceError {
        ServiceError::Provider {
            status,
            code: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn config_error_display() {
        let error = ConfigError::MissingVariable {
            name: "AMADEUS_CLIENT_ID",
        };
        let msg = error.to_string();
        assert!(msg.contains("missing"));
        assert!(msg.contains("AMADEUS_CLIENT_ID"));
    }

    #[test]
    fn invalid_value_display() {
        let error = ConfigError::InvalidValue {
            name: "PORT",
            message: "not a number".to_string(),
        };
        assert!(error.to_string().contains("not a number"));
    }

    #[test]
    fn transient_provider_statuses_are_retryable() {
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(provider(status).is_retryable(), "{status} should retry");
        }
    }

    #[test]
    fn client_errors_fail_fast() {
        for status in [400, 401, 403, 404, 422] {
            assert!(!provider(status).is_retryable(), "{status} should not retry");
        }
    }

    #[test]
    fn network_retries_and_validation_does_not() {
        let network = ServiceError::Network {
            message: "connection reset".to_string(),
        };
        assert!(network.is_retryable());

        let validation = ServiceError::from(ValidationErrors::from(vec![Violation::new(
            "origin",
            "must be a 3-letter IATA code",
            Some(serde_json::json!("LH")),
        )]));
        assert!(!validation.is_retryable());
        assert!(!ServiceError::unknown("odd").is_retryable());
    }

    #[test]
    fn every_variant_has_a_code() {
        assert_eq!(provider(500).code(), "PROVIDER_ERROR");
        assert_eq!(ServiceError::unknown("x").code(), "UNKNOWN_ERROR");
        assert_eq!(
            ServiceError::Network {
                message: String::new()
            }
            .code(),
            "NETWORK_ERROR"
        );
        assert_eq!(
            ServiceError::Validation(ValidationErrors::default()).code(),
            "VALIDATION_ERROR"
        );
    }
}
