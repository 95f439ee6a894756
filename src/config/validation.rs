//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, time zone and header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use chrono_tz::Tz;

use crate::config::schema::AppConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    UnknownTimeZone(String),
    InvalidSecurityPolicy(String),
    ZeroShutdownTimeout,
    InvalidMetricsAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(a) => write!(f, "invalid bind address {:?}", a),
            ValidationError::UnknownTimeZone(tz) => write!(f, "unknown time zone {:?}", tz),
            ValidationError::InvalidSecurityPolicy(e) => {
                write!(f, "invalid security policy: {}", e)
            }
            ValidationError::ZeroShutdownTimeout => write!(f, "shutdown timeout must be positive"),
            ValidationError::InvalidMetricsAddress(a) => {
                write!(f, "invalid metrics address {:?}", a)
            }
        }
    }
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(name) = &config.location {
        if name.parse::<Tz>().is_err() {
            errors.push(ValidationError::UnknownTimeZone(name.clone()));
        }
    }

    if let Err(e) = config.security().headers() {
        errors.push(ValidationError::InvalidSecurityPolicy(e.to_string()));
    }

    if config.run.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
