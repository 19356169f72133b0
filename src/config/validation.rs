//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("deferred.timeout_after_ms must be greater than zero")]
    ZeroTimeout,

    #[error("deferred.failed_status {0} is not a 4xx or 5xx status code")]
    InvalidFailedStatus(u16),

    #[error("content.path must not be empty")]
    EmptyContentPath,
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.deferred.timeout_after_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if !(400..=599).contains(&config.deferred.failed_status) {
        errors.push(ValidationError::InvalidFailedStatus(
            config.deferred.failed_status,
        ));
    }

    if config.content.path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyContentPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
