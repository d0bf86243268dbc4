//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and endpoint URLs
//! - Validate value ranges (timeouts > 0, concurrency > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.provider.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError {
            field: "provider.rpc_url",
            message: format!("invalid URL '{}': {}", config.provider.rpc_url, e),
        });
    }

    for failover in &config.provider.failover_urls {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError {
                field: "provider.failover_urls",
                message: format!("invalid URL '{}': {}", failover, e),
            });
        }
    }

    if config.provider.rpc_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "provider.rpc_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.provider.account_poll_secs == 0 {
        errors.push(ValidationError {
            field: "provider.account_poll_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.contracts.main_address.is_empty() {
        errors.push(ValidationError {
            field: "contracts.main_address",
            message: "is required".to_string(),
        });
    } else if let Err(e) = config.contracts.main_address.parse::<Address>() {
        errors.push(ValidationError {
            field: "contracts.main_address",
            message: format!("invalid address: {}", e),
        });
    }

    if config.listing.max_concurrent_reads == 0 {
        errors.push(ValidationError {
            field: "listing.max_concurrent_reads",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!("invalid socket address '{}'", config.observability.metrics_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
