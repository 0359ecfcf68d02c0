//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check that endpoint URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AutConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;

use crate::config::schema::AutConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &AutConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(endpoint) = &config.rpc_endpoint {
        match url::Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "rpc_endpoint",
                format!("unsupported scheme '{}' (expected http or https)", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("rpc_endpoint", e.to_string())),
        }
    }

    if let Some(validator) = &config.validator {
        if validator.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "validator",
                format!("'{validator}' is not an address"),
            ));
        }
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }
    if config.transactions.wait_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transactions.wait_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.transactions.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "transactions.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if config.transactions.fallback_gas_limit == Some(0) {
        errors.push(ValidationError::new(
            "transactions.fallback_gas_limit",
            "must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
