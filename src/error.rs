//! User-facing error type at the command boundary.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::auth::AuthError;
use crate::blockchain::BlockchainError;
use crate::config::ConfigError;
use crate::value::ValueError;

/// Every way a command can fail.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The transaction was mined but reverted.
    #[error("Transaction {0} failed (status 0)")]
    TransactionFailed(TxHash),

    #[error("Signature invalid")]
    SignatureInvalid,

    #[error("Interrupted")]
    Interrupted,
}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Shorthand for [`CliError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_messages_pass_through() {
        let err = CliError::from(ValueError::InvalidAmount("1xyz".into()));
        assert_eq!(err.to_string(), "1xyz is not a valid amount");

        let err = CliError::from(AuthError::DeviceBusy);
        assert_eq!(err.to_string(), "Device in use by another process.");

        let err = CliError::from(BlockchainError::EmptyTransaction);
        assert_eq!(err.to_string(), "Empty tx (neither value or data given)");
    }

    #[test]
    fn test_transaction_failed_message() {
        let err = CliError::TransactionFailed(TxHash::ZERO);
        assert!(err.to_string().ends_with("failed (status 0)"));
    }
}
