//! Chain-facing types and error definitions.

use alloy::primitives::{TxHash, U256};
use serde::Serialize;
use thiserror::Error;

use crate::value::ValueError;

/// Errors that can occur while building, completing or broadcasting transactions.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Neither a value nor call data was given for a plain transfer.
    #[error("Empty tx (neither value or data given)")]
    EmptyTransaction,

    /// `--fee-factor` needs the latest base fee from a live node.
    #[error("--fee-factor requires a connection to a node: {0}")]
    FeeFactorRequiresConnection(String),

    /// Legacy and EIP-1559 fee fields were both requested.
    #[error("Conflicting fee models: {0}")]
    ConflictingFeeModels(String),

    /// A required field could not be determined.
    #[error("Incomplete transaction: cannot determine {0}")]
    IncompleteTransaction(String),

    /// Chain id too large to fold into an EIP-155 `v`.
    #[error("Chain id {0} is out of range for a legacy transaction")]
    ChainIdOutOfRange(u64),

    /// No receipt appeared before the deadline.
    #[error("Tx {hash} timed out after {secs:.1} seconds")]
    TransactionTimeout { hash: TxHash, secs: f64 },

    /// Transaction was mined with a failure status.
    #[error("Transaction {0} failed (status 0)")]
    TransactionReverted(TxHash),

    /// Contract call could not be encoded or its result decoded.
    #[error("Contract error: {0}")]
    Contract(String),

    /// A value given on the command line did not parse.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// What to do when the node cannot estimate gas for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasEstimatePolicy {
    /// Report the estimation failure.
    #[default]
    Strict,
    /// Log a warning and use this gas limit.
    Fallback(u64),
}

impl GasEstimatePolicy {
    /// Build the policy from an optional configured fallback limit.
    pub fn from_fallback(limit: Option<u64>) -> Self {
        limit.map_or(Self::Strict, Self::Fallback)
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub effective_gas_price: U256,
    /// `true` when execution succeeded.
    pub status: bool,
    /// The node's full receipt, printed for inspection.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Receipt {
    /// JSON shown to the user: the node's receipt when available.
    pub fn to_json(&self) -> serde_json::Value {
        if self.raw.is_null() {
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
        } else {
            self.raw.clone()
        }
    }
}
