//! Transaction pipeline and chain access.
//!
//! # Data Flow
//! ```text
//! command-line parameters
//!     → builder.rs (value normalization, fee factor, fee model checks)
//!     → finalize.rs (chain id, nonce, fees, gas from the node)
//!     → auth (signing, outside this module)
//!     → broadcast.rs (send, bounded wait for the receipt)
//! ```
//!
//! # Constraints
//! - A finalized transaction never mixes legacy and EIP-1559 fee fields
//! - All RPC calls have a configurable timeout
//! - No retries; a failed call fails the command

pub mod broadcast;
pub mod builder;
pub mod client;
pub mod finalize;
pub mod transaction;
pub mod types;

pub use broadcast::{ensure_success, send_transaction, wait_for_receipt};
pub use builder::{build_contract_transaction, build_transaction, TxOptions};
pub use client::{parse_block_tag, BlockchainClient, ChainClient};
pub use finalize::finalize_transaction;
pub use transaction::{FeeModel, SignedTransaction, TypedUnsigned, UnsignedTransaction};
pub use types::{BlockchainError, BlockchainResult, GasEstimatePolicy, Receipt};
