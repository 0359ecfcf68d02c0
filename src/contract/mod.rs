//! Contract call encoding and read-only queries.
//!
//! State-mutating methods produce a [`ContractCall`] that feeds the normal
//! transaction pipeline. Read-only methods are executed immediately with
//! `eth_call` and decoded with the `sol!` generated return types.

pub mod autonity;
pub mod erc20;
pub mod liquid;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::{BlockchainError, BlockchainResult, ChainClient, UnsignedTransaction};

pub use autonity::{AutonityContract, AUTONITY_CONTRACT_ADDRESS};
pub use erc20::Erc20Contract;
pub use liquid::{LiquidContract, UnclaimedRewards};

/// Target, calldata and attached value of a contract method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
}

impl ContractCall {
    /// Encode `call` for the contract at `to`, with no value attached.
    pub fn new<T: SolCall>(to: Address, call: &T) -> Self {
        Self {
            to,
            data: call.abi_encode().into(),
            value: None,
        }
    }
}

/// Run a read-only call against `to` and decode its return value.
pub async fn read<C, T>(client: &C, to: Address, call: T) -> BlockchainResult<T::Return>
where
    C: ChainClient + ?Sized,
    T: SolCall + Send,
{
    let request = UnsignedTransaction {
        to: Some(to),
        data: Some(call.abi_encode().into()),
        ..Default::default()
    };
    let output = client.call(&request).await?;

    T::abi_decode_returns(&output).map_err(|e| {
        BlockchainError::Contract(format!("cannot decode {} result: {e}", T::SIGNATURE))
    })
}
