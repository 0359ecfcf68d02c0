//! Transaction records: the unsigned skeleton the builder fills in, and the
//! signed, wire-encoded result an authenticator produces.
//!
//! # Responsibilities
//! - Hold optional transaction fields as they are resolved
//! - Enforce the single-fee-model invariant at conversion time
//! - Convert into RPC requests (gas estimation, calls) and consensus types (signing)
//! - Encode signed transactions per EIP-2718

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, Signature, TxHash, TxKind, B256, U256};
use alloy::rpc::types::TransactionRequest;
use serde::{Deserialize, Serialize};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Type tag of pre-EIP-1559 transactions.
pub const TX_TYPE_LEGACY: u8 = 0;
/// Type tag of EIP-1559 fee-market transactions.
pub const TX_TYPE_EIP1559: u8 = 2;

/// Fee model of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    /// Single `gasPrice`.
    Legacy,
    /// `maxFeePerGas` and `maxPriorityFeePerGas`.
    Eip1559,
}

/// Transaction whose fields may still be unresolved.
///
/// Serialized field names follow the JSON-RPC transaction object so that
/// files written by `tx make` can be read back by `tx sign`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<u8>,
}

fn require<T>(field: Option<T>, name: &str) -> BlockchainResult<T> {
    field.ok_or_else(|| BlockchainError::IncompleteTransaction(name.to_string()))
}

/// EIP-155 `v` for a legacy signature: `chain_id * 2 + 35 + parity`.
fn eip155_v(chain_id: u64, parity: u64) -> Option<u64> {
    chain_id.checked_mul(2)?.checked_add(35)?.checked_add(parity)
}

fn eip155_chain_id(chain_id: u64) -> BlockchainResult<u64> {
    eip155_v(chain_id, 1)
        .map(|_| chain_id)
        .ok_or(BlockchainError::ChainIdOutOfRange(chain_id))
}

impl UnsignedTransaction {
    /// `gasPrice` is set.
    pub fn has_legacy_fees(&self) -> bool {
        self.gas_price.is_some()
    }

    /// Either EIP-1559 fee field is set.
    pub fn has_eip1559_fees(&self) -> bool {
        self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some()
    }

    /// The fee model already committed to, if any.
    ///
    /// Fails when fields of both models are present.
    pub fn fee_model(&self) -> BlockchainResult<Option<FeeModel>> {
        let legacy = self.has_legacy_fees() || self.tx_type == Some(TX_TYPE_LEGACY);
        let eip1559 = self.has_eip1559_fees() || self.tx_type == Some(TX_TYPE_EIP1559);
        match (legacy, eip1559) {
            (true, true) => Err(BlockchainError::ConflictingFeeModels(
                "gasPrice cannot be combined with maxFeePerGas/maxPriorityFeePerGas or a mismatched type"
                    .to_string(),
            )),
            (true, false) => Ok(Some(FeeModel::Legacy)),
            (false, true) => Ok(Some(FeeModel::Eip1559)),
            (false, false) => Ok(None),
        }
    }

    /// Whether every field needed for signing is present.
    pub fn is_complete(&self) -> bool {
        self.to_typed().is_ok()
    }

    /// RPC request view, used for gas estimation and read-only calls.
    pub fn to_request(&self) -> TransactionRequest {
        let mut request = TransactionRequest::default();
        if let Some(from) = self.from {
            request.set_from(from);
        }
        if let Some(to) = self.to {
            request.set_to(to);
        }
        if let Some(value) = self.value {
            request.set_value(value);
        }
        if let Some(data) = &self.data {
            request.set_input(data.clone());
        }
        if let Some(nonce) = self.nonce {
            request.set_nonce(nonce);
        }
        if let Some(gas) = self.gas {
            request.set_gas_limit(gas);
        }
        if let Some(gas_price) = self.gas_price {
            request.set_gas_price(gas_price);
        }
        if let Some(max_fee) = self.max_fee_per_gas {
            request.set_max_fee_per_gas(max_fee);
        }
        if let Some(priority) = self.max_priority_fee_per_gas {
            request.set_max_priority_fee_per_gas(priority);
        }
        if let Some(chain_id) = self.chain_id {
            request.set_chain_id(chain_id);
        }
        request.transaction_type = self.tx_type;
        request
    }

    /// Consensus transaction ready to be hashed and signed.
    ///
    /// A missing `to` means contract creation.
    pub fn to_typed(&self) -> BlockchainResult<TypedUnsigned> {
        let chain_id = require(self.chain_id, "chain id")?;
        let nonce = require(self.nonce, "nonce")?;
        let gas_limit = require(self.gas, "gas")?;
        let to = self.to.map_or(TxKind::Create, TxKind::Call);
        let value = self.value.unwrap_or_default();
        let input = self.data.clone().unwrap_or_default();

        match self.fee_model()? {
            Some(FeeModel::Legacy) => Ok(TypedUnsigned::Legacy(TxLegacy {
                chain_id: Some(eip155_chain_id(chain_id)?),
                nonce,
                gas_price: require(self.gas_price, "gas price")?,
                gas_limit,
                to,
                value,
                input,
            })),
            Some(FeeModel::Eip1559) => Ok(TypedUnsigned::Eip1559(TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas: require(self.max_fee_per_gas, "max fee per gas")?,
                max_priority_fee_per_gas: require(
                    self.max_priority_fee_per_gas,
                    "max priority fee per gas",
                )?,
                to,
                value,
                access_list: Default::default(),
                input,
            })),
            None => Err(BlockchainError::IncompleteTransaction(
                "fee fields".to_string(),
            )),
        }
    }
}

/// Complete unsigned transaction in one of the supported envelopes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedUnsigned {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

impl TypedUnsigned {
    /// Hash the signer commits to (EIP-155 for legacy, EIP-1559 otherwise).
    pub fn signature_hash(&self) -> B256 {
        match self {
            Self::Legacy(tx) => tx.signature_hash(),
            Self::Eip1559(tx) => tx.signature_hash(),
        }
    }

    /// Attach a signature and encode.
    pub fn into_signed(self, signature: Signature) -> BlockchainResult<SignedTransaction> {
        let parity = u64::from(signature.v());
        let (envelope, v) = match self {
            Self::Legacy(tx) => {
                let v = match tx.chain_id {
                    Some(chain_id) => eip155_v(chain_id, parity)
                        .ok_or(BlockchainError::ChainIdOutOfRange(chain_id))?,
                    None => 27 + parity,
                };
                (TxEnvelope::from(tx.into_signed(signature)), v)
            }
            Self::Eip1559(tx) => (TxEnvelope::from(tx.into_signed(signature)), parity),
        };

        let raw = envelope.encoded_2718();
        Ok(SignedTransaction {
            hash: keccak256(&raw),
            raw_transaction: raw.into(),
            r: signature.r(),
            s: signature.s(),
            v,
        })
    }
}

/// Signed, broadcast-ready transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// EIP-2718 encoded bytes, as accepted by `eth_sendRawTransaction`.
    pub raw_transaction: Bytes,
    pub hash: TxHash,
    pub r: U256,
    pub s: U256,
    pub v: u64,
}

impl SignedTransaction {
    /// Signature with the y-parity recovered from `v`, or `None` when `v`
    /// is not a valid raw, pre-EIP-155 or EIP-155 value.
    pub fn signature(&self) -> Option<Signature> {
        let parity = match self.v {
            0 | 1 => self.v == 1,
            27 | 28 => self.v == 28,
            v if v >= 35 => (v - 35) % 2 == 1,
            _ => return None,
        };
        Some(Signature::new(self.r, self.s, parity))
    }
}
