//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use aut_cli::auth::keystore::create_keyfile;
use aut_cli::blockchain::{BlockchainError, BlockchainResult, ChainClient, Receipt, UnsignedTransaction};

pub const CHAIN_ID: u64 = 65_010_000;
pub const GAS_ESTIMATE: u64 = 21_000;
pub const GAS_PRICE: u128 = 5_000_000_000;
pub const PRIORITY_FEE: u128 = 1_000_000_000;

/// Well-known test private key (0x4c0883a6...).
pub const TEST_PRIVATE_KEY: &str =
    "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// In-memory node with configurable answers.
pub struct MockChain {
    pub base_fee: Option<u128>,
    pub nonce: u64,
    pub estimate_fails: bool,
    pub receipts: Mutex<HashMap<TxHash, Receipt>>,
    /// Polls that answer "pending" before a stored receipt is returned.
    pub pending_polls: AtomicU32,
    pub sent: Mutex<Vec<Vec<u8>>>,
    /// `eth_call` answers by target and selector; anything else returns no data.
    pub call_results: Mutex<HashMap<(Address, [u8; 4]), Bytes>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            base_fee: Some(10_000_000_000),
            nonce: 7,
            estimate_fails: false,
            receipts: Mutex::new(HashMap::new()),
            pending_polls: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            call_results: Mutex::new(HashMap::new()),
        }
    }
}

impl MockChain {
    /// Node of a chain without EIP-1559.
    pub fn legacy() -> Self {
        Self {
            base_fee: None,
            ..Default::default()
        }
    }

    /// Answer calls of `selector` on `to` with the ABI-encoded `output`.
    pub fn with_call_result(self, to: Address, selector: [u8; 4], output: Vec<u8>) -> Self {
        self.call_results
            .lock()
            .unwrap()
            .insert((to, selector), output.into());
        self
    }

    pub fn with_receipt(self, receipt: Receipt) -> Self {
        self.receipts
            .lock()
            .unwrap()
            .insert(receipt.transaction_hash, receipt);
        self
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        Ok(100)
    }

    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>> {
        Ok(self.base_fee)
    }

    async fn balance(&self, _address: Address, _block: BlockNumberOrTag) -> BlockchainResult<U256> {
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }

    async fn transaction_count(
        &self,
        _address: Address,
        _block: BlockNumberOrTag,
    ) -> BlockchainResult<u64> {
        Ok(self.nonce)
    }

    async fn estimate_gas(&self, _tx: &UnsignedTransaction) -> BlockchainResult<u64> {
        if self.estimate_fails {
            return Err(BlockchainError::Rpc("execution reverted".into()));
        }
        Ok(GAS_ESTIMATE)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        Ok(GAS_PRICE)
    }

    async fn max_priority_fee_per_gas(&self) -> BlockchainResult<u128> {
        Ok(PRIORITY_FEE)
    }

    async fn call(&self, tx: &UnsignedTransaction) -> BlockchainResult<Bytes> {
        let (Some(to), Some(data)) = (tx.to, tx.data.as_ref()) else {
            return Ok(Bytes::new());
        };
        let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) else {
            return Ok(Bytes::new());
        };
        Ok(self
            .call_results
            .lock()
            .unwrap()
            .get(&(to, selector))
            .cloned()
            .unwrap_or_default())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.sent.lock().unwrap().push(raw.to_vec());
        Ok(alloy::primitives::keccak256(raw))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Option<Receipt>> {
        let remaining = self.pending_polls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.pending_polls.store(remaining - 1, Ordering::SeqCst);
            return Ok(None);
        }
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }
}

/// Receipt without the node's raw JSON.
pub fn receipt(hash: TxHash, status: bool) -> Receipt {
    Receipt {
        transaction_hash: hash,
        block_number: Some(101),
        gas_used: GAS_ESTIMATE,
        effective_gas_price: U256::from(GAS_PRICE),
        status,
        raw: serde_json::Value::Null,
    }
}

pub fn test_key() -> Vec<u8> {
    hex::decode(TEST_PRIVATE_KEY).unwrap()
}

/// Write the test key to `dir/name`, encrypted with `password`.
pub fn write_keyfile(dir: &Path, name: &str, password: &str) -> (Address, PathBuf) {
    let path = dir.join(name);
    let address = create_keyfile(&path, &test_key(), password).unwrap();
    (address, path)
}
