//! Node RPC access with per-request timeouts.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint over HTTP
//! - Query chain state (chain id, blocks, balances, nonces, fees, receipts)
//! - Estimate gas, run read-only calls, broadcast raw transactions
//! - Map transport failures and timeouts into [`BlockchainError`]
//!
//! # Design Decisions
//! - Commands depend on the [`ChainClient`] trait, not on alloy directly, so
//!   builders and waiters run against an in-memory chain in tests
//! - One endpoint per invocation; there is no failover

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::transaction::UnsignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Receipt};

/// Chain queries used by the transaction pipeline and the read-only commands.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> BlockchainResult<u64>;

    async fn block_number(&self) -> BlockchainResult<u64>;

    /// Base fee of the latest block, `None` on pre-London chains.
    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>>;

    async fn balance(&self, address: Address, block: BlockNumberOrTag) -> BlockchainResult<U256>;

    async fn transaction_count(
        &self,
        address: Address,
        block: BlockNumberOrTag,
    ) -> BlockchainResult<u64>;

    async fn estimate_gas(&self, tx: &UnsignedTransaction) -> BlockchainResult<u64>;

    async fn gas_price(&self) -> BlockchainResult<u128>;

    async fn max_priority_fee_per_gas(&self) -> BlockchainResult<u128>;

    /// Execute a call without creating a transaction.
    async fn call(&self, tx: &UnsignedTransaction) -> BlockchainResult<Bytes>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;

    /// Receipt of a mined transaction, `None` while pending or unknown.
    async fn transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Option<Receipt>>;
}

/// Parse a block selector: a tag (`latest`, `pending`, ...) or a number.
pub fn parse_block_tag(text: &str) -> BlockchainResult<BlockNumberOrTag> {
    let text = text.trim();
    if let Ok(number) = text.parse::<u64>() {
        return Ok(BlockNumberOrTag::Number(number));
    }
    text.to_lowercase()
        .parse::<BlockNumberOrTag>()
        .map_err(|e| BlockchainError::Rpc(format!("invalid block '{text}': {e}")))
}

/// JSON-RPC client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a client for `endpoint`.
    ///
    /// No request is made until the first query.
    pub fn connect(endpoint: &str, timeout_duration: Duration) -> BlockchainResult<Self> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL '{endpoint}': {e}")))?;
        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::debug!(endpoint = %endpoint, timeout_secs = timeout_duration.as_secs(), "RPC client created");

        Ok(Self {
            provider,
            endpoint: endpoint.to_string(),
            timeout_duration,
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request<F, T, E>(&self, method: &str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::debug!(method, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{method}: {e}")))
            }
            Err(_) => {
                tracing::debug!(method, "RPC timeout");
                Err(BlockchainError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }
}

fn receipt_from_rpc(receipt: TransactionReceipt) -> Receipt {
    Receipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        effective_gas_price: U256::from(receipt.effective_gas_price),
        status: receipt.status(),
        raw: serde_json::to_value(&receipt).unwrap_or_default(),
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.request("eth_chainId", self.provider.get_chain_id()).await
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>> {
        let block = self
            .request(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(BlockNumberOrTag::Latest),
            )
            .await?;
        Ok(block.and_then(|b| b.header.base_fee_per_gas.map(u128::from)))
    }

    async fn balance(&self, address: Address, block: BlockNumberOrTag) -> BlockchainResult<U256> {
        self.request(
            "eth_getBalance",
            self.provider.get_balance(address).block_id(block.into()),
        )
        .await
    }

    async fn transaction_count(
        &self,
        address: Address,
        block: BlockNumberOrTag,
    ) -> BlockchainResult<u64> {
        self.request(
            "eth_getTransactionCount",
            self.provider
                .get_transaction_count(address)
                .block_id(block.into()),
        )
        .await
    }

    async fn estimate_gas(&self, tx: &UnsignedTransaction) -> BlockchainResult<u64> {
        self.request("eth_estimateGas", self.provider.estimate_gas(tx.to_request()))
            .await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.request("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    async fn max_priority_fee_per_gas(&self) -> BlockchainResult<u128> {
        self.request(
            "eth_maxPriorityFeePerGas",
            self.provider.get_max_priority_fee_per_gas(),
        )
        .await
    }

    async fn call(&self, tx: &UnsignedTransaction) -> BlockchainResult<Bytes> {
        self.request("eth_call", self.provider.call(tx.to_request()))
            .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self
            .request(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(raw),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Option<Receipt>> {
        let receipt = self
            .request(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(hash),
            )
            .await?;
        Ok(receipt.map(receipt_from_rpc))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        let result = BlockchainClient::connect("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(BlockchainError::Rpc(_))));
    }

    #[test]
    fn test_connect_is_lazy() {
        // Nothing listens here; creating the client must still succeed.
        let client = BlockchainClient::connect("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_an_error() {
        let client = BlockchainClient::connect("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = client.block_number().await;
        assert!(matches!(
            result,
            Err(BlockchainError::Rpc(_)) | Err(BlockchainError::Timeout(_))
        ));
    }

    #[test]
    fn test_parse_block_tag() {
        assert_eq!(parse_block_tag("latest").unwrap(), BlockNumberOrTag::Latest);
        assert_eq!(parse_block_tag("Pending").unwrap(), BlockNumberOrTag::Pending);
        assert_eq!(parse_block_tag("42").unwrap(), BlockNumberOrTag::Number(42));
        assert_eq!(parse_block_tag("0x2a").unwrap(), BlockNumberOrTag::Number(42));
        assert!(parse_block_tag("tomorrow").is_err());
    }
}
