//! Broadcasting signed transactions and waiting for their receipts.

use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::time::{interval, timeout};

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Receipt};

/// Submit a signed transaction and return the hash reported by the node.
pub async fn send_transaction<C: ChainClient + ?Sized>(
    client: &C,
    signed: &SignedTransaction,
) -> BlockchainResult<TxHash> {
    let hash = client
        .send_raw_transaction(&signed.raw_transaction)
        .await?;
    if hash != signed.hash {
        tracing::warn!(expected = %signed.hash, reported = %hash, "Node reported a different hash");
    }
    tracing::info!(tx_hash = %hash, "Transaction sent");
    Ok(hash)
}

/// Poll for the receipt of `hash` until it appears or `wait_timeout` elapses.
///
/// The receipt is returned whatever its status; see [`ensure_success`].
pub async fn wait_for_receipt<C: ChainClient + ?Sized>(
    client: &C,
    hash: TxHash,
    wait_timeout: Duration,
    poll_interval: Duration,
) -> BlockchainResult<Receipt> {
    let result = timeout(wait_timeout, async {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            match client.transaction_receipt(hash).await? {
                Some(receipt) => return Ok(receipt),
                None => tracing::debug!(tx_hash = %hash, "Transaction pending"),
            }
        }
    })
    .await;

    match result {
        Ok(receipt) => receipt,
        Err(_) => Err(BlockchainError::TransactionTimeout {
            hash,
            secs: wait_timeout.as_secs_f64(),
        }),
    }
}

/// Turn a failed receipt into [`BlockchainError::TransactionReverted`].
pub fn ensure_success(receipt: &Receipt) -> BlockchainResult<()> {
    if receipt.status {
        Ok(())
    } else {
        Err(BlockchainError::TransactionReverted(receipt.transaction_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn receipt(status: bool) -> Receipt {
        Receipt {
            transaction_hash: TxHash::repeat_byte(0xab),
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: U256::from(1),
            status,
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(&receipt(true)).is_ok());
        assert!(matches!(
            ensure_success(&receipt(false)),
            Err(BlockchainError::TransactionReverted(h)) if h == TxHash::repeat_byte(0xab)
        ));
    }
}
