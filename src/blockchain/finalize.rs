//! Completing unsigned transactions from chain state.
//!
//! # Responsibilities
//! - Fill chain id, nonce, fees and gas when the caller left them unset
//! - Keep the fee model the caller chose; pick one when none was chosen
//! - Apply the configured gas estimation policy
//!
//! Nothing here mutates chain state. Without a client, any field that still
//! needs the chain is reported as [`BlockchainError::IncompleteTransaction`].

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::Address;

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::{FeeModel, UnsignedTransaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult, GasEstimatePolicy};

fn need<'a, C: ?Sized>(client: Option<&'a C>, field: &str) -> BlockchainResult<&'a C> {
    client.ok_or_else(|| BlockchainError::IncompleteTransaction(field.to_string()))
}

/// Fill every unset field of `tx` so that it can be signed.
///
/// `from` is used when the transaction carries no sender.
pub async fn finalize_transaction<C: ChainClient + ?Sized>(
    client: Option<&C>,
    mut tx: UnsignedTransaction,
    from: Option<Address>,
    policy: GasEstimatePolicy,
) -> BlockchainResult<UnsignedTransaction> {
    if tx.from.is_none() {
        tx.from = from;
    }
    let model = tx.fee_model()?;

    if tx.chain_id.is_none() {
        tx.chain_id = Some(need(client, "chain id")?.chain_id().await?);
    }

    if tx.nonce.is_none() {
        let sender = tx.from.ok_or_else(|| {
            BlockchainError::IncompleteTransaction("nonce (no sender address)".to_string())
        })?;
        let nonce = need(client, "nonce")?
            .transaction_count(sender, BlockNumberOrTag::Pending)
            .await?;
        tx.nonce = Some(nonce);
    }

    match model {
        Some(FeeModel::Legacy) => fill_legacy_fees(client, &mut tx).await?,
        Some(FeeModel::Eip1559) => {
            let base_fee = if tx.max_fee_per_gas.is_none() {
                need(client, "max fee per gas")?.latest_base_fee().await?
            } else {
                None
            };
            fill_eip1559_fees(client, &mut tx, base_fee).await?;
        }
        None => {
            let base_fee = need(client, "fee fields")?.latest_base_fee().await?;
            if base_fee.is_some() {
                fill_eip1559_fees(client, &mut tx, base_fee).await?;
            } else {
                fill_legacy_fees(client, &mut tx).await?;
            }
        }
    }

    if tx.gas.is_none() {
        let estimate = need(client, "gas")?.estimate_gas(&tx).await;
        tx.gas = Some(match (estimate, policy) {
            (Ok(gas), _) => gas,
            (Err(e), GasEstimatePolicy::Strict) => return Err(e),
            (Err(e), GasEstimatePolicy::Fallback(limit)) => {
                tracing::warn!(error = %e, gas = limit, "Gas estimation failed, using fallback limit");
                limit
            }
        });
    }

    tracing::debug!(
        chain_id = ?tx.chain_id,
        nonce = ?tx.nonce,
        gas = ?tx.gas,
        "Transaction finalized"
    );
    Ok(tx)
}

async fn fill_legacy_fees<C: ChainClient + ?Sized>(
    client: Option<&C>,
    tx: &mut UnsignedTransaction,
) -> BlockchainResult<()> {
    if tx.gas_price.is_none() {
        tx.gas_price = Some(need(client, "gas price")?.gas_price().await?);
    }
    Ok(())
}

async fn fill_eip1559_fees<C: ChainClient + ?Sized>(
    client: Option<&C>,
    tx: &mut UnsignedTransaction,
    base_fee: Option<u128>,
) -> BlockchainResult<()> {
    if tx.max_priority_fee_per_gas.is_none() {
        tx.max_priority_fee_per_gas = Some(
            need(client, "max priority fee per gas")?
                .max_priority_fee_per_gas()
                .await?,
        );
    }

    if tx.max_fee_per_gas.is_none() {
        let base_fee = base_fee.ok_or_else(|| {
            BlockchainError::IncompleteTransaction(
                "max fee per gas (latest block has no base fee)".to_string(),
            )
        })?;
        let priority = tx.max_priority_fee_per_gas.unwrap_or_default();
        tx.max_fee_per_gas = Some(base_fee.saturating_mul(2).saturating_add(priority));
    }
    Ok(())
}
