//! Assembling unsigned transactions from command-line parameters.
//!
//! The builder only records what the caller asked for (plus the fee factor
//! resolution, which needs the latest block). Everything left unset is the
//! finalizer's job.

use alloy::primitives::{Address, Bytes, U256};

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::{UnsignedTransaction, TX_TYPE_LEGACY};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::contract::ContractCall;
use crate::value::{parse_denominated_amount, Decimal, ValueError};

/// Optional transaction parameters shared by every state-mutating command.
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    /// Multiplier applied to the latest base fee to derive `maxFeePerGas`.
    pub fee_factor: Option<Decimal>,
    pub nonce: Option<u64>,
    pub chain_id: Option<u64>,
    /// Force a type 0 transaction.
    pub legacy: bool,
}

impl TxOptions {
    fn wants_legacy(&self) -> bool {
        self.legacy || self.gas_price.is_some()
    }

    fn wants_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some()
            || self.max_priority_fee_per_gas.is_some()
            || self.fee_factor.is_some()
    }
}

/// Build a plain transaction: a value transfer, a call, or both.
///
/// `value` is a denominated amount such as `"1.5aut"` or `"200gwei"`.
pub async fn build_transaction<C: ChainClient + ?Sized>(
    client: Option<&C>,
    from: Option<Address>,
    to: Option<Address>,
    value: Option<&str>,
    data: Option<Bytes>,
    opts: &TxOptions,
) -> BlockchainResult<UnsignedTransaction> {
    let data = data.filter(|d| !d.is_empty());
    if value.is_none() && data.is_none() {
        return Err(BlockchainError::EmptyTransaction);
    }

    let value = value.map(parse_denominated_amount).transpose()?;
    assemble(client, from, to, value, data, opts).await
}

/// Build a transaction for an encoded contract call.
pub async fn build_contract_transaction<C: ChainClient + ?Sized>(
    client: Option<&C>,
    from: Option<Address>,
    call: ContractCall,
    opts: &TxOptions,
) -> BlockchainResult<UnsignedTransaction> {
    assemble(
        client,
        from,
        Some(call.to),
        call.value,
        Some(call.data),
        opts,
    )
    .await
}

async fn assemble<C: ChainClient + ?Sized>(
    client: Option<&C>,
    from: Option<Address>,
    to: Option<Address>,
    value: Option<U256>,
    data: Option<Bytes>,
    opts: &TxOptions,
) -> BlockchainResult<UnsignedTransaction> {
    if opts.wants_legacy() && opts.wants_eip1559() {
        return Err(BlockchainError::ConflictingFeeModels(
            "--legacy/--gas-price cannot be combined with EIP-1559 fee options".to_string(),
        ));
    }

    let mut tx = UnsignedTransaction {
        from,
        to,
        value,
        data,
        gas: opts.gas,
        gas_price: opts.gas_price,
        max_fee_per_gas: opts.max_fee_per_gas,
        max_priority_fee_per_gas: opts.max_priority_fee_per_gas,
        nonce: opts.nonce,
        chain_id: opts.chain_id,
        tx_type: opts.legacy.then_some(TX_TYPE_LEGACY),
    };

    if let Some(factor) = &opts.fee_factor {
        if factor.mantissa().is_zero() {
            return Err(ValueError::InvalidAmount(format!("fee factor {factor}")).into());
        }
        let max_fee = max_fee_from_factor(client, factor).await?;
        if let Some(explicit) = tx.max_fee_per_gas {
            tracing::warn!(
                explicit,
                derived = max_fee,
                "--fee-factor overrides --max-fee-per-gas"
            );
        }
        tx.max_fee_per_gas = Some(max_fee);
    }

    tracing::debug!(to = ?tx.to, value = ?tx.value, "Transaction assembled");
    Ok(tx)
}

async fn max_fee_from_factor<C: ChainClient + ?Sized>(
    client: Option<&C>,
    factor: &Decimal,
) -> BlockchainResult<u128> {
    let client = client.ok_or_else(|| {
        BlockchainError::FeeFactorRequiresConnection("no RPC endpoint configured".to_string())
    })?;

    let base_fee = client
        .latest_base_fee()
        .await
        .map_err(|e| BlockchainError::FeeFactorRequiresConnection(e.to_string()))?
        .ok_or_else(|| {
            BlockchainError::FeeFactorRequiresConnection(
                "latest block has no base fee".to_string(),
            )
        })?;

    let invalid = || BlockchainError::Value(ValueError::InvalidAmount(factor.to_string()));
    let max_fee = factor
        .mul_truncate(U256::from(base_fee))
        .ok_or_else(invalid)?;
    u128::try_from(max_fee).map_err(|_| invalid())
}
