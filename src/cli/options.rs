//! Option groups shared by several commands.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use clap::Args;

use crate::auth::AuthSelection;
use crate::blockchain::TxOptions;
use crate::error::{CliError, CliResult};
use crate::value::{parse_denominated_amount, parse_fee_factor};

/// `--rpc-endpoint`
#[derive(Args, Debug, Clone, Default)]
pub struct RpcArgs {
    /// RPC endpoint (falls back to 'rpc_endpoint' in the config file)
    #[arg(long, short = 'r', env = "WEB3_ENDPOINT", value_name = "URL")]
    pub rpc_endpoint: Option<String>,
}

/// `--keyfile`
#[derive(Args, Debug, Clone, Default)]
pub struct KeyfileArgs {
    /// Encrypted private key file (falls back to 'keyfile' in the config file)
    #[arg(long, short = 'k', env = "KEYFILE", value_name = "FILE")]
    pub keyfile: Option<PathBuf>,
}

/// `--keystore`
#[derive(Args, Debug, Clone, Default)]
pub struct KeystoreArgs {
    /// Keystore directory (falls back to 'keystore' in the config file, then ~/.autonity/keystore)
    #[arg(long, short = 's', value_name = "DIR")]
    pub keystore: Option<PathBuf>,
}

/// Signing method: keyfile (with password) or hardware wallet.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Keyfile password (falls back to KEYFILEPWD, then a prompt)
    #[arg(long, short = 'p', env = "KEYFILEPWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Use a Trezor; optional account index or derivation path (default 0)
    #[arg(
        long,
        value_name = "INDEX|PATH",
        num_args = 0..=1,
        default_missing_value = "0"
    )]
    pub trezor: Option<String>,
}

impl AuthArgs {
    pub fn selection(&self) -> AuthSelection {
        AuthSelection {
            trezor: self.trezor.clone(),
            keyfile: self.keyfile.keyfile.clone(),
            password: self.password.clone(),
        }
    }
}

/// `--from`
#[derive(Args, Debug, Clone, Default)]
pub struct FromArgs {
    /// Sender address (falls back to the keyfile or hardware wallet address)
    #[arg(long = "from", short = 'f', value_name = "ADDRESS")]
    pub from: Option<Address>,
}

/// `--validator`
#[derive(Args, Debug, Clone, Default)]
pub struct ValidatorArgs {
    /// Validator address (falls back to 'validator' in the config file)
    #[arg(long, short = 'V', value_name = "ADDRESS")]
    pub validator: Option<Address>,
}

/// `--ntn` / `--token`
#[derive(Args, Debug, Clone, Default)]
pub struct TokenArgs {
    /// Use the Newton token
    #[arg(long, conflicts_with = "token")]
    pub ntn: bool,

    /// Use the ERC20 token at this address
    #[arg(long, value_name = "ADDRESS")]
    pub token: Option<Address>,
}

/// Optional transaction parameters. Fee amounts accept denominations.
#[derive(Args, Debug, Clone, Default)]
pub struct TxArgs {
    /// Gas limit (estimated if absent)
    #[arg(long, short = 'g')]
    pub gas: Option<u64>,

    /// Legacy gas price, e.g. "10gwei"
    #[arg(long, value_name = "AMOUNT")]
    pub gas_price: Option<String>,

    /// EIP-1559 maximum fee per gas
    #[arg(long, short = 'F', value_name = "AMOUNT")]
    pub max_fee_per_gas: Option<String>,

    /// EIP-1559 maximum priority fee per gas
    #[arg(long, short = 'P', value_name = "AMOUNT")]
    pub max_priority_fee_per_gas: Option<String>,

    /// Set maxFeePerGas to this multiple of the latest base fee
    #[arg(long, value_name = "FACTOR")]
    pub fee_factor: Option<String>,

    /// Nonce (pending transaction count if absent)
    #[arg(long, short = 'n')]
    pub nonce: Option<u64>,

    /// Chain id (queried if absent)
    #[arg(long, short = 'I')]
    pub chain_id: Option<u64>,

    /// Create a type 0 (pre-EIP-1559) transaction
    #[arg(long)]
    pub legacy: bool,
}

fn parse_fee(text: &Option<String>) -> CliResult<Option<u128>> {
    text.as_deref()
        .map(|t| {
            let wei: U256 = parse_denominated_amount(t)?;
            u128::try_from(wei).map_err(|_| CliError::invalid(format!("fee '{t}' is too large")))
        })
        .transpose()
}

impl TxArgs {
    pub fn to_options(&self) -> CliResult<TxOptions> {
        Ok(TxOptions {
            gas: self.gas,
            gas_price: parse_fee(&self.gas_price)?,
            max_fee_per_gas: parse_fee(&self.max_fee_per_gas)?,
            max_priority_fee_per_gas: parse_fee(&self.max_priority_fee_per_gas)?,
            fee_factor: self.fee_factor.as_deref().map(parse_fee_factor).transpose()?,
            nonce: self.nonce,
            chain_id: self.chain_id,
            legacy: self.legacy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_args_parse_denominations() {
        let args = TxArgs {
            gas_price: Some("10gwei".into()),
            max_priority_fee_per_gas: Some("1gwei".into()),
            fee_factor: Some("1.5".into()),
            ..Default::default()
        };
        let opts = args.to_options().unwrap();
        assert_eq!(opts.gas_price, Some(10_000_000_000));
        assert_eq!(opts.max_priority_fee_per_gas, Some(1_000_000_000));
        assert_eq!(opts.fee_factor.unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_tx_args_reject_bad_amount() {
        let args = TxArgs {
            max_fee_per_gas: Some("lots".into()),
            ..Default::default()
        };
        assert!(matches!(args.to_options(), Err(CliError::Value(_))));
    }
}
