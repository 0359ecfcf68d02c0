//! `aut validator`: validator queries and staking operations.
//!
//! Every state-changing command prints an unsigned transaction, ready for
//! `tx sign`.

use alloy::primitives::{Address, Bytes};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::blockchain::{BlockchainClient, ChainClient};
use crate::cli::account::default_account;
use crate::cli::options::{KeyfileArgs, RpcArgs, ValidatorArgs};
use crate::cli::output::{print_json, print_json_pretty};
use crate::cli::{make_contract_tx, Context, ContractTxArgs};
use crate::contract::autonity::validator_json;
use crate::contract::{AutonityContract, ContractCall, LiquidContract};
use crate::error::{CliError, CliResult};
use crate::value::{
    format_auton_quantity, format_newton_quantity, parse_commission_rate, parse_newton_amount,
    COMMISSION_RATE_PRECISION,
};

#[derive(Subcommand, Debug)]
pub enum ValidatorCommands {
    /// List the registered validators
    List {
        #[command(flatten)]
        rpc: RpcArgs,
    },

    /// Print a validator's record
    Info(InfoArgs),

    /// Validator address for an enode URL
    ComputeAddress {
        /// enode://<public key>@<host>:<port>
        enode: String,
    },

    /// Register a validator
    Register(RegisterArgs),

    /// Bond Newton to a validator
    Bond(AmountArgs),

    /// Unbond Newton from a validator
    Unbond(AmountArgs),

    /// Pause a validator
    Pause(ValidatorTxArgs),

    /// Re-activate a paused validator
    Activate(ValidatorTxArgs),

    /// Change a validator's commission rate
    ChangeCommissionRate(CommissionArgs),

    /// Claim the staking rewards held by the validator's liquid contract
    ClaimRewards(ValidatorTxArgs),

    /// Change a validator's enode URL
    UpdateEnode(EnodeArgs),

    /// Rewards a delegator can claim from a validator
    UnclaimedRewards(LiquidQueryArgs),

    /// Locked Liquid Newton an account holds for a validator
    LockedBalanceOf(LiquidQueryArgs),

    /// Unlocked Liquid Newton an account holds for a validator
    UnlockedBalanceOf(LiquidQueryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub validator: ValidatorArgs,
}

/// Query of one account's position in a validator's liquid contract.
#[derive(Args, Debug, Clone)]
pub struct LiquidQueryArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    #[command(flatten)]
    pub validator: ValidatorArgs,

    /// Account to check (default: the keyfile's account)
    #[arg(long, value_name = "ADDRESS")]
    pub account: Option<Address>,
}

/// Options of a transaction addressed to one validator.
#[derive(Args, Debug, Clone)]
pub struct ValidatorTxArgs {
    #[command(flatten)]
    pub validator: ValidatorArgs,

    #[command(flatten)]
    pub tx: ContractTxArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub tx: ContractTxArgs,

    /// enode URL of the validator node
    pub enode: String,

    /// Oracle server address
    pub oracle: Address,

    /// Consensus public key (hex)
    pub consensus_key: Bytes,

    /// Ownership proof (hex)
    pub proof: Bytes,
}

#[derive(Args, Debug, Clone)]
pub struct AmountArgs {
    #[command(flatten)]
    pub target: ValidatorTxArgs,

    /// Newton amount, e.g. "10" or "0.5"
    pub amount: String,
}

#[derive(Args, Debug, Clone)]
pub struct CommissionArgs {
    #[command(flatten)]
    pub target: ValidatorTxArgs,

    /// New rate: "5%", "0.05" or a value out of 10000
    pub rate: String,
}

#[derive(Args, Debug, Clone)]
pub struct EnodeArgs {
    #[command(flatten)]
    pub target: ValidatorTxArgs,

    pub enode: String,
}

pub async fn run(ctx: &Context, cmd: ValidatorCommands) -> CliResult<()> {
    let autonity = AutonityContract::default();

    match cmd {
        ValidatorCommands::List { rpc } => {
            for validator in autonity.validators(&ctx.client(&rpc)?).await? {
                println!("{validator}");
            }
            Ok(())
        }
        ValidatorCommands::Info(args) => {
            let client = ctx.client(&args.rpc)?;
            let address = ctx.validator_address(args.validator.validator)?;
            let validator = autonity.validator(&client, address).await?;
            print_json_pretty(&validator_json(&validator))
        }
        ValidatorCommands::ComputeAddress { enode } => {
            println!("{}", enode_address(&enode)?);
            Ok(())
        }
        ValidatorCommands::Register(args) => {
            let call =
                autonity.register_validator(args.enode, args.oracle, args.consensus_key, args.proof);
            submit(ctx, &args.tx, call).await
        }
        ValidatorCommands::Bond(args) => {
            let validator = ctx.validator_address(args.target.validator.validator)?;
            let call = autonity.bond(validator, parse_newton_amount(&args.amount)?);
            submit(ctx, &args.target.tx, call).await
        }
        ValidatorCommands::Unbond(args) => {
            let validator = ctx.validator_address(args.target.validator.validator)?;
            let call = autonity.unbond(validator, parse_newton_amount(&args.amount)?);
            submit(ctx, &args.target.tx, call).await
        }
        ValidatorCommands::Pause(args) => {
            let validator = ctx.validator_address(args.validator.validator)?;
            submit(ctx, &args.tx, autonity.pause_validator(validator)).await
        }
        ValidatorCommands::Activate(args) => {
            let validator = ctx.validator_address(args.validator.validator)?;
            submit(ctx, &args.tx, autonity.activate_validator(validator)).await
        }
        ValidatorCommands::ChangeCommissionRate(args) => {
            let validator = ctx.validator_address(args.target.validator.validator)?;
            let rate = parse_commission_rate(&args.rate, COMMISSION_RATE_PRECISION)?;
            let call = autonity.change_commission_rate(validator, rate);
            submit(ctx, &args.target.tx, call).await
        }
        ValidatorCommands::ClaimRewards(args) => {
            let validator = ctx.validator_address(args.validator.validator)?;
            let client = ctx.client(&args.tx.rpc)?;
            let call = liquid_contract(&client, validator).await?.claim_rewards();
            submit(ctx, &args.tx, call).await
        }
        ValidatorCommands::UpdateEnode(args) => {
            let validator = ctx.validator_address(args.target.validator.validator)?;
            let call = autonity.update_enode(validator, args.enode);
            submit(ctx, &args.target.tx, call).await
        }
        ValidatorCommands::UnclaimedRewards(args) => {
            let (client, liquid, account) = liquid_query(ctx, &args).await?;
            let rewards = liquid.unclaimed_rewards(&client, account).await?;
            print_json_pretty(&json!({
                "atn": format_auton_quantity(rewards.atn),
                "ntn": format_newton_quantity(rewards.ntn),
            }))
        }
        ValidatorCommands::LockedBalanceOf(args) => {
            let (client, liquid, account) = liquid_query(ctx, &args).await?;
            let balance = liquid.locked_balance_of(&client, account).await?;
            println!("{}", format_newton_quantity(balance));
            Ok(())
        }
        ValidatorCommands::UnlockedBalanceOf(args) => {
            let (client, liquid, account) = liquid_query(ctx, &args).await?;
            let balance = liquid.unlocked_balance_of(&client, account).await?;
            println!("{}", format_newton_quantity(balance));
            Ok(())
        }
    }
}

/// The liquid contract of `validator`, read from its record.
pub async fn liquid_contract<C: ChainClient + ?Sized>(
    client: &C,
    validator: Address,
) -> CliResult<LiquidContract> {
    let record = AutonityContract::default().validator(client, validator).await?;
    tracing::debug!(validator = %validator, liquid = %record.liquidStateContract, "Liquid contract");
    Ok(LiquidContract::new(record.liquidStateContract))
}

async fn liquid_query(
    ctx: &Context,
    args: &LiquidQueryArgs,
) -> CliResult<(BlockchainClient, LiquidContract, Address)> {
    let validator = ctx.validator_address(args.validator.validator)?;
    let account = match args.account {
        Some(account) => account,
        None => default_account(ctx, &args.keyfile)?,
    };
    let client = ctx.client(&args.rpc)?;
    let liquid = liquid_contract(&client, validator).await?;
    Ok((client, liquid, account))
}

async fn submit(ctx: &Context, args: &ContractTxArgs, call: ContractCall) -> CliResult<()> {
    let tx = make_contract_tx(ctx, args, call).await?;
    print_json(&tx)
}

/// Address of the node key in an enode URL.
pub fn enode_address(enode: &str) -> CliResult<Address> {
    let url = url::Url::parse(enode.trim())
        .map_err(|e| CliError::invalid(format!("invalid enode '{enode}': {e}")))?;
    if url.scheme() != "enode" {
        return Err(CliError::invalid(format!("invalid enode '{enode}': expected enode://")));
    }

    let public_key = hex::decode(url.username())
        .map_err(|e| CliError::invalid(format!("invalid enode public key: {e}")))?;
    if public_key.len() != 64 {
        return Err(CliError::invalid(format!(
            "enode public key must be 64 bytes, got {}",
            public_key.len()
        )));
    }
    Ok(Address::from_raw_public_key(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;
    use alloy::signers::local::PrivateKeySigner;

    #[test]
    fn test_enode_address_matches_node_key() {
        let signer = PrivateKeySigner::from_slice(&[7u8; 32]).unwrap();
        let point = signer.credential().verifying_key().to_encoded_point(false);
        let public_key = &point.as_bytes()[1..];
        let enode = format!("enode://{}@127.0.0.1:30303", hex::encode(public_key));

        assert_eq!(enode_address(&enode).unwrap(), signer.address());
        assert_eq!(
            Address::from_slice(&keccak256(public_key)[12..]),
            signer.address()
        );
    }

    #[test]
    fn test_parse_liquid_queries() {
        use crate::cli::{Cli, Commands};
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "aut",
            "validator",
            "unclaimed-rewards",
            "--validator",
            "0x0000000000000000000000000000000000000003",
            "--account",
            "0x0000000000000000000000000000000000000004",
        ])
        .unwrap();
        match cli.command {
            Commands::Validator(ValidatorCommands::UnclaimedRewards(args)) => {
                assert_eq!(args.validator.validator, Some(Address::with_last_byte(3)));
                assert_eq!(args.account, Some(Address::with_last_byte(4)));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["aut", "validator", "locked-balance-of"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Validator(ValidatorCommands::LockedBalanceOf(LiquidQueryArgs {
                account: None,
                ..
            }))
        ));
        let cli = Cli::try_parse_from(["aut", "validator", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Validator(ValidatorCommands::List { .. })
        ));
    }

    #[test]
    fn test_enode_address_rejects_garbage() {
        assert!(enode_address("http://abc@host:1").is_err());
        assert!(enode_address("enode://abcd@host:1").is_err());
        assert!(enode_address("not a url").is_err());
    }
}
