//! `aut protocol` and `aut block`: read-only queries.

use clap::{Args, Subcommand};

use crate::blockchain::ChainClient;
use crate::cli::options::RpcArgs;
use crate::cli::output::print_json_pretty;
use crate::cli::Context;
use crate::contract::autonity::committee_json;
use crate::contract::{AutonityContract, AUTONITY_CONTRACT_ADDRESS};
use crate::error::CliResult;
use crate::value::{format_auton_quantity, format_newton_quantity};

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,
}

#[derive(Subcommand, Debug)]
pub enum ProtocolCommands {
    /// Current epoch id
    EpochId(QueryArgs),
    /// Timestamp of the last epoch change
    LastEpochTime(QueryArgs),
    /// Newton bonded in the current epoch
    EpochTotalBondedStake(QueryArgs),
    /// Newton total supply
    TotalSupply(QueryArgs),
    /// Registered validators
    Validators(QueryArgs),
    MaxCommitteeSize(QueryArgs),
    /// Protocol operator account
    Operator(QueryArgs),
    TreasuryAccount(QueryArgs),
    /// Minimum base fee, in Auton
    MinimumBaseFee(QueryArgs),
    /// Current consensus committee
    Committee(QueryArgs),
    /// enode URLs of the committee members
    CommitteeEnodes(QueryArgs),
    /// Epoch length in blocks
    EpochPeriod(QueryArgs),
    /// Target block interval in seconds
    BlockPeriod(QueryArgs),
    /// Unbonding delay in blocks
    UnbondingPeriod(QueryArgs),
    /// Block of the last epoch change
    LastEpochBlock(QueryArgs),
    /// Treasury share of fees (out of 10^18)
    TreasuryFee(QueryArgs),
    /// Autonity contract version
    Version(QueryArgs),
    /// Protocol configuration
    Config(QueryArgs),
    /// Epoch containing a block
    EpochFromBlock {
        #[command(flatten)]
        rpc: RpcArgs,

        /// Block number
        block: u64,
    },
    /// Address of the Autonity contract
    ContractAddress,
}

#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// Latest block number
    Height(QueryArgs),
}

pub async fn run(ctx: &Context, cmd: ProtocolCommands) -> CliResult<()> {
    let autonity = AutonityContract::default();

    let text = match &cmd {
        ProtocolCommands::EpochId(args) => {
            autonity.epoch_id(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::LastEpochTime(args) => {
            autonity.last_epoch_time(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::EpochTotalBondedStake(args) => format_newton_quantity(
            autonity
                .epoch_total_bonded_stake(&ctx.client(&args.rpc)?)
                .await?,
        ),
        ProtocolCommands::TotalSupply(args) => {
            format_newton_quantity(autonity.total_supply(&ctx.client(&args.rpc)?).await?)
        }
        ProtocolCommands::Validators(args) => {
            let validators = autonity.validators(&ctx.client(&args.rpc)?).await?;
            let list: Vec<String> = validators.iter().map(ToString::to_string).collect();
            return print_json_pretty(&list);
        }
        ProtocolCommands::MaxCommitteeSize(args) => autonity
            .max_committee_size(&ctx.client(&args.rpc)?)
            .await?
            .to_string(),
        ProtocolCommands::Operator(args) => {
            autonity.operator(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::TreasuryAccount(args) => autonity
            .treasury_account(&ctx.client(&args.rpc)?)
            .await?
            .to_string(),
        ProtocolCommands::MinimumBaseFee(args) => {
            format_auton_quantity(autonity.minimum_base_fee(&ctx.client(&args.rpc)?).await?)
        }
        ProtocolCommands::Committee(args) => {
            let members = autonity.committee(&ctx.client(&args.rpc)?).await?;
            return print_json_pretty(&committee_json(&members));
        }
        ProtocolCommands::CommitteeEnodes(args) => {
            let enodes = autonity.committee_enodes(&ctx.client(&args.rpc)?).await?;
            return print_json_pretty(&enodes);
        }
        ProtocolCommands::EpochPeriod(args) => {
            autonity.epoch_period(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::BlockPeriod(args) => {
            autonity.block_period(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::UnbondingPeriod(args) => autonity
            .unbonding_period(&ctx.client(&args.rpc)?)
            .await?
            .to_string(),
        ProtocolCommands::LastEpochBlock(args) => autonity
            .last_epoch_block(&ctx.client(&args.rpc)?)
            .await?
            .to_string(),
        ProtocolCommands::TreasuryFee(args) => {
            autonity.treasury_fee(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::Version(args) => {
            autonity.version(&ctx.client(&args.rpc)?).await?.to_string()
        }
        ProtocolCommands::Config(args) => {
            return print_json_pretty(&autonity.config(&ctx.client(&args.rpc)?).await?);
        }
        ProtocolCommands::EpochFromBlock { rpc, block } => autonity
            .epoch_from_block(&ctx.client(rpc)?, *block)
            .await?
            .to_string(),
        ProtocolCommands::ContractAddress => AUTONITY_CONTRACT_ADDRESS.to_string(),
    };

    println!("{text}");
    Ok(())
}

pub async fn run_block(ctx: &Context, cmd: BlockCommands) -> CliResult<()> {
    match cmd {
        BlockCommands::Height(args) => {
            let client = ctx.client(&args.rpc)?;
            println!("{}", client.block_number().await?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_protocol_queries() {
        for name in [
            "committee",
            "committee-enodes",
            "epoch-period",
            "block-period",
            "unbonding-period",
            "last-epoch-block",
            "treasury-fee",
            "version",
            "config",
        ] {
            let cli = Cli::try_parse_from(["aut", "protocol", name, "-r", "http://node:8545"])
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(matches!(cli.command, Commands::Protocol(_)), "{name}");
        }

        let cli = Cli::try_parse_from(["aut", "protocol", "epoch-from-block", "1200"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Protocol(ProtocolCommands::EpochFromBlock { block: 1200, .. })
        ));
    }

    #[tokio::test]
    async fn test_contract_address_needs_no_node() {
        let cli = Cli::try_parse_from(["aut", "protocol", "contract-address"]).unwrap();
        let Commands::Protocol(cmd) = cli.command else {
            panic!("expected a protocol command");
        };
        run(&Context::default(), cmd).await.unwrap();
    }
}
