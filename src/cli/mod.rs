//! Command-line surface of `aut`.
//!
//! # Responsibilities
//! - Parse arguments (clap derive) into one command per invocation
//! - Resolve each setting as flag > environment > config file > default
//! - Drive the pipeline: build → finalize → sign → send → wait
//!
//! # Data Flow
//! ```text
//! argv ──→ Cli ──→ run() ──→ Context (config)
//!                              │
//!          tx / account / validator / protocol / block handlers
//!                              │
//!          blockchain::*, auth::*, contract::*, signing::*
//!                              │
//!          stdout: one JSON document, hash or value
//! ```
//!
//! # Design Decisions
//! - Handlers return `CliResult`; `main` owns the exit code
//! - A chain connection is only opened when a handler needs one

pub mod account;
pub mod options;
pub mod output;
pub mod protocol;
pub mod tx;
pub mod validator;

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};

use crate::auth::{get_authenticator, keystore, Authenticator};
use crate::blockchain::{
    build_contract_transaction, finalize_transaction, BlockchainClient, TxOptions,
    UnsignedTransaction,
};
use crate::config::{load_or_default, AutConfig};
use crate::contract::ContractCall;
use crate::error::{CliError, CliResult};

use options::{AuthArgs, FromArgs, RpcArgs, TxArgs};

/// Command-line interface for Autonity.
#[derive(Parser, Debug)]
#[command(name = "aut", version, about = "Command line interface to Autonity")]
pub struct Cli {
    /// Enable debug logging and print error causes
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (default: .aut.toml in this or a parent directory, then ~/.aut.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, sign, send and wait for transactions
    #[command(subcommand)]
    Tx(tx::TxCommands),

    /// Keyfiles, balances and message signatures
    #[command(subcommand)]
    Account(account::AccountCommands),

    /// Validator queries and operations
    #[command(subcommand)]
    Validator(validator::ValidatorCommands),

    /// Protocol parameters
    #[command(subcommand)]
    Protocol(protocol::ProtocolCommands),

    /// Block queries
    #[command(subcommand)]
    Block(protocol::BlockCommands),
}

/// Load the configuration and run the selected command.
pub async fn run(cli: Cli) -> CliResult<()> {
    let config = load_or_default(cli.config.as_deref())?;
    let ctx = Context::new(config);

    match cli.command {
        Commands::Tx(cmd) => tx::run(&ctx, cmd).await,
        Commands::Account(cmd) => account::run(&ctx, cmd).await,
        Commands::Validator(cmd) => validator::run(&ctx, cmd).await,
        Commands::Protocol(cmd) => protocol::run(&ctx, cmd).await,
        Commands::Block(cmd) => protocol::run_block(&ctx, cmd).await,
    }
}

/// Per-invocation settings shared by the handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: AutConfig,
}

impl Context {
    pub fn new(config: AutConfig) -> Self {
        Self { config }
    }

    pub fn rpc_endpoint(&self, rpc: &RpcArgs) -> Option<String> {
        rpc.rpc_endpoint
            .clone()
            .or_else(|| self.config.rpc_endpoint.clone())
    }

    /// Connection to the configured node; fails when no endpoint is known.
    pub fn client(&self, rpc: &RpcArgs) -> CliResult<BlockchainClient> {
        self.optional_client(rpc)?.ok_or_else(|| {
            CliError::invalid(
                "no RPC endpoint (use --rpc-endpoint, WEB3_ENDPOINT or 'rpc_endpoint' in the config file)",
            )
        })
    }

    /// Connection when an endpoint is known, for commands that can work offline.
    pub fn optional_client(&self, rpc: &RpcArgs) -> CliResult<Option<BlockchainClient>> {
        self.rpc_endpoint(rpc)
            .map(|endpoint| BlockchainClient::connect(&endpoint, self.config.rpc_timeout()))
            .transpose()
            .map_err(CliError::from)
    }

    pub fn validator_address(&self, validator: Option<Address>) -> CliResult<Address> {
        if let Some(address) = validator {
            return Ok(address);
        }
        match &self.config.validator {
            Some(text) => text
                .parse()
                .map_err(|_| CliError::invalid(format!("invalid validator address '{text}'"))),
            None => Err(CliError::invalid(
                "no validator address (use --validator or 'validator' in the config file)",
            )),
        }
    }

    pub async fn authenticator(&self, auth: &AuthArgs) -> CliResult<Box<dyn Authenticator>> {
        let default_keyfile = self.config.keyfile_path();
        Ok(get_authenticator(auth.selection(), default_keyfile.as_deref()).await?)
    }

    /// Sender for a new transaction: `--from`, else the hardware wallet or
    /// keyfile address. Reading a keyfile address needs no password.
    pub async fn sender(&self, from: &FromArgs, auth: &AuthArgs) -> CliResult<Option<Address>> {
        if from.from.is_some() {
            return Ok(from.from);
        }
        if auth.trezor.is_some() {
            return Ok(Some(self.authenticator(auth).await?.address()));
        }
        let keyfile = auth
            .keyfile
            .keyfile
            .clone()
            .or_else(|| self.config.keyfile_path());
        match keyfile {
            Some(path) => Ok(Some(keystore::keyfile_address(&path)?)),
            None => Ok(None),
        }
    }
}

/// Options of every command that produces a contract transaction.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ContractTxArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub from: FromArgs,

    #[command(flatten)]
    pub tx: TxArgs,
}

/// Build and finalize a contract transaction, returning it unsigned.
pub async fn make_contract_tx(
    ctx: &Context,
    args: &ContractTxArgs,
    call: ContractCall,
) -> CliResult<UnsignedTransaction> {
    let opts: TxOptions = args.tx.to_options()?;
    let from = ctx.sender(&args.from, &args.auth).await?;
    let client = ctx.optional_client(&args.rpc)?;

    let tx = build_contract_transaction(client.as_ref(), from, call, &opts).await?;
    Ok(finalize_transaction(client.as_ref(), tx, from, ctx.config.gas_policy()).await?)
}
