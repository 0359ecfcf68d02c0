//! `aut tx`: the make → sign → send → wait pipeline, one step per command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use clap::{Args, Subcommand};

use crate::blockchain::{
    build_contract_transaction, build_transaction, ensure_success, finalize_transaction,
    send_transaction, wait_for_receipt, BlockchainError, ChainClient, Receipt, SignedTransaction,
    UnsignedTransaction,
};
use crate::cli::options::{AuthArgs, FromArgs, RpcArgs, TokenArgs, TxArgs};
use crate::cli::output::{print_json, read_json, write_json};
use crate::cli::Context;
use crate::contract::{AutonityContract, ContractCall, Erc20Contract};
use crate::error::{CliError, CliResult};
use crate::signing;
use crate::value::{parse_newton_amount, parse_token_amount};

#[derive(Subcommand, Debug)]
pub enum TxCommands {
    /// Create an unsigned transaction (JSON on stdout)
    Make(MakeArgs),

    /// Sign a transaction file (JSON on stdout)
    Sign(SignArgs),

    /// Send a signed transaction file, printing its hash
    Send(SendArgs),

    /// Wait for a transaction to be mined and print its receipt
    Wait(WaitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MakeArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub from: FromArgs,

    /// Recipient (omit to deploy a contract from --data)
    #[arg(long, short = 't', value_name = "ADDRESS")]
    pub to: Option<Address>,

    /// Value to send, e.g. "1.5aut" or "200gwei" (token units with --ntn/--token)
    #[arg(long, value_name = "AMOUNT")]
    pub value: Option<String>,

    /// Call data as hex
    #[arg(long, short = 'd', value_name = "HEX", conflicts_with_all = ["ntn", "token"])]
    pub data: Option<Bytes>,

    #[command(flatten)]
    pub token: TokenArgs,

    #[command(flatten)]
    pub tx: TxArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Unsigned transaction file ("-" for stdin)
    #[arg(default_value = "-")]
    pub tx_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    /// Signed transaction file ("-" for stdin)
    #[arg(default_value = "-")]
    pub tx_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    /// Print nothing; only the exit status reports the outcome
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Seconds to wait (default from config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    pub tx_hash: TxHash,
}

pub async fn run(ctx: &Context, cmd: TxCommands) -> CliResult<()> {
    match cmd {
        TxCommands::Make(args) => {
            let tx = make(ctx, &args).await?;
            print_json(&tx)
        }
        TxCommands::Sign(args) => sign(ctx, &args.auth, &args.tx_file).await,
        TxCommands::Send(args) => {
            let client = ctx.client(&args.rpc)?;
            let signed: SignedTransaction = read_json(&args.tx_file)?;
            let hash = send_transaction(&client, &signed).await?;
            println!("{hash}");
            Ok(())
        }
        TxCommands::Wait(args) => {
            let client = ctx.client(&args.rpc)?;
            let wait_timeout = match args.timeout {
                Some(secs) => Duration::try_from_secs_f64(secs)
                    .map_err(|_| CliError::invalid(format!("invalid timeout {secs}")))?,
                None => ctx.config.wait_timeout(),
            };
            wait_for_transaction(
                &client,
                args.tx_hash,
                wait_timeout,
                ctx.config.poll_interval(),
                args.quiet,
                &mut std::io::stdout().lock(),
            )
            .await
            .map(|_| ())
        }
    }
}

/// Sign an unsigned transaction file and print the signed JSON.
pub async fn sign(ctx: &Context, auth: &AuthArgs, tx_file: &Path) -> CliResult<()> {
    let tx: UnsignedTransaction = read_json(tx_file)?;
    let authenticator = ctx.authenticator(auth).await?;
    let signed = signing::sign(authenticator.as_ref(), &tx).await?;
    println!("{}", signing::to_json(&signed)?);
    Ok(())
}

async fn make(ctx: &Context, args: &MakeArgs) -> CliResult<UnsignedTransaction> {
    let opts = args.tx.to_options()?;
    let from = ctx.sender(&args.from, &args.auth).await?;
    let client = ctx.optional_client(&args.rpc)?;

    let tx = if args.token.ntn || args.token.token.is_some() {
        let call = token_transfer(client.as_ref(), args).await?;
        build_contract_transaction(client.as_ref(), from, call, &opts).await?
    } else {
        build_transaction(
            client.as_ref(),
            from,
            args.to,
            args.value.as_deref(),
            args.data.clone(),
            &opts,
        )
        .await?
    };

    Ok(finalize_transaction(client.as_ref(), tx, from, ctx.config.gas_policy()).await?)
}

async fn token_transfer<C: ChainClient + ?Sized>(
    client: Option<&C>,
    args: &MakeArgs,
) -> CliResult<ContractCall> {
    let to = args
        .to
        .ok_or_else(|| CliError::invalid("token transfers need --to"))?;
    let value = args
        .value
        .as_deref()
        .ok_or_else(|| CliError::invalid("token transfers need --value"))?;

    match args.token.token {
        Some(token) => {
            let client = client.ok_or_else(|| {
                CliError::invalid("an RPC endpoint is needed to read the token's decimals")
            })?;
            let erc20 = Erc20Contract::new(token);
            let decimals = erc20.decimals(client).await?;
            Ok(erc20.transfer(to, parse_token_amount(value, decimals)?))
        }
        None => Ok(AutonityContract::default().transfer(to, parse_newton_amount(value)?)),
    }
}

/// Wait for `hash`, print its receipt to `out` unless `quiet`, and fail
/// when the transaction reverted.
pub async fn wait_for_transaction<C: ChainClient + ?Sized>(
    client: &C,
    hash: TxHash,
    wait_timeout: Duration,
    poll_interval: Duration,
    quiet: bool,
    out: &mut impl Write,
) -> CliResult<Receipt> {
    let receipt = wait_for_receipt(client, hash, wait_timeout, poll_interval).await?;
    if !quiet {
        write_json(out, &receipt.to_json())?;
    }

    match ensure_success(&receipt) {
        Ok(()) => Ok(receipt),
        Err(BlockchainError::TransactionReverted(hash)) => Err(CliError::TransactionFailed(hash)),
        Err(e) => Err(e.into()),
    }
}
