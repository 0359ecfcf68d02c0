//! `aut account`: keyfiles, balances and message signatures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use clap::{Args, Subcommand};
use rand::RngCore;
use serde_json::json;
use zeroize::Zeroizing;

use crate::auth::keystore::{create_keyfile, keyfile_address, keystore_accounts, new_keyfile_path};
use crate::auth::{KeyfileAuthenticator, PASSWORD_ENV_VAR};
use crate::blockchain::{parse_block_tag, ChainClient};
use crate::cli::options::{AuthArgs, FromArgs, KeyfileArgs, KeystoreArgs, RpcArgs, TokenArgs};
use crate::cli::output::{decode_hex, print_json_pretty, read_input, read_input_line};
use crate::cli::validator::liquid_contract;
use crate::cli::{tx, Context};
use crate::contract::{AutonityContract, Erc20Contract};
use crate::error::{CliError, CliResult};
use crate::signing::verify_message;
use crate::value::{format_auton_quantity, format_newton_quantity, format_quantity};

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List the accounts in the keystore
    List(ListArgs),

    /// Balance and nonce of one or more accounts
    Info(InfoArgs),

    /// Balance of an account in Auton, Newton or an ERC20 token
    Balance(BalanceArgs),

    /// Liquid Newton held by an account, per validator
    LntnBalances(LntnBalancesArgs),

    /// Create a new key and write it to an encrypted keyfile
    New(NewArgs),

    /// Encrypt an existing private key into a keyfile
    ImportPrivateKey(ImportArgs),

    /// Print the private key held in a keyfile
    RevealPrivateKey(RevealArgs),

    /// Sign a transaction file (same as `tx sign`)
    Signtx(tx::SignArgs),

    /// Sign a message (EIP-191), printing the signature as hex
    SignMessage(SignMessageArgs),

    /// Check that a message signature was made by an account
    VerifySignature(VerifySignatureArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub keystore: KeystoreArgs,

    /// Also print the keyfile paths
    #[arg(long)]
    pub with_files: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Block number or tag (latest, pending, earliest, ...)
    #[arg(long, default_value = "latest")]
    pub asof: String,

    /// Accounts to query (default: the keyfile's account)
    pub accounts: Vec<Address>,
}

#[derive(Args, Debug, Clone)]
pub struct LntnBalancesArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Account to query (default: the keyfile's account)
    pub account: Option<Address>,
}

#[derive(Args, Debug, Clone)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    #[command(flatten)]
    pub token: TokenArgs,

    /// Account to query (default: the keyfile's account)
    pub account: Option<Address>,
}

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    #[command(flatten)]
    pub keystore: KeystoreArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Password for the new keyfile (falls back to KEYFILEPWD, then a prompt)
    #[arg(long, short = 'p', env = "KEYFILEPWD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub keystore: KeystoreArgs,

    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Password for the new keyfile (falls back to KEYFILEPWD, then a prompt)
    #[arg(long, short = 'p', env = "KEYFILEPWD", hide_env_values = true)]
    pub password: Option<String>,

    /// File holding the hex private key ("-" for stdin)
    pub private_key_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RevealArgs {
    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    /// Keyfile password (falls back to KEYFILEPWD, then a prompt)
    #[arg(long, short = 'p', env = "KEYFILEPWD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SignMessageArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Treat MESSAGE as the name of a file holding the message
    #[arg(long)]
    pub use_message_file: bool,

    pub message: String,

    /// Also write the signature to this file
    pub signature_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifySignatureArgs {
    #[command(flatten)]
    pub keyfile: KeyfileArgs,

    #[command(flatten)]
    pub from: FromArgs,

    /// Treat MESSAGE as the name of a file holding the message
    #[arg(long)]
    pub use_message_file: bool,

    pub message: String,

    /// File holding the hex signature ("-" for stdin)
    pub signature_file: PathBuf,
}

pub async fn run(ctx: &Context, cmd: AccountCommands) -> CliResult<()> {
    match cmd {
        AccountCommands::List(args) => {
            let dir = keystore_dir(ctx, &args.keystore);
            for (address, path) in keystore_accounts(&dir)? {
                if args.with_files {
                    println!("{address}  {}", path.display());
                } else {
                    println!("{address}");
                }
            }
            Ok(())
        }
        AccountCommands::Info(args) => info(ctx, &args).await,
        AccountCommands::Balance(args) => balance(ctx, &args).await,
        AccountCommands::LntnBalances(args) => {
            let client = ctx.client(&args.rpc)?;
            let account = match args.account {
                Some(account) => account,
                None => default_account(ctx, &args.keyfile)?,
            };
            let balances: serde_json::Map<String, serde_json::Value> =
                lntn_balances(&client, account)
                    .await?
                    .into_iter()
                    .map(|(validator, amount)| {
                        (validator.to_string(), format_newton_quantity(amount).into())
                    })
                    .collect();
            print_json_pretty(&balances)
        }
        AccountCommands::New(args) => {
            let mut key = Zeroizing::new(vec![0u8; 32]);
            rand::thread_rng().fill_bytes(key.as_mut_slice());
            let (address, path) = store_key(
                ctx,
                &args.keystore,
                &args.keyfile,
                &key,
                args.password.as_deref(),
            )?;
            println!("{address}  {}", path.display());
            Ok(())
        }
        AccountCommands::ImportPrivateKey(args) => {
            let text = Zeroizing::new(read_input_line(&args.private_key_file)?);
            let key = Zeroizing::new(decode_hex(&text)?);
            if key.len() != 32 {
                return Err(CliError::invalid(format!(
                    "private key must be 32 bytes, got {}",
                    key.len()
                )));
            }
            let (address, path) = store_key(
                ctx,
                &args.keystore,
                &args.keyfile,
                &key,
                args.password.as_deref(),
            )?;
            println!("{address}  {}", path.display());
            Ok(())
        }
        AccountCommands::RevealPrivateKey(args) => reveal_private_key(ctx, args).await,
        AccountCommands::Signtx(args) => tx::sign(ctx, &args.auth, &args.tx_file).await,
        AccountCommands::SignMessage(args) => {
            let message = message_text(&args.message, args.use_message_file)?;
            let authenticator = ctx.authenticator(&args.auth).await?;
            let signature = format!("0x{}", hex::encode(authenticator.sign_message(&message).await?));
            if let Some(path) = &args.signature_file {
                std::fs::write(path, &signature)?;
            }
            println!("{signature}");
            Ok(())
        }
        AccountCommands::VerifySignature(args) => {
            let message = message_text(&args.message, args.use_message_file)?;
            let signature = decode_hex(&read_input(&args.signature_file)?)?;
            let address = match args.from.from {
                Some(address) => address,
                None => keyfile_address(&keyfile(ctx, &args.keyfile)?)?,
            };
            if !verify_message(address, &message, &signature)? {
                return Err(CliError::SignatureInvalid);
            }
            println!("Signature valid");
            Ok(())
        }
    }
}

fn keystore_dir(ctx: &Context, args: &KeystoreArgs) -> PathBuf {
    args.keystore
        .clone()
        .unwrap_or_else(|| ctx.config.keystore_dir())
}

fn keyfile(ctx: &Context, args: &KeyfileArgs) -> CliResult<PathBuf> {
    args.keyfile
        .clone()
        .or_else(|| ctx.config.keyfile_path())
        .ok_or_else(|| CliError::invalid("no keyfile (use --keyfile, KEYFILE or 'keyfile' in the config file)"))
}

/// Address of the keyfile given by flag or config.
pub(crate) fn default_account(ctx: &Context, args: &KeyfileArgs) -> CliResult<Address> {
    Ok(keyfile_address(&keyfile(ctx, args)?)?)
}

fn message_text(message: &str, from_file: bool) -> CliResult<String> {
    if from_file {
        read_input(Path::new(message))
    } else {
        Ok(message.to_string())
    }
}

/// Password for a new keyfile: KEYFILEPWD, else prompted twice.
fn new_password(explicit: Option<&str>) -> CliResult<Zeroizing<String>> {
    if let Some(password) = explicit {
        return Ok(Zeroizing::new(password.to_string()));
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
        return Ok(Zeroizing::new(password));
    }
    let password = dialoguer::Password::new()
        .with_prompt("Password for new keyfile")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    Ok(Zeroizing::new(password))
}

fn store_key(
    ctx: &Context,
    keystore: &KeystoreArgs,
    keyfile: &KeyfileArgs,
    key: &[u8],
    password: Option<&str>,
) -> CliResult<(Address, PathBuf)> {
    let address = PrivateKeySigner::from_slice(key)
        .map_err(|e| CliError::invalid(format!("invalid private key: {e}")))?
        .address();
    let path = new_keyfile_path(&keystore_dir(ctx, keystore), keyfile.keyfile.as_deref(), address)?;
    let password = new_password(password)?;
    create_keyfile(&path, key, &password)?;
    tracing::info!(address = %address, keyfile = %path.display(), "Keyfile written");
    Ok((address, path))
}

async fn reveal_private_key(ctx: &Context, args: RevealArgs) -> CliResult<()> {
    let path = keyfile(ctx, &args.keyfile)?;
    let confirmation: String = dialoguer::Input::new()
        .with_prompt(format!(
            "The private key of {} will be printed. Type 'yes' to continue",
            path.display()
        ))
        .interact_text()?;
    if confirmation.trim() != "yes" {
        return Err(CliError::Interrupted);
    }

    let authenticator = KeyfileAuthenticator::new(path, args.password)?;
    let key = authenticator.private_key().await?;
    println!("0x{}", hex::encode(key.as_slice()));
    Ok(())
}

async fn info(ctx: &Context, args: &InfoArgs) -> CliResult<()> {
    let client = ctx.client(&args.rpc)?;
    let tag = parse_block_tag(&args.asof)?;
    let accounts = if args.accounts.is_empty() {
        vec![default_account(ctx, &args.keyfile)?]
    } else {
        args.accounts.clone()
    };

    let mut infos = Vec::with_capacity(accounts.len());
    for account in accounts {
        infos.push(account_info(&client, account, tag).await?);
    }
    print_json_pretty(&infos)
}

/// Balance and nonce of `account` at `tag`.
pub async fn account_info<C: ChainClient + ?Sized>(
    client: &C,
    account: Address,
    tag: BlockNumberOrTag,
) -> CliResult<serde_json::Value> {
    let balance = client.balance(account, tag).await?;
    let nonce = client.transaction_count(account, tag).await?;
    Ok(json!({
        "address": account.to_string(),
        "balance": format_auton_quantity(balance),
        "nonce": nonce,
    }))
}

async fn balance(ctx: &Context, args: &BalanceArgs) -> CliResult<()> {
    let client = ctx.client(&args.rpc)?;
    let account = match args.account {
        Some(account) => account,
        None => default_account(ctx, &args.keyfile)?,
    };

    let text = if args.token.ntn {
        format_newton_quantity(AutonityContract::default().balance_of(&client, account).await?)
    } else if let Some(token) = args.token.token {
        let erc20 = Erc20Contract::new(token);
        let decimals = erc20.decimals(&client).await?;
        format_quantity(erc20.balance_of(&client, account).await?, decimals)
    } else {
        format_auton_quantity(client.balance(account, BlockNumberOrTag::Latest).await?)
    };
    println!("{text}");
    Ok(())
}

/// Non-zero Liquid Newton balances of `account`, keyed by validator.
pub async fn lntn_balances<C: ChainClient + ?Sized>(
    client: &C,
    account: Address,
) -> CliResult<BTreeMap<Address, U256>> {
    let mut balances = BTreeMap::new();
    for validator in AutonityContract::default().validators(client).await? {
        let liquid = liquid_contract(client, validator).await?;
        let balance = liquid.balance_of(client, account).await?;
        tracing::debug!(validator = %validator, balance = %balance, "Liquid Newton holding");
        if !balance.is_zero() {
            balances.insert(validator, balance);
        }
    }
    Ok(balances)
}
