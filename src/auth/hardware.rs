//! Signing with a hardware wallet.
//!
//! # Responsibilities
//! - Abstract the device behind [`HardwareDevice`]
//! - Check that a transaction carries everything the device displays
//! - Encode and hash locally; the device only returns signatures

use alloy::consensus::TxEip1559;
use alloy::primitives::{Address, Signature};
use async_trait::async_trait;

use crate::auth::derivation::DerivationPath;
use crate::auth::{AuthError, AuthResult, Authenticator};
use crate::blockchain::{SignedTransaction, TypedUnsigned, UnsignedTransaction};

/// A connected signing device, bound to one derivation path.
#[async_trait]
pub trait HardwareDevice: Send + Sync {
    /// Human-readable description (model, account) for logs.
    fn identity(&self) -> String;

    async fn address(&self) -> AuthResult<Address>;

    async fn sign_transaction(&self, tx: &TxEip1559) -> AuthResult<Signature>;

    /// Sign under the EIP-191 personal-message prefix.
    async fn sign_message(&self, message: &[u8]) -> AuthResult<Signature>;
}

/// Authenticator whose key never leaves the device.
pub struct HardwareAuthenticator {
    device: Box<dyn HardwareDevice>,
    path: DerivationPath,
    address: Address,
}

impl HardwareAuthenticator {
    /// Wrap an already connected device.
    pub async fn new(device: Box<dyn HardwareDevice>, path: DerivationPath) -> AuthResult<Self> {
        let address = device.address().await?;
        tracing::debug!(device = %device.identity(), path = %path, address = %address, "Hardware wallet connected");
        Ok(Self {
            device,
            path,
            address,
        })
    }

    /// Connect to the single attached device.
    #[cfg(feature = "trezor")]
    pub async fn connect(path: DerivationPath) -> AuthResult<Self> {
        let device = crate::auth::trezor::TrezorDevice::connect(&path).await?;
        Self::new(Box::new(device), path).await
    }

    /// Connect to the single attached device.
    #[cfg(not(feature = "trezor"))]
    pub async fn connect(path: DerivationPath) -> AuthResult<Self> {
        Err(AuthError::DeviceNotFound(format!(
            "hardware wallet support is not compiled in (rebuild with --features trezor to use {path})"
        )))
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.path
    }
}

fn require<T: Clone>(field: &Option<T>, name: &str) -> AuthResult<T> {
    field
        .clone()
        .ok_or_else(|| AuthError::IncompleteTransaction(name.to_string()))
}

/// Fee-market transaction with every field the device shows to the user.
fn device_transaction(tx: &UnsignedTransaction) -> AuthResult<TxEip1559> {
    if tx.has_legacy_fees() {
        return Err(AuthError::Signing(
            "hardware wallets only sign EIP-1559 transactions; drop --gas-price/--legacy".to_string(),
        ));
    }

    Ok(TxEip1559 {
        chain_id: require(&tx.chain_id, "chain id")?,
        nonce: require(&tx.nonce, "nonce")?,
        gas_limit: require(&tx.gas, "gas")?,
        max_fee_per_gas: require(&tx.max_fee_per_gas, "max fee per gas")?,
        max_priority_fee_per_gas: require(
            &tx.max_priority_fee_per_gas,
            "max priority fee per gas",
        )?,
        to: require(&tx.to, "recipient")?.into(),
        value: require(&tx.value, "value")?,
        access_list: Default::default(),
        input: tx.data.clone().unwrap_or_default(),
    })
}

#[async_trait]
impl Authenticator for HardwareAuthenticator {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: &UnsignedTransaction) -> AuthResult<SignedTransaction> {
        let unsigned = device_transaction(tx)?;
        let signature = self.device.sign_transaction(&unsigned).await?;

        let typed = TypedUnsigned::Eip1559(unsigned);
        let signer = signature
            .recover_address_from_prehash(&typed.signature_hash())
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        if signer != self.address {
            return Err(AuthError::Signing(format!(
                "device signed as {signer}, expected {}",
                self.address
            )));
        }

        typed
            .into_signed(signature)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    async fn sign_message(&self, message: &str) -> AuthResult<Vec<u8>> {
        let signature = self.device.sign_message(message.as_bytes()).await?;
        Ok(signature.as_bytes().to_vec())
    }
}
