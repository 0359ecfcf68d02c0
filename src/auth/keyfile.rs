//! Signing with an encrypted keyfile.

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use zeroize::Zeroizing;

use crate::auth::keystore::{decrypt_keyfile, load_key_record, record_address};
use crate::auth::{typed_for_signing, AuthError, AuthResult, Authenticator, PASSWORD_ENV_VAR};
use crate::blockchain::{SignedTransaction, UnsignedTransaction};

/// Authenticator backed by a v3 keystore file.
///
/// The address comes from the record's plaintext `address` field, so
/// commands that only need the sender never ask for a password. The key is
/// decrypted the first time something is signed and reused afterwards.
pub struct KeyfileAuthenticator {
    path: PathBuf,
    address: Address,
    password: Option<Zeroizing<String>>,
    signer: OnceCell<PrivateKeySigner>,
}

impl KeyfileAuthenticator {
    /// Load the key record at `path`. Nothing is decrypted yet.
    pub fn new(path: impl Into<PathBuf>, password: Option<String>) -> AuthResult<Self> {
        let path = path.into();
        let address = record_address(&load_key_record(&path)?)?;

        Ok(Self {
            path,
            address,
            password: password.map(Zeroizing::new),
            signer: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the key has been decrypted.
    pub fn is_unlocked(&self) -> bool {
        self.signer.initialized()
    }

    /// The raw private key, decrypting if needed.
    pub async fn private_key(&self) -> AuthResult<Zeroizing<Vec<u8>>> {
        let signer = self.signer().await?;
        Ok(Zeroizing::new(signer.to_bytes().to_vec()))
    }

    async fn signer(&self) -> AuthResult<&PrivateKeySigner> {
        self.signer.get_or_try_init(|| async { self.unlock() }).await
    }

    fn resolve_password(&self) -> AuthResult<Zeroizing<String>> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
            return Ok(Zeroizing::new(password));
        }
        dialoguer::Password::new()
            .with_prompt(format!("Password for {}", self.path.display()))
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| AuthError::KeyDecryption(format!("cannot read password: {e}")))
    }

    fn unlock(&self) -> AuthResult<PrivateKeySigner> {
        let password = self.resolve_password()?;
        let key = decrypt_keyfile(&self.path, &password)?;
        let signer = PrivateKeySigner::from_slice(&key)
            .map_err(|e| AuthError::KeyDecryption(format!("invalid key material: {e}")))?;

        if signer.address() != self.address {
            return Err(AuthError::KeyDecryption(format!(
                "decrypted key is for {}, keyfile claims {}",
                signer.address(),
                self.address
            )));
        }

        tracing::debug!(address = %self.address, "Keyfile unlocked");
        Ok(signer)
    }
}

impl std::fmt::Debug for KeyfileAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyfileAuthenticator")
            .field("path", &self.path)
            .field("address", &self.address)
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}

#[async_trait]
impl Authenticator for KeyfileAuthenticator {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: &UnsignedTransaction) -> AuthResult<SignedTransaction> {
        let typed = typed_for_signing(tx, self.address)?;
        let signer = self.signer().await?;
        let signature = signer
            .sign_hash_sync(&typed.signature_hash())
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        typed
            .into_signed(signature)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    async fn sign_message(&self, message: &str) -> AuthResult<Vec<u8>> {
        let signer = self.signer().await?;
        let signature = signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok(signature.as_bytes().to_vec())
    }
}
