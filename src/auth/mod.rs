//! Signing identities.
//!
//! # Data Flow
//! ```text
//! --trezor / --keyfile / configured keyfile
//!     → get_authenticator (precedence, conflicts)
//!     → keyfile.rs (encrypted v3 keystore, decrypted once on first use)
//!       or hardware.rs (device holds the key; only signatures come back)
//!     → SignedTransaction / 65-byte message signature
//! ```
//!
//! # Security Constraints
//! - Passwords and private keys are held in `Zeroizing` buffers
//! - Neither is ever logged nor included in an error message
//! - A keyfile is only decrypted when something is actually signed

pub mod derivation;
pub mod hardware;
pub mod keyfile;
pub mod keystore;
#[cfg(feature = "trezor")]
pub mod trezor;

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::blockchain::{BlockchainError, SignedTransaction, TypedUnsigned, UnsignedTransaction};

pub use derivation::DerivationPath;
pub use hardware::{HardwareAuthenticator, HardwareDevice};
pub use keyfile::KeyfileAuthenticator;

/// Environment variable consulted for the keyfile password.
pub const PASSWORD_ENV_VAR: &str = "KEYFILEPWD";

/// Errors raised while loading keys or signing.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unreadable key record.
    #[error("Cannot decrypt keyfile: {0}")]
    KeyDecryption(String),

    /// Another process holds the hardware device.
    #[error("Device in use by another process.")]
    DeviceBusy,

    #[error("No hardware device found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid derivation path '{0}'")]
    InvalidDerivationPath(String),

    /// The user rejected the request on the device.
    #[error("Action cancelled by the user")]
    UserCancelled,

    #[error("Both a hardware wallet and a keyfile were given; choose one")]
    AmbiguousAuthMethod,

    #[error("No keyfile specified (use --keyfile or set 'keyfile' in the config file)")]
    NoKeyfile,

    #[error("Incomplete transaction: missing {0}")]
    IncompleteTransaction(String),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Complete consensus transaction to be signed by `signer`.
pub(crate) fn typed_for_signing(
    tx: &UnsignedTransaction,
    signer: Address,
) -> AuthResult<TypedUnsigned> {
    if let Some(from) = tx.from {
        if from != signer {
            return Err(AuthError::Signing(format!(
                "transaction is from {from} but the key is for {signer}"
            )));
        }
    }
    tx.to_typed().map_err(|e| match e {
        BlockchainError::IncompleteTransaction(field) => AuthError::IncompleteTransaction(field),
        err @ BlockchainError::ChainIdOutOfRange(_) => AuthError::Signing(err.to_string()),
        other => AuthError::IncompleteTransaction(other.to_string()),
    })
}

/// Anything that can sign on behalf of one address.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Address whose key produces the signatures.
    fn address(&self) -> Address;

    /// Sign a complete transaction.
    async fn sign_transaction(&self, tx: &UnsignedTransaction) -> AuthResult<SignedTransaction>;

    /// Sign a text message under EIP-191; returns `r || s || v` (65 bytes).
    async fn sign_message(&self, message: &str) -> AuthResult<Vec<u8>>;
}

/// Signing method requested on the command line.
#[derive(Debug, Clone, Default)]
pub struct AuthSelection {
    /// Hardware wallet account index or derivation path.
    pub trezor: Option<String>,
    pub keyfile: Option<PathBuf>,
    pub password: Option<String>,
}

/// Build the authenticator for `selection`.
///
/// A hardware designator wins over a keyfile; an explicit keyfile wins over
/// `default_keyfile`. Giving both a hardware designator and an explicit
/// keyfile is an error.
pub async fn get_authenticator(
    selection: AuthSelection,
    default_keyfile: Option<&Path>,
) -> AuthResult<Box<dyn Authenticator>> {
    match (selection.trezor, selection.keyfile) {
        (Some(_), Some(_)) => Err(AuthError::AmbiguousAuthMethod),
        (Some(selector), None) => {
            let path = DerivationPath::from_selector(&selector)?;
            let auth = HardwareAuthenticator::connect(path).await?;
            Ok(Box::new(auth))
        }
        (None, keyfile) => {
            let path = keyfile
                .or_else(|| default_keyfile.map(Path::to_path_buf))
                .ok_or(AuthError::NoKeyfile)?;
            tracing::debug!(keyfile = %path.display(), "Using keyfile");
            Ok(Box::new(KeyfileAuthenticator::new(path, selection.password)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hardware_and_keyfile_is_ambiguous() {
        let selection = AuthSelection {
            trezor: Some("0".into()),
            keyfile: Some(PathBuf::from("/nonexistent.json")),
            password: None,
        };
        let err = get_authenticator(selection, None).await.err().unwrap();
        assert!(matches!(err, AuthError::AmbiguousAuthMethod));
    }

    #[tokio::test]
    async fn test_nothing_selected_is_no_keyfile() {
        let err = get_authenticator(AuthSelection::default(), None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::NoKeyfile));
    }

    #[tokio::test]
    async fn test_bad_derivation_path_fails_before_device() {
        let selection = AuthSelection {
            trezor: Some("m/44'/x".into()),
            ..Default::default()
        };
        let err = get_authenticator(selection, Some(Path::new("/ignored.json")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::InvalidDerivationPath(_)));
    }

    #[tokio::test]
    async fn test_default_keyfile_is_used() {
        let err = get_authenticator(AuthSelection::default(), Some(Path::new("/nonexistent/key.json")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::Io { .. }));
    }
}
