//! Trezor devices through alloy's Trezor signer.

use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::network::TxSigner;
use alloy::primitives::{Address, Signature};
use alloy::signers::trezor::{HDPath, TrezorSigner};
use alloy::signers::Signer;
use async_trait::async_trait;

use crate::auth::derivation::DerivationPath;
use crate::auth::hardware::HardwareDevice;
use crate::auth::{AuthError, AuthResult};

/// Map a device error onto the user-facing variants.
fn classify(error: impl std::fmt::Display) -> AuthError {
    let message = error.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("busy") || lowered.contains("in use") {
        AuthError::DeviceBusy
    } else if lowered.contains("cancel") || lowered.contains("reject") {
        AuthError::UserCancelled
    } else {
        AuthError::DeviceNotFound(format!(
            "{message}. Check device is connected, unlocked, and detected by OS."
        ))
    }
}

/// A Trezor bound to one derivation path.
pub struct TrezorDevice {
    signer: TrezorSigner,
}

impl TrezorDevice {
    pub async fn connect(path: &DerivationPath) -> AuthResult<Self> {
        let signer = TrezorSigner::new(HDPath::Other(path.to_string()), None)
            .await
            .map_err(classify)?;
        Ok(Self { signer })
    }
}

#[async_trait]
impl HardwareDevice for TrezorDevice {
    fn identity(&self) -> String {
        format!("Trezor ({})", Signer::address(&self.signer))
    }

    async fn address(&self) -> AuthResult<Address> {
        Ok(Signer::address(&self.signer))
    }

    async fn sign_transaction(&self, tx: &TxEip1559) -> AuthResult<Signature> {
        let mut tx = tx.clone();
        TxSigner::sign_transaction(&self.signer, &mut tx as &mut dyn SignableTransaction<Signature>)
            .await
            .map_err(classify)
    }

    async fn sign_message(&self, message: &[u8]) -> AuthResult<Signature> {
        Signer::sign_message(&self.signer, message)
            .await
            .map_err(classify)
    }
}

#[cfg(all(test, feature = "trezor"))]
mod tests {
    use super::*;

    #[test]
    fn test_classify_device_errors() {
        let cases = [
            ("Device is busy", "busy"),
            ("USB device already in use", "busy"),
            ("Action cancelled by user", "cancelled"),
            ("ActionCancelled", "cancelled"),
            ("Transaction rejected on device", "cancelled"),
            ("no Trezor device found", "not found"),
            ("transport error: timeout", "not found"),
        ];
        for (message, expected) in cases {
            let kind = match classify(message) {
                AuthError::DeviceBusy => "busy",
                AuthError::UserCancelled => "cancelled",
                AuthError::DeviceNotFound(_) => "not found",
                other => panic!("{message}: unexpected {other:?}"),
            };
            assert_eq!(kind, expected, "{message}");
        }
    }

    #[test]
    fn test_not_found_keeps_device_message() {
        match classify("libusb: access denied") {
            AuthError::DeviceNotFound(detail) => {
                assert!(detail.starts_with("libusb: access denied."));
                assert!(detail.contains("unlocked"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
