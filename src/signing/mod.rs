//! Transaction and message signing on top of an [`Authenticator`].

use alloy::primitives::{Address, Signature};

use crate::auth::{AuthError, AuthResult, Authenticator};
use crate::blockchain::{SignedTransaction, UnsignedTransaction};

/// Sign a finalized transaction.
pub async fn sign(
    authenticator: &dyn Authenticator,
    tx: &UnsignedTransaction,
) -> AuthResult<SignedTransaction> {
    let signed = authenticator.sign_transaction(tx).await?;
    tracing::info!(tx_hash = %signed.hash, from = %authenticator.address(), "Transaction signed");
    Ok(signed)
}

/// JSON form written by `tx sign` and read back by `tx send`.
pub fn to_json(signed: &SignedTransaction) -> serde_json::Result<String> {
    serde_json::to_string(signed)
}

fn parse_signature(signature: &[u8]) -> AuthResult<Signature> {
    Signature::from_raw(signature).map_err(|e| AuthError::MalformedSignature(e.to_string()))
}

/// Address that produced `signature` over the EIP-191 form of `message`.
pub fn recover_message_signer(message: &str, signature: &[u8]) -> AuthResult<Address> {
    parse_signature(signature)?
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| AuthError::MalformedSignature(e.to_string()))
}

/// Whether `signature` over `message` was produced by `address`.
pub fn verify_message(address: Address, message: &str, signature: &[u8]) -> AuthResult<bool> {
    let signer = recover_message_signer(message, signature)?;
    if signer != address {
        tracing::debug!(expected = %address, recovered = %signer, "Signature mismatch");
    }
    Ok(signer == address)
}
