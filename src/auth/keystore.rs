//! Ethereum v3 keystore files.
//!
//! Files are geth compatible: scrypt/AES-128-CTR JSON with the account
//! address stored unencrypted as lowercase hex, named
//! `UTC--<timestamp>--<address>` inside the keystore directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::auth::{AuthError, AuthResult};

/// Keystore directory used when none is configured.
pub fn default_keystore_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".autonity")
        .join("keystore")
}

/// Read and parse a key record without decrypting it.
pub fn load_key_record(path: &Path) -> AuthResult<serde_json::Value> {
    let contents = fs::read_to_string(path).map_err(|e| AuthError::io(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| AuthError::KeyDecryption(format!("{}: {e}", path.display())))
}

/// The unencrypted `address` field of a key record.
pub fn record_address(record: &serde_json::Value) -> AuthResult<Address> {
    let text = record
        .get("address")
        .and_then(|a| a.as_str())
        .ok_or_else(|| AuthError::KeyDecryption("Unrecognized keyfile format.".to_string()))?;
    let hex = text.strip_prefix("0x").unwrap_or(text);
    hex.parse()
        .map_err(|_| AuthError::KeyDecryption(format!("invalid address '{text}' in keyfile")))
}

/// Address of the account stored in `path`.
pub fn keyfile_address(path: &Path) -> AuthResult<Address> {
    record_address(&load_key_record(path)?)
}

/// Decrypt the private key stored in `path`.
pub fn decrypt_keyfile(path: &Path, password: &str) -> AuthResult<Zeroizing<Vec<u8>>> {
    eth_keystore::decrypt_key(path, password.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| match e {
            eth_keystore::KeystoreError::MacMismatch => {
                AuthError::KeyDecryption("wrong password".to_string())
            }
            other => AuthError::KeyDecryption(other.to_string()),
        })
}

/// Encrypt `private_key` into a new keyfile at `path`.
///
/// Returns the account address.
pub fn create_keyfile(path: &Path, private_key: &[u8], password: &str) -> AuthResult<Address> {
    let signer = PrivateKeySigner::from_slice(private_key)
        .map_err(|e| AuthError::Signing(format!("invalid private key: {e}")))?;
    let address = signer.address();

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AuthError::KeyDecryption(format!("invalid keyfile path {}", path.display())))?;

    eth_keystore::encrypt_key(dir, &mut rand::thread_rng(), private_key, password.as_bytes(), Some(name))
        .map_err(|e| AuthError::KeyDecryption(e.to_string()))?;

    // Tooling reads the address without decrypting, as geth does.
    let mut record = load_key_record(path)?;
    if let Some(object) = record.as_object_mut() {
        object.insert(
            "address".to_string(),
            serde_json::Value::String(hex::encode(address)),
        );
    }
    let contents = serde_json::to_string(&record)
        .map_err(|e| AuthError::KeyDecryption(e.to_string()))?;
    fs::write(path, contents).map_err(|e| AuthError::io(path, e))?;

    tracing::debug!(address = %address, keyfile = %path.display(), "Keyfile created");
    Ok(address)
}

/// Geth-style file name for a key created at `time`.
pub fn geth_keyfile_name(time: DateTime<Utc>, address: Address) -> String {
    format!(
        "UTC--{}000Z--{}",
        time.format("%Y-%m-%dT%H-%M-%S%.6f"),
        hex::encode(address)
    )
}

/// Path for a new keyfile: `keyfile` if given, else a geth-style name in `keystore`.
///
/// Never returns a path that already exists.
pub fn new_keyfile_path(
    keystore: &Path,
    keyfile: Option<&Path>,
    address: Address,
) -> AuthResult<PathBuf> {
    let path = match keyfile {
        Some(path) => path.to_path_buf(),
        None => {
            fs::create_dir_all(keystore).map_err(|e| AuthError::io(keystore, e))?;
            keystore.join(geth_keyfile_name(Utc::now(), address))
        }
    };

    if path.exists() {
        return Err(AuthError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "refusing to overwrite existing keyfile"),
        ));
    }
    Ok(path)
}

/// Accounts in a keystore directory. Files that are not key records are skipped.
pub fn keystore_accounts(dir: &Path) -> AuthResult<BTreeMap<Address, PathBuf>> {
    let mut accounts = BTreeMap::new();
    if !dir.exists() {
        return Ok(accounts);
    }

    let entries = fs::read_dir(dir).map_err(|e| AuthError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| AuthError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        match keyfile_address(&path) {
            Ok(address) => {
                accounts.insert(address, path);
            }
            Err(e) => tracing::debug!(file = %path.display(), error = %e, "Skipping non-keyfile"),
        }
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const KEY: [u8; 32] = [0x11; 32];

    #[test]
    fn test_geth_keyfile_name() {
        let time = Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap()
            + chrono::Duration::microseconds(123_456);
        let addr = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(
            geth_keyfile_name(time, addr),
            "UTC--2023-04-05T06-07-08.123456000Z--f39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_create_and_decrypt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.json");

        let address = create_keyfile(&path, &KEY, "secret").unwrap();
        assert_eq!(keyfile_address(&path).unwrap(), address);

        let decrypted = decrypt_keyfile(&path, "secret").unwrap();
        assert_eq!(decrypted.as_slice(), &KEY);

        assert!(matches!(
            decrypt_keyfile(&path, "wrong"),
            Err(AuthError::KeyDecryption(_))
        ));
    }

    #[test]
    fn test_record_without_address() {
        let record = serde_json::json!({"crypto": {}, "version": 3});
        assert!(matches!(
            record_address(&record),
            Err(AuthError::KeyDecryption(_))
        ));
    }

    #[test]
    fn test_record_address_with_or_without_prefix() {
        let expected = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let bare = serde_json::json!({"address": "f39fd6e51aad88f6f4ce6ab8827279cfffb92266"});
        let prefixed = serde_json::json!({"address": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"});
        assert_eq!(record_address(&bare).unwrap(), expected);
        assert_eq!(record_address(&prefixed).unwrap(), expected);
    }

    #[test]
    fn test_new_keyfile_path_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("taken.json");
        fs::write(&existing, "{}").unwrap();

        let result = new_keyfile_path(dir.path(), Some(&existing), Address::ZERO);
        assert!(matches!(result, Err(AuthError::Io { .. })));

        let generated = new_keyfile_path(&dir.path().join("ks"), None, Address::ZERO).unwrap();
        assert!(generated.starts_with(dir.path().join("ks")));
        assert!(generated
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with(&hex::encode(Address::ZERO)));
    }

    #[test]
    fn test_keystore_accounts_skips_other_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.json");
        let address = create_keyfile(&path, &KEY, "pw").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a key").unwrap();

        let accounts = keystore_accounts(dir.path()).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts.get(&address), Some(&path));

        assert!(keystore_accounts(&dir.path().join("missing")).unwrap().is_empty());
    }
}
