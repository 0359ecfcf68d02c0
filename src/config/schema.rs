//! Configuration schema definitions.
//!
//! Every field has a default so an empty or missing file is valid. Values
//! given on the command line or in the environment take precedence over
//! the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::keystore::default_keystore_dir;
use crate::blockchain::GasEstimatePolicy;

/// Root configuration, usually `.aut.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AutConfig {
    /// Node JSON-RPC endpoint.
    pub rpc_endpoint: Option<String>,

    /// Directory holding keyfiles.
    pub keystore: Option<PathBuf>,

    /// Keyfile used when none is given on the command line.
    pub keyfile: Option<PathBuf>,

    /// Validator address used when `--validator` is absent.
    pub validator: Option<String>,

    pub rpc: RpcConfig,

    pub transactions: TransactionConfig,
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// Transaction pipeline settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Default `tx wait --timeout`.
    pub wait_timeout_secs: u64,

    /// Receipt polling interval.
    pub poll_interval_ms: u64,

    /// Gas limit used when estimation fails. Unset means estimation
    /// failures are errors.
    pub fallback_gas_limit: Option<u64>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 120,
            poll_interval_ms: 1000,
            fallback_gas_limit: None,
        }
    }
}

/// Replace a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

impl AutConfig {
    /// Keystore directory, falling back to `~/.autonity/keystore`.
    pub fn keystore_dir(&self) -> PathBuf {
        self.keystore
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(default_keystore_dir)
    }

    /// Configured default keyfile.
    pub fn keyfile_path(&self) -> Option<PathBuf> {
        self.keyfile.as_deref().map(expand_home)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.transactions.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.transactions.poll_interval_ms)
    }

    pub fn gas_policy(&self) -> GasEstimatePolicy {
        GasEstimatePolicy::from_fallback(self.transactions.fallback_gas_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutConfig::default();
        assert_eq!(config.rpc.timeout_secs, 10);
        assert_eq!(config.transactions.wait_timeout_secs, 120);
        assert_eq!(config.gas_policy(), GasEstimatePolicy::Strict);
        assert_eq!(config.keystore_dir(), default_keystore_dir());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AutConfig = toml::from_str(
            r#"
            rpc_endpoint = "http://localhost:8545"

            [transactions]
            fallback_gas_limit = 250000
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_endpoint.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.transactions.poll_interval_ms, 1000);
        assert_eq!(config.gas_policy(), GasEstimatePolicy::Fallback(250_000));
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("/tmp/keys");
        assert_eq!(expand_home(plain), plain);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/ks")), home.join("ks"));
        }
    }
}
