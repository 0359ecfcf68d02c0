//! BIP-32 derivation paths for hardware wallets.

use std::fmt;
use std::str::FromStr;

use crate::auth::{AuthError, AuthResult};

const HARDENED: u32 = 0x8000_0000;

/// Prefix used when the account is given as a bare index.
pub const DEFAULT_PATH_PREFIX: &str = "m/44'/60'/0'/0";

/// Validated derivation path such as `m/44'/60'/0'/0/3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    components: Vec<u32>,
}

impl DerivationPath {
    /// Resolve a `--trezor` value: an account index or an explicit path.
    pub fn from_selector(selector: &str) -> AuthResult<Self> {
        let selector = selector.trim();
        if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
            return format!("{DEFAULT_PATH_PREFIX}/{selector}").parse();
        }
        selector.parse()
    }

    /// Raw child indices, hardened ones with the high bit set.
    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl FromStr for DerivationPath {
    type Err = AuthError;

    fn from_str(text: &str) -> AuthResult<Self> {
        let invalid = || AuthError::InvalidDerivationPath(text.to_string());

        let rest = text.strip_prefix("m/").unwrap_or(text);
        if rest.is_empty() {
            return Err(invalid());
        }

        let components = rest
            .split('/')
            .map(|part| {
                let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
                    Some(digits) => (digits, true),
                    None => (part, false),
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let index: u32 = digits.parse().map_err(|_| invalid())?;
                if index >= HARDENED {
                    return Err(invalid());
                }
                Ok(if hardened { index | HARDENED } else { index })
            })
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(Self { components })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in &self.components {
            if component & HARDENED != 0 {
                write!(f, "/{}'", component & !HARDENED)?;
            } else {
                write!(f, "/{component}")?;
            }
        }
        Ok(())
    }
}
