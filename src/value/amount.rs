//! Token amounts: parsing into base units and formatting for display.

use alloy::primitives::U256;

use crate::value::decimal::{pow10, Decimal};
use crate::value::denomination::{split_denomination, AUTON_DECIMALS};
use crate::value::{ValueError, ValueResult};

/// Decimals of the Newton (NTN) staking token.
pub const NEWTON_DECIMALS: u8 = 18;

/// Parse an amount with an optional denomination suffix into wei.
///
/// `"7gwei"`, `"0.000000007"` and `"0.000000007aut"` are the same amount.
/// Without a suffix the number is read as whole Auton. Fractions of a wei
/// are truncated.
pub fn parse_denominated_amount(text: &str) -> ValueResult<U256> {
    let lowered = text.trim().to_lowercase();
    let (number, denomination) = split_denomination(&lowered);

    Decimal::parse(number)
        .and_then(|d| d.mul_truncate(denomination.multiplier()))
        .ok_or_else(|| ValueError::InvalidAmount(text.to_string()))
}

/// Parse a token amount given the token's decimals.
///
/// Suffixes are not supported for tokens.
pub fn parse_token_amount(text: &str, decimals: u8) -> ValueResult<U256> {
    let multiplier =
        pow10(u32::from(decimals)).ok_or_else(|| ValueError::InvalidAmount(text.to_string()))?;

    Decimal::parse(text)
        .and_then(|d| d.mul_truncate(multiplier))
        .ok_or_else(|| ValueError::InvalidAmount(text.to_string()))
}

/// Parse an amount of Newton into its smallest units.
pub fn parse_newton_amount(text: &str) -> ValueResult<U256> {
    parse_token_amount(text, NEWTON_DECIMALS)
}

/// Parse a base fee multiplier such as `"2"` or `"1.25"`.
pub fn parse_fee_factor(text: &str) -> ValueResult<Decimal> {
    Decimal::parse(text).ok_or_else(|| ValueError::InvalidAmount(text.to_string()))
}

/// Render base units as a decimal with every fractional digit shown.
pub fn format_quantity(amount: U256, decimals: u8) -> String {
    let Some(unit) = pow10(u32::from(decimals)) else {
        return amount.to_string();
    };
    if decimals == 0 {
        return amount.to_string();
    }

    let whole = amount / unit;
    let fraction = (amount % unit).to_string();
    format!(
        "{whole}.{fraction:0>width$}",
        width = usize::from(decimals)
    )
}

/// Render wei as Auton.
pub fn format_auton_quantity(amount: U256) -> String {
    format_quantity(amount, AUTON_DECIMALS as u8)
}

/// Render Newton base units as Newton.
pub fn format_newton_quantity(amount: U256) -> String {
    format_quantity(amount, NEWTON_DECIMALS)
}
