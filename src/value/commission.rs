//! Validator commission rates.
//!
//! The Autonity contract stores a rate as an integer out of
//! [`COMMISSION_RATE_PRECISION`]. Operators may type `"3%"`, `"0.03"` or the
//! raw `"300"`; all three mean the same rate.

use alloy::primitives::U256;

use crate::value::decimal::Decimal;
use crate::value::{ValueError, ValueResult};

/// Denominator of on-chain commission rates (basis points).
pub const COMMISSION_RATE_PRECISION: u64 = 10_000;

/// Parse a commission rate into a fixed-point integer out of `precision`.
///
/// `"1"` and anything starting with `"1.0"` are rejected as ambiguous: they
/// could mean 100% or a raw value of 1.
pub fn parse_commission_rate(text: &str, precision: u64) -> ValueResult<u64> {
    let text = text.trim();
    if text == "1" || text.starts_with("1.0") {
        return Err(ValueError::AmbiguousRate { precision });
    }

    let invalid = || ValueError::InvalidRate(text.to_string());
    let to_u64 = |value: U256| u64::try_from(value).map_err(|_| invalid());

    if let Some(percent) = text.strip_suffix('%') {
        let rate = Decimal::parse(percent)
            .and_then(|d| d.mul_div_round(U256::from(precision), U256::from(100u8)))
            .ok_or_else(invalid)?;
        return to_u64(rate);
    }

    let value = Decimal::parse(text).ok_or_else(invalid)?;
    if value.is_below_one() {
        let rate = value
            .mul_div_round(U256::from(precision), U256::from(1u8))
            .ok_or_else(invalid)?;
        return to_u64(rate);
    }

    text.parse::<u64>().map_err(|_| invalid())
}
