//! Denomination suffixes and their multipliers.

use alloy::primitives::U256;

use crate::value::decimal::pow10;

/// A unit suffix and its value in base units, as a power of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denomination {
    pub suffix: &'static str,
    pub exponent: u32,
}

impl Denomination {
    /// Value of one unit in base units.
    pub fn multiplier(&self) -> U256 {
        // Exponents in the table are at most 18.
        pow10(self.exponent).unwrap_or(U256::MAX)
    }
}

/// Decimals of the native token: one Auton is 10^18 wei.
pub const AUTON_DECIMALS: u32 = 18;

/// Recognized suffixes, longest first so that `kwei` is never read as `wei`.
pub const DENOMINATIONS: &[Denomination] = &[
    Denomination { suffix: "attoton", exponent: 0 },
    Denomination { suffix: "finney", exponent: 15 },
    Denomination { suffix: "auton", exponent: AUTON_DECIMALS },
    Denomination { suffix: "szabo", exponent: 12 },
    Denomination { suffix: "kwei", exponent: 3 },
    Denomination { suffix: "mwei", exponent: 6 },
    Denomination { suffix: "gwei", exponent: 9 },
    Denomination { suffix: "aut", exponent: AUTON_DECIMALS },
    Denomination { suffix: "wei", exponent: 0 },
];

/// Split a lower-cased amount into its numeric part and denomination.
///
/// Text without a recognized suffix is whole Auton.
pub fn split_denomination(text: &str) -> (&str, Denomination) {
    DENOMINATIONS
        .iter()
        .find_map(|d| text.strip_suffix(d.suffix).map(|number| (number, *d)))
        .unwrap_or((
            text,
            Denomination {
                suffix: "",
                exponent: AUTON_DECIMALS,
            },
        ))
}
