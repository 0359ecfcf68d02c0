//! Value parsing subsystem.
//!
//! # Data Flow
//! ```text
//! command-line text ("0.5auton", "7gwei", "90%")
//!     → decimal.rs (exact decimal, no floating point)
//!     → denomination.rs (suffix → multiplier, longest suffix first)
//!     → amount.rs / commission.rs (integer base units, fixed-point rates)
//! ```
//!
//! # Design Decisions
//! - Amounts are `U256` base units end to end
//! - Fractional base units are truncated, never rounded
//! - Ambiguous commission rates are rejected rather than guessed

pub mod amount;
pub mod commission;
pub mod decimal;
pub mod denomination;

use thiserror::Error;

pub use amount::{
    format_auton_quantity, format_newton_quantity, format_quantity, parse_denominated_amount,
    parse_fee_factor, parse_newton_amount, parse_token_amount, NEWTON_DECIMALS,
};
pub use commission::{parse_commission_rate, COMMISSION_RATE_PRECISION};
pub use decimal::Decimal;
pub use denomination::{Denomination, DENOMINATIONS};

/// Errors raised while normalizing human-entered values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Not a valid amount (bad number, unknown suffix, negative, overflow).
    #[error("{0} is not a valid amount")]
    InvalidAmount(String),

    /// The rate could mean either 100% or a raw value of 1.
    #[error("Ambiguous rate. Use X%, 0.xx or a fixed-point value (out of {precision})")]
    AmbiguousRate { precision: u64 },

    /// The rate is in none of the accepted forms.
    #[error("Expected a percentage, a fraction below 1 or an integer instead of {0}")]
    InvalidRate(String),
}

/// Result type for value parsing.
pub type ValueResult<T> = Result<T, ValueError>;
