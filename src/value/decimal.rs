//! Exact decimal numbers for amount and rate parsing.
//!
//! A `Decimal` is `mantissa / 10^scale` with an unsigned 256-bit mantissa.
//! Nothing here ever goes through `f64`: `0.1` is exactly one tenth.

use alloy::primitives::U256;

/// Non-negative exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    mantissa: U256,
    scale: u32,
}

/// `10^exp`, or `None` once it no longer fits in 256 bits.
pub(crate) fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

impl Decimal {
    /// Parse `[+]digits[.digits][e[+-]digits]`.
    ///
    /// Either side of the decimal point may be empty (`".5"`, `"5."`) but
    /// not both. Signs other than a leading `+` are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('+').unwrap_or(text);

        let (number, exponent) = match text.find(|c: char| c == 'e' || c == 'E') {
            Some(idx) => (&text[..idx], parse_exponent(&text[idx + 1..])?),
            None => (text, 0),
        };

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(int_part) || !is_digits(frac_part) {
            return None;
        }

        // Trailing fractional zeros carry no value but would inflate the mantissa.
        let frac_part = frac_part.trim_end_matches('0');

        let mut mantissa = U256::ZERO;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(U256::from(10u8))?
                .checked_add(U256::from(digit - b'0'))?;
        }

        let mut scale = i64::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;
        if scale < 0 {
            let shift = u32::try_from(scale.checked_neg()?).ok()?;
            if !mantissa.is_zero() {
                mantissa = mantissa.checked_mul(pow10(shift)?)?;
            }
            scale = 0;
        }

        Some(Self {
            mantissa,
            scale: u32::try_from(scale).ok()?,
        })
    }

    /// Whole number with no fractional digits.
    pub fn from_integer(value: U256) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    /// All significant digits, ignoring the decimal point.
    pub fn mantissa(&self) -> U256 {
        self.mantissa
    }

    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// `trunc(self × multiplier)`, `None` on overflow.
    pub fn mul_truncate(&self, multiplier: U256) -> Option<U256> {
        let product = self.mantissa.checked_mul(multiplier)?;
        match pow10(self.scale) {
            Some(divisor) => Some(product / divisor),
            // The divisor exceeds any 256-bit product.
            None => Some(U256::ZERO),
        }
    }

    /// `round(self × numerator / denominator)`, halves rounded up.
    pub fn mul_div_round(&self, numerator: U256, denominator: U256) -> Option<U256> {
        let n = self.mantissa.checked_mul(numerator)?;
        let d = pow10(self.scale)?.checked_mul(denominator)?;
        if d.is_zero() {
            return None;
        }
        let half = d / U256::from(2u8);
        Some(n.checked_add(half)? / d)
    }

    /// Strictly less than one.
    pub fn is_below_one(&self) -> bool {
        match pow10(self.scale) {
            Some(one) => self.mantissa < one,
            None => true,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.mantissa.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(dec("12").mantissa(), U256::from(12));
        assert_eq!(dec("12").scale(), 0);
        assert_eq!(dec("0.25").mantissa(), U256::from(25));
        assert_eq!(dec("0.25").scale(), 2);
        assert_eq!(dec(".5").mantissa(), U256::from(5));
        assert_eq!(dec("5.").scale(), 0);
        assert_eq!(dec("+3").mantissa(), U256::from(3));
        assert_eq!(dec("  7 ").mantissa(), U256::from(7));
    }

    #[test]
    fn test_trailing_zeros_are_dropped() {
        let d = dec("1.500000");
        assert_eq!(d.mantissa(), U256::from(15));
        assert_eq!(d.scale(), 1);
    }

    #[test]
    fn test_exponent() {
        assert_eq!(dec("1e3").mul_truncate(U256::from(1)), Some(U256::from(1000)));
        assert_eq!(dec("15e-1"), dec("1.5"));
        assert_eq!(dec("2.5E2").mul_truncate(U256::from(1)), Some(U256::from(250)));
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in [
            "",
            ".",
            "-1",
            "1.2.3",
            "abc",
            "1e",
            "1e+",
            "0x10",
            "1 2",
            "1.5e-9223372036854775807",
            "1e9223372036854775807",
            "1.5e99999999999999999999",
        ] {
            assert!(Decimal::parse(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_mul_truncate_discards_fraction() {
        assert_eq!(dec("0.2").mul_truncate(U256::from(1000)), Some(U256::from(200)));
        assert_eq!(dec("3.12345").mul_truncate(U256::from(1)), Some(U256::from(3)));
        assert_eq!(dec("0.9999").mul_truncate(U256::from(1)), Some(U256::ZERO));
    }

    #[test]
    fn test_mul_div_round_half_up() {
        assert_eq!(
            dec("0.00015").mul_div_round(U256::from(10_000), U256::from(1)),
            Some(U256::from(2))
        );
        assert_eq!(
            dec("0.00014").mul_div_round(U256::from(10_000), U256::from(1)),
            Some(U256::from(1))
        );
    }

    #[test]
    fn test_below_one() {
        assert!(dec("0.999").is_below_one());
        assert!(!dec("1").is_below_one());
        assert!(!dec("1.0001").is_below_one());
        assert!(dec("0").is_below_one());
    }

    #[test]
    fn test_display() {
        assert_eq!(dec("1.25").to_string(), "1.25");
        assert_eq!(dec("0.005").to_string(), "0.005");
        assert_eq!(dec("2").to_string(), "2");
        assert_eq!(dec("1.50").to_string(), "1.5");
    }

    #[test]
    fn test_overflow_is_none() {
        let huge = "9".repeat(90);
        assert!(Decimal::parse(&huge).is_none());
        assert!(dec("1e70").mul_truncate(U256::from(10).pow(U256::from(18))).is_none());
    }
}
