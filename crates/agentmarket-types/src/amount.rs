//! Decimal price and earnings amounts
//!
//! Prices are carried as decimal strings denominated in the chain's native
//! unit (ether). Arithmetic goes through `rust_decimal` so sums never pick up
//! floating point error.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{TypesError, TypesResult};

/// Decimals of the chain's native unit (wei per ether = 10^18)
pub const NATIVE_DECIMALS: u32 = 18;

/// Parse a non-negative decimal amount such as `"0.01"`
pub fn parse_amount(value: &str) -> TypesResult<Decimal> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed)
        .map_err(|_| TypesError::InvalidAmount(value.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TypesError::InvalidAmount(value.to_string()));
    }
    Ok(amount.normalize())
}

/// Convert a native-unit amount to its smallest unit (wei)
pub fn to_base_units(amount: Decimal) -> TypesResult<u128> {
    let scaled = amount
        .checked_mul(Decimal::from(10u64.pow(NATIVE_DECIMALS)))
        .ok_or_else(|| TypesError::InvalidAmount(amount.to_string()))?;
    if scaled.fract() != Decimal::ZERO {
        return Err(TypesError::InvalidAmount(amount.to_string()));
    }
    scaled
        .to_u128()
        .ok_or_else(|| TypesError::InvalidAmount(amount.to_string()))
}

/// Sum decimal strings, skipping any that do not parse
pub fn sum_amounts<'a>(values: impl IntoIterator<Item = &'a str>) -> Decimal {
    values
        .into_iter()
        .filter_map(|v| parse_amount(v).ok())
        .fold(Decimal::ZERO, |acc, v| acc + v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.01").unwrap(), dec!(0.01));
        assert_eq!(parse_amount(" 1.500 ").unwrap(), dec!(1.5));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(1)).unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(to_base_units(dec!(0.01)).unwrap(), 10_000_000_000_000_000);
        assert_eq!(to_base_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_sum_amounts() {
        let total = sum_amounts(["0.1", "0.2", "bogus", "1"]);
        assert_eq!(total, dec!(1.3));
    }
}
