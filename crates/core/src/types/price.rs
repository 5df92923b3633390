//! Type-safe price representation using decimal arithmetic.
//!
//! Prices never touch floating point: catalog values are parsed straight into
//! a [`Decimal`] and only rounded to two places when displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a string is not a valid price.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid price: {0}")]
pub struct PriceError(String);

/// A non-negative monetary amount in the store currency's standard unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from minor units (e.g. `1250` -> `12.50`).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Map a catalog price value to a `Price`.
    ///
    /// JSON numbers and numeric strings are parsed exactly. Anything else
    /// (missing, null, non-numeric, negative) is treated as `0.00`.
    #[must_use]
    pub fn from_catalog_value(value: Option<&serde_json::Value>) -> Self {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => n.to_string().parse::<Self>().ok(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<Self>().ok(),
            _ => None,
        };
        parsed.unwrap_or(Self::ZERO)
    }

    /// Multiply the unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError(s.to_owned()));
        }
        Ok(Self(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_units(40).to_string(), "40.00");
        assert_eq!("12.5".parse::<Price>().unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_decimal_arithmetic_is_exact() {
        let unit: Price = "0.10".parse().unwrap();
        let total: Price = (0..3).map(|_| unit).sum();
        assert_eq!(total, "0.30".parse().unwrap());
        assert_eq!(unit.times(3), "0.3".parse().unwrap());
    }

    #[test]
    fn test_from_catalog_number() {
        let value = json!(12.50);
        assert_eq!(Price::from_catalog_value(Some(&value)).to_string(), "12.50");
    }

    #[test]
    fn test_from_catalog_numeric_string() {
        let value = json!("7.25");
        assert_eq!(Price::from_catalog_value(Some(&value)).to_string(), "7.25");
    }

    #[test]
    fn test_from_catalog_missing_or_garbage_is_zero() {
        assert_eq!(Price::from_catalog_value(None), Price::ZERO);
        assert_eq!(Price::from_catalog_value(Some(&json!(null))), Price::ZERO);
        assert_eq!(Price::from_catalog_value(Some(&json!("free"))), Price::ZERO);
        assert_eq!(Price::from_catalog_value(Some(&json!([1]))), Price::ZERO);
        assert_eq!(Price::from_catalog_value(Some(&json!(-3))), Price::ZERO);
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Price::from_minor_units(1250).to_string(), "12.50");
    }

    proptest! {
        #[test]
        fn prop_times_matches_repeated_addition(minor in 0i64..1_000_000, quantity in 0u32..50) {
            let unit = Price::from_minor_units(minor);
            let summed: Price = (0..quantity).map(|_| unit).sum();
            prop_assert_eq!(unit.times(quantity), summed);
        }

        #[test]
        fn prop_display_round_trips_cents(minor in 0i64..10_000_000) {
            let price = Price::from_minor_units(minor);
            prop_assert_eq!(price.to_string().parse::<Price>().unwrap(), price);
        }
    }
}
