//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as JSON numbers (e.g. `109.95`). They are held as
//! [`Decimal`] so that cart subtotals never accumulate floating-point error.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative monetary amount in the store currency's standard unit
/// (dollars, not cents).
///
/// ## Examples
///
/// ```
/// use open_fashion_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::try_new(Decimal::new(1050, 2)).unwrap();
/// assert_eq!(price.to_string(), "$10.50");
/// assert_eq!(price.times(2).whole().to_string(), "$21");
/// assert!(Price::try_new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn try_new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units. Saturates at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Round down to a whole currency unit.
    #[must_use]
    pub fn whole(self) -> Self {
        Self(self.0.floor())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Decimal::MAX`].
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    /// Whole amounts render without decimals (`$24`), everything else with
    /// two places (`$10.50`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract().is_zero() {
            write!(f, "${}", self.0.trunc())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::try_new(s.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        let result = Price::try_new(Decimal::new(-5, 1));
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::try_new(Decimal::MAX).unwrap();
        assert_eq!(huge.times(3).amount(), Decimal::MAX);
        assert_eq!((huge + price("0.01")).amount(), Decimal::MAX);

        let total: Price = [huge.times(2), price("5")].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }

    #[test]
    fn test_accepts_zero() {
        assert_eq!(Price::try_new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [price("10.5").times(2), price("3").times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, price("24"));
    }

    #[test]
    fn test_whole_floors() {
        assert_eq!(price("109.95").whole(), price("109"));
        assert_eq!(price("7").whole(), price("7"));
    }

    #[test]
    fn test_display() {
        assert_eq!(price("10.5").to_string(), "$10.50");
        assert_eq!(price("24.00").to_string(), "$24");
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let parsed: Price = serde_json::from_str("109.95").unwrap();
        assert_eq!(parsed, price("109.95"));

        let parsed: Price = serde_json::from_str("22").unwrap();
        assert_eq!(parsed, price("22"));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-1.5").is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let original = price("55.99");
        let json = serde_json::to_string(&original).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
