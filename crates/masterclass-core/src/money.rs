//! # Money Module
//!
//! Provides the `Money` type for cart subtotals and totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    Summing many subtotals drifts away from the real total.              │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal + ONE rounding rule                         │
//! │    round2(x) = x rounded half-up to 2 fraction digits                   │
//! │    applied once per subtotal, once per total, never compounded          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unit prices may carry more precision than cents (a price of `33.333` is
//! legal). Every `Money` value, however, is always held at exactly two
//! fraction digits, and crosses serialization boundaries as a string like
//! `"99.99"`.
//!
//! ## Usage
//! ```rust
//! use masterclass_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Decimal::new(9000, 2); // 90.00
//! let subtotal = Money::line_total(price, 2).unwrap();
//! assert_eq!(subtotal.to_string(), "180.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fraction digits every `Money` value carries.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value rounded to two fraction digits.
///
/// ## Where Money is Used
/// ```text
/// Product.price (Decimal) ──► round2(price × qty) ──► CartItem.subtotal
///                                                          │
///                           round2(Σ subtotal) ◄───────────┘
///                                  │
///                                  ▼
///                             Cart.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Rounds a decimal to two fraction digits, half-up.
    ///
    /// Prices are never negative, so `MidpointAwayFromZero` is round-half-up
    /// for every value this type sees.
    ///
    /// ## Example
    /// ```rust
    /// use masterclass_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::round2(Decimal::new(99999, 3)).to_string(), "100.00");
    /// assert_eq!(Money::round2(Decimal::new(12345, 3)).to_string(), "12.35");
    /// assert_eq!(Money::round2(Decimal::new(12344, 3)).to_string(), "12.34");
    /// ```
    pub fn round2(amount: Decimal) -> Self {
        let mut rounded =
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_SCALE);
        Money(rounded)
    }

    /// Creates Money from a whole number of cents.
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns zero money value.
    #[inline]
    pub fn zero() -> Self {
        Money::from_cents(0)
    }

    /// Returns the underlying decimal (always scale 2).
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Computes `round2(unit_price × qty)`.
    ///
    /// Returns `None` when the product overflows the decimal range.
    ///
    /// ## Example
    /// ```rust
    /// use masterclass_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 33.333 × 3 = 99.999, the third digit rounds up
    /// let subtotal = Money::line_total(Decimal::new(33333, 3), 3).unwrap();
    /// assert_eq!(subtotal.to_string(), "100.00");
    ///
    /// let subtotal = Money::line_total(Decimal::new(33333, 3), 2).unwrap();
    /// assert_eq!(subtotal.to_string(), "66.67");
    /// ```
    pub fn line_total(unit_price: Decimal, qty: i64) -> Option<Self> {
        unit_price
            .checked_mul(Decimal::from(qty))
            .map(Money::round2)
    }

    /// Computes `round2(Σ amounts)`.
    ///
    /// The sum of two-digit values is already two-digit; the final `round2`
    /// only pins the scale. Returns `None` on overflow.
    pub fn sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.0))
            .map(Money::round2)
    }

    /// Formats with a leading currency symbol, e.g. `€90.00`.
    pub fn display_with_symbol(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display always prints exactly two fraction digits.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses a decimal string with at most two fraction digits.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: e.to_string(),
        })?;

        if value.round_dp(MONEY_SCALE) != value {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' has more than {} fraction digits", s, MONEY_SCALE),
            });
        }

        Ok(Money::round2(value))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(Money::round2(dec("0.125")).to_string(), "0.13");
        assert_eq!(Money::round2(dec("0.135")).to_string(), "0.14");
        assert_eq!(Money::round2(dec("0.124")).to_string(), "0.12");
        assert_eq!(Money::round2(dec("90")).to_string(), "90.00");
        assert_eq!(Money::round2(dec("7.5")).to_string(), "7.50");
    }

    #[test]
    fn test_line_total_rounds_once() {
        // 99.999 is never stored with three digits
        let subtotal = Money::line_total(dec("33.333"), 3).unwrap();
        assert_eq!(subtotal.to_string(), "100.00");
        assert_eq!(subtotal.amount().scale(), 2);

        let subtotal = Money::line_total(dec("33.333"), 1).unwrap();
        assert_eq!(subtotal.to_string(), "33.33");
    }

    #[test]
    fn test_line_total_simple() {
        assert_eq!(
            Money::line_total(dec("90"), 2).unwrap().to_string(),
            "180.00"
        );
        assert_eq!(Money::line_total(dec("360.00"), 1).unwrap().to_string(), "360.00");
        assert_eq!(Money::line_total(dec("90"), 0).unwrap(), Money::zero());
    }

    #[test]
    fn test_sum() {
        let total = Money::sum(vec![
            Money::from_cents(9000),
            Money::from_cents(36000),
            Money::from_cents(1),
        ])
        .unwrap();
        assert_eq!(total.to_string(), "450.01");
        assert_eq!(Money::sum(Vec::new()).unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(Money::from_cents(9000).display_with_symbol("€"), "€90.00");
    }

    #[test]
    fn test_serde_uses_two_digit_strings() {
        let json = serde_json::to_string(&Money::from_cents(18000)).unwrap();
        assert_eq!(json, "\"180.00\"");

        let parsed: Money = serde_json::from_str("\"90\"").unwrap();
        assert_eq!(parsed, Money::from_cents(9000));

        assert!(serde_json::from_str::<Money>("\"99.999\"").is_err());
        assert!(serde_json::from_str::<Money>("\"ninety\"").is_err());
    }
}
