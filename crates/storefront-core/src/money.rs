//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The catalog sends prices as strings: "19.99"                          │
//! │  Summing parsed floats:  19.99 * 3 = 59.97000000000001  ❌              │
//! │                                                                         │
//! │  OUR SOLUTION: parse with rust_decimal, store integer cents            │
//! │    "19.99" → 1999 cents → × 3 = 5997 cents → 59.97  ✅                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The persisted cart snapshot stores amounts as JSON decimal numbers
//! (`"price": 19.99`). Amounts of [`MAX_NUMBER_CENTS`] or more would lose
//! digits in a double, so they are written as decimal strings
//! (`"price": "123456789012345.67"`). Reading accepts a JSON number or a
//! decimal string.
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.to_string(), "$32.97");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// =============================================================================
// Parse Error
// =============================================================================

/// Why a string could not be read as an amount.
#[derive(Debug, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("not a decimal amount: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("amount is out of range")]
    OutOfRange,
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic never has to special-case refunds
/// - **Two decimal places**: catalog amounts with more precision are rounded
///   half-to-even when parsed
/// - **Custom serde**: decimal number on the wire, integer in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an exact decimal amount, rounding to cents (banker's rounding).
    ///
    /// Returns `None` when the amount does not fit in an `i64` of cents.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::money::Money;
    ///
    /// // 0.125 → 0.12 (half to even), 0.135 → 0.14
    /// assert_eq!(Money::from_decimal(Decimal::new(125, 3)).unwrap().cents(), 12);
    /// assert_eq!(Money::from_decimal(Decimal::new(135, 3)).unwrap().cents(), 14);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let mut rounded = amount.round_dp(2);
        rounded.rescale(2);
        if rounded.scale() != 2 {
            return None;
        }
        i64::try_from(rounded.mantissa()).ok().map(Money)
    }

    /// Returns the exact decimal value (two decimal places).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. UI layers format with their own currency
/// settings (see `CartConfig::format_currency` in storefront-cart).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        let amount = Decimal::from_str(s)?;
        Money::from_decimal(amount).ok_or(ParseMoneyError::OutOfRange)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde
// =============================================================================

/// Largest magnitude (exclusive) written as a JSON number: 15 significant
/// digits survive a trip through `f64`.
pub const MAX_NUMBER_CENTS: i64 = 1_000_000_000_000_000;

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.unsigned_abs() < MAX_NUMBER_CENTS.unsigned_abs() {
            // Division by 100 yields the double nearest to the decimal,
            // which prints back as the shortest decimal.
            serializer.serialize_f64(self.0 as f64 / 100.0)
        } else {
            serializer.collect_str(&self.to_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v))
            .ok_or_else(|| E::custom(ParseMoneyError::OutOfRange))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v))
            .ok_or_else(|| E::custom(ParseMoneyError::OutOfRange))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // `f64` displays as the shortest decimal that reads back to `v`,
        // i.e. the text that was in the JSON.
        let amount = Decimal::from_str(&v.to_string())
            .or_else(|_| Decimal::try_from(v))
            .map_err(E::custom)?;
        Money::from_decimal(amount).ok_or_else(|| E::custom(ParseMoneyError::OutOfRange))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
