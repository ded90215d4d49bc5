//! Non-negative product price using decimal arithmetic.
//!
//! Operators type prices as free text; [`Price::parse`] is the single place
//! where that text becomes a number.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty (or whitespace only).
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal or scientific number.
    #[error("price must be a number (got {0:?})")]
    NotANumber(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A product price in the shop's single currency (INR).
///
/// Serialized as a JSON number so documents read back by other tools carry
/// `price` as numeric data.
///
/// ```
/// use boutique_core::Price;
///
/// assert_eq!(Price::parse("1299").unwrap().to_string(), "1299");
/// assert_eq!(Price::parse(" 49.50 ").unwrap().to_string(), "49.5");
/// assert!(Price::parse("abc").is_err());
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_zero() {
            return Ok(Self::ZERO);
        }
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse operator-entered price text.
    ///
    /// Surrounding whitespace is ignored. Plain decimals (`1299`, `12.50`,
    /// `+5`, `1.`) and scientific notation (`1e3`) are accepted. Digit
    /// separators (`1_000`, `1,000`) are not.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, not numeric, or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        {
            return Err(PriceError::NotANumber(trimmed.to_owned()));
        }

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(trimmed.to_owned()))?;

        Self::new(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
