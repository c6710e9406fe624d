//! Two-fraction-digit decimal price.
//!
//! # Invariants
//! - In memory a price is an exact count of cents.
//! - On disk it is written as a `NUMERIC(10,2)` value; SQLite may hand it back
//!   as INTEGER (whole amounts) or REAL, both are accepted.
//! - The store rejects amounts outside `0..=99999999.99` on insert.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Price {
    cents: i64,
}

/// A float that cannot be represented as a price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPrice(pub f64);

impl Display for InvalidPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid price value `{}`", self.0)
    }
}

impl Error for InvalidPrice {}

/// Largest amount a `NUMERIC(10,2)` column holds, in cents.
const MAX_ABS_CENTS: i64 = 9_999_999_999;

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Rounds `value` to the nearest cent.
    ///
    /// Returns `None` for non-finite values or amounts outside `NUMERIC(10,2)`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_ABS_CENTS as f64 {
            return None;
        }
        Some(Self {
            cents: cents as i64,
        })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    pub fn as_f64(self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.as_f64()
    }
}

impl TryFrom<f64> for Price {
    type Error = InvalidPrice;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value).ok_or(InvalidPrice(value))
    }
}

impl ToSql for Price {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_f64()))
    }
}

impl FromSql for Price {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(whole) => whole
                .checked_mul(100)
                .map(Price::from_cents)
                .ok_or(FromSqlError::OutOfRange(whole)),
            ValueRef::Real(amount) => Price::from_f64(amount)
                .ok_or_else(|| FromSqlError::Other(Box::new(InvalidPrice(amount)))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Price;

    #[test]
    fn from_f64_rounds_to_cents() {
        assert_eq!(Price::from_f64(129.99).map(Price::cents), Some(12_999));
        assert_eq!(Price::from_f64(19.999).map(Price::cents), Some(2_000));
        assert_eq!(Price::from_f64(10.0).map(Price::cents), Some(1_000));
    }

    #[test]
    fn from_f64_rejects_non_finite_and_oversized_values() {
        assert!(Price::from_f64(f64::NAN).is_none());
        assert!(Price::from_f64(f64::INFINITY).is_none());
        assert!(Price::from_f64(1e12).is_none());
    }

    #[test]
    fn display_always_has_two_fraction_digits() {
        assert_eq!(Price::from_cents(12_999).to_string(), "129.99");
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
        assert_eq!(Price::from_cents(-105).to_string(), "-1.05");
    }

    #[test]
    fn serializes_as_plain_number() {
        let price = Price::from_cents(9_999);
        let json = serde_json::to_string(&price).expect("price should serialize");
        assert_eq!(json, "99.99");

        let parsed: Price = serde_json::from_str("12.5").expect("price should deserialize");
        assert_eq!(parsed.cents(), 1_250);
    }
}
