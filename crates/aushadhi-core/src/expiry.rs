//! # Expiry Dates
//!
//! Batch expiry at year-month granularity, as printed on medicine strips.
//! Wire format is `YYYY-MM`; a batch is usable through the last day of its
//! expiry month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Parse failure for an expiry date string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expiry date '{0}', expected YYYY-MM")]
pub struct ParseExpiryError(pub String);

/// A year-month expiry date.
///
/// Ordering is chronological, so `ExpiryDate` values can be compared and
/// sorted directly (earliest expiry first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpiryDate {
    year: i32,
    month: u32,
}

impl ExpiryDate {
    /// Creates an expiry date; the month must be 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self, ParseExpiryError> {
        if !(1..=12).contains(&month) {
            return Err(ParseExpiryError(format!("{year}-{month}")));
        }
        Ok(ExpiryDate { year, month })
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Whether the expiry month has fully passed as of `today`.
    ///
    /// A batch expiring `2026-08` is still sellable on 2026-08-31 and
    /// expired from 2026-09-01.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        (self.year, self.month) < (today.year(), today.month())
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ExpiryDate {
    type Err = ParseExpiryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseExpiryError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        ExpiryDate::new(year, month).map_err(|_| err())
    }
}

impl TryFrom<String> for ExpiryDate {
    type Error = ParseExpiryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ExpiryDate> for String {
    fn from(date: ExpiryDate) -> Self {
        date.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let date: ExpiryDate = "2026-08".parse().unwrap();
        assert_eq!(date.year(), 2026);
        assert_eq!(date.month(), 8);
        assert_eq!(date.to_string(), "2026-08");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2026".parse::<ExpiryDate>().is_err());
        assert!("2026-13".parse::<ExpiryDate>().is_err());
        assert!("2026-00".parse::<ExpiryDate>().is_err());
        assert!("aug-2026".parse::<ExpiryDate>().is_err());
    }

    #[test]
    fn test_expired_through_end_of_month() {
        let date: ExpiryDate = "2026-08".parse().unwrap();
        let last_day = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(!date.is_expired(last_day));
        assert!(date.is_expired(next_day));
    }

    #[test]
    fn test_ordering_is_chronological() {
        let early: ExpiryDate = "2025-12".parse().unwrap();
        let late: ExpiryDate = "2026-01".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_serde_round_trip() {
        let date: ExpiryDate = "2027-01".parse().unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2027-01\"");
        let back: ExpiryDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
