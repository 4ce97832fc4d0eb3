//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill's subTotal is Σ(total / (1 + gst/100)) — a division that        │
//! │  must still satisfy subTotal + totalGst == grandTotal exactly.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    The GST-exclusive base is rounded once, and the GST portion is       │
//! │    defined as the exact complement (total − base), so the bill          │
//! │    arithmetic invariant holds without any floating tolerance.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aushadhi_core::money::Money;
//!
//! // Create from paise (preferred)
//! let mrp = Money::from_paise(4550); // ₹45.50
//!
//! // Arithmetic operations
//! let line_total = mrp.multiply_quantity(3);        // ₹136.50
//! let with_fee = mrp + Money::from_paise(500);      // ₹50.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments and balances
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization (plain number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use aushadhi_core::money::Money;
    ///
    /// let mrp = Money::from_paise(4550); // Represents ₹45.50
    /// assert_eq!(mrp.paise(), 4550);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from major and minor units (rupees and paise).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_rupees(-5, 50)` = -₹5.50, not -₹4.50
    #[inline]
    pub const fn from_rupees(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise (smallest currency unit).
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (paise) portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use aushadhi_core::money::Money;
    ///
    /// let mrp = Money::from_paise(1250); // ₹12.50
    /// let line_total = mrp.multiply_quantity(4);
    /// assert_eq!(line_total.paise(), 5000); // ₹50.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits a GST-inclusive amount into its tax-exclusive base.
    ///
    /// MRPs are GST-inclusive, so a line total of ₹112.00 at 12% GST is
    /// ₹100.00 of base value plus ₹12.00 of tax. The base is
    /// `total / (1 + rate)` computed in integer math with round-half-up.
    ///
    /// ## Implementation
    /// `(paise × 10000 + denom/2) / denom` where `denom = 10000 + bps`.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use aushadhi_core::money::Money;
    /// use aushadhi_core::types::GstRate;
    ///
    /// let total = Money::from_paise(11200); // ₹112.00 GST-inclusive
    /// let rate = GstRate::from_percentage(12.0);
    ///
    /// assert_eq!(total.excluding_gst(rate).paise(), 10000); // ₹100.00
    /// assert_eq!(total.gst_portion(rate).paise(), 1200);    // ₹12.00
    /// ```
    pub fn excluding_gst(&self, rate: GstRate) -> Money {
        let denom = 10_000_i128 + rate.bps() as i128;
        let base = (self.0 as i128 * 10_000 + denom / 2) / denom;
        Money(base as i64)
    }

    /// The GST share of a GST-inclusive amount.
    ///
    /// Defined as the exact complement of [`Money::excluding_gst`], so
    /// `excluding_gst(r) + gst_portion(r) == self` always holds.
    #[inline]
    pub fn gst_portion(&self, rate: GstRate) -> Money {
        *self - self.excluding_gst(rate)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
