//! # Money Module
//!
//! Provides the `Money` type and the `Percent` rate used by discounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart that re-adds topping prices on every +/- click drifts.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    unit_price × quantity is exact for every quantity, forever           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::{Money, Percent};
//!
//! let subtotal = Money::from_minor(100_000);
//! let off = subtotal.percent_of(Percent::from_bps(2_000)); // 20%
//! assert_eq!(off, Money::from_minor(20_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the store's single currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (list price minus discounted price) may be
///   computed before being floored
/// - **Single field tuple struct**: serializes as a bare JSON number, which is
///   exactly what the catalog provider sends
///
/// ## Where Money Flows
/// ```text
/// Dish.price / SizeVariant.price ──┐
///                                  ├──► CartLine.unit_price ──► CartLine.line_total
/// Topping.price × qty ─────────────┘                                  │
///                                                                     ▼
///          Promotion.discount ──► DiscountOutcome ◄──────── CartStore.subtotal()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let price = Money::from_minor(45_000);
    /// assert_eq!(price.minor(), 45_000);
    /// ```
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
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

    /// Clamps negative values to zero.
    ///
    /// A final total is never allowed below zero, whatever the discount.
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(35_000);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 105_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// `self × qty`, or `None` on overflow.
    #[inline]
    pub const fn checked_mul_quantity(self, qty: u32) -> Option<Money> {
        match self.0.checked_mul(qty as i64) {
            Some(product) => Some(Money(product)),
            None => None,
        }
    }

    /// Computes `self × rate`, rounded half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::{Money, Percent};
    ///
    /// let subtotal = Money::from_minor(99_999);
    /// let off = subtotal.percent_of(Percent::from_bps(1_000)); // 10%
    /// assert_eq!(off.minor(), 10_000); // 9_999.9 rounds up
    /// ```
    pub fn percent_of(&self, rate: Percent) -> Money {
        // i128 keeps large subtotals from overflowing mid-multiplication
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain minor-unit display for logs. Currency formatting belongs to the view.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

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

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A discount rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so "12.5%" is exactly 1250 bps and the
/// discount math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const FULL: Percent = Percent(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Converts a wire percentage (`12.5` means 12.5%) to basis points.
    ///
    /// Returns `None` for values outside 0–100 or non-finite input.
    pub fn from_percentage(pct: f64) -> Option<Self> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return None;
        }
        Some(Percent((pct * 100.0).round() as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
