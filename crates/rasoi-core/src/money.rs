//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1234.56 × 9 / 100 = 111.11039999999998  ❌ WRONG!                    │
//! │                                                                         │
//! │  Rounding that to paise happens to work, until a half-paisa value      │
//! │  lands a hair below .5 and a bill is off by ₹0.01.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise + Exact Ratios                             │
//! │    123456 paise × 900 bps = 111110400 / 10000 = 11111.04 paise         │
//! │    Rounded ONCE, half away from zero → 11111 paise = ₹111.11           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rasoi_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(25_000); // ₹250.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                          // ₹500.00
//! let total = price + Money::from_paise(1_050);     // ₹260.50
//! assert_eq!(total.to_string(), "₹260.50");
//!
//! // Parse what a cashier types
//! let typed: Money = "1,250.5".parse().unwrap();
//! assert_eq!(typed.paise(), 125_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// Basis points in 100%.
pub(crate) const BPS_PER_UNIT: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount held as a whole number of paise (1 ₹ = 100 paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic like `subtotal - discount` may dip below
///   zero before it is clamped; value objects reject negatives at the edge
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: amounts come from paise or from text
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  MenuItem.price ──► LineItem.unit_price ──► LineItem::line_total       │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │  Discount ──────────────────────────► BillResult.taxable_amount        │
/// │                                                  │                      │
/// │                       ┌──────────────────────────┼─────────────┐        │
/// │                       ▼                          ▼             ▼        │
/// │               service_charge              cgst/sgst/igst   final_amount │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // ₹10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees and paise.
    ///
    /// For negative amounts only the rupee part carries the sign:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Creates a Money value from a whole number of rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(1099).paise_part(), 99);
    /// assert_eq!(Money::from_paise(-550).paise_part(), 50);
    /// ```
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
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

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// let over_discounted = Money::from_rupees(100) - Money::from_rupees(150);
    /// assert_eq!(over_discounted.clamp_non_negative(), Money::zero());
    /// ```
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Builds an amount from an exact fraction of paise, rounding once.
    ///
    /// ## Rounding Mode: Half Away From Zero
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │   404.4 paise → 404      404.5 paise → 405      404.6 → 405        │
    /// │  -404.5 paise → -405                                               │
    /// │                                                                     │
    /// │  Matches the rounding a cashier does by hand and what printed      │
    /// │  GST invoices in the field show. Applied to the EXACT ratio, so    │
    /// │  there is never a double-rounding step.                            │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// assert_eq!(Money::from_ratio(809, 2).paise(), 405);   // 404.5 → 405
    /// assert_eq!(Money::from_ratio(-809, 2).paise(), -405);
    /// assert_eq!(Money::from_ratio(1, 3).paise(), 0);
    /// ```
    ///
    /// Results outside the i64 range saturate at `i64::MIN` / `i64::MAX`.
    pub fn from_ratio(numerator: i128, denominator: i128) -> Money {
        let rounded = round_half_away(numerator, denominator);
        Money::from_paise(i64::try_from(rounded).unwrap_or(if rounded < 0 {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// Applies a percentage rate to this amount and rounds to paise.
    ///
    /// Used for the service charge: `₹400.00` at 5% is `₹20.00`.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    /// use rasoi_core::types::TaxRate;
    ///
    /// let amount = Money::from_rupees(400);
    /// let charge = amount.apply_rate(TaxRate::from_bps(500));
    /// assert_eq!(charge, Money::from_rupees(20));
    /// ```
    pub fn apply_rate(&self, rate: TaxRate) -> Money {
        // Use i128 to prevent overflow on large amounts
        Money::from_ratio(self.0 as i128 * rate.bps() as i128, BPS_PER_UNIT)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(12_050); // ₹120.50
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 36_150);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Rounding
// =============================================================================

/// Divides and rounds half away from zero. A zero divisor yields zero.
pub(crate) fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }

    // Normalize so the divisor is positive
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Indian Digit Grouping
// =============================================================================

/// Groups an unsigned rupee count the en-IN way: the last three digits, then
/// pairs (`1,23,45,678`).
fn group_indian(rupees: u64) -> String {
    let digits = rupees.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);

    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped.push(',');
    grouped.push_str(tail);
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount as an Indian-locale rupee string.
///
/// ```rust
/// use rasoi_core::money::Money;
///
/// assert_eq!(Money::from_paise(12_345_678).to_string(), "₹1,23,456.78");
/// assert_eq!(Money::from_paise(-55_000).to_string(), "-₹550.00");
/// ```
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            group_indian(self.0.unsigned_abs() / 100),
            self.paise_part()
        )
    }
}

/// Parses rupee text such as `"250"`, `"1,250.5"`, `"₹99.99"` or `"-10"`.
///
/// At most two fractional digits are accepted; anything finer than a paisa
/// is a typing error, not something to round silently.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let body: String = unsigned
            .strip_prefix('₹')
            .unwrap_or(unsigned)
            .chars()
            .filter(|c| *c != ',')
            .collect();

        let (whole, frac) = body.split_once('.').unwrap_or((body.as_str(), ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a number like 1250.50"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places allowed"));
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let paise: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad paise"))? * 10,
            _ => frac.parse().map_err(|_| invalid("bad paise"))?,
        };

        let total = rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(paise))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -total } else { total }))
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
// Unit Tests
// =============================================================================
