//! # Domain Types
//!
//! Value types fed into the GST bill calculator.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │    Discount     │   │ JurisdictionMode│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  unit_price     │   │  flat Money     │   │  SameState      │       │
//! │  │  quantity       │   │  (never < 0)    │   │  DifferentState │       │
//! │  │  tax_rate       │   └─────────────────┘   └────────▲────────┘       │
//! │  └─────────────────┘                                  │                │
//! │                                                       │ between()      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────┴────────┐       │
//! │  │    TaxRate      │   │    Quantity     │   │   StateCode     │       │
//! │  │  bps (u32)      │   │  0..=999        │   │  "27", "29"...  │◄──┐   │
//! │  │  1800 = 18%     │   └─────────────────┘   └─────────────────┘   │   │
//! │  └─────────────────┘                          ┌─────────────────┐   │   │
//! │                                               │     Gstin       │───┘   │
//! │                                               │ 27AAPFU0939F1ZV │       │
//! │                                               └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Illegal States Are Unrepresentable
//! Every type with a rule has a validating factory (`LineItem::new`,
//! `Discount::flat`, `StateCode::new`, `Gstin::parse`), and deserialization
//! is routed through the same factory, so a negative price can never reach
//! the calculator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_discount, validate_gstin, validate_line_quantity, validate_price,
    validate_tax_rate_bps, ValidationResult,
};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Every GST slab (0.25%, 3%, 5%, 12%, 18%,
/// 28%) and every service-charge rate in use is a whole number of bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    ///
    /// Negative or NaN input saturates to zero.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
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

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Shows the rate as a trimmed percentage: `9%`, `12.5%`, `0.25%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}%", whole),
            f2 if f2 % 10 == 0 => write!(f, "{}.{}%", whole, f2 / 10),
            f2 => write!(f, "{}.{:02}%", whole, f2),
        }
    }
}

/// Parses a percentage such as `"18"`, `"12.5"`, `"0.25%"` exactly.
impl FromStr for TaxRate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "tax_rate".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let body = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a non-negative percentage like 12.5"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places allowed"));
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("rate is too large"))?
        };
        let frac: u32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u32>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => frac.parse().map_err(|_| invalid("bad fraction"))?,
        };

        whole
            .checked_mul(100)
            .and_then(|bps| bps.checked_add(frac))
            .map(TaxRate)
            .ok_or_else(|| invalid("rate is too large"))
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Number of units of one menu item on an order (0..=999).
///
/// Zero is allowed: a waiter may zero out a line before the kitchen
/// confirms it, and the bill must still compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "i64")]
#[ts(export)]
pub struct Quantity(u32);

impl Quantity {
    /// Validates and wraps a raw quantity.
    pub fn new(qty: i64) -> ValidationResult<Self> {
        validate_line_quantity(qty)?;
        Ok(Quantity(qty as u32))
    }

    /// Returns the quantity as a plain integer.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = ValidationError;

    fn try_from(qty: i64) -> Result<Self, Self::Error> {
        Quantity::new(qty)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One ordered menu item at its snapshot price and applicable GST rate.
///
/// ## Snapshot Pattern
/// The price and rate are frozen when the order is billed; later menu edits
/// never change an existing bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", try_from = "RawLineItem")]
#[ts(export)]
pub struct LineItem {
    /// Price of one unit, in paise.
    unit_price: Money,
    /// Units ordered.
    quantity: Quantity,
    /// GST rate for this item, in basis points.
    tax_rate: TaxRate,
}

impl LineItem {
    /// Creates a validated line item.
    ///
    /// ## Rules
    /// - `unit_price` must be non-negative (zero = complimentary item)
    /// - `quantity` must be within 0..=999
    /// - `tax_rate` must be at most 100%
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    /// use rasoi_core::types::{LineItem, TaxRate};
    ///
    /// let item = LineItem::new(Money::from_rupees(100), 2, TaxRate::from_bps(900)).unwrap();
    /// assert_eq!(item.line_total(), Money::from_rupees(200));
    ///
    /// assert!(LineItem::new(Money::from_rupees(-1), 1, TaxRate::zero()).is_err());
    /// ```
    pub fn new(unit_price: Money, quantity: i64, tax_rate: TaxRate) -> ValidationResult<Self> {
        validate_price(unit_price)?;
        validate_tax_rate_bps(tax_rate.bps())?;
        let quantity = Quantity::new(quantity)?;

        Ok(LineItem {
            unit_price,
            quantity,
            tax_rate,
        })
    }

    /// Unit price (snapshot).
    #[inline]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Units ordered.
    #[inline]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// GST rate for this item.
    #[inline]
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Line total before tax (unit price × quantity).
    #[inline]
    pub const fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity.0 as i64)
    }
}

/// Unchecked wire shape of a [`LineItem`]; only used for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLineItem {
    unit_price: Money,
    quantity: i64,
    tax_rate: TaxRate,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = ValidationError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        LineItem::new(raw.unit_price, raw.quantity, raw.tax_rate)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A flat bill-level discount. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(try_from = "Money")]
#[ts(export)]
pub struct Discount(Money);

impl Discount {
    /// Validates a flat discount amount.
    ///
    /// ```rust
    /// use rasoi_core::money::Money;
    /// use rasoi_core::types::Discount;
    ///
    /// assert!(Discount::flat(Money::from_rupees(10)).is_ok());
    /// assert!(Discount::flat(Money::from_rupees(-10)).is_err());
    /// ```
    pub fn flat(amount: Money) -> ValidationResult<Self> {
        validate_discount(amount)?;
        Ok(Discount(amount))
    }

    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount(Money::zero())
    }

    /// The discount amount.
    #[inline]
    pub const fn amount(&self) -> Money {
        self.0
    }
}

impl TryFrom<Money> for Discount {
    type Error = ValidationError;

    fn try_from(amount: Money) -> Result<Self, Self::Error> {
        Discount::flat(amount)
    }
}

// =============================================================================
// Jurisdiction Mode
// =============================================================================

/// Whether a sale is intrastate or interstate for GST purposes.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────────┐
/// │  SameState       outlet in MH, customer in MH → CGST + SGST     │
/// │  DifferentState  outlet in MH, customer in KA → IGST            │
/// └──────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum JurisdictionMode {
    /// Intrastate sale: tax split equally into CGST and SGST.
    SameState,
    /// Interstate sale: tax charged wholly as IGST.
    DifferentState,
}

impl JurisdictionMode {
    /// Derives the mode from the outlet's home state and the place of supply.
    ///
    /// ```rust
    /// use rasoi_core::types::{JurisdictionMode, StateCode};
    ///
    /// let maharashtra = StateCode::new(27).unwrap();
    /// let karnataka = StateCode::new(29).unwrap();
    ///
    /// assert_eq!(JurisdictionMode::between(maharashtra, maharashtra), JurisdictionMode::SameState);
    /// assert_eq!(JurisdictionMode::between(maharashtra, karnataka), JurisdictionMode::DifferentState);
    /// ```
    pub fn between(home: StateCode, place_of_supply: StateCode) -> Self {
        if home == place_of_supply {
            JurisdictionMode::SameState
        } else {
            JurisdictionMode::DifferentState
        }
    }

    /// Returns true for interstate (IGST) sales.
    #[inline]
    pub const fn is_interstate(&self) -> bool {
        matches!(self, JurisdictionMode::DifferentState)
    }
}

impl fmt::Display for JurisdictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JurisdictionMode::SameState => write!(f, "same-state"),
            JurisdictionMode::DifferentState => write!(f, "different-state"),
        }
    }
}

impl FromStr for JurisdictionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "same-state" | "same_state" | "intrastate" | "intra" => Ok(JurisdictionMode::SameState),
            "different-state" | "different_state" | "interstate" | "inter" => {
                Ok(JurisdictionMode::DifferentState)
            }
            _ => Err(ValidationError::NotAllowed {
                field: "jurisdiction".to_string(),
                allowed: vec!["same-state".to_string(), "different-state".to_string()],
            }),
        }
    }
}

// =============================================================================
// State Code
// =============================================================================

/// GST state codes and the names printed on invoices.
const STATE_NAMES: &[(u8, &str)] = &[
    (1, "Jammu and Kashmir"),
    (2, "Himachal Pradesh"),
    (3, "Punjab"),
    (4, "Chandigarh"),
    (5, "Uttarakhand"),
    (6, "Haryana"),
    (7, "Delhi"),
    (8, "Rajasthan"),
    (9, "Uttar Pradesh"),
    (10, "Bihar"),
    (11, "Sikkim"),
    (12, "Arunachal Pradesh"),
    (13, "Nagaland"),
    (14, "Manipur"),
    (15, "Mizoram"),
    (16, "Tripura"),
    (17, "Meghalaya"),
    (18, "Assam"),
    (19, "West Bengal"),
    (20, "Jharkhand"),
    (21, "Odisha"),
    (22, "Chhattisgarh"),
    (23, "Madhya Pradesh"),
    (24, "Gujarat"),
    (25, "Daman and Diu"),
    (26, "Dadra and Nagar Haveli and Daman and Diu"),
    (27, "Maharashtra"),
    (28, "Andhra Pradesh (Old)"),
    (29, "Karnataka"),
    (30, "Goa"),
    (31, "Lakshadweep"),
    (32, "Kerala"),
    (33, "Tamil Nadu"),
    (34, "Puducherry"),
    (35, "Andaman and Nicobar Islands"),
    (36, "Telangana"),
    (37, "Andhra Pradesh"),
    (38, "Ladakh"),
    (97, "Other Territory"),
    (99, "Centre Jurisdiction"),
];

/// Two-digit GST state code, e.g. `27` for Maharashtra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(u8);

impl StateCode {
    /// Validates a numeric state code.
    pub fn new(code: u8) -> ValidationResult<Self> {
        if STATE_NAMES.iter().any(|(c, _)| *c == code) {
            Ok(StateCode(code))
        } else {
            Err(ValidationError::InvalidFormat {
                field: "state_code".to_string(),
                reason: format!("{:02} is not a GST state code", code),
            })
        }
    }

    /// Numeric code.
    #[inline]
    pub const fn code(&self) -> u8 {
        self.0
    }

    /// State or territory name.
    pub fn name(&self) -> &'static str {
        STATE_NAMES
            .iter()
            .find(|(c, _)| *c == self.0)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for StateCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 2 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "state_code".to_string(),
                reason: "must be two digits, e.g. 27".to_string(),
            });
        }
        let code: u8 = s.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "state_code".to_string(),
            reason: "must be two digits, e.g. 27".to_string(),
        })?;
        StateCode::new(code)
    }
}

impl TryFrom<String> for StateCode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.to_string()
    }
}

// =============================================================================
// GSTIN
// =============================================================================

/// A 15-character GST Identification Number, e.g. `27AAPFU0939F1ZV`.
///
/// ## Layout
/// ```text
///   27  AAPFU0939F  1   Z   V
///   │   │           │   │   └─ check character
///   │   │           │   └───── always 'Z'
///   │   │           └───────── registration number within the PAN
///   │   └───────────────────── PAN of the business
///   └───────────────────────── state code
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl Gstin {
    /// Validates and normalizes (trim + uppercase) a GSTIN.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        validate_gstin(raw)
    }

    /// Wraps an already-validated, normalized GSTIN.
    pub(crate) fn from_validated(normalized: String) -> Self {
        Gstin(normalized)
    }

    /// The GSTIN text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// State the GSTIN is registered in (its first two digits).
    pub fn state_code(&self) -> StateCode {
        // validate_gstin guarantees a known two-digit prefix
        self.0[..2]
            .parse::<u8>()
            .map(StateCode)
            .unwrap_or(StateCode(99))
    }

    /// The embedded PAN (characters 3-12).
    pub fn pan(&self) -> &str {
        &self.0[2..12]
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Gstin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gstin::parse(s)
    }
}

impl TryFrom<String> for Gstin {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Gstin::parse(&s)
    }
}

impl From<Gstin> for String {
    fn from(gstin: Gstin) -> Self {
        gstin.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
