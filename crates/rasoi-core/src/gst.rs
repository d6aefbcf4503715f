//! # GST Bill Calculator
//!
//! Pure functions that turn order lines into an itemized GST bill.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        compute_bill()                                   │
//! │                                                                         │
//! │  items ──► Σ price×qty ────────────────► subtotal                      │
//! │    │                                        │                           │
//! │    │                          − discount ───┤ (floored at 0)            │
//! │    │                                        ▼                           │
//! │    │                                  taxable_amount ──► service_charge │
//! │    │                                        │          (× svc rate)     │
//! │    │                                        │                           │
//! │    └─► Σ(line×rate) / Σ line ──► weighted rate                          │
//! │          (PRE-discount mix)             │   │                           │
//! │                                         ▼   ▼                           │
//! │                              compute_single_rate_tax()                  │
//! │                                         │                               │
//! │                      ┌──────────────────┴──────────────┐                │
//! │                 SameState                        DifferentState         │
//! │              cgst = sgst = ½ tax                  igst = tax            │
//! │                                                                         │
//! │  final_amount = taxable_amount + service_charge + total_tax            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every output field is rounded to paise exactly once, half away from zero,
//! from its exact rational value. `total_tax` is rounded from the pre-split
//! tax, so on an odd-paise tax `cgst + sgst` may exceed `total_tax` by ₹0.01.
//!
//! ## Example
//! ```rust
//! use rasoi_core::gst::compute_bill;
//! use rasoi_core::money::Money;
//! use rasoi_core::types::{Discount, JurisdictionMode, LineItem, TaxRate};
//!
//! let items = [
//!     LineItem::new(Money::from_rupees(100), 2, TaxRate::from_bps(900)).unwrap(),
//!     LineItem::new(Money::from_rupees(200), 1, TaxRate::from_bps(1800)).unwrap(),
//! ];
//!
//! let bill = compute_bill(
//!     &items,
//!     JurisdictionMode::SameState,
//!     TaxRate::from_bps(500), // 5% service charge
//!     Discount::none(),
//! );
//!
//! assert_eq!(bill.subtotal, Money::from_rupees(400));
//! assert_eq!(bill.service_charge, Money::from_rupees(20));
//! assert_eq!(bill.cgst, Money::from_rupees(27));
//! assert_eq!(bill.final_amount, Money::from_rupees(474));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{round_half_away, Money, BPS_PER_UNIT};
use crate::types::{Discount, JurisdictionMode, LineItem, TaxRate};

// =============================================================================
// Effective Rate
// =============================================================================

/// An exact tax rate in basis points, held as a fraction.
///
/// A single menu rate is `bps / 1`. A bill's blended rate is
/// `Σ(line_total × bps) / Σ line_total`, which is rarely a whole number of
/// basis points; keeping the fraction means the tax is rounded once, at the
/// end, instead of once for the rate and again for the amount.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveRate {
    numerator: i128,
    denominator: i128,
}

impl EffectiveRate {
    /// The zero rate.
    pub const fn zero() -> Self {
        EffectiveRate {
            numerator: 0,
            denominator: 1,
        }
    }

    /// Weighted average of the line rates, weighted by line total.
    ///
    /// Lines are weighted by their pre-discount totals. A bill whose lines
    /// total zero has a zero rate.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::gst::EffectiveRate;
    /// use rasoi_core::money::Money;
    /// use rasoi_core::types::{LineItem, TaxRate};
    ///
    /// let items = [
    ///     LineItem::new(Money::from_rupees(100), 2, TaxRate::from_bps(900)).unwrap(),
    ///     LineItem::new(Money::from_rupees(200), 1, TaxRate::from_bps(1800)).unwrap(),
    /// ];
    /// let rate = EffectiveRate::weighted(&items);
    /// assert_eq!(rate.to_tax_rate(), TaxRate::from_bps(1350)); // 13.5%
    /// ```
    pub fn weighted(items: &[LineItem]) -> Self {
        let (numerator, denominator) =
            items
                .iter()
                .fold((0_i128, 0_i128), |(weighted, total), item| {
                    let line = item.line_total().paise() as i128;
                    (
                        weighted + line * item.tax_rate().bps() as i128,
                        total + line,
                    )
                });

        if denominator == 0 {
            return EffectiveRate::zero();
        }

        EffectiveRate {
            numerator,
            denominator,
        }
    }

    /// Returns true when no tax applies.
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Nearest whole-bps rate (for display and persistence).
    pub fn to_tax_rate(&self) -> TaxRate {
        let bps = round_half_away(self.numerator, self.denominator);
        TaxRate::from_bps(u32::try_from(bps.max(0)).unwrap_or(u32::MAX))
    }

    /// Rate as a percentage (display only).
    pub fn percentage(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64 / 100.0
    }

    /// Tax on `amount` at this rate, with the result divided by `parts`
    /// before rounding.
    fn tax_on(&self, amount: Money, parts: i128) -> Money {
        Money::from_ratio(
            amount.paise() as i128 * self.numerator,
            self.denominator * BPS_PER_UNIT * parts,
        )
    }
}

impl From<TaxRate> for EffectiveRate {
    fn from(rate: TaxRate) -> Self {
        EffectiveRate {
            numerator: rate.bps() as i128,
            denominator: 1,
        }
    }
}

/// Equal when the fractions are equal (`1800/2 == 900/1`).
impl PartialEq for EffectiveRate {
    fn eq(&self, other: &Self) -> bool {
        self.numerator * other.denominator == other.numerator * self.denominator
    }
}

impl Eq for EffectiveRate {}

impl fmt::Display for EffectiveRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.percentage())
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// Tax split for one taxable amount.
///
/// Exactly one channel is used: CGST+SGST for intrastate sales, IGST for
/// interstate sales. All zero when nothing is taxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TaxBreakdown {
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    /// Pre-split tax rounded once; see the module docs on rounding.
    pub total_tax: Money,
}

impl TaxBreakdown {
    /// All-zero breakdown.
    pub const fn zero() -> Self {
        TaxBreakdown {
            cgst: Money::zero(),
            sgst: Money::zero(),
            igst: Money::zero(),
            total_tax: Money::zero(),
        }
    }

    /// Sum of the three channels as printed on the invoice.
    ///
    /// Equals `total_tax` except for the odd-paise intrastate case, where it
    /// is one paisa higher.
    pub fn channel_sum(&self) -> Money {
        self.cgst + self.sgst + self.igst
    }
}

// =============================================================================
// Bill Result
// =============================================================================

/// Fully itemized bill amounts.
///
/// ## Invariants
/// - `taxable_amount == max(0, subtotal - discount)`
/// - `final_amount == taxable_amount + service_charge + total_tax`
/// - every field is non-negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillResult {
    pub subtotal: Money,
    /// Discount as requested, even when it exceeds the subtotal.
    pub discount: Money,
    pub taxable_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub total_tax: Money,
    pub service_charge: Money,
    pub final_amount: Money,
}

impl BillResult {
    /// The tax portion of the bill.
    pub fn tax_breakdown(&self) -> TaxBreakdown {
        TaxBreakdown {
            cgst: self.cgst,
            sgst: self.sgst,
            igst: self.igst,
            total_tax: self.total_tax,
        }
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes the GST split of `amount` at a single rate.
///
/// ## Behavior
/// - Zero (or negative) amount, or zero rate: all-zero breakdown
/// - `SameState`: `cgst = sgst = round(tax / 2)`, `igst = 0`
/// - `DifferentState`: `igst = round(tax)`, `cgst = sgst = 0`
/// - `total_tax = round(tax)` in both cases
///
/// ## Example
/// ```rust
/// use rasoi_core::gst::compute_single_rate_tax;
/// use rasoi_core::money::Money;
/// use rasoi_core::types::{JurisdictionMode, TaxRate};
///
/// let tax = compute_single_rate_tax(
///     Money::from_rupees(1000),
///     TaxRate::from_bps(900),
///     JurisdictionMode::SameState,
/// );
/// assert_eq!(tax.cgst, Money::from_rupees(45));
/// assert_eq!(tax.sgst, Money::from_rupees(45));
/// assert_eq!(tax.total_tax, Money::from_rupees(90));
/// ```
pub fn compute_single_rate_tax(
    amount: Money,
    rate: impl Into<EffectiveRate>,
    jurisdiction: JurisdictionMode,
) -> TaxBreakdown {
    let rate = rate.into();

    if !amount.is_positive() || rate.is_zero() {
        return TaxBreakdown::zero();
    }

    let total_tax = rate.tax_on(amount, 1);

    match jurisdiction {
        JurisdictionMode::SameState => {
            let half = rate.tax_on(amount, 2);
            TaxBreakdown {
                cgst: half,
                sgst: half,
                igst: Money::zero(),
                total_tax,
            }
        }
        JurisdictionMode::DifferentState => TaxBreakdown {
            cgst: Money::zero(),
            sgst: Money::zero(),
            igst: total_tax,
            total_tax,
        },
    }
}

/// Aggregates order lines into a full bill.
///
/// ## Steps
/// 1. `subtotal = Σ unit_price × quantity`
/// 2. `taxable_amount = max(0, subtotal − discount)`
/// 3. `service_charge = taxable_amount × service_charge_rate`
/// 4. Tax on `taxable_amount` at the pre-discount weighted rate
/// 5. `final_amount = taxable_amount + service_charge + total_tax`
///
/// An empty order yields an all-zero bill, discount included.
///
/// Line items are bounded by `MAX_UNIT_PRICE_PAISE` and `MAX_ITEM_QUANTITY`.
/// Orders of up to `MAX_ORDER_LINES` lines therefore compute exactly. The
/// subtotal is summed in i128 and saturates rather than wrapping.
pub fn compute_bill(
    items: &[LineItem],
    jurisdiction: JurisdictionMode,
    service_charge_rate: TaxRate,
    discount: Discount,
) -> BillResult {
    if items.is_empty() {
        return BillResult::default();
    }

    let subtotal = Money::from_ratio(
        items
            .iter()
            .map(|item| item.line_total().paise() as i128)
            .sum::<i128>(),
        1,
    );
    let taxable_amount = (subtotal - discount.amount()).clamp_non_negative();
    let service_charge = taxable_amount.apply_rate(service_charge_rate);

    let rate = EffectiveRate::weighted(items);
    let tax = compute_single_rate_tax(taxable_amount, rate, jurisdiction);

    BillResult {
        subtotal,
        discount: discount.amount(),
        taxable_amount,
        cgst: tax.cgst,
        sgst: tax.sgst,
        igst: tax.igst,
        total_tax: tax.total_tax,
        service_charge,
        final_amount: taxable_amount + service_charge + tax.total_tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(rupees: i64, qty: i64, bps: u32) -> LineItem {
        LineItem::new(Money::from_rupees(rupees), qty, TaxRate::from_bps(bps)).unwrap()
    }

    fn rupees(r: i64) -> Money {
        Money::from_rupees(r)
    }

    #[test]
    fn test_single_rate_same_state() {
        let tax = compute_single_rate_tax(rupees(1000), TaxRate::from_bps(900), JurisdictionMode::SameState);
        assert_eq!(
            tax,
            TaxBreakdown {
                cgst: rupees(45),
                sgst: rupees(45),
                igst: Money::zero(),
                total_tax: rupees(90),
            }
        );
    }

    #[test]
    fn test_single_rate_different_state() {
        let tax = compute_single_rate_tax(
            rupees(1000),
            TaxRate::from_bps(900),
            JurisdictionMode::DifferentState,
        );
        assert_eq!(
            tax,
            TaxBreakdown {
                cgst: Money::zero(),
                sgst: Money::zero(),
                igst: rupees(90),
                total_tax: rupees(90),
            }
        );
    }

    #[test]
    fn test_single_rate_zero_short_circuit() {
        let rate = TaxRate::from_bps(900);
        assert_eq!(
            compute_single_rate_tax(Money::zero(), rate, JurisdictionMode::SameState),
            TaxBreakdown::zero()
        );
        assert_eq!(
            compute_single_rate_tax(rupees(1000), TaxRate::zero(), JurisdictionMode::SameState),
            TaxBreakdown::zero()
        );
        assert_eq!(
            compute_single_rate_tax(rupees(1000), TaxRate::zero(), JurisdictionMode::DifferentState),
            TaxBreakdown::zero()
        );
    }

    #[test]
    fn test_single_rate_decimal_amount() {
        // ₹1234.56 at 9% = ₹111.1104; half = ₹55.5552
        let tax = compute_single_rate_tax(
            Money::from_paise(123_456),
            TaxRate::from_bps(900),
            JurisdictionMode::SameState,
        );
        assert_eq!(tax.cgst.paise(), 5_556);
        assert_eq!(tax.sgst.paise(), 5_556);
        assert_eq!(tax.total_tax.paise(), 11_111);
    }

    /// Documents the independently rounded total: ₹11.00 at 9% is ₹0.99,
    /// each half is ₹0.495 → ₹0.50, so the printed halves sum to ₹1.00.
    #[test]
    fn test_odd_paise_total_differs_from_split_sum() {
        let tax = compute_single_rate_tax(rupees(11), TaxRate::from_bps(900), JurisdictionMode::SameState);
        assert_eq!(tax.cgst.paise(), 50);
        assert_eq!(tax.sgst.paise(), 50);
        assert_eq!(tax.total_tax.paise(), 99);
        assert_eq!(tax.channel_sum().paise(), 100);
    }

    #[test]
    fn test_bill_mixed_rates_with_service_charge() {
        let items = [item(100, 2, 900), item(200, 1, 1800)];
        let bill = compute_bill(&items, JurisdictionMode::SameState, TaxRate::from_bps(500), Discount::none());

        assert_eq!(bill.subtotal, rupees(400));
        assert_eq!(bill.taxable_amount, rupees(400));
        assert_eq!(bill.service_charge, rupees(20));
        assert_eq!(bill.cgst, rupees(27));
        assert_eq!(bill.sgst, rupees(27));
        assert_eq!(bill.igst, Money::zero());
        assert_eq!(bill.total_tax, rupees(54));
        assert_eq!(bill.final_amount, rupees(474));
    }

    #[test]
    fn test_bill_interstate() {
        let bill = compute_bill(
            &[item(100, 1, 1800)],
            JurisdictionMode::DifferentState,
            TaxRate::zero(),
            Discount::none(),
        );

        assert_eq!(bill.subtotal, rupees(100));
        assert_eq!(bill.service_charge, Money::zero());
        assert_eq!(bill.cgst, Money::zero());
        assert_eq!(bill.sgst, Money::zero());
        assert_eq!(bill.igst, rupees(18));
        assert_eq!(bill.total_tax, rupees(18));
        assert_eq!(bill.final_amount, rupees(118));
    }

    #[test]
    fn test_bill_discount() {
        let discount = Discount::flat(rupees(10)).unwrap();
        let bill = compute_bill(&[item(100, 1, 900)], JurisdictionMode::SameState, TaxRate::zero(), discount);

        assert_eq!(bill.subtotal, rupees(100));
        assert_eq!(bill.discount, rupees(10));
        assert_eq!(bill.taxable_amount, rupees(90));
        assert_eq!(bill.cgst.paise(), 405);
        assert_eq!(bill.sgst.paise(), 405);
        assert_eq!(bill.total_tax.paise(), 810);
        assert_eq!(bill.final_amount.paise(), 9_810);
    }

    #[test]
    fn test_bill_discount_larger_than_subtotal() {
        let discount = Discount::flat(rupees(500)).unwrap();
        let bill = compute_bill(
            &[item(100, 1, 1800)],
            JurisdictionMode::SameState,
            TaxRate::from_bps(1000),
            discount,
        );

        assert_eq!(bill.discount, rupees(500));
        assert_eq!(bill.taxable_amount, Money::zero());
        assert_eq!(bill.service_charge, Money::zero());
        assert_eq!(bill.total_tax, Money::zero());
        assert_eq!(bill.final_amount, Money::zero());
    }

    #[test]
    fn test_bill_mixed_rates_weighted_average() {
        let bill = compute_bill(
            &[item(100, 1, 500), item(100, 1, 1800)],
            JurisdictionMode::SameState,
            TaxRate::zero(),
            Discount::none(),
        );

        assert_eq!(bill.subtotal, rupees(200));
        assert_eq!(bill.cgst.paise(), 1_150);
        assert_eq!(bill.sgst.paise(), 1_150);
        assert_eq!(bill.total_tax, rupees(23));
    }

    #[test]
    fn test_bill_empty_is_all_zero() {
        let bill = compute_bill(&[], JurisdictionMode::SameState, TaxRate::zero(), Discount::none());
        assert_eq!(bill, BillResult::default());

        // Even a requested discount is not echoed on an empty order
        let bill = compute_bill(
            &[],
            JurisdictionMode::DifferentState,
            TaxRate::from_bps(1000),
            Discount::flat(rupees(50)).unwrap(),
        );
        assert_eq!(bill, BillResult::default());
    }

    #[test]
    fn test_bill_zero_priced_lines() {
        let bill = compute_bill(
            &[item(0, 3, 1800)],
            JurisdictionMode::SameState,
            TaxRate::from_bps(1000),
            Discount::none(),
        );
        assert_eq!(bill.subtotal, Money::zero());
        assert_eq!(bill.total_tax, Money::zero());
        assert_eq!(bill.final_amount, Money::zero());
    }

    #[test]
    fn test_weighted_rate_uses_pre_discount_mix() {
        // ₹100 at 5% and ₹300 at 18%: (500 + 5400) / 4 = 1475 bps
        let items = [item(100, 1, 500), item(300, 1, 1800)];
        let rate = EffectiveRate::weighted(&items);
        assert_eq!(rate.to_tax_rate().bps(), 1_475);

        let discount = Discount::flat(rupees(200)).unwrap();
        let bill = compute_bill(&items, JurisdictionMode::DifferentState, TaxRate::zero(), discount);
        // ₹200 × 14.75% = ₹29.50
        assert_eq!(bill.igst.paise(), 2_950);
    }

    #[test]
    fn test_weighted_rate_is_exact_fraction() {
        // ₹100 at 5%, ₹100 at 12%, ₹100 at 18% → 11.666..% (not a whole bps)
        let items = [item(100, 1, 500), item(100, 1, 1200), item(100, 1, 1800)];
        let rate = EffectiveRate::weighted(&items);
        assert_eq!(rate.to_tax_rate().bps(), 1_167);

        // Exact: ₹300 × 3500/300 bps = ₹35.00; a rounded 1167 bps would give ₹35.01
        let tax = compute_single_rate_tax(rupees(300), rate, JurisdictionMode::DifferentState);
        assert_eq!(tax.igst, rupees(35));
    }

    #[test]
    fn test_effective_rate_equality() {
        assert_eq!(EffectiveRate::from(TaxRate::from_bps(900)), EffectiveRate::weighted(&[item(50, 2, 900)]));
        assert_eq!(EffectiveRate::weighted(&[]), EffectiveRate::zero());
        assert!(EffectiveRate::weighted(&[item(0, 1, 1800)]).is_zero());
    }

    #[test]
    fn test_bill_result_serializes_camel_case() {
        let bill = compute_bill(&[item(100, 1, 900)], JurisdictionMode::SameState, TaxRate::zero(), Discount::none());
        let json = serde_json::to_value(bill).unwrap();
        assert_eq!(json["taxableAmount"], 10_000);
        assert_eq!(json["finalAmount"], 10_900);
        assert_eq!(bill.tax_breakdown().total_tax, rupees(9));
    }
}
