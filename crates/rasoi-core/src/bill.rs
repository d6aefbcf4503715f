//! # Bill Records
//!
//! The record a cashier issues once an order's amounts are computed.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  compute_bill() ──► Bill::issue() ──► [UNPAID] ──► mark_paid() ──► [PAID]
//! │                          │                             │                │
//! │                          ▼                             ▼                │
//! │                BILL-20240115-042               paid_at = now            │
//! │                id = UUID v4                    (second call → error)    │
//! │                                                                         │
//! │  Cashier screen: BillStats::from_bills(&bills) → counts + revenue      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storing bills is the caller's job; nothing here touches a database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::gst::BillResult;
use crate::money::Money;
use crate::types::JurisdictionMode;
use crate::validation::validate_required;

// =============================================================================
// Bill Number
// =============================================================================

/// Human-readable bill number: `BILL-YYYYMMDD-NNN`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rasoi_core::bill::BillNumber;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let number = BillNumber::new(date, 42).unwrap();
/// assert_eq!(number.to_string(), "BILL-20240115-042");
///
/// let parsed: BillNumber = "BILL-20240115-042".parse().unwrap();
/// assert_eq!(parsed, number);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillNumber {
    date: NaiveDate,
    suffix: u16,
}

impl BillNumber {
    /// Prefix every bill number starts with.
    pub const PREFIX: &'static str = "BILL";

    /// Largest allowed suffix.
    pub const MAX_SUFFIX: u16 = 999;

    /// Creates a bill number for `date` with an explicit suffix.
    pub fn new(date: NaiveDate, suffix: u16) -> CoreResult<Self> {
        if suffix > Self::MAX_SUFFIX {
            return Err(ValidationError::OutOfRange {
                field: "bill suffix".to_string(),
                min: 0,
                max: Self::MAX_SUFFIX as i64,
            }
            .into());
        }
        Ok(BillNumber { date, suffix })
    }

    /// Creates a bill number for `date` with a random 3-digit suffix.
    ///
    /// Collisions within a day are possible; callers persisting bills should
    /// keep a unique index on the number and retry.
    pub fn generate(date: NaiveDate) -> Self {
        let suffix = (Uuid::new_v4().as_u128() % (Self::MAX_SUFFIX as u128 + 1)) as u16;
        BillNumber { date, suffix }
    }

    /// Business date of the bill.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The 3-digit suffix.
    pub fn suffix(&self) -> u16 {
        self.suffix
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:03}",
            Self::PREFIX,
            self.date.format("%Y%m%d"),
            self.suffix
        )
    }
}

impl FromStr for BillNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidBillNumber(s.to_string());

        let rest = s
            .trim()
            .strip_prefix(Self::PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(invalid)?;
        let (date, suffix) = rest.split_once('-').ok_or_else(invalid)?;

        if date.len() != 8 || suffix.len() != 3 || !suffix.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;
        let suffix: u16 = suffix.parse().map_err(|_| invalid())?;

        BillNumber::new(date, suffix)
    }
}

impl TryFrom<String> for BillNumber {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BillNumber> for String {
    fn from(number: BillNumber) -> Self {
        number.to_string()
    }
}

// =============================================================================
// Bill
// =============================================================================

/// An issued bill for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Printed bill number.
    #[ts(as = "String")]
    pub bill_number: BillNumber,

    /// Order this bill settles.
    pub order_id: String,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,

    /// Tax channel used for this bill.
    pub jurisdiction: JurisdictionMode,

    /// Computed amounts (frozen at issue time).
    pub amounts: BillResult,

    pub is_paid: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Bill {
    /// Issues an unpaid bill dated now (UTC).
    pub fn issue(
        order_id: &str,
        jurisdiction: JurisdictionMode,
        amounts: BillResult,
    ) -> CoreResult<Self> {
        Self::issue_at(order_id, jurisdiction, amounts, Utc::now())
    }

    /// Issues an unpaid bill with an explicit timestamp.
    pub fn issue_at(
        order_id: &str,
        jurisdiction: JurisdictionMode,
        amounts: BillResult,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let order_id = validate_required("order_id", order_id)?;

        Ok(Bill {
            id: Uuid::new_v4().to_string(),
            bill_number: BillNumber::generate(now.date_naive()),
            order_id: order_id.to_string(),
            customer_name: None,
            customer_phone: None,
            jurisdiction,
            amounts,
            is_paid: false,
            created_at: now,
            paid_at: None,
        })
    }

    /// Attaches customer details; blank values are dropped.
    pub fn with_customer(mut self, name: Option<&str>, phone: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        self.customer_name = clean(name);
        self.customer_phone = clean(phone);
        self
    }

    /// Settles the bill.
    ///
    /// ## Errors
    /// `CoreError::BillAlreadyPaid` if the bill was settled before; the
    /// original `paid_at` is kept.
    pub fn mark_paid(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        if self.is_paid {
            return Err(CoreError::BillAlreadyPaid {
                bill_number: self.bill_number.to_string(),
            });
        }
        self.is_paid = true;
        self.paid_at = Some(at);
        Ok(())
    }

    /// Amount the customer owes.
    pub fn final_amount(&self) -> Money {
        self.amounts.final_amount
    }

    /// Case-insensitive search on bill number and customer name.
    ///
    /// An empty term matches every bill.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.bill_number.to_string().to_lowercase().contains(&term)
            || self
                .customer_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&term))
    }
}

// =============================================================================
// Payment Filter
// =============================================================================

/// Filter used by the cashier bill list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl PaymentFilter {
    /// Returns true if `bill` passes this filter.
    pub fn admits(&self, bill: &Bill) -> bool {
        match self {
            PaymentFilter::All => true,
            PaymentFilter::Paid => bill.is_paid,
            PaymentFilter::Unpaid => !bill.is_paid,
        }
    }
}

/// Parses `all`, `paid` or `unpaid` (any case).
impl FromStr for PaymentFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(PaymentFilter::All),
            "paid" => Ok(PaymentFilter::Paid),
            "unpaid" => Ok(PaymentFilter::Unpaid),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["all".into(), "paid".into(), "unpaid".into()],
            }),
        }
    }
}

// =============================================================================
// Bill Statistics
// =============================================================================

/// Counts and revenue over a set of bills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillStats {
    pub total: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub total_revenue: Money,
    pub paid_revenue: Money,
    pub pending_revenue: Money,
}

impl BillStats {
    /// Aggregates statistics over `bills`.
    pub fn from_bills<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> Self {
        bills.into_iter().fold(BillStats::default(), |mut stats, bill| {
            stats.total += 1;
            stats.total_revenue += bill.final_amount();
            if bill.is_paid {
                stats.paid += 1;
                stats.paid_revenue += bill.final_amount();
            } else {
                stats.unpaid += 1;
                stats.pending_revenue += bill.final_amount();
            }
            stats
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn amounts(final_rupees: i64) -> BillResult {
        BillResult {
            final_amount: Money::from_rupees(final_rupees),
            ..BillResult::default()
        }
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 13, 45, 0).unwrap()
    }

    #[test]
    fn test_bill_number_format_and_parse() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let number = BillNumber::new(date, 7).unwrap();
        assert_eq!(number.to_string(), "BILL-20240305-007");
        assert_eq!("BILL-20240305-007".parse::<BillNumber>().unwrap(), number);

        assert!(BillNumber::new(date, 1000).is_err());
        assert!("BILL-20240305-7".parse::<BillNumber>().is_err());
        assert!("INV-20240305-007".parse::<BillNumber>().is_err());
        assert!("BILL-20241305-007".parse::<BillNumber>().is_err()); // month 13
        assert!("BILL-20240305".parse::<BillNumber>().is_err());
    }

    #[test]
    fn test_generated_bill_number_uses_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for _ in 0..50 {
            let number = BillNumber::generate(date);
            assert_eq!(number.date(), date);
            assert!(number.suffix() <= BillNumber::MAX_SUFFIX);
            assert!(number.to_string().starts_with("BILL-20240115-"));
        }
    }

    #[test]
    fn test_issue_bill() {
        let bill = Bill::issue_at(" T4-0012 ", JurisdictionMode::SameState, amounts(474), issued_at())
            .unwrap();

        assert_eq!(bill.order_id, "T4-0012");
        assert!(!bill.is_paid);
        assert!(bill.paid_at.is_none());
        assert_eq!(bill.bill_number.date(), issued_at().date_naive());
        assert!(uuid::Uuid::parse_str(&bill.id).is_ok());
        assert_eq!(bill.final_amount(), Money::from_rupees(474));
    }

    #[test]
    fn test_issue_requires_order_id() {
        let err = Bill::issue("  ", JurisdictionMode::SameState, amounts(10)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));
    }

    #[test]
    fn test_mark_paid_once() {
        let mut bill =
            Bill::issue_at("T1", JurisdictionMode::SameState, amounts(100), issued_at()).unwrap();
        let paid_at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();

        bill.mark_paid(paid_at).unwrap();
        assert!(bill.is_paid);
        assert_eq!(bill.paid_at, Some(paid_at));

        let err = bill.mark_paid(Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::BillAlreadyPaid { .. }));
        assert_eq!(bill.paid_at, Some(paid_at));
    }

    #[test]
    fn test_search_and_filter() {
        let bill = Bill::issue_at("T2", JurisdictionMode::SameState, amounts(100), issued_at())
            .unwrap()
            .with_customer(Some("  Asha Rao "), Some(""));

        assert_eq!(bill.customer_name.as_deref(), Some("Asha Rao"));
        assert!(bill.customer_phone.is_none());

        assert!(bill.matches("asha"));
        assert!(bill.matches("bill-20240115"));
        assert!(bill.matches(""));
        assert!(!bill.matches("vikram"));

        assert!(PaymentFilter::All.admits(&bill));
        assert!(PaymentFilter::Unpaid.admits(&bill));
        assert!(!PaymentFilter::Paid.admits(&bill));
    }

    #[test]
    fn test_payment_filter_parse() {
        assert_eq!("paid".parse::<PaymentFilter>().unwrap(), PaymentFilter::Paid);
        assert_eq!(" Unpaid ".parse::<PaymentFilter>().unwrap(), PaymentFilter::Unpaid);
        assert_eq!("ALL".parse::<PaymentFilter>().unwrap(), PaymentFilter::All);
        assert!(matches!(
            "settled".parse::<PaymentFilter>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_bill_stats() {
        let mut paid =
            Bill::issue_at("T1", JurisdictionMode::SameState, amounts(474), issued_at()).unwrap();
        paid.mark_paid(issued_at()).unwrap();
        let open_a =
            Bill::issue_at("T2", JurisdictionMode::SameState, amounts(118), issued_at()).unwrap();
        let open_b =
            Bill::issue_at("T3", JurisdictionMode::DifferentState, amounts(98), issued_at())
                .unwrap();

        let stats = BillStats::from_bills(&[paid, open_a, open_b]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.unpaid, 2);
        assert_eq!(stats.total_revenue, Money::from_rupees(690));
        assert_eq!(stats.paid_revenue, Money::from_rupees(474));
        assert_eq!(stats.pending_revenue, Money::from_rupees(216));

        assert_eq!(BillStats::from_bills(&Vec::<Bill>::new()), BillStats::default());
    }

    #[test]
    fn test_bill_json_round_trip_keeps_number_text() {
        let bill = Bill::issue_at("T9", JurisdictionMode::DifferentState, amounts(5), issued_at())
            .unwrap();
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["billNumber"], bill.bill_number.to_string());
        assert_eq!(json["jurisdiction"], "different-state");

        let back: Bill = serde_json::from_value(json).unwrap();
        assert_eq!(back, bill);
    }
}
