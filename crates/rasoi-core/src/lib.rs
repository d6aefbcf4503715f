//! # rasoi-core: GST Bill Computation for Rasoi POS
//!
//! This crate holds the restaurant billing math: line totals, discounts,
//! service charge, and the GST split into CGST/SGST or IGST. Everything is
//! a pure function over integer paise.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rasoi POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 rasoi-bill (apps/billing-cli)                   │   │
//! │  │   order ticket JSON ──► outlet config ──► printed / JSON bill   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rasoi-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    gst    │  │   bill    │  │   │
//! │  │   │ LineItem  │  │   Money   │  │ compute_  │  │   Bill    │  │   │
//! │  │   │  Gstin    │  │  (paise)  │  │   bill    │  │ BillStats │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type in paise with Indian-grouped display
//! - [`types`] - Value objects (TaxRate, LineItem, Discount, Gstin, ...)
//! - [`gst`] - Single-rate tax split and whole-bill aggregation
//! - [`bill`] - Issued bill records, bill numbers, cashier stats
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use rasoi_core::{compute_bill, Discount, JurisdictionMode, LineItem, Money, TaxRate};
//!
//! let items = [
//!     LineItem::new(Money::from_rupees(250), 2, TaxRate::from_bps(500)).unwrap(),
//! ];
//!
//! let bill = compute_bill(
//!     &items,
//!     JurisdictionMode::SameState,
//!     TaxRate::zero(),
//!     Discount::none(),
//! );
//!
//! assert_eq!(bill.subtotal, Money::from_rupees(500));
//! assert_eq!(bill.cgst, Money::from_rupees_paise(12, 50));
//! assert_eq!(bill.final_amount, Money::from_rupees(525));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod error;
pub mod gst;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{Bill, BillNumber, BillStats, PaymentFilter};
pub use error::{CoreError, CoreResult, ValidationError};
pub use gst::{compute_bill, compute_single_rate_tax, BillResult, EffectiveRate, TaxBreakdown};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Catches fat-fingered quantities (1000 instead of 10) at the ticket.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price, in paise (₹1,00,00,000).
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_ORDER_LINES`] this keeps every
/// subtotal under 10^15 paise, so the exact-ratio tax math stays inside i128.
pub const MAX_UNIT_PRICE_PAISE: i64 = 1_000_000_000;

/// Maximum number of lines on one order.
pub const MAX_ORDER_LINES: usize = 999;

/// Highest accepted tax or service-charge rate, in basis points (100%).
pub const MAX_TAX_RATE_BPS: u32 = 10_000;
