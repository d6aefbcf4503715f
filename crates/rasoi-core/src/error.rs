//! # Error Types
//!
//! Domain-specific error types for rasoi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rasoi-core errors (this file)                                         │
//! │  ├── CoreError        - Bill lifecycle / domain errors                 │
//! │  └── ValidationError  - Value-object construction failures             │
//! │                                                                         │
//! │  rasoi-bill errors (apps/billing-cli)                                  │
//! │  ├── ConfigError      - Outlet config file / env failures              │
//! │  └── CliError         - Order ticket and I/O failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → anyhow (main)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator functions themselves never fail: every error here is
//! raised while *building* their inputs.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bill number text does not match `BILL-YYYYMMDD-NNN`.
    #[error("Invalid bill number: {0}")]
    InvalidBillNumber(String),

    /// Bill was already settled.
    ///
    /// ## When This Occurs
    /// - Cashier double-clicks "Mark as paid"
    /// - Two terminals settle the same table bill
    #[error("Bill {bill_number} is already paid")]
    BillAlreadyPaid { bill_number: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the validating factories (`LineItem::new`, `Discount::flat`,
/// `Gstin::parse`, ...) before any bill math runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad GSTIN, bad amount text, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
