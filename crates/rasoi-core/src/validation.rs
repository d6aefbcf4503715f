//! # Validation Module
//!
//! Input validation for the billing core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Order screen (web UI)                                        │
//! │  └── min="0" inputs, immediate feedback                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Value-object factories (THIS MODULE)                         │
//! │  ├── LineItem::new, Discount::flat, Quantity::new                      │
//! │  └── Gstin::parse, StateCode::new                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: gst::compute_bill                                            │
//! │  └── Assumes valid input; never fails                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rasoi_core::validation::{validate_gstin, validate_line_quantity};
//!
//! assert!(validate_line_quantity(3).is_ok());
//! assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Gstin, StateCode};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES, MAX_TAX_RATE_BPS, MAX_UNIT_PRICE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Length of a GSTIN.
pub const GSTIN_LEN: usize = 15;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a required text field is present.
///
/// ## Returns
/// The trimmed value.
pub fn validate_required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Validates a GST Identification Number.
///
/// ## Rules
/// ```text
///   position  0-1   2-6    7-10   11    12      13   14
///   class     digit A-Z    digit  A-Z   1-9A-Z  'Z'  0-9A-Z
///   example   27    AAPFU  0939   F     1       Z    V
/// ```
/// The leading two digits must also be a known GST state code.
///
/// Input is trimmed and upper-cased before checking.
///
/// ## Example
/// ```rust
/// use rasoi_core::validation::validate_gstin;
///
/// let gstin = validate_gstin("29abcde1234f1z5").unwrap();
/// assert_eq!(gstin.as_str(), "29ABCDE1234F1Z5");
///
/// assert!(validate_gstin("29ABCDE1234F0Z5").is_err()); // entity code 0
/// assert!(validate_gstin("").is_err());
/// ```
pub fn validate_gstin(raw: &str) -> ValidationResult<Gstin> {
    let gstin = validate_required("gstin", raw)?.to_ascii_uppercase();

    let invalid = |reason: String| ValidationError::InvalidFormat {
        field: "gstin".to_string(),
        reason,
    };

    if gstin.len() != GSTIN_LEN || !gstin.is_ascii() {
        return Err(invalid(format!("must be {} characters", GSTIN_LEN)));
    }

    let bytes = gstin.as_bytes();
    let digit = |b: u8| b.is_ascii_digit();
    let letter = |b: u8| b.is_ascii_uppercase();

    for (pos, &b) in bytes.iter().enumerate() {
        let ok = match pos {
            0..=1 | 7..=10 => digit(b),
            2..=6 | 11 => letter(b),
            12 => letter(b) || (b'1'..=b'9').contains(&b),
            13 => b == b'Z',
            _ => letter(b) || digit(b),
        };
        if !ok {
            return Err(invalid(format!(
                "unexpected '{}' at position {}",
                b as char,
                pos + 1
            )));
        }
    }

    validate_state_code(&gstin[..2])?;

    Ok(Gstin::from_validated(gstin))
}

/// Validates a two-digit GST state code.
pub fn validate_state_code(raw: &str) -> ValidationResult<StateCode> {
    raw.parse()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be non-negative (zero is a voided line that still bills as ₹0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
/// - Must not exceed MAX_UNIT_PRICE_PAISE (₹1,00,00,000)
///
/// ## Example
/// ```rust
/// use rasoi_core::money::Money;
/// use rasoi_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_paise(25_000)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_paise(-100)).is_err());
/// assert!(validate_price(Money::from_rupees(50_000_000_000_000)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit_price".to_string(),
        });
    }

    if price.paise() > MAX_UNIT_PRICE_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_PAISE,
        });
    }

    Ok(())
}

/// Validates the number of lines on an order.
///
/// ## Rules
/// - Must not exceed MAX_ORDER_LINES (999)
/// - An empty order is allowed (it bills ₹0)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

/// Validates a flat discount amount.
pub fn validate_discount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "discount".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - GST slabs in practice are 0-2800 (0% to 28%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: MAX_TAX_RATE_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("order_id", "  T4-12 ").unwrap(), "T4-12");
        assert!(validate_required("order_id", "   ").is_err());
    }

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gstin("29ABCDE1234F1Z5").is_ok());
        assert!(validate_gstin("07AAACB2894G1ZP").is_ok());

        assert!(validate_gstin("27AAPFU0939F1Z").is_err()); // too short
        assert!(validate_gstin("27AAPFU0939F1ZVX").is_err()); // too long
        assert!(validate_gstin("2AAAPFU0939F1ZV").is_err()); // letter in state code
        assert!(validate_gstin("27AAPF10939F1ZV").is_err()); // digit in PAN letters
        assert!(validate_gstin("27AAPFU0939F1YV").is_err()); // missing Z
        assert!(validate_gstin("00AAPFU0939F1ZV").is_err()); // unknown state
        assert!(validate_gstin("27AAPFU0939F1Z-").is_err());
    }

    #[test]
    fn test_validate_gstin_reports_position() {
        let err = validate_gstin("27AAPFU0939F1YV").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFormat {
                field: "gstin".to_string(),
                reason: "unexpected 'Y' at position 14".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(0).is_ok());
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(999).is_ok());

        assert!(validate_line_quantity(-1).is_err());
        assert!(validate_line_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_and_discount() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_paise(-1)).is_err());
        assert!(validate_price(Money::from_paise(MAX_UNIT_PRICE_PAISE)).is_ok());
        assert_eq!(
            validate_price(Money::from_paise(MAX_UNIT_PRICE_PAISE + 1)),
            Err(ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 0,
                max: MAX_UNIT_PRICE_PAISE,
            })
        );
        assert!(validate_price("50000000000000000".parse().unwrap()).is_err());
        assert!(validate_price(Money::from_paise(i64::MAX)).is_err());
        assert!(validate_discount(Money::from_rupees(50)).is_ok());
        assert!(validate_discount(Money::from_paise(-1)).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(0).is_ok());
        assert!(validate_line_count(MAX_ORDER_LINES).is_ok());
        assert!(validate_line_count(MAX_ORDER_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(2800).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_state_code() {
        assert_eq!(validate_state_code("33").unwrap().name(), "Tamil Nadu");
        assert!(validate_state_code("3a").is_err());
    }
}
