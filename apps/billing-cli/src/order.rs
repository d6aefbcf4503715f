//! # Order Tickets
//!
//! Reads the kitchen order ticket a waiter hands to the cashier and turns it
//! into validated line items.
//!
//! ```json
//! {
//!   "orderId": "T4-0012",
//!   "items": [
//!     { "name": "Paneer Tikka", "unitPrice": "250.00", "quantity": 2, "taxRate": "5" }
//!   ],
//!   "customerGstin": null,
//!   "customerState": null,
//!   "discount": "0",
//!   "paid": false
//! }
//! ```
//!
//! Amounts and rates may be written as strings or plain JSON numbers.

use std::path::Path;

use rasoi_core::validation::validate_line_count;
use rasoi_core::{
    Discount, Gstin, JurisdictionMode, LineItem, Money, StateCode, TaxRate, ValidationError,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult, ConfigError};

// =============================================================================
// Ticket (wire format)
// =============================================================================

/// Decimal text or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(serde_json::Number),
}

impl Decimal {
    fn text(&self) -> String {
        match self {
            Decimal::Text(s) => s.clone(),
            Decimal::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketItem {
    name: String,
    unit_price: Decimal,
    quantity: i64,
    tax_rate: Decimal,
}

/// Order ticket as written to disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTicket {
    order_id: String,
    #[serde(default)]
    items: Vec<TicketItem>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    customer_phone: Option<String>,
    #[serde(default)]
    customer_gstin: Option<String>,
    #[serde(default)]
    customer_state: Option<String>,
    #[serde(default)]
    discount: Option<Decimal>,
    /// Settled at the counter before billing.
    #[serde(default)]
    paid: bool,
}

impl OrderTicket {
    /// Reads a ticket from a JSON file.
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadTicket {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parses a ticket from JSON text.
    pub fn from_json(json: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates every field and builds the order.
    pub fn into_order(self) -> CliResult<Order> {
        validate_line_count(self.items.len())?;

        let lines = self
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let line = idx + 1;
                let name = item.name.trim().to_string();
                OrderLine::parse(&name, &item.unit_price.text(), item.quantity, &item.tax_rate.text())
                    .map_err(|source| CliError::InvalidLine { line, name, source })
            })
            .collect::<CliResult<Vec<_>>>()?;

        let discount = match self.discount {
            Some(raw) => Discount::flat(parse_amount("discount", &raw.text())?)?,
            None => Discount::none(),
        };

        let customer_gstin = non_blank(self.customer_gstin)
            .map(|g| Gstin::parse(&g))
            .transpose()?;
        let customer_state = non_blank(self.customer_state)
            .map(|s| s.parse::<StateCode>())
            .transpose()?;

        debug!(order_id = %self.order_id, lines = lines.len(), "Parsed order ticket");

        Ok(Order {
            order_id: self.order_id,
            lines,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_gstin,
            customer_state,
            discount,
            paid: self.paid,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_amount(field: &str, raw: &str) -> Result<Money, ValidationError> {
    raw.parse::<Money>().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a rupee amount", raw),
    })
}

// =============================================================================
// Validated Order
// =============================================================================

/// One named line of the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub name: String,
    pub item: LineItem,
}

impl OrderLine {
    fn parse(name: &str, unit_price: &str, quantity: i64, tax_rate: &str) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            });
        }
        let price = parse_amount("unit_price", unit_price)?;
        let rate: TaxRate = tax_rate.parse()?;

        Ok(OrderLine {
            name: name.to_string(),
            item: LineItem::new(price, quantity, rate)?,
        })
    }
}

/// A validated order, ready for billing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub lines: Vec<OrderLine>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_gstin: Option<Gstin>,
    pub customer_state: Option<StateCode>,
    pub discount: Discount,
    pub paid: bool,
}

impl Order {
    /// The priced line items, in ticket order.
    pub fn items(&self) -> Vec<LineItem> {
        self.lines.iter().map(|line| line.item).collect()
    }

    /// Place of supply named on the ticket. A GSTIN outranks a bare state code.
    pub fn place_of_supply(&self) -> PlaceOfSupply {
        match (&self.customer_gstin, self.customer_state) {
            (Some(gstin), _) => PlaceOfSupply::State(gstin.state_code()),
            (None, Some(state)) => PlaceOfSupply::State(state),
            (None, None) => PlaceOfSupply::Outlet,
        }
    }
}

// =============================================================================
// Place of Supply
// =============================================================================

/// Where the supply is made, which decides CGST/SGST against IGST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOfSupply {
    /// Dine-in or takeaway at the outlet: always intrastate.
    Outlet,
    /// Customer in a known state.
    State(StateCode),
    /// Forced interstate.
    Interstate,
}

impl PlaceOfSupply {
    /// Place of supply from command-line flags, if any were given.
    pub fn from_flags(
        interstate: bool,
        customer_gstin: Option<&Gstin>,
        customer_state: Option<StateCode>,
    ) -> Option<Self> {
        if interstate {
            Some(PlaceOfSupply::Interstate)
        } else if let Some(gstin) = customer_gstin {
            Some(PlaceOfSupply::State(gstin.state_code()))
        } else {
            customer_state.map(PlaceOfSupply::State)
        }
    }

    /// Resolves the tax channel against the outlet's home state.
    pub fn jurisdiction(&self, home: Option<StateCode>) -> CliResult<JurisdictionMode> {
        match self {
            PlaceOfSupply::Outlet => Ok(JurisdictionMode::SameState),
            PlaceOfSupply::Interstate => Ok(JurisdictionMode::DifferentState),
            PlaceOfSupply::State(customer) => home
                .map(|home| JurisdictionMode::between(home, *customer))
                .ok_or_else(|| {
                    CliError::from(ConfigError::MissingRequired(
                        "outlet.home_state (or outlet.gstin) to compare with the customer's state"
                            .into(),
                    ))
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKET: &str = r#"{
        "orderId": "T4-0012",
        "items": [
            { "name": "Paneer Tikka", "unitPrice": "250.00", "quantity": 2, "taxRate": "5" },
            { "name": "Butter Naan", "unitPrice": 45, "quantity": 4, "taxRate": 5 },
            { "name": "Mocktail", "unitPrice": "120.50", "quantity": 1, "taxRate": "18%" }
        ],
        "customerName": "Asha Rao",
        "customerGstin": null,
        "customerState": "29",
        "discount": "50"
    }"#;

    fn state(code: u8) -> StateCode {
        StateCode::new(code).unwrap()
    }

    #[test]
    fn test_parse_ticket() {
        let order = OrderTicket::from_json(TICKET).unwrap().into_order().unwrap();

        assert_eq!(order.order_id, "T4-0012");
        assert_eq!(order.lines.len(), 3);
        assert_eq!(order.lines[0].name, "Paneer Tikka");
        assert_eq!(order.lines[0].item.line_total(), Money::from_rupees(500));
        assert_eq!(order.lines[1].item.unit_price(), Money::from_rupees(45));
        assert_eq!(order.lines[2].item.unit_price(), Money::from_paise(12_050));
        assert_eq!(order.lines[2].item.tax_rate(), TaxRate::from_bps(1800));
        assert_eq!(order.discount.amount(), Money::from_rupees(50));
        assert_eq!(order.customer_name.as_deref(), Some("Asha Rao"));
        assert_eq!(order.place_of_supply(), PlaceOfSupply::State(state(29)));
        assert!(!order.paid);

        let settled = r#"{ "orderId": "T5", "items": [], "paid": true }"#;
        assert!(OrderTicket::from_json(settled).unwrap().into_order().unwrap().paid);
    }

    #[test]
    fn test_minimal_ticket() {
        let order = OrderTicket::from_json(r#"{ "orderId": "T1", "items": [] }"#)
            .unwrap()
            .into_order()
            .unwrap();
        assert!(order.lines.is_empty());
        assert_eq!(order.discount, Discount::none());
        assert_eq!(order.place_of_supply(), PlaceOfSupply::Outlet);
    }

    #[test]
    fn test_invalid_line_is_reported_with_position() {
        let json = r#"{
            "orderId": "T2",
            "items": [
                { "name": "Chai", "unitPrice": "20", "quantity": 1, "taxRate": "5" },
                { "name": "Samosa", "unitPrice": "-15", "quantity": 2, "taxRate": "5" }
            ]
        }"#;
        let err = OrderTicket::from_json(json).unwrap().into_order().unwrap_err();
        match err {
            CliError::InvalidLine { line, name, .. } => {
                assert_eq!(line, 2);
                assert_eq!(name, "Samosa");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_price_above_ceiling() {
        let json = r#"{
            "orderId": "T9",
            "items": [
                { "name": "Chai", "unitPrice": "20", "quantity": 1, "taxRate": "5" },
                { "name": "Gold Thali", "unitPrice": "50000000000000000", "quantity": 2, "taxRate": "18" }
            ]
        }"#;
        let err = OrderTicket::from_json(json).unwrap().into_order().unwrap_err();
        match err {
            CliError::InvalidLine { line, source, .. } => {
                assert_eq!(line, 2);
                assert!(matches!(source, ValidationError::OutOfRange { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        let at_ceiling = r#"{ "orderId": "T9", "items": [
            { "name": "Banquet", "unitPrice": "10000000", "quantity": 999, "taxRate": "28" } ] }"#;
        let order = OrderTicket::from_json(at_ceiling).unwrap().into_order().unwrap();
        assert_eq!(order.items()[0].line_total(), Money::from_rupees(9_990_000_000));
    }

    #[test]
    fn test_rejects_bad_fields() {
        let too_many = r#"{ "orderId": "T3", "items": [
            { "name": "Idli", "unitPrice": "30", "quantity": 1000, "taxRate": "5" } ] }"#;
        assert!(OrderTicket::from_json(too_many).unwrap().into_order().is_err());

        let bad_gstin = r#"{ "orderId": "T3", "items": [], "customerGstin": "27XYZ" }"#;
        assert!(OrderTicket::from_json(bad_gstin).unwrap().into_order().is_err());

        let bad_discount = r#"{ "orderId": "T3", "items": [], "discount": "-5" }"#;
        assert!(OrderTicket::from_json(bad_discount).unwrap().into_order().is_err());

        let too_long = format!(
            r#"{{ "orderId": "T3", "items": [{}] }}"#,
            vec![r#"{ "name": "Chai", "unitPrice": "20", "quantity": 1, "taxRate": "5" }"#; 1000]
                .join(",")
        );
        assert!(matches!(
            OrderTicket::from_json(&too_long).unwrap().into_order(),
            Err(CliError::Validation(ValidationError::OutOfRange { .. }))
        ));

        assert!(matches!(
            OrderTicket::from_json("{ not json"),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn test_gstin_outranks_state() {
        let json = r#"{ "orderId": "T5", "items": [],
            "customerGstin": "07AAACB2894G1ZP", "customerState": "29" }"#;
        let order = OrderTicket::from_json(json).unwrap().into_order().unwrap();
        assert_eq!(order.place_of_supply(), PlaceOfSupply::State(state(7)));
    }

    #[test]
    fn test_flags_override_ticket() {
        let gstin = Gstin::parse("29ABCDE1234F1Z5").unwrap();

        assert_eq!(
            PlaceOfSupply::from_flags(true, Some(&gstin), Some(state(27))),
            Some(PlaceOfSupply::Interstate)
        );
        assert_eq!(
            PlaceOfSupply::from_flags(false, Some(&gstin), Some(state(27))),
            Some(PlaceOfSupply::State(state(29)))
        );
        assert_eq!(
            PlaceOfSupply::from_flags(false, None, Some(state(27))),
            Some(PlaceOfSupply::State(state(27)))
        );
        assert_eq!(PlaceOfSupply::from_flags(false, None, None), None);
    }

    #[test]
    fn test_jurisdiction_resolution() {
        let home = Some(state(27));

        assert_eq!(
            PlaceOfSupply::Outlet.jurisdiction(None).unwrap(),
            JurisdictionMode::SameState
        );
        assert_eq!(
            PlaceOfSupply::Interstate.jurisdiction(None).unwrap(),
            JurisdictionMode::DifferentState
        );
        assert_eq!(
            PlaceOfSupply::State(state(27)).jurisdiction(home).unwrap(),
            JurisdictionMode::SameState
        );
        assert_eq!(
            PlaceOfSupply::State(state(29)).jurisdiction(home).unwrap(),
            JurisdictionMode::DifferentState
        );
        assert!(matches!(
            PlaceOfSupply::State(state(29)).jurisdiction(None),
            Err(CliError::Config(ConfigError::MissingRequired(_)))
        ));
    }
}
