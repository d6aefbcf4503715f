//! # Bill Rendering
//!
//! Plain-text output sized for a 44-column thermal printer.
//!
//! ```text
//!                 Rasoi Kitchen
//!             GSTIN 27AAPFU0939F1ZV
//! --------------------------------------------
//! Bill BILL-20240115-042      15-01-2024 13:45
//! Order T4-0012
//! --------------------------------------------
//! Item                 Qty     GST      Amount
//! Paneer Tikka           2      5%     ₹500.00
//! --------------------------------------------
//! Subtotal                             ₹500.00
//! CGST                                  ₹12.50
//! SGST                                  ₹12.50
//! --------------------------------------------
//! TOTAL                                ₹525.00
//! ```

use rasoi_core::{
    Bill, BillStats, EffectiveRate, Gstin, JurisdictionMode, Money, TaxBreakdown, TaxRate,
};

use crate::config::OutletSettings;
use crate::order::Order;

/// Printer width in characters.
const WIDTH: usize = 44;

fn rule() -> String {
    "-".repeat(WIDTH)
}

fn center(text: &str) -> String {
    format!("{:^width$}", text, width = WIDTH).trim_end().to_string()
}

fn amount_row(label: &str, amount: Money) -> String {
    let amount = amount.to_string();
    let pad = WIDTH.saturating_sub(amount.chars().count());
    format!("{:<pad$}{}", label, amount, pad = pad)
}

fn split_row(left: &str, right: &str) -> String {
    let pad = WIDTH.saturating_sub(right.chars().count());
    format!("{:<pad$}{}", left, right, pad = pad)
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn tax_rows(out: &mut Vec<String>, jurisdiction: JurisdictionMode, tax: &TaxBreakdown) {
    match jurisdiction {
        JurisdictionMode::SameState => {
            out.push(amount_row("CGST", tax.cgst));
            out.push(amount_row("SGST", tax.sgst));
        }
        JurisdictionMode::DifferentState => out.push(amount_row("IGST", tax.igst)),
    }
}

/// Renders an issued bill with its order lines.
pub fn render_bill(
    outlet: &OutletSettings,
    order: &Order,
    bill: &Bill,
    service_rate: TaxRate,
) -> String {
    let mut out = vec![center(&outlet.name)];
    if let Some(gstin) = &outlet.gstin {
        out.push(center(&format!("GSTIN {}", gstin)));
    }

    out.push(rule());
    out.push(split_row(
        &format!("Bill {}", bill.bill_number),
        &bill.created_at.format("%d-%m-%Y %H:%M").to_string(),
    ));
    out.push(format!("Order {}", bill.order_id));
    if let Some(name) = &bill.customer_name {
        out.push(format!("Customer {}", name));
    }
    if let Some(gstin) = &order.customer_gstin {
        out.push(format!("Customer GSTIN {}", gstin));
    }

    out.push(rule());
    out.push(format!("{:<20}{:>4}{:>8}{:>12}", "Item", "Qty", "GST", "Amount"));
    for line in &order.lines {
        let total = line.item.line_total().to_string();
        out.push(format!(
            "{:<20}{:>4}{:>8}{:>12}",
            truncate(&line.name, 19),
            line.item.quantity().to_string(),
            line.item.tax_rate().to_string(),
            total,
        ));
    }

    let amounts = &bill.amounts;
    out.push(rule());
    out.push(amount_row("Subtotal", amounts.subtotal));
    if amounts.discount.is_positive() {
        out.push(amount_row("Discount", Money::zero() - amounts.discount));
        out.push(amount_row("Taxable amount", amounts.taxable_amount));
    }
    if !amounts.service_charge.is_zero() {
        out.push(amount_row(
            &format!("Service charge @{}", service_rate),
            amounts.service_charge,
        ));
    }

    let rate = EffectiveRate::weighted(&order.items());
    if !amounts.total_tax.is_zero() {
        out.push(format!("GST @{} ({})", rate, bill.jurisdiction));
    }
    tax_rows(&mut out, bill.jurisdiction, &amounts.tax_breakdown());

    out.push(rule());
    out.push(amount_row("TOTAL", amounts.final_amount));
    out.push(center(if bill.is_paid { "PAID" } else { "Thank you, visit again" }));

    out.join("\n")
}

/// Renders a single-rate tax calculation.
pub fn render_tax(
    amount: Money,
    rate: TaxRate,
    jurisdiction: JurisdictionMode,
    tax: &TaxBreakdown,
) -> String {
    let mut out = vec![
        amount_row("Amount", amount),
        format!("GST @{} ({})", rate, jurisdiction),
    ];
    tax_rows(&mut out, jurisdiction, tax);
    out.push(amount_row("Total tax", tax.total_tax));
    out.push(amount_row("Amount with tax", amount + tax.total_tax));
    out.join("\n")
}

/// Renders the cashier's bill list followed by its totals.
pub fn render_summary(bills: &[&Bill], stats: &BillStats) -> String {
    let mut out = vec![format!("{:<18}{:<6}{:>20}", "Bill", "Status", "Amount")];
    out.push(rule());

    if bills.is_empty() {
        out.push("No bills match".to_string());
    }
    for bill in bills {
        out.push(format!(
            "{:<18}{:<6}{:>20}",
            bill.bill_number.to_string(),
            if bill.is_paid { "PAID" } else { "DUE" },
            bill.final_amount().to_string(),
        ));
        if let Some(name) = &bill.customer_name {
            out.push(format!("  {}", truncate(name, WIDTH - 2)));
        }
    }

    out.push(rule());
    out.push(format!(
        "Bills {} ({} paid, {} unpaid)",
        stats.total, stats.paid, stats.unpaid
    ));
    out.push(amount_row("Revenue", stats.total_revenue));
    out.push(amount_row("Collected", stats.paid_revenue));
    out.push(amount_row("Pending", stats.pending_revenue));

    out.join("\n")
}

/// Describes a valid GSTIN.
pub fn render_gstin(gstin: &Gstin) -> String {
    let state = gstin.state_code();
    format!(
        "{} is valid\nState  {} {}\nPAN    {}",
        gstin,
        state,
        state.name(),
        gstin.pan()
    )
}
