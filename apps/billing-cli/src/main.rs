//! # rasoi-bill
//!
//! Cashier-side command line for Rasoi POS: turns an order ticket into a GST
//! bill using the outlet's configuration.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ORDER.json ──► OrderTicket ──► Order (validated lines)                 │
//! │                                      │                                  │
//! │  billing.toml + RASOI_* ──► OutletConfig                                │
//! │                                      │                                  │
//! │  --interstate / --customer-* ──► PlaceOfSupply ──► JurisdictionMode     │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                         rasoi_core::compute_bill                        │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                      Bill ──► text bill or JSON                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `summary` bills several tickets at once and prints the cashier's bill
//! list with paid/pending totals.
//!
//! JSON output (`--json`) carries every amount as integer paise
//! (`"finalAmount": 47400` is ₹474.00). Tickets and flags take rupee text.
//!
//! Logs go to stderr; set `RASOI_LOG=debug` (or `RUST_LOG`) to see them.

mod config;
mod error;
mod order;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rasoi_core::{
    compute_bill, compute_single_rate_tax, Bill, BillStats, Discount, Gstin, JurisdictionMode,
    Money, PaymentFilter, StateCode, TaxRate,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::OutletConfig;
use crate::order::{Order, OrderTicket, PlaceOfSupply};

#[derive(Parser)]
#[command(name = "rasoi-bill")]
#[command(about = "GST bill calculator for Rasoi POS", version)]
struct Cli {
    /// Outlet config file (default: platform config dir / billing.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and print the bill for an order ticket
    Bill(BillArgs),

    /// Bill several order tickets and list them with totals
    Summary(SummaryArgs),

    /// Split tax on a single amount
    Tax(TaxArgs),

    /// Validate a GSTIN
    Gstin {
        /// 15-character GSTIN
        gstin: String,
    },

    /// Print the effective outlet configuration
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(clap::Args)]
struct BillArgs {
    /// Order ticket (JSON)
    order: PathBuf,

    /// Customer's two-digit GST state code
    #[arg(long, conflicts_with_all = ["customer_gstin", "interstate"])]
    customer_state: Option<StateCode>,

    /// Customer GSTIN (B2B); its state decides the tax channel
    #[arg(long, conflicts_with = "interstate")]
    customer_gstin: Option<Gstin>,

    /// Force IGST
    #[arg(long)]
    interstate: bool,

    /// Flat discount in rupees (overrides the ticket)
    #[arg(long)]
    discount: Option<Money>,

    /// Service charge percentage (overrides the config)
    #[arg(long)]
    service_charge: Option<TaxRate>,

    /// Mark the bill as paid
    #[arg(long)]
    paid: bool,

    /// Print the computed amounts as JSON, in paise
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SummaryArgs {
    /// Order tickets (JSON)
    #[arg(required = true)]
    orders: Vec<PathBuf>,

    /// Only bills whose number or customer name contains this text
    #[arg(long, default_value = "")]
    search: String,

    /// Payment status to list: all, paid or unpaid
    #[arg(long, default_value = "all")]
    status: PaymentFilter,

    /// Print the statistics as JSON, amounts in paise
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct TaxArgs {
    /// Taxable amount in rupees
    #[arg(long)]
    amount: Money,

    /// GST rate percentage
    #[arg(long)]
    rate: TaxRate,

    /// Charge IGST instead of CGST + SGST
    #[arg(long)]
    interstate: bool,

    /// Print the breakdown as JSON, in paise
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bill(args) => run_bill(cli.config, args),
        Commands::Summary(args) => run_summary(cli.config, args),
        Commands::Tax(args) => run_tax(args),
        Commands::Gstin { gstin } => {
            let gstin = Gstin::parse(&gstin).context("invalid GSTIN")?;
            println!("{}", render::render_gstin(&gstin));
            Ok(())
        }
        Commands::Config { save } => run_config(cli.config, save),
    }
}

/// Initializes the tracing subscriber, writing to stderr.
///
/// ## Log Levels
/// - `RASOI_LOG=debug` - Show debug messages
/// - `RUST_LOG` - Used when `RASOI_LOG` is unset
/// - Default: warnings only
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RASOI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Explicit `--config` paths must load; the default location may fall back.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<OutletConfig> {
    match path {
        Some(path) => OutletConfig::load(Some(path.clone()))
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(OutletConfig::load_or_default(None)),
    }
}

fn run_bill(config_path: Option<PathBuf>, args: BillArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut order = OrderTicket::from_path(&args.order)
        .and_then(|ticket| ticket.into_order())
        .with_context(|| format!("invalid order ticket {}", args.order.display()))?;

    if let Some(discount) = args.discount {
        order.discount = Discount::flat(discount).context("invalid --discount")?;
    }
    if let Some(gstin) = &args.customer_gstin {
        order.customer_gstin = Some(gstin.clone());
    }

    if args.paid {
        order.paid = true;
    }

    let place = PlaceOfSupply::from_flags(
        args.interstate,
        args.customer_gstin.as_ref(),
        args.customer_state,
    )
    .unwrap_or_else(|| order.place_of_supply());
    let service_rate = args.service_charge.unwrap_or_else(|| config.service_charge());

    let bill = issue_bill(&config, &order, place, service_rate)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bill.amounts)?);
    } else {
        println!(
            "{}",
            render::render_bill(&config.outlet, &order, &bill, service_rate)
        );
    }

    Ok(())
}

/// Computes, issues and (if the order says so) settles one bill.
fn issue_bill(
    config: &OutletConfig,
    order: &Order,
    place: PlaceOfSupply,
    service_rate: TaxRate,
) -> anyhow::Result<Bill> {
    let jurisdiction = place.jurisdiction(config.home_state())?;

    debug!(order_id = %order.order_id, ?place, %jurisdiction, %service_rate, "Resolved billing inputs");

    let amounts = compute_bill(&order.items(), jurisdiction, service_rate, order.discount);
    let mut bill = Bill::issue(&order.order_id, jurisdiction, amounts)?
        .with_customer(order.customer_name.as_deref(), order.customer_phone.as_deref());

    if order.paid {
        bill.mark_paid(Utc::now())?;
    }

    info!(
        bill_number = %bill.bill_number,
        order_id = %bill.order_id,
        final_amount = %bill.amounts.final_amount,
        paid = bill.is_paid,
        "Bill issued"
    );

    Ok(bill)
}

/// Issues one bill per ticket, using each ticket's own place of supply.
fn collect_bills(config: &OutletConfig, tickets: &[PathBuf]) -> anyhow::Result<Vec<Bill>> {
    let service_rate = config.service_charge();

    tickets
        .iter()
        .map(|path| {
            let order = OrderTicket::from_path(path)
                .and_then(|ticket| ticket.into_order())
                .with_context(|| format!("invalid order ticket {}", path.display()))?;
            issue_bill(config, &order, order.place_of_supply(), service_rate)
                .with_context(|| format!("cannot bill {}", path.display()))
        })
        .collect()
}

fn run_summary(config_path: Option<PathBuf>, args: SummaryArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let bills = collect_bills(&config, &args.orders)?;

    let shown: Vec<&Bill> = bills
        .iter()
        .filter(|bill| args.status.admits(bill) && bill.matches(&args.search))
        .collect();
    let stats = BillStats::from_bills(shown.iter().copied());

    debug!(issued = bills.len(), shown = shown.len(), "Summarized bills");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", render::render_summary(&shown, &stats));
    }

    Ok(())
}

fn run_tax(args: TaxArgs) -> anyhow::Result<()> {
    let jurisdiction = if args.interstate {
        JurisdictionMode::DifferentState
    } else {
        JurisdictionMode::SameState
    };

    let tax = compute_single_rate_tax(args.amount, args.rate, jurisdiction);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tax)?);
    } else {
        println!(
            "{}",
            render::render_tax(args.amount, args.rate, jurisdiction, &tax)
        );
    }

    Ok(())
}

fn run_config(config_path: Option<PathBuf>, save: bool) -> anyhow::Result<()> {
    let config = load_config(config_path.clone())?;

    if save {
        let path = config.save(config_path).context("failed to save config")?;
        eprintln!("Saved {}", path.display());
    }

    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
