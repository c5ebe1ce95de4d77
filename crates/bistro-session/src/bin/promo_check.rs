//! # Promotion Check
//!
//! Summarizes the menu and lists the promotions a store would offer at a
//! given moment, read from a directory holding `catalog.json` and
//! `promotions.json`.
//!
//! ## Usage
//! ```bash
//! # Promotions selectable right now
//! cargo run -p bistro-session --bin promo-check -- --data ./data
//!
//! # At a specific instant, with the discount on a 250,000 order
//! cargo run -p bistro-session --bin promo-check -- \
//!     --at 2026-06-15T18:30:00+07:00 --subtotal 250000
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use bistro_core::{compute_discount, CoreError, Discount, Money, Promotion};
use bistro_session::telemetry::init_tracing;
use bistro_session::{
    Clock, FixedClock, InMemorySubmitter, JsonFileProvider, PosSession, SessionConfig, SystemClock,
};
use chrono::DateTime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut data_dir = PathBuf::from("./data");
    let mut config_path: Option<PathBuf> = None;
    let mut at: Option<String> = None;
    let mut subtotal: Option<Money> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--at" | "-a" => {
                if i + 1 < args.len() {
                    at = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--subtotal" | "-s" => {
                if i + 1 < args.len() {
                    subtotal = args[i + 1].parse::<i64>().ok().map(Money::from_minor);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bistro POS Promotion Check");
                println!();
                println!("Usage: promo-check [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --data <DIR>       Directory with catalog.json and promotions.json (default: ./data)");
                println!("  -c, --config <PATH>    Session config file (default: platform config dir)");
                println!("  -a, --at <RFC3339>     Check at this instant instead of now");
                println!("  -s, --subtotal <N>     Show each promotion's discount on this subtotal");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();
    let config = SessionConfig::load_or_default(config_path);

    let clock: Arc<dyn Clock> = match at {
        Some(at) => Arc::new(FixedClock::new(DateTime::parse_from_rfc3339(&at)?)),
        None => Arc::new(SystemClock::from_offset(config.utc_offset())),
    };
    let now = clock.now();

    let provider = JsonFileProvider::new(&data_dir);
    let session = PosSession::new(&config, provider.clone(), provider, InMemorySubmitter::new(), clock);
    session.refresh_all().await?;

    println!("{} - promotions at {}", config.store.name, now.format("%Y-%m-%d %H:%M %:z"));
    println!("================================");

    if let Some(catalog) = session.catalog().await {
        let toppings = catalog.toppings();
        println!(
            "Menu: {} dishes, {} toppings in {} categories",
            catalog.dishes().len(),
            toppings.len(),
            toppings.categories().len()
        );
        println!();
    }

    let eligible = session.eligible_promotions().await;
    if eligible.is_empty() {
        println!("No promotions available.");
        return Ok(());
    }

    for promotion in &eligible {
        println!("• {} [{}]: {}", promotion.name, promotion.id, describe(&config, promotion));

        if let Some(subtotal) = subtotal {
            match compute_discount(subtotal, Some(promotion)) {
                Ok(_) if matches!(promotion.discount, Discount::UniformPrice(_)) => {
                    println!("    applies per line, see the cart")
                }
                Ok(outcome) => println!(
                    "    {} off, pay {}",
                    config.format_amount(outcome.discount_amount),
                    config.format_amount(outcome.final_total)
                ),
                Err(CoreError::MinimumOrderNotMet { required, .. }) => {
                    println!("    needs a {} order", config.format_amount(required))
                }
                Err(e) => println!("    {}", e),
            }
        }
    }

    Ok(())
}

fn describe(config: &SessionConfig, promotion: &Promotion) -> String {
    let mut text = match promotion.discount {
        Discount::Percentage(rate) => format!("{}% off", rate.percentage()),
        Discount::FixedAmount(amount) => format!("{} off", config.format_amount(amount)),
        Discount::UniformPrice(price) => format!("everything at {}", config.format_amount(price)),
    };
    if let Some(min) = promotion.conditions.min_order_amount {
        text.push_str(&format!(", orders from {}", config.format_amount(min)));
    }
    for slot in &promotion.conditions.time_slots {
        text.push_str(&format!(", {}-{}", slot.start().format("%H:%M"), slot.end().format("%H:%M")));
    }
    text
}
