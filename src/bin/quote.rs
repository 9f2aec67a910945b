//! One-shot fee quote
//!
//! Usage: cargo run --bin quote -- <BUY|SELL> <quantity> <price> [buy_price]
//!
//! Prints the fee breakdown as JSON using the configured fee schedule.

use anyhow::{bail, Context, Result};
use tracing::debug;

use stocktax::config::AppConfig;
use stocktax::types::TradeType;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !(3..=4).contains(&args.len()) {
        bail!("usage: quote <BUY|SELL> <quantity> <price> [buy_price]");
    }

    let config = AppConfig::load()?;
    let schedule = config.fee_schedule()?;
    debug!(config = %config, "Loaded configuration");

    let trade_type: TradeType = args[0].parse()?;
    let fees = schedule
        .calculate_raw(
            trade_type,
            &args[1],
            &args[2],
            args.get(3).map(String::as_str),
        )
        .context("Failed to calculate fees")?;

    println!("{}", serde_json::to_string_pretty(&fees.rounded())?);
    Ok(())
}
