//! StockTax server
//!
//! Serves the trade ledger and fee calculator over HTTP.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stocktax::config::AppConfig;
use stocktax::dashboard::{create_router, AppState};
use stocktax::persistence::TradeLedger;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("STOCKTAX_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing();
    info!(config = %config, "Starting StockTax v{}", env!("CARGO_PKG_VERSION"));

    let schedule = config.fee_schedule()?;
    let ledger = TradeLedger::open(
        &config.persistence.data_dir,
        schedule,
        config.ledger.max_symbol_len,
    )
    .context("Failed to open trade ledger")?;

    let state = Arc::new(AppState::new(ledger));
    let app = create_router(state, config.server.cors_permissive);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("StockTax stopped");
    Ok(())
}
