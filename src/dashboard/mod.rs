//! Dashboard Module
//!
//! HTTP API used by the frontend: fee preview, trade CRUD and ledger stats.
//! Only compiled when the `dashboard` feature is enabled.

mod api;
mod types;

pub use api::create_router;
pub use types::*;

use crate::fees::FeeSchedule;
use crate::persistence::TradeLedger;

/// Shared state behind every handler
#[derive(Debug)]
pub struct AppState {
    pub ledger: TradeLedger,
    /// Schedule used for previews; the ledger carries its own copy
    pub schedule: FeeSchedule,
}

impl AppState {
    pub fn new(ledger: TradeLedger) -> Self {
        let schedule = *ledger.schedule();
        Self { ledger, schedule }
    }
}
