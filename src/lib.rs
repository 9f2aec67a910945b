//! StockTax Library
//!
//! NEPSE trade fee & capital gains tax calculator with a CSV trade ledger

pub mod config;
pub mod error;
pub mod fees;
pub mod persistence;
pub mod types;

#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use error::{CalcError, LedgerError};
pub use fees::{calculate, FeeBreakdown, FeeSchedule};
pub use types::{TradeInput, TradeType};
