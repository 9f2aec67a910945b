//! Ledger statistics for the dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeRecord;
use crate::types::TradeType;

/// Number of symbols reported in `LedgerStats::symbols`
pub const TOP_SYMBOLS: usize = 6;

/// Activity for one stock symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub symbol: String,
    pub trades: usize,
    pub shares: u64,
}

/// Totals across the whole ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_trades: usize,
    pub total_buys: usize,
    pub total_sells: usize,
    /// Net amount of all buys
    pub total_invested: Decimal,
    /// Net amount of all sells
    pub total_realized: Decimal,
    /// Realized minus invested (negative is a loss)
    pub total_profit: Decimal,
    pub total_taxes_paid: Decimal,
    /// Commission + SEBON + DP over all trades
    pub total_fees_paid: Decimal,
    /// First-seen order of `records`, capped at `TOP_SYMBOLS`
    pub symbols: Vec<SymbolStats>,
}

impl LedgerStats {
    pub fn from_records(records: &[TradeRecord]) -> Self {
        let mut stats = LedgerStats {
            total_trades: records.len(),
            ..Default::default()
        };
        let mut symbols: Vec<SymbolStats> = Vec::new();

        for record in records {
            match record.trade_type {
                TradeType::Buy => {
                    stats.total_buys += 1;
                    stats.total_invested += record.net_amount;
                }
                TradeType::Sell => {
                    stats.total_sells += 1;
                    stats.total_realized += record.net_amount;
                }
            }
            stats.total_taxes_paid += record.capital_gain_tax;
            stats.total_fees_paid += record.total_fees();

            match symbols.iter_mut().find(|s| s.symbol == record.symbol) {
                Some(entry) => {
                    entry.trades += 1;
                    entry.shares += u64::from(record.quantity);
                }
                None => symbols.push(SymbolStats {
                    symbol: record.symbol.clone(),
                    trades: 1,
                    shares: u64::from(record.quantity),
                }),
            }
        }

        stats.total_profit = stats.total_realized - stats.total_invested;
        symbols.truncate(TOP_SYMBOLS);
        stats.symbols = symbols;
        stats
    }
}
