//! CSV Trade Ledger
//!
//! Stores every recorded trade, together with its fee breakdown, in
//! `<data_dir>/trades/trades.csv`. Amounts are kept at the currency scale.
//! Creates append a row; updates and deletes rewrite the file.

mod stats;

pub use stats::{LedgerStats, SymbolStats, TOP_SYMBOLS};

use anyhow::Context;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock as AsyncRwLock;
use tokio::task;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::fees::FeeSchedule;
use crate::types::{TradeInput, TradeType, CURRENCY_DP};

/// Largest price the ledger columns hold (8 integer digits)
const MAX_PRICE: Decimal = rust_decimal_macros::dec!(99999999.99);
/// Largest quantity the ledger column holds (signed 32-bit)
const MAX_QUANTITY: u32 = i32::MAX as u32;

/// One ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: u64,
    pub symbol: String,
    pub trade_type: TradeType,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub buy_price: Option<Decimal>,
    pub broker_commission: Decimal,
    pub sebon_fee: Decimal,
    pub dp_charge: Decimal,
    pub capital_gain_tax: Decimal,
    pub gross_amount: Decimal,
    pub net_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Commission + SEBON fee + DP charge
    pub fn total_fees(&self) -> Decimal {
        self.broker_commission + self.sebon_fee + self.dp_charge
    }
}

/// Trade attributes supplied by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrade {
    pub symbol: String,
    pub trade_type: TradeType,
    pub quantity: u32,
    pub price: Decimal,
    pub buy_price: Option<Decimal>,
}

impl NewTrade {
    /// Build from raw form values. An empty buy price counts as absent.
    pub fn parse(
        symbol: &str,
        trade_type: &str,
        quantity: &str,
        price: &str,
        buy_price: Option<&str>,
    ) -> Result<Self, LedgerError> {
        let trade_type: TradeType = trade_type.parse()?;
        let input = TradeInput::parse(trade_type, quantity, price, buy_price)?;

        if !input.quantity.fract().is_zero() {
            return Err(LedgerError::invalid("quantity", "must be a whole number"));
        }
        let quantity = input
            .quantity
            .to_u32()
            .filter(|q| *q > 0)
            .ok_or_else(|| LedgerError::invalid("quantity", "must be a positive integer"))?;

        Ok(Self {
            symbol: symbol.to_string(),
            trade_type,
            quantity,
            price: input.price,
            buy_price: input.buy_price,
        })
    }

    /// Trim and uppercase the symbol, then check every column constraint
    pub fn validate(mut self, max_symbol_len: usize) -> Result<Self, LedgerError> {
        self.symbol = self.symbol.trim().to_uppercase();
        if self.symbol.is_empty() {
            return Err(LedgerError::invalid("symbol", "must not be empty"));
        }
        if self.symbol.chars().count() > max_symbol_len {
            return Err(LedgerError::invalid(
                "symbol",
                format!("must be at most {} characters", max_symbol_len),
            ));
        }
        if self.quantity == 0 {
            return Err(LedgerError::invalid("quantity", "must be a positive integer"));
        }
        if self.quantity > MAX_QUANTITY {
            return Err(LedgerError::invalid(
                "quantity",
                format!("must not exceed {}", MAX_QUANTITY),
            ));
        }
        check_price("price", self.price)?;
        if let Some(buy_price) = self.buy_price {
            check_price("buy_price", buy_price)?;
        }
        Ok(self)
    }

    fn input(&self) -> TradeInput {
        TradeInput::new(
            self.trade_type,
            Decimal::from(self.quantity),
            self.price,
            self.buy_price,
        )
    }
}

fn check_price(field: &'static str, value: Decimal) -> Result<(), LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::invalid(field, "must not be negative"));
    }
    if value.normalize().scale() > CURRENCY_DP {
        return Err(LedgerError::invalid(
            field,
            format!("must have at most {} decimal places", CURRENCY_DP),
        ));
    }
    if value > MAX_PRICE {
        return Err(LedgerError::invalid(field, format!("must not exceed {}", MAX_PRICE)));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Insertion order
    records: Vec<TradeRecord>,
    next_id: u64,
}

/// CSV-backed trade ledger
#[derive(Debug)]
pub struct TradeLedger {
    path: PathBuf,
    schedule: FeeSchedule,
    max_symbol_len: usize,
    state: AsyncRwLock<LedgerState>,
}

impl TradeLedger {
    /// Open (or create) the ledger under `data_dir` and load existing rows
    pub fn open(
        data_dir: &str,
        schedule: FeeSchedule,
        max_symbol_len: usize,
    ) -> Result<Self, LedgerError> {
        let dir = PathBuf::from(data_dir).join("trades");
        fs::create_dir_all(&dir).context("Failed to create data directory")?;

        let path = dir.join("trades.csv");
        let records = Self::load(&path)?;
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        info!(
            path = %path.display(),
            trades = records.len(),
            next_id,
            "Trade ledger opened"
        );

        Ok(Self {
            path,
            schedule,
            max_symbol_len,
            state: AsyncRwLock::new(LedgerState { records, next_id }),
        })
    }

    fn load(path: &Path) -> anyhow::Result<Vec<TradeRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(path).context("Failed to open trade ledger")?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: TradeRecord = result.context("Failed to deserialize trade record")?;
            records.push(record);
        }
        Ok(records)
    }

    fn create_writer(path: &Path) -> anyhow::Result<csv::Writer<fs::File>> {
        let file_has_data =
            path.exists() && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context("Failed to open CSV file")?;

        let writer = WriterBuilder::new()
            .has_headers(!file_has_data)
            .from_writer(file);

        Ok(writer)
    }

    fn write_row(path: &Path, record: &TradeRecord) -> anyhow::Result<()> {
        let mut writer = Self::create_writer(path)?;
        writer
            .serialize(record)
            .context("Failed to write trade record")?;
        writer.flush().context("Failed to flush trade writer")?;
        Ok(())
    }

    /// Replace the file contents with `records` via a temp file + rename
    fn write_all(path: &Path, records: &[TradeRecord]) -> anyhow::Result<()> {
        let tmp = path.with_extension("csv.tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)
                .context("Failed to create temporary ledger file")?;
            let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
            for record in records {
                writer
                    .serialize(record)
                    .context("Failed to write trade record")?;
            }
            writer.flush().context("Failed to flush trade writer")?;
        }
        fs::rename(&tmp, path).context("Failed to replace trade ledger")?;
        Ok(())
    }

    // File writes run on the blocking pool. Callers hold the state write
    // guard across the await so rows land in id order.
    async fn append(&self, record: TradeRecord) -> anyhow::Result<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::write_row(&path, &record))
            .await
            .context("Trade writer task failed")?
    }

    async fn rewrite(&self, records: Vec<TradeRecord>) -> anyhow::Result<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::write_all(&path, &records))
            .await
            .context("Trade writer task failed")?
    }

    fn build_record(
        &self,
        id: u64,
        created_at: DateTime<Utc>,
        trade: &NewTrade,
    ) -> Result<TradeRecord, LedgerError> {
        let fees = self.schedule.calculate(&trade.input())?.rounded();
        Ok(TradeRecord {
            id,
            symbol: trade.symbol.clone(),
            trade_type: trade.trade_type,
            quantity: trade.quantity,
            price: trade.price,
            buy_price: trade.buy_price,
            broker_commission: fees.broker_commission,
            sebon_fee: fees.regulatory_fee,
            dp_charge: fees.depository_charge,
            capital_gain_tax: fees.capital_gains_tax,
            gross_amount: fees.gross,
            net_amount: fees.net,
            created_at,
        })
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Compute fees for a trade and record it
    pub async fn create(&self, trade: NewTrade) -> Result<TradeRecord, LedgerError> {
        let trade = trade.validate(self.max_symbol_len)?;
        let mut state = self.state.write().await;

        let record = self.build_record(state.next_id, Utc::now(), &trade)?;
        self.append(record.clone()).await?;
        state.next_id += 1;
        state.records.push(record.clone());

        info!(
            id = record.id,
            symbol = %record.symbol,
            trade_type = %record.trade_type,
            quantity = record.quantity,
            net = %record.net_amount,
            cgt = %record.capital_gain_tax,
            "Trade recorded"
        );
        Ok(record)
    }

    /// All trades, newest first
    pub async fn list(&self) -> Vec<TradeRecord> {
        let state = self.state.read().await;
        let mut records = state.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    pub async fn get(&self, id: u64) -> Result<TradeRecord, LedgerError> {
        let state = self.state.read().await;
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    /// Replace a trade's attributes and recompute its fees.
    /// The id and creation time are kept.
    pub async fn update(&self, id: u64, trade: NewTrade) -> Result<TradeRecord, LedgerError> {
        let trade = trade.validate(self.max_symbol_len)?;
        let mut state = self.state.write().await;

        let index = state
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let record = self.build_record(id, state.records[index].created_at, &trade)?;
        let mut records = state.records.clone();
        records[index] = record.clone();
        self.rewrite(records.clone()).await?;
        state.records = records;

        info!(id, symbol = %record.symbol, net = %record.net_amount, "Trade updated");
        Ok(record)
    }

    pub async fn delete(&self, id: u64) -> Result<TradeRecord, LedgerError> {
        let mut state = self.state.write().await;

        let index = state
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let mut records = state.records.clone();
        let removed = records.remove(index);
        self.rewrite(records.clone()).await?;
        state.records = records;

        info!(id, symbol = %removed.symbol, "Trade deleted");
        Ok(removed)
    }

    pub async fn stats(&self) -> LedgerStats {
        let records = self.list().await;
        let stats = LedgerStats::from_records(&records);
        debug!(trades = stats.total_trades, "Ledger stats computed");
        stats
    }
}
