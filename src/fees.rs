//! NEPSE Fee & Tax Calculator
//!
//! Computes the cost breakdown of a single stock trade:
//! - Broker commission: percentage of the gross amount
//! - SEBON fee: regulator's percentage of the gross amount
//! - DP charge: flat depository fee per trade
//! - Capital gains tax: percentage of the realized profit, sells only
//!
//! All arithmetic is exact `Decimal`. Nothing is rounded here; rounding to the
//! ledger's currency scale is the caller's choice (see `FeeBreakdown::rounded`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::{round_currency, TradeInput, TradeType};

/// Broker commission rate (0.36%)
pub const BROKER_RATE: Decimal = dec!(0.0036);
/// SEBON regulatory fee rate (0.015%)
pub const SEBON_RATE: Decimal = dec!(0.00015);
/// Flat DP charge per trade (NPR)
pub const DP_CHARGE: Decimal = dec!(25);
/// Capital gains tax rate on positive profit (7.5%)
pub const CGT_RATE: Decimal = dec!(0.075);

/// Rates applied by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub broker_rate: Decimal,
    pub regulatory_rate: Decimal,
    pub depository_charge: Decimal,
    pub cgt_rate: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            broker_rate: BROKER_RATE,
            regulatory_rate: SEBON_RATE,
            depository_charge: DP_CHARGE,
            cgt_rate: CGT_RATE,
        }
    }
}

/// Cost breakdown of one trade.
///
/// Serializes with the short keys the ledger and frontend use:
/// `gross, broker, sebon, dp, cgt, net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub gross: Decimal,
    #[serde(rename = "broker")]
    pub broker_commission: Decimal,
    #[serde(rename = "sebon")]
    pub regulatory_fee: Decimal,
    #[serde(rename = "dp")]
    pub depository_charge: Decimal,
    #[serde(rename = "cgt")]
    pub capital_gains_tax: Decimal,
    pub net: Decimal,
}

impl FeeBreakdown {
    /// Commission + SEBON fee + DP charge (tax excluded)
    pub fn total_fees(&self) -> Decimal {
        self.broker_commission + self.regulatory_fee + self.depository_charge
    }

    /// Everything deducted from the gross amount
    pub fn total_deductions(&self) -> Decimal {
        self.total_fees() + self.capital_gains_tax
    }

    /// Each component rounded independently to the currency scale
    pub fn rounded(&self) -> Self {
        Self {
            gross: round_currency(self.gross),
            broker_commission: round_currency(self.broker_commission),
            regulatory_fee: round_currency(self.regulatory_fee),
            depository_charge: round_currency(self.depository_charge),
            capital_gains_tax: round_currency(self.capital_gains_tax),
            net: round_currency(self.net),
        }
    }
}

/// Unwrap a checked `Decimal` operation, naming the amount that overflowed
fn checked(value: Option<Decimal>, amount: &'static str) -> Result<Decimal, CalcError> {
    value.ok_or(CalcError::Overflow { amount })
}

impl FeeSchedule {
    /// Profit subject to capital gains tax.
    ///
    /// `None` unless this is a sell with a non-zero buy price. The value may be
    /// zero or negative; only positive profit is taxed.
    pub fn taxable_profit(&self, input: &TradeInput) -> Result<Option<Decimal>, CalcError> {
        match (input.trade_type, input.buy_price) {
            (TradeType::Sell, Some(buy_price)) if !buy_price.is_zero() => {
                let spread = checked(input.price.checked_sub(buy_price), "profit")?;
                checked(spread.checked_mul(input.quantity), "profit").map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Fee breakdown for one trade.
    ///
    /// Inputs are not range checked, so amounts beyond `Decimal::MAX` surface
    /// as `CalcError::Overflow` instead of panicking.
    pub fn calculate(&self, input: &TradeInput) -> Result<FeeBreakdown, CalcError> {
        let gross = checked(input.quantity.checked_mul(input.price), "gross")?;
        let broker_commission = checked(gross.checked_mul(self.broker_rate), "broker")?;
        let regulatory_fee = checked(gross.checked_mul(self.regulatory_rate), "sebon")?;
        let depository_charge = self.depository_charge;

        let capital_gains_tax = match self.taxable_profit(input)? {
            Some(profit) if profit > Decimal::ZERO => {
                checked(profit.checked_mul(self.cgt_rate), "cgt")?
            }
            _ => Decimal::ZERO,
        };

        let deductions = [regulatory_fee, depository_charge, capital_gains_tax]
            .into_iter()
            .try_fold(broker_commission, |sum, amount| {
                checked(sum.checked_add(amount), "net")
            })?;
        let net = checked(gross.checked_sub(deductions), "net")?;

        Ok(FeeBreakdown {
            gross,
            broker_commission,
            regulatory_fee,
            depository_charge,
            capital_gains_tax,
            net,
        })
    }

    /// Calculate from raw form values, failing if any number does not parse
    pub fn calculate_raw(
        &self,
        trade_type: TradeType,
        quantity: &str,
        price: &str,
        buy_price: Option<&str>,
    ) -> Result<FeeBreakdown, CalcError> {
        let input = TradeInput::parse(trade_type, quantity, price, buy_price)?;
        self.calculate(&input)
    }
}

/// Calculate with the standard NEPSE schedule
pub fn calculate(
    trade_type: TradeType,
    quantity: Decimal,
    price: Decimal,
    buy_price: Option<Decimal>,
) -> Result<FeeBreakdown, CalcError> {
    FeeSchedule::default().calculate(&TradeInput::new(trade_type, quantity, price, buy_price))
}
