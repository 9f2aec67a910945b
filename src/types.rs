//! Core types used throughout StockTax
//!
//! Trade direction, calculator input and decimal parsing helpers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, UnknownTradeType};

/// Scale of every monetary column in the ledger
pub const CURRENCY_DP: u32 = 2;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl FromStr for TradeType {
    type Err = UnknownTradeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            _ => Err(UnknownTradeType(s.to_string())),
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculator input, built fresh for every calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeInput {
    pub trade_type: TradeType,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Only meaningful for sells
    pub buy_price: Option<Decimal>,
}

impl TradeInput {
    pub fn new(
        trade_type: TradeType,
        quantity: Decimal,
        price: Decimal,
        buy_price: Option<Decimal>,
    ) -> Self {
        Self {
            trade_type,
            quantity,
            price,
            buy_price,
        }
    }

    /// Build an input from raw form values.
    ///
    /// An empty buy price counts as absent. No range checks happen here.
    pub fn parse(
        trade_type: TradeType,
        quantity: &str,
        price: &str,
        buy_price: Option<&str>,
    ) -> Result<Self, CalcError> {
        let quantity = parse_decimal("quantity", quantity)?;
        let price = parse_decimal("price", price)?;
        let buy_price = match buy_price.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_decimal("buy_price", raw)?),
            _ => None,
        };

        Ok(Self::new(trade_type, quantity, price, buy_price))
    }
}

/// Parse a decimal-like string (plain or scientific notation)
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, CalcError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CalcError::InvalidNumberFormat {
            field,
            value: raw.to_string(),
        })
}

/// Round to the ledger's currency scale (banker's rounding)
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_type_parses_case_insensitively() {
        assert_eq!("BUY".parse::<TradeType>().unwrap(), TradeType::Buy);
        assert_eq!(" sell ".parse::<TradeType>().unwrap(), TradeType::Sell);
        assert_eq!(
            "HOLD".parse::<TradeType>().unwrap_err(),
            UnknownTradeType("HOLD".to_string())
        );
    }

    #[test]
    fn trade_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&TradeType::Sell).unwrap(), "\"SELL\"");
        let parsed: TradeType = serde_json::from_str("\"BUY\"").unwrap();
        assert_eq!(parsed, TradeType::Buy);
    }

    #[test]
    fn parse_decimal_accepts_plain_and_scientific() {
        assert_eq!(parse_decimal("price", "120.50").unwrap(), dec!(120.50));
        assert_eq!(parse_decimal("price", " 7 ").unwrap(), dec!(7));
        assert_eq!(parse_decimal("price", "1e3").unwrap(), dec!(1000));
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        let err = parse_decimal("quantity", "ten").unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidNumberFormat {
                field: "quantity",
                value: "ten".to_string()
            }
        );
        assert!(parse_decimal("quantity", "").is_err());
    }

    #[test]
    fn empty_buy_price_is_absent() {
        let input = TradeInput::parse(TradeType::Sell, "10", "120", Some("  ")).unwrap();
        assert_eq!(input.buy_price, None);

        let input = TradeInput::parse(TradeType::Sell, "10", "120", Some("100")).unwrap();
        assert_eq!(input.buy_price, Some(dec!(100)));
    }

    #[test]
    fn bad_buy_price_is_reported_by_field() {
        let err = TradeInput::parse(TradeType::Sell, "10", "120", Some("abc")).unwrap_err();
        assert!(matches!(
            err,
            CalcError::InvalidNumberFormat {
                field: "buy_price",
                ..
            }
        ));
    }

    #[test]
    fn round_currency_uses_bankers_rounding() {
        assert_eq!(round_currency(dec!(9.375)), dec!(9.38));
        assert_eq!(round_currency(dec!(62240.625)), dec!(62240.62));
        assert_eq!(round_currency(dec!(3.6000)), dec!(3.60));
    }
}
