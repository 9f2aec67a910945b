//! Request/response types for the HTTP API

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::persistence::NewTrade;

/// Number sent either as a JSON number or as a string (form fields)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumberInput {
    pub fn as_text(&self) -> String {
        match self {
            NumberInput::Number(n) => n.to_string(),
            NumberInput::Text(s) => s.clone(),
        }
    }
}

/// POST /api/calculator/ body
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorRequest {
    pub trade_type: String,
    pub quantity: NumberInput,
    pub price: NumberInput,
    #[serde(default)]
    pub buy_price: Option<NumberInput>,
}

/// POST /api/trades/ and PUT /api/trades/:id/ body
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub trade_type: String,
    pub quantity: NumberInput,
    pub price: NumberInput,
    #[serde(default)]
    pub buy_price: Option<NumberInput>,
}

impl TradeRequest {
    pub fn into_new_trade(self) -> Result<NewTrade, LedgerError> {
        let buy_price = self.buy_price.as_ref().map(NumberInput::as_text);
        NewTrade::parse(
            &self.symbol,
            &self.trade_type,
            &self.quantity.as_text(),
            &self.price.as_text(),
            buy_price.as_deref(),
        )
    }
}

/// GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub trades: usize,
}

/// Envelope for every API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
