//! Error taxonomy
//!
//! `CalcError` is the only error the fee calculator raises. Everything the
//! ledger and API layers add on top is collected in `LedgerError`.

use thiserror::Error;

/// Fee calculation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid number format for {field}: {value:?}")]
    InvalidNumberFormat { field: &'static str, value: String },

    #[error("Amount out of range: {amount} exceeds the decimal range")]
    Overflow { amount: &'static str },
}

/// Trade type string that is neither BUY nor SELL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown trade type: {0:?} (expected BUY or SELL)")]
pub struct UnknownTradeType(pub String);

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    UnknownTradeType(#[from] UnknownTradeType),

    #[error("Invalid trade {field}: {reason}")]
    InvalidTrade { field: &'static str, reason: String },

    #[error("Trade not found: {0}")]
    NotFound(u64),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidTrade {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than storage
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LedgerError::Storage(_) | LedgerError::NotFound(_))
    }
}
