//! Error handling for the application

use thiserror::Error;

/// Errors raised by the risk engine and the pricing calculators.
///
/// Every variant aborts the call with no state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Not owner")]
    NotOwner,

    #[error("{field} out of range: {value} (expected 0-100)")]
    OutOfRange { field: &'static str, value: u64 },

    #[error("Invalid amount: amount in must be positive")]
    InvalidAmount,

    #[error("Invalid reserves: both reserves must be positive")]
    InvalidReserves,

    #[error("Invalid price change: {0}% (must be greater than -100%)")]
    InvalidPriceChange(i64),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl RiskError {
    /// Stable reason code for callers that match on failures.
    pub fn code(&self) -> &'static str {
        match self {
            RiskError::NotOwner => "NOT_OWNER",
            RiskError::OutOfRange { .. } => "OUT_OF_RANGE",
            RiskError::InvalidAmount => "INVALID_AMOUNT",
            RiskError::InvalidReserves => "INVALID_RESERVES",
            RiskError::InvalidPriceChange(_) => "INVALID_PRICE_CHANGE",
            RiskError::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
            RiskError::DivisionByZero => "DIVISION_BY_ZERO",
            RiskError::InvalidConfig(_) => "INVALID_CONFIG",
            RiskError::CorruptSnapshot(_) => "CORRUPT_SNAPSHOT",
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Risk(#[from] RiskError),
}
