//! Core error types for the valuation and analytics engine.
//!
//! This module defines storage-agnostic error types. Collaborator-specific
//! failures (database drivers, HTTP providers, etc.) are converted into
//! these types at the repository/source boundary.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use thiserror::Error;

use crate::fx::FxError;
use crate::market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Missing data within a fallback window is deliberately *not* represented
/// here: it degrades a snapshot to incomplete with attached warnings instead
/// of failing the call (see `ValuationSnapshot`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Benchmark series unavailable: {0}")]
    BenchmarkUnavailable(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that occur during position and valuation calculations.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("Insufficient quantity for asset {asset_id} in portfolio {portfolio_id} on {date}")]
    InsufficientQuantity {
        asset_id: String,
        portfolio_id: String,
        date: NaiveDate,
    },

    #[error("Position not found for asset {asset_id} in portfolio {portfolio_id}")]
    PositionNotFound {
        asset_id: String,
        portfolio_id: String,
    },
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Unsupported history interval: {0}")]
    UnsupportedInterval(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
