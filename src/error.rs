//! Error types for currency_rates

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for currency_rates
#[derive(Error, Debug)]
pub enum RatesError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Currency already registered: {0}")]
    DuplicateCurrency(String),

    #[error("Invalid rate for {currency} on {date}: {rate}")]
    InvalidRate {
        currency: String,
        date: NaiveDate,
        rate: f64,
    },

    /// Outside the years the `YYYYMMDD` column can hold.
    #[error("Date out of storable range (years 0 to 9999): {0}")]
    DateOutOfRange(NaiveDate),

    /// A resolved reference-currency value of zero was used as a divisor.
    #[error("Division by zero: {currency} resolves to a zero rate on {date}")]
    DivisionByZero { currency: String, date: NaiveDate },

    #[error("Corrupt rate storage: {0}")]
    StorageCorrupt(String),

    #[error("Rate storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for currency_rates operations
pub type Result<T> = std::result::Result<T, RatesError>;
