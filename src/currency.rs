//! Currency metadata and the registry the rate store falls back on

pub mod builtin;
pub mod registry;

pub use registry::{CurrencyRegistry, CurrencyRegistryBuilder};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered currency
///
/// Immutable once registered. `latest_rate` is the value of one unit in the
/// reference currency used when no persisted rate exists, and unconditionally
/// after `stop_date`. Before `start_date` the currency is worth `start_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code (USD, EUR, ...)
    pub code: String,
    /// Display name
    pub name: String,
    /// Number of minor-unit digits (2 for cents, 0 for yen)
    pub exponent: u32,
    pub start_date: Option<NaiveDate>,
    pub start_rate: f64,
    pub stop_date: Option<NaiveDate>,
    pub latest_rate: f64,
}

impl Currency {
    /// Create a currency with exponent 2 and unit rates
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            exponent: 2,
            start_date: None,
            start_rate: 1.0,
            stop_date: None,
            latest_rate: 1.0,
        }
    }

    pub fn with_exponent(mut self, exponent: u32) -> Self {
        self.exponent = exponent;
        self
    }

    pub fn with_latest_rate(mut self, rate: f64) -> Self {
        self.latest_rate = rate;
        self
    }

    /// Set the validity start date and the rate that applies before it
    pub fn with_start(mut self, date: NaiveDate, rate: f64) -> Self {
        self.start_date = Some(date);
        self.start_rate = rate;
        self
    }

    /// Set the validity end date; `latest_rate` applies after it
    pub fn with_stop(mut self, date: NaiveDate) -> Self {
        self.stop_date = Some(date);
        self
    }

    /// Fallback value in the reference currency
    pub fn default_rate(&self) -> f64 {
        self.latest_rate
    }

    /// Pinned value outside the validity range, if `date` falls there
    pub fn out_of_range_rate(&self, date: NaiveDate) -> Option<f64> {
        match (self.start_date, self.stop_date) {
            (Some(start), _) if date < start => Some(self.start_rate),
            (_, Some(stop)) if date > stop => Some(self.latest_rate),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
