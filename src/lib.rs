//! # currency_rates
//!
//! Persistent store of daily exchange rates.
//!
//! Every rate is kept as the value of one unit of a currency in a single
//! reference currency. Point-in-time and cross-currency queries fall back to
//! the nearest known rate and, failing that, to the currency's default rate
//! from the [`currency::CurrencyRegistry`]. An in-memory cache keeps repeated
//! lookups cheap.
//!
//! ## Example
//!
//! ```rust
//! use currency_rates::prelude::*;
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CurrencyRegistry::builtin());
//! let db = RatesDB::in_memory(registry).unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2008, 4, 20).unwrap();
//! db.set_value(date, "USD", 1.25).unwrap();
//! db.set_value(date, "EUR", 1.5).unwrap();
//!
//! // 1 EUR = 1.2 USD
//! let rate = db.get_rate(date, "EUR", "USD").unwrap();
//! assert!((rate - 1.2).abs() < 1e-12);
//! ```

pub mod config;
pub mod currency;
pub mod dates;
pub mod error;
pub mod ingest;
pub mod source;
pub mod store;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::RatesConfig;
    pub use crate::currency::{Currency, CurrencyRegistry};
    pub use crate::error::{RatesError, Result};
    pub use crate::source::RateSource;
    pub use crate::store::{RateRecord, RatesDB, StoreLocation};
}
