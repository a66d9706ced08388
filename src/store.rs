//! Persistent exchange-rate store
//!
//! Rates are stored per day as the value of one unit of a currency in the
//! registry's reference currency. Cross rates are computed as the ratio of two
//! such values. A lookup for a date without a stored rate uses the nearest
//! earlier rate, then the nearest later rate, then the currency's default rate
//! from the registry.
//!
//! # Example
//!
//! ```rust
//! use currency_rates::currency::CurrencyRegistry;
//! use currency_rates::store::RatesDB;
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CurrencyRegistry::builtin());
//! let db = RatesDB::in_memory(registry).unwrap();
//!
//! let jan = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
//! let feb = NaiveDate::from_ymd_opt(2008, 2, 1).unwrap();
//! db.set_value(jan, "EUR", 1.5).unwrap();
//!
//! // 1 EUR = 1.5 CAD, carried forward to later dates
//! assert_eq!(db.get_rate(feb, "EUR", "CAD").unwrap(), 1.5);
//! ```

pub mod cache;
mod storage;

pub use cache::{CacheStats, RateCache};

use crate::currency::{Currency, CurrencyRegistry};
use crate::dates::to_db_date;
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use storage::Storage;

/// Where the rates table lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Transient table with no backing file
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// Location string meaning [`StoreLocation::Memory`]
    pub const MEMORY: &'static str = ":memory:";

    pub fn parse(s: &str) -> Self {
        if s == Self::MEMORY {
            StoreLocation::Memory
        } else {
            StoreLocation::File(PathBuf::from(s))
        }
    }
}

impl From<&Path> for StoreLocation {
    fn from(path: &Path) -> Self {
        StoreLocation::File(path.to_path_buf())
    }
}

impl From<PathBuf> for StoreLocation {
    fn from(path: PathBuf) -> Self {
        StoreLocation::File(path)
    }
}

impl From<&str> for StoreLocation {
    fn from(s: &str) -> Self {
        StoreLocation::parse(s)
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::Memory => write!(f, "{}", Self::MEMORY),
            StoreLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One persisted rate: 1 unit of `currency` is worth `rate` units of the
/// reference currency on `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub currency: String,
    pub rate: f64,
}

impl RateRecord {
    pub fn new(date: NaiveDate, currency: impl Into<String>, rate: f64) -> Self {
        Self {
            date,
            currency: currency.into(),
            rate,
        }
    }
}

struct State {
    storage: Storage,
    cache: RateCache,
}

impl State {
    /// Run a storage operation, dropping memoized values if it had to replace
    /// the table
    fn with_storage<T>(&mut self, op: impl FnOnce(&mut Storage) -> Result<T>) -> Result<T> {
        let generation = self.storage.generation();
        let result = op(&mut self.storage);
        if self.storage.generation() != generation {
            log::debug!("Rate table was replaced, clearing {} cached value(s)", self.cache.len());
            self.cache.clear();
        }
        result
    }
}

/// Exchange-rate store backed by SQLite with an in-memory cache
///
/// The connection and the cache sit behind one lock, so a memoized value is
/// always what a fresh read of the table would produce.
pub struct RatesDB {
    registry: Arc<CurrencyRegistry>,
    state: Mutex<State>,
}

impl RatesDB {
    /// Open or create the rates table at `location`
    ///
    /// Missing, unreadable or corrupted storage is replaced (falling back to
    /// an in-memory table if needed). Only fails when not even an in-memory
    /// table can be created.
    pub fn open(
        location: impl Into<StoreLocation>,
        registry: Arc<CurrencyRegistry>,
    ) -> Result<Self> {
        let storage = Storage::open(location.into())?;
        Ok(Self {
            registry,
            state: Mutex::new(State {
                storage,
                cache: RateCache::new(),
            }),
        })
    }

    /// Transient store with no backing file
    pub fn in_memory(registry: Arc<CurrencyRegistry>) -> Result<Self> {
        Self::open(StoreLocation::Memory, registry)
    }

    pub fn registry(&self) -> &Arc<CurrencyRegistry> {
        &self.registry
    }

    pub fn reference_code(&self) -> &str {
        self.registry.reference_code()
    }

    /// Requested location (the active table may be a memory fallback)
    pub fn location(&self) -> StoreLocation {
        self.lock().storage.location().clone()
    }

    /// Whether writes currently reach the backing file
    pub fn is_persistent(&self) -> bool {
        self.lock().storage.is_persistent()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every critical section leaves the state consistent between statements
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// First and last dates with a stored rate for `code`
    pub fn date_range(&self, code: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        self.lock().with_storage(|storage| storage.date_range(code))
    }

    /// Units of `code2` worth one unit of `code1` on `date`
    pub fn get_rate(&self, date: NaiveDate, code1: &str, code2: &str) -> Result<f64> {
        let (value1, value2) = {
            let mut state = self.lock();
            let generation = state.storage.generation();
            let mut value1 = self.resolve(&mut state, date, code1)?;
            let value2 = self.resolve(&mut state, date, code2)?;
            if state.storage.generation() != generation {
                // value1 came from the table that was just replaced
                value1 = self.resolve(&mut state, date, code1)?;
            }
            (value1, value2)
        };

        if value2 == 0.0 {
            return Err(RatesError::DivisionByZero {
                currency: code2.to_string(),
                date,
            });
        }
        Ok(value1 / value2)
    }

    /// Value of one unit of `code` in the reference currency on `date`
    pub fn reference_value(&self, date: NaiveDate, code: &str) -> Result<f64> {
        let mut state = self.lock();
        self.resolve(&mut state, date, code)
    }

    /// Value of `from` in `to`, honouring `from`'s validity range
    ///
    /// Before `from.start_date` the start rate applies and after
    /// `from.stop_date` the latest rate applies, without consulting the store.
    pub fn value_in(&self, from: &Currency, to: &Currency, date: NaiveDate) -> Result<f64> {
        match from.out_of_range_rate(date) {
            Some(rate) => Ok(rate),
            None => self.get_rate(date, &from.code, &to.code),
        }
    }

    fn resolve(&self, state: &mut State, date: NaiveDate, code: &str) -> Result<f64> {
        if code == self.registry.reference_code() {
            return Ok(1.0);
        }
        if let Some(value) = state.cache.get(date, code) {
            return Ok(value);
        }

        let value = match state.with_storage(|storage| storage.seek_rate(date, code))? {
            Some(rate) => rate,
            None => {
                let currency = self.registry.lookup_by_code(code)?;
                log::debug!(
                    "No stored rate for {} around {}, using default {}",
                    code,
                    date,
                    currency.default_rate()
                );
                currency.default_rate()
            }
        };

        state.cache.insert(date, code, value);
        Ok(value)
    }

    /// Store the reference-currency value of `code` on `date`
    ///
    /// Replaces any existing value for that day and is committed before
    /// returning.
    pub fn set_value(&self, date: NaiveDate, code: &str, value: f64) -> Result<()> {
        self.set_values(&[RateRecord::new(date, code, value)])
            .map(|_| ())
    }

    /// Store several values in a single transaction
    pub fn set_values(&self, records: &[RateRecord]) -> Result<usize> {
        for record in records {
            self.validate(record)?;
        }

        let mut state = self.lock();
        state.with_storage(|storage| storage.upsert(records))?;
        for record in records {
            // Memoized neighbours of this date may now resolve differently
            state.cache.invalidate_currency(&record.currency);
        }
        for record in records {
            state.cache.insert(record.date, &record.currency, record.rate);
        }

        log::debug!("Stored {} rate(s)", records.len());
        Ok(records.len())
    }

    fn validate(&self, record: &RateRecord) -> Result<()> {
        to_db_date(record.date)?;
        let is_reference = record.currency == self.registry.reference_code();
        if is_reference || !record.rate.is_finite() || record.rate <= 0.0 {
            return Err(RatesError::InvalidRate {
                currency: record.currency.clone(),
                date: record.date,
                rate: record.rate,
            });
        }
        Ok(())
    }

    /// Stored rates of `code`, oldest first
    pub fn history(&self, code: &str) -> Result<Vec<RateRecord>> {
        self.lock().with_storage(|storage| storage.history(code))
    }

    /// Number of stored rates across all currencies
    pub fn row_count(&self) -> Result<usize> {
        self.lock().with_storage(|storage| storage.count())
    }

    /// Drop all memoized values
    pub fn clear_cache(&self) {
        self.lock().cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache.stats()
    }
}

impl fmt::Debug for RatesDB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatesDB")
            .field("reference", &self.reference_code())
            .field("location", &self.location())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn registry() -> Arc<CurrencyRegistry> {
        Arc::new(
            CurrencyRegistry::builder("CAD")
                .register(Currency::new("CAD", "Canadian dollar"))
                .unwrap()
                .register(Currency::new("USD", "U.S. dollar").with_latest_rate(0.9896))
                .unwrap()
                .register(Currency::new("EUR", "European Euro").with_latest_rate(1.5611))
                .unwrap()
                .build(),
        )
    }

    fn db() -> RatesDB {
        RatesDB::in_memory(registry()).unwrap()
    }

    #[test]
    fn test_store_location_parse() {
        assert_eq!(StoreLocation::parse(":memory:"), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("/tmp/rates.db"),
            StoreLocation::File(PathBuf::from("/tmp/rates.db"))
        );
        assert_eq!(StoreLocation::Memory.to_string(), ":memory:");
    }

    #[test]
    fn test_eur_example() {
        let db = db();
        db.set_value(d(2008, 1, 1), "EUR", 1.5).unwrap();
        db.set_value(d(2008, 3, 1), "EUR", 1.6).unwrap();

        assert_eq!(db.get_rate(d(2008, 2, 1), "EUR", "CAD").unwrap(), 1.5);
        assert_eq!(db.get_rate(d(2007, 1, 1), "EUR", "CAD").unwrap(), 1.5);
        assert_eq!(db.get_rate(d(2008, 4, 1), "EUR", "CAD").unwrap(), 1.6);
    }

    #[test]
    fn test_cross_rate() {
        let db = db();
        db.set_value(d(2008, 1, 1), "EUR", 1.5).unwrap();
        db.set_value(d(2008, 1, 1), "USD", 1.2).unwrap();

        assert_relative_eq!(db.get_rate(d(2008, 1, 1), "EUR", "USD").unwrap(), 1.25);
        assert_relative_eq!(db.get_rate(d(2008, 1, 1), "USD", "EUR").unwrap(), 0.8);
        assert_relative_eq!(db.get_rate(d(2008, 1, 1), "CAD", "USD").unwrap(), 1.0 / 1.2);
    }

    #[test]
    fn test_registry_fallback() {
        let db = db();
        assert_relative_eq!(
            db.get_rate(d(2008, 1, 1), "EUR", "USD").unwrap(),
            1.5611 / 0.9896
        );
    }

    #[test]
    fn test_unknown_currency_without_rows() {
        let db = db();
        assert!(matches!(
            db.get_rate(d(2008, 1, 1), "XXX", "CAD"),
            Err(RatesError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_reference_identity_skips_cache() {
        let db = db();
        assert_eq!(db.get_rate(d(2008, 1, 1), "CAD", "CAD").unwrap(), 1.0);
        assert_eq!(db.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_set_value_refreshes_cached_neighbours() {
        let db = db();
        db.set_value(d(2008, 1, 1), "EUR", 1.5).unwrap();
        assert_eq!(db.get_rate(d(2008, 6, 1), "EUR", "CAD").unwrap(), 1.5);

        db.set_value(d(2008, 5, 1), "EUR", 1.7).unwrap();
        assert_eq!(db.get_rate(d(2008, 6, 1), "EUR", "CAD").unwrap(), 1.7);
    }

    #[test]
    fn test_dates_beyond_year_9999() {
        let db = db();
        db.set_value(d(2008, 1, 1), "EUR", 1.5).unwrap();
        db.set_value(d(2009, 1, 1), "EUR", 1.6).unwrap();

        assert_eq!(db.get_rate(d(10000, 1, 1), "EUR", "CAD").unwrap(), 1.6);
        assert_eq!(db.get_rate(d(-1, 6, 1), "EUR", "CAD").unwrap(), 1.5);

        assert!(matches!(
            db.set_value(d(10000, 1, 1), "EUR", 1.7),
            Err(RatesError::DateOutOfRange(_))
        ));
        assert_eq!(
            db.date_range("EUR").unwrap(),
            Some((d(2008, 1, 1), d(2009, 1, 1)))
        );
        assert_eq!(db.history("EUR").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_rates_rejected() {
        let db = db();
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                db.set_value(d(2008, 1, 1), "EUR", rate),
                Err(RatesError::InvalidRate { .. })
            ));
        }
        assert!(db.set_value(d(2008, 1, 1), "CAD", 1.0).is_err());
        assert_eq!(db.row_count().unwrap(), 0);
    }

    #[test]
    fn test_set_values_batch() {
        let db = db();
        let stored = db
            .set_values(&[
                RateRecord::new(d(2008, 1, 1), "EUR", 1.5),
                RateRecord::new(d(2008, 1, 2), "EUR", 1.52),
                RateRecord::new(d(2008, 1, 1), "USD", 0.99),
            ])
            .unwrap();

        assert_eq!(stored, 3);
        assert_eq!(db.row_count().unwrap(), 3);
        assert_eq!(db.history("EUR").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_batch_stores_nothing() {
        let db = db();
        let result = db.set_values(&[
            RateRecord::new(d(2008, 1, 1), "EUR", 1.5),
            RateRecord::new(d(2008, 1, 2), "EUR", -2.0),
        ]);
        assert!(result.is_err());
        assert_eq!(db.row_count().unwrap(), 0);
    }

    #[test]
    fn test_value_in_honours_validity_range() {
        let reg = registry();
        let db = RatesDB::in_memory(Arc::clone(&reg)).unwrap();
        let frf = Currency::new("FRF", "French franc")
            .with_start(d(1960, 1, 1), 0.3)
            .with_stop(d(2001, 12, 31))
            .with_latest_rate(0.2);
        let cad = reg.lookup_by_code("CAD").unwrap();

        assert_eq!(db.value_in(&frf, &cad, d(1950, 1, 1)).unwrap(), 0.3);
        assert_eq!(db.value_in(&frf, &cad, d(2005, 1, 1)).unwrap(), 0.2);

        db.set_value(d(1999, 1, 1), "FRF", 0.25).unwrap();
        assert_eq!(db.value_in(&frf, &cad, d(2000, 1, 1)).unwrap(), 0.25);
    }

    #[test]
    fn test_rates_db_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RatesDB>();
    }
}
