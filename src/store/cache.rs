//! Memoized reference-currency values keyed by (date, currency)

use chrono::NaiveDate;
use hashbrown::HashMap;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Resolved values per currency, then per date
///
/// Grouping by currency lets a write drop every memoized date of the
/// currency it touches, and lets lookups borrow the code as `&str`.
#[derive(Debug, Default)]
pub struct RateCache {
    entries: HashMap<String, HashMap<NaiveDate, f64>>,
    hits: u64,
    misses: u64,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, date: NaiveDate, code: &str) -> Option<f64> {
        let value = self
            .entries
            .get(code)
            .and_then(|dates| dates.get(&date))
            .copied();
        match value {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        value
    }

    pub fn insert(&mut self, date: NaiveDate, code: &str, value: f64) {
        match self.entries.get_mut(code) {
            Some(dates) => {
                dates.insert(date, value);
            }
            None => {
                let mut dates = HashMap::new();
                dates.insert(date, value);
                self.entries.insert(code.to_string(), dates);
            }
        }
    }

    /// Forget every memoized date of one currency
    pub fn invalidate_currency(&mut self, code: &str) {
        self.entries.remove(code);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|dates| dates.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|dates| dates.is_empty())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
        }
    }
}
