//! CSV ingestion of daily rates
//!
//! Expected columns (header row required, any order, extra columns ignored):
//!
//! ```text
//! date,currency,rate
//! 2008-01-01,EUR,1.5
//! 20080301,EUR,1.6
//! ```
//!
//! `rate` is the value of one unit of `currency` in the reference currency.

use crate::dates::parse_date;
use crate::error::{RatesError, Result};
use crate::store::{RateRecord, RatesDB};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

/// Column names of a rates CSV file
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub date: String,
    pub currency: String,
    pub rate: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            currency: "currency".to_string(),
            rate: "rate".to_string(),
        }
    }
}

/// Parse rate records from any CSV reader
pub fn read_rates<R: Read>(reader: R, columns: &CsvColumns) -> Result<Vec<RateRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = find_column(&headers, &columns.date)?;
    let currency_idx = find_column(&headers, &columns.currency)?;
    let rate_idx = find_column(&headers, &columns.rate)?;

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let row = result?;
        // Header is line 1
        let line = line + 2;

        let field = |idx: usize, name: &str| {
            row.get(idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| RatesError::ParseError(format!("Missing {} at line {}", name, line)))
        };

        let date = parse_date(field(date_idx, "date")?)?;
        let currency = field(currency_idx, "currency")?.to_uppercase();
        let rate_str = field(rate_idx, "rate")?;
        let rate: f64 = rate_str.parse().map_err(|_| {
            RatesError::ParseError(format!("Invalid rate {:?} at line {}", rate_str, line))
        })?;

        records.push(RateRecord::new(date, currency, rate));
    }

    Ok(records)
}

/// Parse a rates CSV file with the default column names
pub fn read_rates_file(path: &Path) -> Result<Vec<RateRecord>> {
    let file = std::fs::File::open(path)?;
    read_rates(file, &CsvColumns::default())
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| RatesError::ParseError(format!("Column not found: {}", name)))
}

impl RatesDB {
    /// Load a rates CSV file and store every row in one transaction
    pub fn import_csv(&self, path: &Path) -> Result<usize> {
        let records = read_rates_file(path)?;
        let count = self.set_values(&records)?;
        log::info!("Imported {} rate(s) from {}", count, path.display());
        Ok(count)
    }
}
