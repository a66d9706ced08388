//! Date helpers for the `YYYYMMDD` storage format

use crate::error::{RatesError, Result};
use chrono::{Datelike, NaiveDate};

/// Storage format of the `date` column
pub const DB_DATE_FORMAT: &str = "%Y%m%d";

/// Format accepted from users and CSV files in addition to [`DB_DATE_FORMAT`]
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Years representable as four unsigned digits
pub const MIN_DB_YEAR: i32 = 0;
pub const MAX_DB_YEAR: i32 = 9999;

const MIN_DB_DATE: &str = "00000101";
const MAX_DB_DATE: &str = "99991231";

/// Render a date as stored in the rates table
///
/// Zero-padded so that text ordering matches chronological ordering, which the
/// nearest-date queries rely on. Years outside `0..=9999` would be written
/// with a sign and break that ordering, so they are rejected.
pub fn to_db_date(date: NaiveDate) -> Result<String> {
    if (MIN_DB_YEAR..=MAX_DB_YEAR).contains(&date.year()) {
        Ok(date.format(DB_DATE_FORMAT).to_string())
    } else {
        Err(RatesError::DateOutOfRange(date))
    }
}

/// Comparison key for a query date, clamped to the storable range
///
/// Every stored row lies inside the range, so clamping keeps the nearest
/// earlier and later rows unchanged.
pub fn db_seek_date(date: NaiveDate) -> String {
    match date.year() {
        y if y < MIN_DB_YEAR => MIN_DB_DATE.to_string(),
        y if y > MAX_DB_YEAR => MAX_DB_DATE.to_string(),
        _ => date.format(DB_DATE_FORMAT).to_string(),
    }
}

/// Parse a `date` column value
pub fn parse_db_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DB_DATE_FORMAT)
        .map_err(|e| RatesError::ParseError(format!("Invalid stored date {:?}: {}", s, e)))
}

/// Parse either `YYYY-MM-DD` or `YYYYMMDD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let format = if s.contains('-') {
        ISO_DATE_FORMAT
    } else {
        DB_DATE_FORMAT
    };
    NaiveDate::parse_from_str(s, format)
        .map_err(|e| RatesError::ParseError(format!("Invalid date {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_db_date_pads() {
        let date = NaiveDate::from_ymd_opt(2008, 4, 2).unwrap();
        assert_eq!(to_db_date(date).unwrap(), "20080402");
    }

    #[test]
    fn test_to_db_date_rejects_signed_years() {
        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        let negative = NaiveDate::from_ymd_opt(-1, 12, 31).unwrap();
        assert!(matches!(to_db_date(far), Err(RatesError::DateOutOfRange(d)) if d == far));
        assert!(matches!(to_db_date(negative), Err(RatesError::DateOutOfRange(_))));

        let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert_eq!(to_db_date(last).unwrap(), "99991231");
        assert_eq!(parse_db_date("99991231").unwrap(), last);
    }

    #[test]
    fn test_seek_date_clamps_to_storable_range() {
        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        let negative = NaiveDate::from_ymd_opt(-5, 6, 1).unwrap();
        let inside = NaiveDate::from_ymd_opt(2008, 4, 2).unwrap();

        assert_eq!(db_seek_date(far), "99991231");
        assert_eq!(db_seek_date(negative), "00000101");
        assert_eq!(db_seek_date(inside), "20080402");
        assert!(db_seek_date(inside) < db_seek_date(far));
    }

    #[test]
    fn test_db_date_ordering_matches_chronology() {
        let earlier = NaiveDate::from_ymd_opt(999, 12, 31).unwrap();
        let later = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        assert!(to_db_date(earlier).unwrap() < to_db_date(later).unwrap());
    }

    #[test]
    fn test_parse_db_date() {
        let date = parse_db_date("20080420").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2008, 4, 20).unwrap());
        assert!(parse_db_date("2008-04-20").is_err());
        assert!(parse_db_date("garbage").is_err());
    }

    #[test]
    fn test_parse_date_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2008, 4, 20).unwrap();
        assert_eq!(parse_date("2008-04-20").unwrap(), expected);
        assert_eq!(parse_date("20080420").unwrap(), expected);
        assert_eq!(parse_date(" 2008-04-20 ").unwrap(), expected);
        assert!(matches!(parse_date("2008-13-01"), Err(RatesError::ParseError(_))));
    }
}
