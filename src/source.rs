//! Rate lookup trait and amount conversion helpers

use crate::error::{RatesError, Result};
use crate::store::RatesDB;
use chrono::NaiveDate;

/// Anything that can answer "units of `to` per unit of `from` on `date`"
pub trait RateSource: Send + Sync {
    fn get_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<f64>;

    /// Rates for several pairs on the same date
    fn get_rates(&self, pairs: &[(&str, &str)], date: NaiveDate) -> Result<Vec<f64>> {
        pairs
            .iter()
            .map(|(from, to)| self.get_rate(date, from, to))
            .collect()
    }

    /// Units of `from` per unit of `to`
    fn get_inverse_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<f64> {
        let rate = self.get_rate(date, from, to)?;
        if rate == 0.0 {
            return Err(RatesError::DivisionByZero {
                currency: from.to_string(),
                date,
            });
        }
        Ok(1.0 / rate)
    }

    fn convert_amount(&self, amount: f64, from: &str, to: &str, date: NaiveDate) -> Result<f64> {
        Ok(amount * self.get_rate(date, from, to)?)
    }
}

impl RateSource for RatesDB {
    fn get_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<f64> {
        RatesDB::get_rate(self, date, from, to)
    }
}

/// Sum of amounts held in various currencies, expressed in `target`
pub fn total_value<S: RateSource + ?Sized>(
    source: &S,
    amounts: &[(f64, &str)],
    target: &str,
    date: NaiveDate,
) -> Result<f64> {
    amounts.iter().try_fold(0.0, |total, (amount, code)| {
        Ok(total + source.convert_amount(*amount, code, target, date)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyRegistry;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn db() -> RatesDB {
        let db = RatesDB::in_memory(Arc::new(CurrencyRegistry::builtin())).unwrap();
        db.set_value(d(2008, 1, 1), "EUR", 1.5).unwrap();
        db.set_value(d(2008, 1, 1), "USD", 1.2).unwrap();
        db
    }

    #[test]
    fn test_convert_amount() {
        let db = db();
        let cad = db.convert_amount(100.0, "EUR", "CAD", d(2008, 1, 1)).unwrap();
        assert_relative_eq!(cad, 150.0);

        let usd = db.convert_amount(100.0, "EUR", "USD", d(2008, 1, 1)).unwrap();
        assert_relative_eq!(usd, 125.0);
    }

    #[test]
    fn test_get_rates_and_inverse() {
        let db = db();
        let rates = db
            .get_rates(&[("EUR", "CAD"), ("USD", "CAD"), ("CAD", "CAD")], d(2008, 1, 1))
            .unwrap();
        assert_eq!(rates, vec![1.5, 1.2, 1.0]);

        let inverse = db.get_inverse_rate(d(2008, 1, 1), "EUR", "USD").unwrap();
        assert_relative_eq!(inverse, 0.8);
    }

    #[test]
    fn test_total_value_through_trait_object() {
        let db = db();
        let source: &dyn RateSource = &db;
        let total = total_value(
            source,
            &[(100.0, "CAD"), (100.0, "EUR"), (50.0, "USD")],
            "CAD",
            d(2008, 1, 1),
        )
        .unwrap();
        assert_relative_eq!(total, 100.0 + 150.0 + 60.0);
    }

    #[test]
    fn test_unknown_currency_propagates() {
        let db = db();
        assert!(matches!(
            db.convert_amount(1.0, "XXX", "CAD", d(2008, 1, 1)),
            Err(RatesError::UnknownCurrency(_))
        ));
    }
}
