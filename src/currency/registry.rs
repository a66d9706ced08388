//! Immutable currency registry with O(1) lookup by code and by name

use super::Currency;
use crate::error::{RatesError, Result};
use hashbrown::HashMap;
use std::sync::Arc;

/// Read-only table of registered currencies
///
/// Built once through [`CurrencyRegistryBuilder`] and shared behind an `Arc`.
/// Registration order is preserved by [`CurrencyRegistry::all`].
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    reference: String,
    currencies: Vec<Arc<Currency>>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl CurrencyRegistry {
    pub fn builder(reference: impl Into<String>) -> CurrencyRegistryBuilder {
        CurrencyRegistryBuilder::new(reference)
    }

    /// Code of the currency every stored rate is expressed in
    pub fn reference_code(&self) -> &str {
        &self.reference
    }

    pub fn lookup_by_code(&self, code: &str) -> Result<Arc<Currency>> {
        self.by_code
            .get(code)
            .map(|&idx| Arc::clone(&self.currencies[idx]))
            .ok_or_else(|| RatesError::UnknownCurrency(format!("code {:?}", code)))
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<Arc<Currency>> {
        self.by_name
            .get(name)
            .map(|&idx| Arc::clone(&self.currencies[idx]))
            .ok_or_else(|| RatesError::UnknownCurrency(format!("name {:?}", name)))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// All currencies in registration order
    pub fn all(&self) -> &[Arc<Currency>] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

/// Collects registrations and rejects duplicate codes or names
#[derive(Debug)]
pub struct CurrencyRegistryBuilder {
    registry: CurrencyRegistry,
}

impl CurrencyRegistryBuilder {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            registry: CurrencyRegistry {
                reference: reference.into(),
                currencies: Vec::new(),
                by_code: HashMap::new(),
                by_name: HashMap::new(),
            },
        }
    }

    pub fn register(mut self, currency: Currency) -> Result<Self> {
        let reg = &mut self.registry;
        if reg.by_code.contains_key(&currency.code) {
            return Err(RatesError::DuplicateCurrency(currency.code));
        }
        if reg.by_name.contains_key(&currency.name) {
            return Err(RatesError::DuplicateCurrency(currency.name));
        }

        self.insert_static(currency);
        Ok(self)
    }

    /// Register an entry of a compile-time table known to be duplicate-free
    pub(crate) fn insert_static(&mut self, currency: Currency) {
        let reg = &mut self.registry;
        debug_assert!(!reg.by_code.contains_key(&currency.code));
        debug_assert!(!reg.by_name.contains_key(&currency.name));

        let idx = reg.currencies.len();
        reg.by_code.insert(currency.code.clone(), idx);
        reg.by_name.insert(currency.name.clone(), idx);
        reg.currencies.push(Arc::new(currency));
    }

    pub fn build(self) -> CurrencyRegistry {
        if !self.registry.contains(&self.registry.reference) {
            log::debug!(
                "Reference currency {} is not registered; it still resolves to 1",
                self.registry.reference
            );
        }
        self.registry
    }
}
