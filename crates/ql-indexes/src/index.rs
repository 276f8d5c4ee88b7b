//! `Index` — base trait for market indexes (translates `ql/index.hpp`).

use ql_core::{errors::Result, Real};
use ql_time::{Calendar, Date};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared store of historical fixings.
///
/// Clones share the same map, so every copy of an index sees fixings added
/// through any of them.
#[derive(Debug, Clone, Default)]
pub struct FixingStore {
    data: Arc<RwLock<BTreeMap<Date, Real>>>,
}

impl FixingStore {
    /// Create a new, empty fixing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a fixing.
    pub fn add(&self, date: Date, value: Real) {
        self.data.write().insert(date, value);
    }

    /// Look up a fixing.
    pub fn get(&self, date: Date) -> Option<Real> {
        self.data.read().get(&date).copied()
    }

    /// Number of stored fixings.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Clear all fixings.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

/// Base trait for market indexes.
///
/// Corresponds to `QuantLib::Index`.
pub trait Index: std::fmt::Debug + Send + Sync {
    /// Unique name (e.g. `"Euribor6M Actual/360"`).
    fn name(&self) -> String;

    /// Calendar fixings are published on.
    fn fixing_calendar(&self) -> &Calendar;

    /// Whether `date` is a valid fixing date.
    fn is_valid_fixing_date(&self, date: Date) -> bool {
        self.fixing_calendar().is_business_day(date)
    }

    /// The fixing for `date`: a stored fixing if there is one, otherwise a
    /// forecast.
    fn fixing(&self, date: Date) -> Result<Real>;

    /// The historical fixing store.
    fn fixing_store(&self) -> &FixingStore;

    /// Record a historical fixing.
    fn add_fixing(&self, date: Date, value: Real) {
        self.fixing_store().add(date, value);
    }
}
