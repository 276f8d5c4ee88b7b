//! `ImpliedTermStructure` — a curve seen from a later reference date
//! (translates `ql/termstructures/yield/impliedtermstructure.hpp`).

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{errors::Result, DiscountFactor, Time};
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;

/// The forward curve implied by `base` at a later reference date:
/// `D(t) = D_base(t₀ + t) / D_base(t₀)`.
///
/// Corresponds to `QuantLib::ImpliedTermStructure`.
#[derive(Debug, Clone)]
pub struct ImpliedTermStructure {
    base: Arc<dyn YieldTermStructure>,
    reference_date: Date,
    offset: Time,
}

impl ImpliedTermStructure {
    /// The curve implied by `base` at `reference_date`.
    ///
    /// # Errors
    /// A configuration error if `reference_date` precedes the base curve's
    /// reference date.
    pub fn new(base: Arc<dyn YieldTermStructure>, reference_date: Date) -> Result<Self> {
        ql_core::ensure!(
            reference_date >= base.reference_date(),
            "implied reference date {reference_date} precedes base reference date {}",
            base.reference_date()
        );
        let offset = base.time_from_reference(reference_date);
        Ok(Self {
            base,
            reference_date,
            offset,
        })
    }
}

impl TermStructure for ImpliedTermStructure {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> DayCounter {
        self.base.day_counter()
    }

    fn calendar(&self) -> &Calendar {
        self.base.calendar()
    }

    fn max_date(&self) -> Date {
        self.base.max_date()
    }

    fn max_time(&self) -> Time {
        self.base.max_time() - self.offset
    }

    fn allows_extrapolation(&self) -> bool {
        self.base.allows_extrapolation()
    }
}

impl YieldTermStructure for ImpliedTermStructure {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        // the base curve is asked for the absolute time t₀ + t
        Ok(self.base.discount_with(self.offset + t, true)? / self.base.discount_with(self.offset, true)?)
    }
}
