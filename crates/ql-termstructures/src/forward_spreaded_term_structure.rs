//! `ForwardSpreadedTermStructure` — a curve shifted by a forward spread
//! (translates `ql/termstructures/yield/forwardspreadedtermstructure.hpp`).

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{errors::Result, DiscountFactor, Rate, Time};
use ql_quotes::QuoteHandle;
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;

/// A base curve whose instantaneous forwards are all shifted by a
/// continuously-compounded spread: `D(t) = D_base(t)·e^{−s·t}`.
///
/// Corresponds to `QuantLib::ForwardSpreadedTermStructure`.
#[derive(Debug, Clone)]
pub struct ForwardSpreadedTermStructure {
    base: Arc<dyn YieldTermStructure>,
    spread: QuoteHandle,
}

impl ForwardSpreadedTermStructure {
    /// Shift `base` by `spread`.
    pub fn new(base: Arc<dyn YieldTermStructure>, spread: impl Into<QuoteHandle>) -> Self {
        Self {
            base,
            spread: spread.into(),
        }
    }

    /// The underlying curve.
    pub fn base(&self) -> &Arc<dyn YieldTermStructure> {
        &self.base
    }
}

impl TermStructure for ForwardSpreadedTermStructure {
    fn reference_date(&self) -> Date {
        self.base.reference_date()
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
        self.base.max_time()
    }

    fn allows_extrapolation(&self) -> bool {
        self.base.allows_extrapolation()
    }
}

impl YieldTermStructure for ForwardSpreadedTermStructure {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok(self.base.discount_with(t, true)? * (-self.spread.value()? * t).exp())
    }

    fn forward_impl(&self, t: Time) -> Result<Rate> {
        Ok(self.base.forward_impl(t)? + self.spread.value()?)
    }
}
