//! `BlackVolTermStructure` — Black-volatility term structures
//! (translates `ql/termstructures/volatility/equityfx/blackvoltermstructure.hpp`).
//!
//! Provides the `BlackVolTermStructure` trait and concrete implementations:
//! * `BlackConstantVol` — a flat Black volatility surface, read from a quote.

use crate::term_structure::{TermStructure, TermStructureBase};
use crate::volatility_term_structure::VolatilityTermStructure;
use ql_core::{errors::Result, Real, Time, Volatility};
use ql_quotes::QuoteHandle;
use ql_time::{Calendar, Date, DayCounter};

/// A Black-volatility term structure.
///
/// Implementors provide [`black_vol_impl`](Self::black_vol_impl); variances
/// and range-checked accessors follow.
///
/// Corresponds to `QuantLib::BlackVolTermStructure`.
pub trait BlackVolTermStructure: VolatilityTermStructure {
    /// Black volatility for time `t` and `strike`, without range checks.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Result<Volatility>;

    /// Black variance `σ²·t`, without range checks.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Result<Real> {
        let vol = self.black_vol_impl(t, strike)?;
        Ok(vol * vol * t)
    }

    /// Black volatility for a time and strike.
    fn black_vol(&self, t: Time, strike: Real, extrapolate: bool) -> Result<Volatility> {
        self.check_range(t, extrapolate)?;
        self.check_strike(strike, extrapolate)?;
        self.black_vol_impl(t, strike)
    }

    /// Black variance for a time and strike.
    fn black_variance(&self, t: Time, strike: Real, extrapolate: bool) -> Result<Real> {
        self.check_range(t, extrapolate)?;
        self.check_strike(strike, extrapolate)?;
        self.black_variance_impl(t, strike)
    }

    /// Black volatility for a date and strike.
    fn black_vol_date(&self, date: Date, strike: Real, extrapolate: bool) -> Result<Volatility> {
        self.check_range_date(date, extrapolate)?;
        self.black_vol(self.time_from_reference(date), strike, true)
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// A flat (constant) Black volatility surface.
///
/// Corresponds to `QuantLib::BlackConstantVol`.
#[derive(Debug, Clone)]
pub struct BlackConstantVol {
    base: TermStructureBase,
    volatility: QuoteHandle,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.
    pub fn new(reference_date: Date, volatility: impl Into<QuoteHandle>, day_counter: DayCounter) -> Self {
        Self {
            base: TermStructureBase::new(reference_date, Calendar::Null, day_counter),
            volatility: volatility.into(),
        }
    }

    /// Create with a specific calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.base.calendar = calendar;
        self
    }

    /// The current volatility.
    pub fn volatility(&self) -> Result<Volatility> {
        self.volatility.value()
    }
}

impl TermStructure for BlackConstantVol {
    fn reference_date(&self) -> Date {
        self.base.reference_date
    }

    fn day_counter(&self) -> DayCounter {
        self.base.day_counter
    }

    fn calendar(&self) -> &Calendar {
        &self.base.calendar
    }

    fn max_date(&self) -> Date {
        Date::MAX
    }

    fn max_time(&self) -> Time {
        Time::MAX
    }
}

impl VolatilityTermStructure for BlackConstantVol {}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Result<Volatility> {
        self.volatility.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_vol_and_variance() {
        let ref_date = Date::from_ymd(2025, 1, 2).unwrap();
        let surface = BlackConstantVol::new(ref_date, 0.20, DayCounter::Actual365Fixed);
        assert_abs_diff_eq!(surface.black_vol(1.0, 100.0, false).unwrap(), 0.20);
        assert_abs_diff_eq!(surface.black_variance(2.0, 50.0, false).unwrap(), 0.08, epsilon = 1e-15);
        let d1 = Date::from_ymd(2026, 1, 2).unwrap();
        assert_abs_diff_eq!(surface.black_vol_date(d1, 100.0, false).unwrap(), 0.20);
        assert!(surface.black_vol(-1.0, 100.0, false).is_err());
    }
}
