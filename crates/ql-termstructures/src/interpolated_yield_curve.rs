//! `InterpolatedYieldCurve` — a yield curve interpolated on node dates
//! (translates `ql/termstructures/yield/interpolateddiscountcurve.hpp`,
//! `zerocurve.hpp` and `forwardcurve.hpp`).
//!
//! One curve type covers the whole traits × interpolator matrix: the
//! [`CurveStrategy`] decides what the node values mean and how they are
//! interpolated.
//!
//! # Example
//!
//! ```
//! use ql_termstructures::{InterpolatedYieldCurve, YieldTermStructure};
//! use ql_time::{Calendar, Date, DayCounter};
//!
//! let dates = vec![
//!     Date::from_ymd(2025, 1, 2).unwrap(),
//!     Date::from_ymd(2026, 1, 2).unwrap(),
//!     Date::from_ymd(2030, 1, 2).unwrap(),
//! ];
//! let curve = InterpolatedYieldCurve::discount_curve(
//!     dates,
//!     vec![1.0, 0.97, 0.85],
//!     DayCounter::Actual365Fixed,
//!     Calendar::Null,
//! )
//! .unwrap();
//! assert!((curve.discount(1.0).unwrap() - 0.97).abs() < 1e-12);
//! assert!(curve.discount(60.0).is_err());
//! ```

use crate::curve_strategy::{CurveStrategy, CurveTraits, Interpolator};
use crate::term_structure::{TermStructure, TermStructureBase};
use crate::yield_term_structure::{Jumps, YieldTermStructure};
use ql_core::{errors::Result, DiscountFactor, Rate, Real, Time};
use ql_math::Interpolation1D;
use ql_quotes::QuoteHandle;
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;

/// A yield curve defined by node dates, node values and a
/// [`CurveStrategy`].
///
/// Corresponds to `QuantLib::InterpolatedDiscountCurve`,
/// `InterpolatedZeroCurve` and `InterpolatedForwardCurve`.
#[derive(Debug, Clone)]
pub struct InterpolatedYieldCurve {
    base: TermStructureBase,
    strategy: CurveStrategy,
    dates: Vec<Date>,
    times: Vec<Time>,
    data: Vec<Real>,
    interpolation: Arc<dyn Interpolation1D>,
    jumps: Jumps,
}

impl InterpolatedYieldCurve {
    /// Build a curve from node dates and values.
    ///
    /// The first date is the reference date.  `jumps` are quote handles for
    /// discrete multiplicative jumps at `jump_dates` (year ends when no dates
    /// are given).
    ///
    /// # Errors
    /// A configuration error when fewer than two nodes are given, when the
    /// lengths differ, when dates are not strictly increasing, when a
    /// discount curve does not start at 1 or has non-positive values, or
    /// when the interpolator rejects the data.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dates: Vec<Date>,
        data: Vec<Real>,
        calendar: Calendar,
        day_counter: DayCounter,
        jumps: Vec<QuoteHandle>,
        jump_dates: Vec<Date>,
        traits: CurveTraits,
        interpolator: Interpolator,
    ) -> Result<Self> {
        ql_core::ensure!(dates.len() >= 2, "not enough nodes: {} given, at least 2 required", dates.len());
        ql_core::ensure!(
            dates.len() == data.len(),
            "dates/data count mismatch ({} vs {})",
            dates.len(),
            data.len()
        );
        for w in dates.windows(2) {
            ql_core::ensure!(w[1] > w[0], "invalid date ({}, vs {}): dates must be strictly increasing", w[1], w[0]);
        }
        if traits == CurveTraits::Discount {
            ql_core::ensure!(
                data[0] == 1.0,
                "the first discount must be 1.0 to flag the reference date, got {}",
                data[0]
            );
            ql_core::ensure!(
                data.iter().all(|&d| d > 0.0),
                "discount factors must be positive"
            );
        }
        let reference_date = dates[0];
        let times: Vec<Time> = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        for (w, d) in times.windows(2).zip(dates.windows(2)) {
            ql_core::ensure!(w[1] > w[0], "dates {} and {} map to the same time", d[0], d[1]);
        }
        let jumps = Jumps::new(jumps, jump_dates, reference_date, day_counter)?;
        let base = TermStructureBase::new(reference_date, calendar, day_counter);
        Self::from_nodes(base, CurveStrategy::new(traits, interpolator), dates, times, data, jumps)
    }

    /// Assemble a curve from validated nodes.  `times` must be strictly
    /// increasing and start at zero.  With fewer nodes than the interpolator
    /// needs, its (log-)linear fallback is used.
    pub(crate) fn from_nodes(
        base: TermStructureBase,
        strategy: CurveStrategy,
        dates: Vec<Date>,
        times: Vec<Time>,
        data: Vec<Real>,
        jumps: Jumps,
    ) -> Result<Self> {
        let scheme = if times.len() < strategy.interpolator.required_points() {
            strategy.interpolator.fallback()
        } else {
            strategy.interpolator
        };
        let interpolation: Arc<dyn Interpolation1D> = Arc::from(scheme.interpolate(&times, &data)?);
        Ok(Self {
            base,
            strategy,
            dates,
            times,
            data,
            interpolation,
            jumps,
        })
    }

    /// A discount curve: log-linear discount factors.
    ///
    /// # Errors
    /// As for [`new`](Self::new).
    pub fn discount_curve(
        dates: Vec<Date>,
        discounts: Vec<DiscountFactor>,
        day_counter: DayCounter,
        calendar: Calendar,
    ) -> Result<Self> {
        Self::new(
            dates,
            discounts,
            calendar,
            day_counter,
            vec![],
            vec![],
            CurveTraits::Discount,
            Interpolator::LogLinear,
        )
    }

    /// A zero curve: linear continuously-compounded zero rates.
    ///
    /// # Errors
    /// As for [`new`](Self::new).
    pub fn zero_curve(
        dates: Vec<Date>,
        zero_rates: Vec<Rate>,
        day_counter: DayCounter,
        calendar: Calendar,
    ) -> Result<Self> {
        Self::new(
            dates,
            zero_rates,
            calendar,
            day_counter,
            vec![],
            vec![],
            CurveTraits::ZeroYield,
            Interpolator::Linear,
        )
    }

    /// A forward curve: backward-flat instantaneous forwards.
    ///
    /// # Errors
    /// As for [`new`](Self::new).
    pub fn forward_curve(
        dates: Vec<Date>,
        forwards: Vec<Rate>,
        day_counter: DayCounter,
        calendar: Calendar,
    ) -> Result<Self> {
        Self::new(
            dates,
            forwards,
            calendar,
            day_counter,
            vec![],
            vec![],
            CurveTraits::ForwardRate,
            Interpolator::BackwardFlat,
        )
    }

    /// Allow or forbid queries past the last node.
    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.base.extrapolate = extrapolate;
        self
    }

    /// Node times, starting at 0.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Node dates, starting at the reference date.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Node values, in the quantity given by the traits.
    pub fn data(&self) -> &[Real] {
        &self.data
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Vec<(Date, Real)> {
        self.dates.iter().copied().zip(self.data.iter().copied()).collect()
    }

    /// Jump times.
    pub fn jump_times(&self) -> &[Time] {
        self.jumps.times()
    }

    /// Jump dates.
    pub fn jump_dates(&self) -> &[Date] {
        self.jumps.dates()
    }

    /// The (traits, interpolator) pair.
    pub fn strategy(&self) -> CurveStrategy {
        self.strategy
    }

    /// The interpolation over the node values.
    pub fn interpolation(&self) -> &dyn Interpolation1D {
        &*self.interpolation
    }
}

impl TermStructure for InterpolatedYieldCurve {
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
        self.dates[self.dates.len() - 1]
    }

    fn max_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    fn allows_extrapolation(&self) -> bool {
        self.base.extrapolate
    }
}

impl YieldTermStructure for InterpolatedYieldCurve {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        if t == 0.0 {
            return Ok(1.0);
        }
        Ok(self.strategy.discount(&*self.interpolation, t))
    }

    fn jump_factor(&self, t: Time) -> Result<Real> {
        if self.jumps.is_empty() {
            return Ok(1.0);
        }
        self.jumps.factor(t)
    }

    fn forward_impl(&self, t: Time) -> Result<Rate> {
        Ok(self.strategy.forward(&*self.interpolation, t))
    }
}
