//! `TermStructure` — base trait for all term structures
//! (translates `ql/termstructure.hpp`).
//!
//! Every term structure has a **reference date**, a **day counter**, a
//! **calendar** and a **maximum date**.  Queries past the maximum date are
//! rejected unless extrapolation is allowed, either by the structure itself
//! or by the caller for a single query.

use ql_core::{errors::Result, Time};
use ql_time::{Calendar, Date, DayCounter};

/// Slack allowed when comparing a query time with the maximum time, so that
/// the last node date itself is always in range.
pub(crate) const TIME_TOLERANCE: Time = 1.0e-12;

/// Base trait for all term structures.
///
/// Corresponds to `QuantLib::TermStructure`.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The date at which discount = 1.0 and from which time is measured.
    fn reference_date(&self) -> Date;

    /// The day counter used for date → time conversions.
    fn day_counter(&self) -> DayCounter;

    /// The calendar used for date adjustments.
    fn calendar(&self) -> &Calendar;

    /// The latest date for which the curve can be used without
    /// extrapolation.
    fn max_date(&self) -> Date;

    /// The latest time for which the curve can be used without
    /// extrapolation.
    fn max_time(&self) -> Time {
        self.time_from_reference(self.max_date())
    }

    /// `true` if queries beyond [`max_time`](Self::max_time) are allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Year fraction from the reference date to `date`.
    fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), date)
    }

    /// Check that `t` can be queried.
    ///
    /// # Errors
    /// A domain error for negative times, or for times past the maximum
    /// unless `extrapolate` or [`allows_extrapolation`](Self::allows_extrapolation).
    fn check_range(&self, t: Time, extrapolate: bool) -> Result<()> {
        ql_core::ensure_domain!(t >= 0.0, "negative time ({t}) given");
        ql_core::ensure_domain!(
            extrapolate || self.allows_extrapolation() || t <= self.max_time() + TIME_TOLERANCE,
            "time ({t}) is past max curve time ({}), date out of range",
            self.max_time()
        );
        Ok(())
    }

    /// Date version of [`check_range`](Self::check_range).
    fn check_range_date(&self, date: Date, extrapolate: bool) -> Result<()> {
        ql_core::ensure_domain!(
            date >= self.reference_date(),
            "date ({date}) before reference date ({})",
            self.reference_date()
        );
        ql_core::ensure_domain!(
            extrapolate || self.allows_extrapolation() || date <= self.max_date(),
            "date ({date}) is past max curve date ({}), date out of range",
            self.max_date()
        );
        Ok(())
    }
}

/// Reference date, calendar, day counter and extrapolation flag shared by
/// most concrete term structures.
#[derive(Debug, Clone, PartialEq)]
pub struct TermStructureBase {
    /// Reference date.
    pub reference_date: Date,
    /// Calendar for date adjustments.
    pub calendar: Calendar,
    /// Day counter for time calculations.
    pub day_counter: DayCounter,
    /// Whether extrapolation is allowed.
    pub extrapolate: bool,
}

impl TermStructureBase {
    /// A base with extrapolation disabled.
    pub fn new(reference_date: Date, calendar: Calendar, day_counter: DayCounter) -> Self {
        Self {
            reference_date,
            calendar,
            day_counter,
            extrapolate: false,
        }
    }

    /// Year fraction from the reference date to `date`.
    pub fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter.year_fraction(self.reference_date, date)
    }
}
