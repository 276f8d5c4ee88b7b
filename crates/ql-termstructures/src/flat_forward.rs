//! `FlatForward` — a yield term structure with a constant rate
//! (translates `ql/termstructures/yield/flatforward.hpp`).
//!
//! The rate is read from its quote on every query, so a curve built on a
//! [`SimpleQuote`](ql_quotes::SimpleQuote) follows the quote.

use crate::term_structure::{TermStructure, TermStructureBase};
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{errors::Result, Compounding, DiscountFactor, Natural, Rate, Time};
use ql_quotes::QuoteHandle;
use ql_time::{Calendar, Date, DayCounter, Frequency, InterestRate};

/// A flat yield curve.
///
/// Corresponds to `QuantLib::FlatForward`.
#[derive(Debug, Clone)]
pub struct FlatForward {
    base: TermStructureBase,
    rate: QuoteHandle,
    compounding: Compounding,
    frequency: Frequency,
}

impl FlatForward {
    /// A curve with the given rate and conventions at a fixed reference date.
    pub fn new(
        reference_date: Date,
        rate: impl Into<QuoteHandle>,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Self {
        Self {
            base: TermStructureBase::new(reference_date, Calendar::Null, day_counter),
            rate: rate.into(),
            compounding,
            frequency,
        }
    }

    /// A continuously-compounded flat curve.
    pub fn continuous(reference_date: Date, rate: impl Into<QuoteHandle>, day_counter: DayCounter) -> Self {
        Self::new(
            reference_date,
            rate,
            day_counter,
            Compounding::Continuous,
            Frequency::NoFrequency,
        )
    }

    /// A curve whose reference date is `settlement_days` business days after
    /// `evaluation_date` on `calendar`.
    pub fn with_settlement(
        evaluation_date: Date,
        settlement_days: Natural,
        calendar: Calendar,
        rate: impl Into<QuoteHandle>,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Self {
        let reference_date = calendar.advance_business_days(evaluation_date, settlement_days as i32);
        let mut curve = Self::new(reference_date, rate, day_counter, compounding, frequency);
        curve.base.calendar = calendar;
        curve
    }

    /// Use `calendar` for date adjustments.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.base.calendar = calendar;
        self
    }

    /// Allow or forbid extrapolation.  The curve is defined for all
    /// positive times, so this only matters to composite structures that
    /// inspect the flag.
    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.base.extrapolate = extrapolate;
        self
    }

    /// The current rate with its conventions.
    pub fn rate(&self) -> Result<InterestRate> {
        Ok(InterestRate::new(
            self.rate.value()?,
            self.base.day_counter,
            self.compounding,
            self.frequency,
        ))
    }
}

impl TermStructure for FlatForward {
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

    fn allows_extrapolation(&self) -> bool {
        self.base.extrapolate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.rate()?.discount_factor(t)
    }

    fn forward_impl(&self, t: Time) -> Result<Rate> {
        if self.compounding == Compounding::Continuous {
            return self.rate.value();
        }
        let t = t.max(1.0e-4);
        Ok(self.rate()?.equivalent_rate(Compounding::Continuous, Frequency::NoFrequency, t)?.rate())
    }
}
