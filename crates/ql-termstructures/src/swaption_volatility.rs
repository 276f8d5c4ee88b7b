//! Swaption volatility structures (translates
//! `ql/termstructures/volatility/swaption/swaptionvolstructure.hpp`,
//! `swaptionconstantvol.hpp` and `swaptionvolmatrix.hpp`).
//!
//! Swap lengths are year fractions; a tenor converts through
//! [`Period::years`].

use crate::term_structure::{TermStructure, TermStructureBase};
use crate::volatility_term_structure::{VolatilityTermStructure, VolatilityType};
use ql_core::{errors::Result, Rate, Real, Time, Volatility};
use ql_math::BilinearInterpolation;
use ql_quotes::QuoteHandle;
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Period};

/// Swaption volatility by option time, swap length and strike.
///
/// Corresponds to `QuantLib::SwaptionVolatilityStructure`.
pub trait SwaptionVolatilityStructure: VolatilityTermStructure {
    /// Volatility without range checks.
    fn volatility_impl(&self, t: Time, swap_length: Time, strike: Rate) -> Result<Volatility>;

    /// Longest swap length covered without extrapolation.
    fn max_swap_length(&self) -> Time {
        Time::INFINITY
    }

    /// Quotation of the volatilities.
    fn volatility_type(&self) -> VolatilityType {
        VolatilityType::ShiftedLognormal
    }

    /// Shift for shifted-lognormal quotes.
    fn displacement(&self) -> Real {
        0.0
    }

    /// Range-checked volatility.
    ///
    /// # Errors
    /// A domain error for an option time, strike or swap length out of
    /// range unless extrapolating.
    fn volatility(&self, t: Time, swap_length: Time, strike: Rate, extrapolate: bool) -> Result<Volatility> {
        self.check_range(t, extrapolate)?;
        self.check_strike(strike, extrapolate)?;
        ql_core::ensure_domain!(swap_length > 0.0, "non-positive swap length ({swap_length})");
        ql_core::ensure_domain!(
            extrapolate || self.allows_extrapolation() || swap_length <= self.max_swap_length(),
            "swap length ({swap_length}) is past the maximum ({})",
            self.max_swap_length()
        );
        self.volatility_impl(t, swap_length, strike)
    }

    /// Range-checked volatility for an option tenor and swap tenor.
    fn volatility_tenor(&self, option_tenor: Period, swap_tenor: Period, strike: Rate, extrapolate: bool) -> Result<Volatility> {
        let t = self.time_from_reference(self.option_date_from_tenor(option_tenor));
        self.volatility(t, swap_tenor.years(), strike, extrapolate)
    }
}

// ── ConstantSwaptionVolatility ────────────────────────────────────────────────

/// Flat swaption volatility read from a quote.
///
/// Corresponds to `QuantLib::ConstantSwaptionVolatility`.
#[derive(Debug, Clone)]
pub struct ConstantSwaptionVolatility {
    base: TermStructureBase,
    volatility: QuoteHandle,
    volatility_type: VolatilityType,
    displacement: Real,
}

impl ConstantSwaptionVolatility {
    /// A flat surface of the given quotation.
    pub fn new(
        reference_date: Date,
        volatility: impl Into<QuoteHandle>,
        day_counter: DayCounter,
        volatility_type: VolatilityType,
        displacement: Real,
    ) -> Self {
        Self {
            base: TermStructureBase::new(reference_date, Calendar::Null, day_counter),
            volatility: volatility.into(),
            volatility_type,
            displacement,
        }
    }

    /// Set the calendar used for expiries.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.base.calendar = calendar;
        self
    }
}

impl TermStructure for ConstantSwaptionVolatility {
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

impl VolatilityTermStructure for ConstantSwaptionVolatility {}

impl SwaptionVolatilityStructure for ConstantSwaptionVolatility {
    fn volatility_impl(&self, _t: Time, _swap_length: Time, _strike: Rate) -> Result<Volatility> {
        self.volatility.value()
    }

    fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    fn displacement(&self) -> Real {
        self.displacement
    }
}

// ── SwaptionVolatilityMatrix ──────────────────────────────────────────────────

/// At-the-money swaption volatilities on an option tenor × swap tenor
/// matrix; the strike is ignored.
///
/// Corresponds to `QuantLib::SwaptionVolatilityMatrix`.
#[derive(Debug, Clone)]
pub struct SwaptionVolatilityMatrix {
    base: TermStructureBase,
    convention: BusinessDayConvention,
    expiries: Vec<Date>,
    interpolation: BilinearInterpolation,
    volatility_type: VolatilityType,
    displacement: Real,
}

impl SwaptionVolatilityMatrix {
    /// Build from option tenors, swap tenors and
    /// `volatilities[option][swap]`.
    ///
    /// # Errors
    /// Unsorted tenors, a ragged matrix or negative volatilities.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reference_date: Date,
        calendar: Calendar,
        convention: BusinessDayConvention,
        option_tenors: &[Period],
        swap_tenors: &[Period],
        volatilities: &[Vec<Volatility>],
        day_counter: DayCounter,
        volatility_type: VolatilityType,
        displacement: Real,
    ) -> Result<Self> {
        ql_core::ensure!(
            volatilities.len() == option_tenors.len()
                && volatilities.iter().all(|row| row.len() == swap_tenors.len()),
            "volatility matrix must be {} options × {} swaps",
            option_tenors.len(),
            swap_tenors.len()
        );
        ql_core::ensure!(
            volatilities.iter().flatten().all(|&v| v >= 0.0),
            "negative volatility in matrix"
        );
        let expiries: Vec<Date> = option_tenors
            .iter()
            .map(|&p| calendar.advance_period(reference_date, p, convention, false))
            .collect();
        ql_core::ensure!(
            expiries.first().is_some_and(|&d| d > reference_date),
            "first option expiry must be after the reference date {reference_date}"
        );
        let times: Vec<Time> = expiries
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        let lengths: Vec<Time> = swap_tenors.iter().map(|p| p.years()).collect();
        let mut z = vec![0.0; times.len() * lengths.len()];
        for (i, row) in volatilities.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                z[j * times.len() + i] = v;
            }
        }
        let interpolation = BilinearInterpolation::new(&times, &lengths, &z)?;
        Ok(Self {
            base: TermStructureBase::new(reference_date, calendar, day_counter),
            convention,
            expiries,
            interpolation,
            volatility_type,
            displacement,
        })
    }

    /// Allow queries outside the matrix (flat).
    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.base.extrapolate = extrapolate;
        self
    }

    /// Option expiry dates.
    pub fn expiries(&self) -> &[Date] {
        &self.expiries
    }

    /// Swap lengths in years.
    pub fn swap_lengths(&self) -> &[Time] {
        self.interpolation.ys()
    }
}

impl TermStructure for SwaptionVolatilityMatrix {
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
        self.expiries.last().copied().unwrap_or(self.base.reference_date)
    }

    fn allows_extrapolation(&self) -> bool {
        self.base.extrapolate
    }
}

impl VolatilityTermStructure for SwaptionVolatilityMatrix {
    fn business_day_convention(&self) -> BusinessDayConvention {
        self.convention
    }
}

impl SwaptionVolatilityStructure for SwaptionVolatilityMatrix {
    fn volatility_impl(&self, t: Time, swap_length: Time, _strike: Rate) -> Result<Volatility> {
        Ok(self.interpolation.value(t, swap_length))
    }

    fn max_swap_length(&self) -> Time {
        self.swap_lengths().last().copied().unwrap_or(Time::INFINITY)
    }

    fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    fn displacement(&self) -> Real {
        self.displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;
    use ql_time::TimeUnit;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn years(n: i32) -> Period {
        Period::new(n, TimeUnit::Years)
    }

    fn matrix() -> SwaptionVolatilityMatrix {
        SwaptionVolatilityMatrix::new(
            today(),
            Calendar::WeekendsOnly,
            BusinessDayConvention::ModifiedFollowing,
            &[years(1), years(5)],
            &[years(2), years(10)],
            &[vec![0.0080, 0.0070], vec![0.0090, 0.0075]],
            DayCounter::Actual365Fixed,
            VolatilityType::Normal,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn matrix_nodes_and_interpolation() {
        let m = matrix();
        assert_abs_diff_eq!(m.volatility_tenor(years(1), years(2), 0.03, false).unwrap(), 0.0080, epsilon = 1e-14);
        assert_abs_diff_eq!(m.volatility_tenor(years(5), years(10), 0.03, false).unwrap(), 0.0075, epsilon = 1e-14);
        let t1 = m.time_from_reference(m.expiries()[0]);
        assert_abs_diff_eq!(m.volatility(t1, 6.0, 0.03, false).unwrap(), 0.0075, epsilon = 1e-14);
    }

    #[test]
    fn swap_length_out_of_range() {
        let m = matrix();
        assert_eq!(m.volatility(2.0, 30.0, 0.03, false).unwrap_err().kind(), ErrorKind::Domain);
        assert_abs_diff_eq!(m.volatility(2.0, 30.0, 0.03, true).unwrap(), m.volatility(2.0, 10.0, 0.03, false).unwrap());
        assert_eq!(m.volatility(2.0, 0.0, 0.03, true).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn constant_volatility() {
        let v = ConstantSwaptionVolatility::new(today(), 0.2, DayCounter::Actual365Fixed, VolatilityType::ShiftedLognormal, 0.02);
        assert_abs_diff_eq!(v.volatility(7.0, 20.0, -0.01, false).unwrap(), 0.2);
        assert_abs_diff_eq!(v.displacement(), 0.02);
    }
}
