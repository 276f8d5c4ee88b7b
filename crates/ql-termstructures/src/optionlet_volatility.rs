//! Caplet/floorlet volatility structures (translates
//! `ql/termstructures/volatility/optionlet/optionletvolatilitystructure.hpp`,
//! `constantoptionletvol.hpp` and `strippedoptionlet.hpp`).

use crate::term_structure::{TermStructure, TermStructureBase};
use crate::volatility_term_structure::{VolatilityTermStructure, VolatilityType};
use ql_core::{errors::Result, Rate, Real, Time, Volatility};
use ql_math::BilinearInterpolation;
use ql_quotes::QuoteHandle;
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Period};

/// Volatility of single-period caplets and floorlets by expiry and strike.
///
/// Corresponds to `QuantLib::OptionletVolatilityStructure`.
pub trait OptionletVolatilityStructure: VolatilityTermStructure {
    /// Volatility without range checks.
    fn volatility_impl(&self, t: Time, strike: Rate) -> Result<Volatility>;

    /// Quotation of the volatilities.
    fn volatility_type(&self) -> VolatilityType {
        VolatilityType::ShiftedLognormal
    }

    /// Shift applied to forwards and strikes for shifted-lognormal quotes.
    fn displacement(&self) -> Real {
        0.0
    }

    /// Range-checked volatility at option time `t`.
    fn volatility(&self, t: Time, strike: Rate, extrapolate: bool) -> Result<Volatility> {
        self.check_range(t, extrapolate)?;
        self.check_strike(strike, extrapolate)?;
        self.volatility_impl(t, strike)
    }

    /// Range-checked volatility for an expiry date.
    fn volatility_date(&self, expiry: Date, strike: Rate, extrapolate: bool) -> Result<Volatility> {
        self.check_range_date(expiry, extrapolate)?;
        self.volatility(self.time_from_reference(expiry), strike, true)
    }

    /// Total variance `σ²·t`.
    fn black_variance(&self, t: Time, strike: Rate, extrapolate: bool) -> Result<Real> {
        let vol = self.volatility(t, strike, extrapolate)?;
        Ok(vol * vol * t)
    }
}

// ── ConstantOptionletVolatility ───────────────────────────────────────────────

/// Flat optionlet volatility read from a quote.
///
/// Corresponds to `QuantLib::ConstantOptionletVolatility`.
#[derive(Debug, Clone)]
pub struct ConstantOptionletVolatility {
    base: TermStructureBase,
    volatility: QuoteHandle,
    volatility_type: VolatilityType,
    displacement: Real,
}

impl ConstantOptionletVolatility {
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

impl TermStructure for ConstantOptionletVolatility {
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

impl VolatilityTermStructure for ConstantOptionletVolatility {}

impl OptionletVolatilityStructure for ConstantOptionletVolatility {
    fn volatility_impl(&self, _t: Time, _strike: Rate) -> Result<Volatility> {
        self.volatility.value()
    }

    fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    fn displacement(&self) -> Real {
        self.displacement
    }
}

// ── OptionletVolatilityGrid ───────────────────────────────────────────────────

/// Optionlet volatilities on an expiry × strike grid, bilinear inside and
/// flat outside.
#[derive(Debug, Clone)]
pub struct OptionletVolatilityGrid {
    base: TermStructureBase,
    expiries: Vec<Date>,
    interpolation: BilinearInterpolation,
    volatility_type: VolatilityType,
    displacement: Real,
}

impl OptionletVolatilityGrid {
    /// Build from expiry dates, strikes and `volatilities[expiry][strike]`.
    ///
    /// # Errors
    /// Expiries not strictly after the reference date or not increasing,
    /// unsorted strikes, a ragged grid, or negative volatilities.
    pub fn new(
        reference_date: Date,
        expiries: Vec<Date>,
        strikes: Vec<Rate>,
        volatilities: &[Vec<Volatility>],
        day_counter: DayCounter,
        volatility_type: VolatilityType,
        displacement: Real,
    ) -> Result<Self> {
        ql_core::ensure!(
            expiries.first().is_some_and(|&d| d > reference_date),
            "first expiry must be after the reference date {reference_date}"
        );
        ql_core::ensure!(
            volatilities.len() == expiries.len() && volatilities.iter().all(|row| row.len() == strikes.len()),
            "volatility grid must be {} expiries × {} strikes",
            expiries.len(),
            strikes.len()
        );
        ql_core::ensure!(
            volatilities.iter().flatten().all(|&v| v >= 0.0),
            "negative volatility in grid"
        );
        let times: Vec<Time> = expiries
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        let mut z = vec![0.0; times.len() * strikes.len()];
        for (i, row) in volatilities.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                z[j * times.len() + i] = v;
            }
        }
        let interpolation = BilinearInterpolation::new(&times, &strikes, &z)?;
        Ok(Self {
            base: TermStructureBase::new(reference_date, Calendar::Null, day_counter),
            expiries,
            interpolation,
            volatility_type,
            displacement,
        })
    }

    /// As [`new`](Self::new) with expiries given as option tenors.
    ///
    /// # Errors
    /// As for [`new`](Self::new).
    #[allow(clippy::too_many_arguments)]
    pub fn from_tenors(
        reference_date: Date,
        calendar: Calendar,
        convention: BusinessDayConvention,
        option_tenors: &[Period],
        strikes: Vec<Rate>,
        volatilities: &[Vec<Volatility>],
        day_counter: DayCounter,
        volatility_type: VolatilityType,
        displacement: Real,
    ) -> Result<Self> {
        let expiries = option_tenors
            .iter()
            .map(|&p| calendar.advance_period(reference_date, p, convention, false))
            .collect();
        Ok(Self::new(
            reference_date,
            expiries,
            strikes,
            volatilities,
            day_counter,
            volatility_type,
            displacement,
        )?
        .with_calendar(calendar))
    }

    /// Set the calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.base.calendar = calendar;
        self
    }

    /// Allow queries outside the grid (flat).
    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.base.extrapolate = extrapolate;
        self
    }

    /// Grid expiries.
    pub fn expiries(&self) -> &[Date] {
        &self.expiries
    }

    /// Grid strikes.
    pub fn strikes(&self) -> &[Rate] {
        self.interpolation.ys()
    }
}

impl TermStructure for OptionletVolatilityGrid {
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

impl VolatilityTermStructure for OptionletVolatilityGrid {
    fn min_strike(&self) -> Real {
        self.strikes().first().copied().unwrap_or(Real::NEG_INFINITY)
    }

    fn max_strike(&self) -> Real {
        self.strikes().last().copied().unwrap_or(Real::INFINITY)
    }
}

impl OptionletVolatilityStructure for OptionletVolatilityGrid {
    fn volatility_impl(&self, t: Time, strike: Rate) -> Result<Volatility> {
        Ok(self.interpolation.value(t, strike))
    }

    fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    fn displacement(&self) -> Real {
        self.displacement
    }
}
