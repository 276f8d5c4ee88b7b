//! `TenorOptionletVTS` — caplet volatilities for one Ibor tenor derived
//! from those of a shorter one (translates
//! `ql/experimental/basismodels/tenoroptionletvts.hpp`).
//!
//! The target-tenor forward over `[S, E]` compounds the base-tenor
//! forwards `Fₖ` of the sub-periods of `[S, E]`.  To first order
//!
//! ```text
//! dF_T = Σₖ vₖ·dFₖ,   vₖ = τₖ/τ_T · Π_j (1 + τⱼFⱼ) / (1 + τₖFₖ)
//! ```
//!
//! so in normal terms `σ_T² = Σᵢⱼ vᵢvⱼ·ρᵢⱼ·σᵢσⱼ`, each `σₖ` read from the
//! base structure at the shifted strike `Kₖ = Fₖ + (K − F_T)/Σv`.
//! Shifted-lognormal bases are converted to normal and back around the
//! recombination; the result is quoted like the base.

use super::correlation::CorrelationStructure;
use ql_core::{errors::Error, errors::Result, Rate, Real, Time, Volatility};
use ql_indexes::{IborIndex, Index};
use ql_termstructures::{
    normal_to_shifted_lognormal, shifted_lognormal_to_normal, OptionletVolatilityStructure, TermStructure,
    VolatilityTermStructure, VolatilityType, YieldTermStructure,
};
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Period};
use std::sync::Arc;

/// Forwards and weights of the decomposition at one option time.
///
/// Corresponds to `QuantLib::TenorOptionletVTS::TenorOptionletSmileSection`.
#[derive(Debug, Clone)]
pub struct TenorOptionletSmileSection {
    option_time: Time,
    forward_target: Rate,
    forwards_base: Vec<Rate>,
    weights: Vec<Real>,
    fixing_times: Vec<Time>,
    start_times: Vec<Time>,
}

impl TenorOptionletSmileSection {
    /// Option time of the target rate.
    pub fn option_time(&self) -> Time {
        self.option_time
    }

    /// Target-tenor forward.
    pub fn forward_target(&self) -> Rate {
        self.forward_target
    }

    /// Base-tenor forwards of the sub-periods.
    pub fn forwards_base(&self) -> &[Rate] {
        &self.forwards_base
    }

    /// Sensitivities `vₖ` of the target forward to the base forwards.
    pub fn weights(&self) -> &[Real] {
        &self.weights
    }

    /// Option times of the base rates.
    pub fn fixing_times(&self) -> &[Time] {
        &self.fixing_times
    }

    /// Base-tenor strikes matching a target-tenor strike.
    pub fn base_strikes(&self, strike: Rate) -> Vec<Rate> {
        let sum: Real = self.weights.iter().sum();
        self.forwards_base
            .iter()
            .map(|&f| f + (strike - self.forward_target) / sum)
            .collect()
    }
}

/// Optionlet volatilities of `targ_index` implied by a structure quoted for
/// `base_index` and a correlation between base-tenor rates.
///
/// Corresponds to `QuantLib::TenorOptionletVTS`.
#[derive(Debug, Clone)]
pub struct TenorOptionletVTS {
    base_vts: Arc<dyn OptionletVolatilityStructure>,
    base_index: Arc<IborIndex>,
    targ_index: Arc<IborIndex>,
    correlation: Arc<dyn CorrelationStructure>,
    base_curve: Arc<dyn YieldTermStructure>,
    targ_curve: Arc<dyn YieldTermStructure>,
}

impl TenorOptionletVTS {
    /// Transform `base_vts` from `base_index` to `targ_index`; both indexes
    /// forecast from their own forwarding curves.
    ///
    /// # Errors
    /// [`Error::MissingCurve`] for an index without a forwarding curve; a
    /// configuration error when the target tenor is shorter than the base.
    pub fn new(
        base_vts: Arc<dyn OptionletVolatilityStructure>,
        base_index: Arc<IborIndex>,
        targ_index: Arc<IborIndex>,
        correlation: Arc<dyn CorrelationStructure>,
    ) -> Result<Self> {
        ql_core::ensure!(
            targ_index.tenor().years() >= base_index.tenor().years(),
            "target tenor {} is shorter than base tenor {}",
            targ_index.tenor(),
            base_index.tenor()
        );
        let base_curve = forwarding(&base_index, base_vts.reference_date())?;
        let targ_curve = forwarding(&targ_index, base_vts.reference_date())?;
        Ok(Self {
            base_vts,
            base_index,
            targ_index,
            correlation,
            base_curve,
            targ_curve,
        })
    }

    /// The base structure.
    pub fn base_vts(&self) -> &Arc<dyn OptionletVolatilityStructure> {
        &self.base_vts
    }

    /// The index the base structure is quoted for.
    pub fn base_index(&self) -> &Arc<IborIndex> {
        &self.base_index
    }

    /// The index volatilities are produced for.
    pub fn targ_index(&self) -> &Arc<IborIndex> {
        &self.targ_index
    }

    /// The decomposition of the target rate fixing at option time `t`.
    ///
    /// # Errors
    /// Range errors from the forwarding curves.
    pub fn smile_section(&self, t: Time) -> Result<TenorOptionletSmileSection> {
        let reference = self.reference_date();
        let fixing = option_date(reference, self.day_counter(), self.targ_index.fixing_calendar(), t);
        let start = self.targ_index.value_date(fixing);
        let end = self.targ_index.maturity_date(start);
        let forward_target = self.targ_index.forecast_fixing_on(self.targ_curve.as_ref(), start, end)?;
        let tau_target = self.targ_index.day_counter().year_fraction(start, end);

        let dates = sub_periods(&self.base_index, start, end);
        let base_dc = self.base_index.day_counter();
        let mut forwards_base = Vec::with_capacity(dates.len() - 1);
        let mut taus = Vec::with_capacity(dates.len() - 1);
        let mut fixing_times = Vec::with_capacity(dates.len() - 1);
        let mut start_times = Vec::with_capacity(dates.len() - 1);
        for pair in dates.windows(2) {
            let (s, e) = (pair[0], pair[1]);
            forwards_base.push(self.base_index.forecast_fixing_on(self.base_curve.as_ref(), s, e)?);
            taus.push(base_dc.year_fraction(s, e));
            let base_fixing = self.base_index.fixing_date(s);
            fixing_times.push(t + self.day_counter().year_fraction(fixing, base_fixing));
            start_times.push(self.time_from_reference(s));
        }
        let growth: Real = taus
            .iter()
            .zip(&forwards_base)
            .map(|(tau, f)| 1.0 + tau * f)
            .product();
        let weights = taus
            .iter()
            .zip(&forwards_base)
            .map(|(tau, f)| tau / tau_target * growth / (1.0 + tau * f))
            .collect();
        Ok(TenorOptionletSmileSection {
            option_time: t,
            forward_target,
            forwards_base,
            weights,
            fixing_times,
            start_times,
        })
    }

    fn normal_from_base(&self, volatility: Volatility, forward: Rate, strike: Rate) -> Result<Volatility> {
        match self.base_vts.volatility_type() {
            VolatilityType::Normal => Ok(volatility),
            VolatilityType::ShiftedLognormal => {
                shifted_lognormal_to_normal(volatility, forward, strike, self.base_vts.displacement())
            }
        }
    }

    fn base_from_normal(&self, volatility: Volatility, forward: Rate, strike: Rate) -> Result<Volatility> {
        match self.base_vts.volatility_type() {
            VolatilityType::Normal => Ok(volatility),
            VolatilityType::ShiftedLognormal => {
                normal_to_shifted_lognormal(volatility, forward, strike, self.base_vts.displacement())
            }
        }
    }
}

/// The forwarding curve of `index`, which must exist.
pub(crate) fn forwarding(index: &IborIndex, date: Date) -> Result<Arc<dyn YieldTermStructure>> {
    index.forwarding_curve().cloned().ok_or_else(|| Error::MissingCurve {
        curve: format!("{} forwarding", index.name()),
        date: date.to_string(),
    })
}

/// The business day closest to option time `t`.
pub(crate) fn option_date(reference: Date, day_counter: DayCounter, calendar: &Calendar, t: Time) -> Date {
    let one_day = day_counter.year_fraction(reference, reference + 1);
    let days = (t / one_day).round() as i64;
    calendar.adjust(reference + days, BusinessDayConvention::Following)
}

/// `start, start + 1·tenor, start + 2·tenor, …` on the index's conventions,
/// closed by `end`.
fn sub_periods(index: &IborIndex, start: Date, end: Date) -> Vec<Date> {
    let tenor = index.tenor();
    let mut dates = vec![start];
    let mut k = 1;
    loop {
        let next = index.fixing_calendar().advance_period(
            start,
            Period::new(k * tenor.length, tenor.unit),
            index.business_day_convention(),
            index.end_of_month(),
        );
        if next >= end || tenor.length <= 0 {
            break;
        }
        dates.push(next);
        k += 1;
    }
    dates.push(end);
    dates
}

impl TermStructure for TenorOptionletVTS {
    fn reference_date(&self) -> Date {
        self.base_vts.reference_date()
    }

    fn day_counter(&self) -> DayCounter {
        self.base_vts.day_counter()
    }

    fn calendar(&self) -> &Calendar {
        self.base_vts.calendar()
    }

    fn max_date(&self) -> Date {
        self.base_vts.max_date()
    }

    fn max_time(&self) -> Time {
        self.base_vts.max_time()
    }

    fn allows_extrapolation(&self) -> bool {
        self.base_vts.allows_extrapolation()
    }
}

impl VolatilityTermStructure for TenorOptionletVTS {
    fn business_day_convention(&self) -> BusinessDayConvention {
        self.base_vts.business_day_convention()
    }
}

impl OptionletVolatilityStructure for TenorOptionletVTS {
    fn volatility_impl(&self, t: Time, strike: Rate) -> Result<Volatility> {
        let section = self.smile_section(t)?;
        let strikes = section.base_strikes(strike);
        let mut normal = Vec::with_capacity(strikes.len());
        for (k, &base_strike) in strikes.iter().enumerate() {
            let vol = self.base_vts.volatility(section.fixing_times[k], base_strike, true)?;
            normal.push(self.normal_from_base(vol, section.forwards_base[k], base_strike)?);
        }
        let mut variance = 0.0;
        for i in 0..normal.len() {
            for j in 0..normal.len() {
                let rho = self
                    .correlation
                    .correlation(section.start_times[i], section.start_times[j])?;
                variance += section.weights[i] * section.weights[j] * rho * normal[i] * normal[j];
            }
        }
        let vol = variance.max(0.0).sqrt();
        self.base_from_normal(vol, section.forward_target, strike)
    }

    fn volatility_type(&self) -> VolatilityType {
        self.base_vts.volatility_type()
    }

    fn displacement(&self) -> Real {
        self.base_vts.displacement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basismodels::correlation::ConstantCorrelation;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;
    use ql_indexes::euribor;
    use ql_termstructures::{ConstantOptionletVolatility, FlatForward};
    use ql_time::TimeUnit;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn index(months: i32) -> Arc<IborIndex> {
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today(), 0.03, DayCounter::Actual365Fixed));
        Arc::new(euribor(Period::new(months, TimeUnit::Months)).with_forwarding(curve))
    }

    fn normal_base(vol: Volatility) -> Arc<dyn OptionletVolatilityStructure> {
        Arc::new(ConstantOptionletVolatility::new(
            today(),
            vol,
            DayCounter::Actual365Fixed,
            VolatilityType::Normal,
            0.0,
        ))
    }

    #[test]
    fn two_periods_make_one_six_month_rate() {
        let vts = TenorOptionletVTS::new(
            normal_base(0.01),
            index(3),
            index(6),
            Arc::new(ConstantCorrelation::new(1.0).unwrap()),
        )
        .unwrap();
        let section = vts.smile_section(2.0).unwrap();
        assert_eq!(section.weights().len(), 2);
        let sum: Real = section.weights().iter().sum();
        assert!(sum > 1.0 && sum < 1.01, "weights sum {sum}");
        // perfectly correlated normal vols add up through the weights
        let vol = vts.volatility(2.0, 0.03, false).unwrap();
        assert_abs_diff_eq!(vol, 0.01 * sum, epsilon = 1e-14);
    }

    #[test]
    fn decorrelation_lowers_volatility() {
        let build = |rho: Real| {
            TenorOptionletVTS::new(
                normal_base(0.01),
                index(3),
                index(12),
                Arc::new(ConstantCorrelation::new(rho).unwrap()),
            )
            .unwrap()
        };
        let full = build(1.0).volatility(3.0, 0.03, false).unwrap();
        let partial = build(0.5).volatility(3.0, 0.03, false).unwrap();
        let none = build(0.0).volatility(3.0, 0.03, false).unwrap();
        assert!(full > partial && partial > none && none > 0.0);
    }

    #[test]
    fn indexes_need_forwarding_curves() {
        let err = TenorOptionletVTS::new(
            normal_base(0.01),
            Arc::new(euribor(Period::new(3, TimeUnit::Months))),
            index(6),
            Arc::new(ConstantCorrelation::new(1.0).unwrap()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingCurve { .. }));
        let err = TenorOptionletVTS::new(
            normal_base(0.01),
            index(6),
            index(3),
            Arc::new(ConstantCorrelation::new(1.0).unwrap()),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
