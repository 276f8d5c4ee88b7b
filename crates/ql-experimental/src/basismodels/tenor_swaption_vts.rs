//! `TenorSwaptionVTS` — swaption volatilities for swaps on one Ibor tenor
//! derived from those quoted for another (translates
//! `ql/experimental/basismodels/tenorswaptionvts.hpp`).
//!
//! Both swaps share start, end and discounting.  Their floating legs
//! differ by a deterministic basis, so with `λ = A_B/A_T` the target swap
//! rate is `S_T = λ·S_B + b`, `b = S_T − λ·S_B`, and in normal terms
//!
//! ```text
//! σ_T(K) = λ·σ_B((K − b)/λ)
//! ```

use super::tenor_optionlet_vts::{forwarding, option_date};
use ql_core::{errors::Result, Rate, Real, Time, Volatility};
use ql_indexes::{IborIndex, Index};
use ql_termstructures::{
    normal_to_shifted_lognormal, shifted_lognormal_to_normal, SwaptionVolatilityStructure, TermStructure,
    VolatilityTermStructure, VolatilityType, YieldTermStructure,
};
use ql_time::{BusinessDayConvention, Calendar, Date, DateGeneration, DayCounter, Period, ScheduleBuilder, TimeUnit};
use std::sync::Arc;

/// Swap rates and annuities of the two swaps at one expiry and length.
///
/// Corresponds to `QuantLib::TenorSwaptionVTS::TenorSwaptionSmileSection`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TenorSwaptionSmileSection {
    /// Option time.
    pub option_time: Time,
    /// Swap length in years.
    pub swap_length: Time,
    /// Par rate of the base-tenor swap.
    pub swap_rate_base: Rate,
    /// Par rate of the target-tenor swap.
    pub swap_rate_targ: Rate,
    /// Fixed-leg annuity of the base-tenor swap.
    pub annuity_base: Real,
    /// Fixed-leg annuity of the target-tenor swap.
    pub annuity_targ: Real,
}

impl TenorSwaptionSmileSection {
    /// `A_B/A_T`.
    pub fn lambda(&self) -> Real {
        self.annuity_base / self.annuity_targ
    }

    /// `S_T − λ·S_B`.
    pub fn basis(&self) -> Rate {
        self.swap_rate_targ - self.lambda() * self.swap_rate_base
    }

    /// Base-swap strike matching a target-swap strike.
    pub fn base_strike(&self, strike: Rate) -> Rate {
        (strike - self.basis()) / self.lambda()
    }
}

/// Fixed-leg conventions of one swap family.
#[derive(Debug, Clone)]
struct SwapConventions {
    index: Arc<IborIndex>,
    curve: Arc<dyn YieldTermStructure>,
    fixed_tenor: Period,
    fixed_day_counter: DayCounter,
}

impl SwapConventions {
    /// Par rate and annuity of the swap over `[start, end]`.
    fn rate_and_annuity(&self, discount: &dyn YieldTermStructure, start: Date, end: Date) -> Result<(Rate, Real)> {
        let index = &self.index;
        let schedule = |tenor: Period| {
            ScheduleBuilder::new(start, end, tenor, index.fixing_calendar().clone())
                .with_convention(index.business_day_convention())
                .with_termination_convention(index.business_day_convention())
                .with_rule(DateGeneration::Backward)
                .build()
        };
        let mut annuity = 0.0;
        for (s, e) in schedule(self.fixed_tenor)?.periods() {
            annuity += self.fixed_day_counter.year_fraction(s, e) * discount.discount_date(e)?;
        }
        let mut floating = 0.0;
        for (s, e) in schedule(index.tenor())?.periods() {
            let forward = index.forecast_fixing_on(self.curve.as_ref(), s, e)?;
            floating += forward * index.day_counter().year_fraction(s, e) * discount.discount_date(e)?;
        }
        ql_core::ensure_domain!(annuity > 0.0, "swap {start}..{end} has no fixed-leg annuity");
        Ok((floating / annuity, annuity))
    }
}

/// Swaption volatilities for swaps against `targ_index` implied by a
/// structure quoted for swaps against `base_index`.
///
/// Corresponds to `QuantLib::TenorSwaptionVTS`.
#[derive(Debug, Clone)]
pub struct TenorSwaptionVTS {
    base_vts: Arc<dyn SwaptionVolatilityStructure>,
    discount_curve: Arc<dyn YieldTermStructure>,
    base: SwapConventions,
    targ: SwapConventions,
}

impl TenorSwaptionVTS {
    /// Transform `base_vts`; both indexes forecast from their own
    /// forwarding curves, both swaps discount on `discount_curve`.
    ///
    /// # Errors
    /// [`ql_core::Error::MissingCurve`] for an index without a forwarding
    /// curve.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_vts: Arc<dyn SwaptionVolatilityStructure>,
        discount_curve: Arc<dyn YieldTermStructure>,
        base_index: Arc<IborIndex>,
        targ_index: Arc<IborIndex>,
        base_fixed_tenor: Period,
        targ_fixed_tenor: Period,
        base_fixed_day_counter: DayCounter,
        targ_fixed_day_counter: DayCounter,
    ) -> Result<Self> {
        let reference = base_vts.reference_date();
        let base = SwapConventions {
            curve: forwarding(&base_index, reference)?,
            index: base_index,
            fixed_tenor: base_fixed_tenor,
            fixed_day_counter: base_fixed_day_counter,
        };
        let targ = SwapConventions {
            curve: forwarding(&targ_index, reference)?,
            index: targ_index,
            fixed_tenor: targ_fixed_tenor,
            fixed_day_counter: targ_fixed_day_counter,
        };
        Ok(Self {
            base_vts,
            discount_curve,
            base,
            targ,
        })
    }

    /// The base structure.
    pub fn base_vts(&self) -> &Arc<dyn SwaptionVolatilityStructure> {
        &self.base_vts
    }

    /// The two swaps behind an option time and swap length.
    ///
    /// # Errors
    /// A domain error for swap lengths under a month; curve range errors.
    pub fn smile_section(&self, t: Time, swap_length: Time) -> Result<TenorSwaptionSmileSection> {
        let months = (swap_length * 12.0).round() as i32;
        ql_core::ensure_domain!(months >= 1, "swap length ({swap_length}) is shorter than a month");
        let expiry = option_date(
            self.reference_date(),
            self.day_counter(),
            self.targ.index.fixing_calendar(),
            t,
        );
        let start = self.targ.index.value_date(expiry);
        let end = start.advance(months, TimeUnit::Months);
        let discount = self.discount_curve.as_ref();
        let (swap_rate_base, annuity_base) = self.base.rate_and_annuity(discount, start, end)?;
        let (swap_rate_targ, annuity_targ) = self.targ.rate_and_annuity(discount, start, end)?;
        Ok(TenorSwaptionSmileSection {
            option_time: t,
            swap_length,
            swap_rate_base,
            swap_rate_targ,
            annuity_base,
            annuity_targ,
        })
    }
}

impl TermStructure for TenorSwaptionVTS {
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

impl VolatilityTermStructure for TenorSwaptionVTS {
    fn business_day_convention(&self) -> BusinessDayConvention {
        self.base_vts.business_day_convention()
    }
}

impl SwaptionVolatilityStructure for TenorSwaptionVTS {
    fn volatility_impl(&self, t: Time, swap_length: Time, strike: Rate) -> Result<Volatility> {
        let section = self.smile_section(t, swap_length)?;
        let lambda = section.lambda();
        let base_strike = section.base_strike(strike);
        let base_vol = self.base_vts.volatility(t, swap_length, base_strike, true)?;
        match self.base_vts.volatility_type() {
            VolatilityType::Normal => Ok(lambda * base_vol),
            VolatilityType::ShiftedLognormal => {
                let shift = self.base_vts.displacement();
                let normal = shifted_lognormal_to_normal(base_vol, section.swap_rate_base, base_strike, shift)?;
                normal_to_shifted_lognormal(lambda * normal, section.swap_rate_targ, strike, shift)
            }
        }
    }

    fn max_swap_length(&self) -> Time {
        self.base_vts.max_swap_length()
    }

    fn volatility_type(&self) -> VolatilityType {
        self.base_vts.volatility_type()
    }

    fn displacement(&self) -> Real {
        self.base_vts.displacement()
    }
}
