//! `QuantoTermStructure` — quanto-adjusted dividend yield
//! (translates `ql/termstructures/yield/quantotermstructure.hpp`).

use crate::black_vol_term_structure::BlackVolTermStructure;
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{errors::Result, DiscountFactor, Real, Time};
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;

/// The dividend yield of an underlying paid in a foreign currency:
///
/// `z(t) = z_div(t) + z_rf(t) − z_frf(t) + ρ·σ_S(t, K)·σ_X(t, X_ATM)`.
///
/// The reference date, day counter and calendar are those of the
/// underlying dividend curve; the maximum date is the earliest of the inputs.
///
/// Corresponds to `QuantLib::QuantoTermStructure`.
#[derive(Debug, Clone)]
pub struct QuantoTermStructure {
    underlying_dividend: Arc<dyn YieldTermStructure>,
    risk_free: Arc<dyn YieldTermStructure>,
    foreign_risk_free: Arc<dyn YieldTermStructure>,
    underlying_vol: Arc<dyn BlackVolTermStructure>,
    strike: Real,
    fx_vol: Arc<dyn BlackVolTermStructure>,
    fx_atm_level: Real,
    correlation: Real,
}

impl QuantoTermStructure {
    /// Build the quanto-adjusted curve.
    ///
    /// # Errors
    /// A domain error if `correlation` lies outside `[−1, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        underlying_dividend: Arc<dyn YieldTermStructure>,
        risk_free: Arc<dyn YieldTermStructure>,
        foreign_risk_free: Arc<dyn YieldTermStructure>,
        underlying_vol: Arc<dyn BlackVolTermStructure>,
        strike: Real,
        fx_vol: Arc<dyn BlackVolTermStructure>,
        fx_atm_level: Real,
        correlation: Real,
    ) -> Result<Self> {
        ql_core::ensure_domain!(
            (-1.0..=1.0).contains(&correlation),
            "correlation {correlation} outside [-1, 1]"
        );
        Ok(Self {
            underlying_dividend,
            risk_free,
            foreign_risk_free,
            underlying_vol,
            strike,
            fx_vol,
            fx_atm_level,
            correlation,
        })
    }

    fn zero_yield(&self, t: Time) -> Result<Real> {
        let zero = |curve: &Arc<dyn YieldTermStructure>| -> Result<Real> {
            let t = t.max(1.0e-4);
            Ok(-curve.discount_with(t, true)?.ln() / t)
        };
        Ok(zero(&self.underlying_dividend)? + zero(&self.risk_free)? - zero(&self.foreign_risk_free)?
            + self.correlation
                * self.underlying_vol.black_vol(t, self.strike, true)?
                * self.fx_vol.black_vol(t, self.fx_atm_level, true)?)
    }
}

impl TermStructure for QuantoTermStructure {
    fn reference_date(&self) -> Date {
        self.underlying_dividend.reference_date()
    }

    fn day_counter(&self) -> DayCounter {
        self.underlying_dividend.day_counter()
    }

    fn calendar(&self) -> &Calendar {
        self.underlying_dividend.calendar()
    }

    fn max_date(&self) -> Date {
        [
            self.underlying_dividend.max_date(),
            self.risk_free.max_date(),
            self.foreign_risk_free.max_date(),
            self.underlying_vol.max_date(),
            self.fx_vol.max_date(),
        ]
        .into_iter()
        .min()
        .unwrap_or(Date::MIN)
    }
}

impl YieldTermStructure for QuantoTermStructure {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok((-self.zero_yield(t)? * t).exp())
    }
}
