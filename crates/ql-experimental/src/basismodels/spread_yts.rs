//! `SpreadYTS` — a blend of two curves in discount space (translates
//! `ql/experimental/basismodels/spreadyieldtermstructure.hpp`).

use ql_core::{errors::Result, DiscountFactor, Real, Time};
use ql_termstructures::{TermStructure, YieldTermStructure};
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;

/// `D(t) = D_base(t)·(D_sprd(t)/D_base(t))^alpha`.
///
/// With `alpha = 0` this is the base curve; with `alpha = 1` it is the
/// spread curve, so the zero-rate spread between the two is fully applied.
///
/// Corresponds to `QuantLib::SpreadYTS`.
#[derive(Debug, Clone)]
pub struct SpreadYTS {
    base: Arc<dyn YieldTermStructure>,
    sprd: Arc<dyn YieldTermStructure>,
    alpha: Real,
}

impl SpreadYTS {
    /// Blend `base` towards `sprd` by `alpha`.
    ///
    /// # Errors
    /// A configuration error when the curves have different reference
    /// dates.
    pub fn new(base: Arc<dyn YieldTermStructure>, sprd: Arc<dyn YieldTermStructure>, alpha: Real) -> Result<Self> {
        ql_core::ensure!(
            base.reference_date() == sprd.reference_date(),
            "reference-date mismatch: base curve {} vs spread curve {}",
            base.reference_date(),
            sprd.reference_date()
        );
        ql_core::ensure!(alpha.is_finite(), "alpha must be finite, got {alpha}");
        Ok(Self { base, sprd, alpha })
    }

    /// The base curve.
    pub fn base(&self) -> &Arc<dyn YieldTermStructure> {
        &self.base
    }

    /// The spread curve.
    pub fn sprd(&self) -> &Arc<dyn YieldTermStructure> {
        &self.sprd
    }

    /// The blend exponent.
    pub fn alpha(&self) -> Real {
        self.alpha
    }
}

impl TermStructure for SpreadYTS {
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
        self.base.max_date().min(self.sprd.max_date())
    }

    fn max_time(&self) -> Time {
        self.base.max_time().min(self.sprd.max_time())
    }

    fn allows_extrapolation(&self) -> bool {
        self.base.allows_extrapolation() && self.sprd.allows_extrapolation()
    }
}

impl YieldTermStructure for SpreadYTS {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        let base = self.base.discount_with(t, true)?;
        if self.alpha == 0.0 {
            return Ok(base);
        }
        let sprd = self.sprd.discount_with(t, true)?;
        ql_core::ensure_domain!(base > 0.0 && sprd > 0.0, "non-positive discount factor at t = {t}");
        Ok(base * (sprd / base).powf(self.alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;
    use ql_termstructures::FlatForward;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn half_blend_averages_zero_rates() {
        let today = date(2025, 1, 2);
        let base: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.02, DayCounter::Actual365Fixed));
        let sprd: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed));
        let curve = SpreadYTS::new(base, sprd, 0.5).unwrap();
        assert_abs_diff_eq!(curve.discount(4.0).unwrap(), (-0.025_f64 * 4.0).exp(), epsilon = 1e-14);
    }

    #[test]
    fn mismatched_reference_dates_are_rejected() {
        let base: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(date(2025, 1, 2), 0.02, DayCounter::Actual365Fixed));
        let sprd: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(date(2025, 1, 3), 0.03, DayCounter::Actual365Fixed));
        let err = SpreadYTS::new(base, sprd, 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("reference-date mismatch"));
    }
}
