//! Correlation between forward rates of different fixing times, used to
//! recombine single-period volatilities (translates the correlation
//! structures of `ql/experimental/basismodels/tenoroptionletvts.hpp`).

use ql_core::{errors::Result, Real, Time};
use ql_math::{Interpolation1D, LinearInterpolation};
use std::fmt;
use std::sync::Arc;

/// Correlation `ρ(s, t)` between rates starting at times `s` and `t`.
///
/// Corresponds to `QuantLib::TenorOptionletVTS::CorrelationStructure`.
pub trait CorrelationStructure: fmt::Debug + Send + Sync {
    /// Correlation between rates starting at `start1` and `start2`.
    ///
    /// # Errors
    /// A domain error when the value falls outside `[−1, 1]`.
    fn correlation(&self, start1: Time, start2: Time) -> Result<Real>;
}

fn checked(rho: Real, start1: Time, start2: Time) -> Result<Real> {
    ql_core::ensure_domain!(
        (-1.0..=1.0).contains(&rho),
        "correlation {rho} between start times {start1} and {start2} is outside [-1, 1]"
    );
    Ok(rho)
}

// ── TwoParameterCorrelation ───────────────────────────────────────────────────

/// `ρ(s, t) = ρ∞(u) + (1 − ρ∞(u))·exp(−β(u)·|s − t|)` with `u = min(s, t)`.
///
/// `ρ∞` and `β` are interpolations in time, held flat outside their range.
///
/// Corresponds to `QuantLib::TenorOptionletVTS::TwoParameterCorrelation`.
#[derive(Debug, Clone)]
pub struct TwoParameterCorrelation {
    rho_inf: Arc<dyn Interpolation1D>,
    beta: Arc<dyn Interpolation1D>,
}

impl TwoParameterCorrelation {
    /// From interpolations of the long-run correlation and the decay.
    pub fn new(rho_inf: Arc<dyn Interpolation1D>, beta: Arc<dyn Interpolation1D>) -> Self {
        Self { rho_inf, beta }
    }

    /// Linear interpolation of `rho_inf` and `beta` over `times`.
    ///
    /// # Errors
    /// Invalid interpolation inputs.
    pub fn linear(times: &[Time], rho_inf: &[Real], beta: &[Real]) -> Result<Self> {
        Ok(Self::new(
            Arc::new(LinearInterpolation::new(times, rho_inf)?),
            Arc::new(LinearInterpolation::new(times, beta)?),
        ))
    }

    fn flat(interpolation: &dyn Interpolation1D, t: Time) -> Real {
        interpolation.operator(t.clamp(interpolation.x_min(), interpolation.x_max()))
    }
}

impl CorrelationStructure for TwoParameterCorrelation {
    fn correlation(&self, start1: Time, start2: Time) -> Result<Real> {
        let u = start1.min(start2);
        let rho_inf = Self::flat(self.rho_inf.as_ref(), u);
        let beta = Self::flat(self.beta.as_ref(), u);
        let rho = rho_inf + (1.0 - rho_inf) * (-beta * (start1 - start2).abs()).exp();
        checked(rho, start1, start2)
    }
}

// ── ConstantCorrelation ───────────────────────────────────────────────────────

/// The same correlation between any two distinct start times; one on the
/// diagonal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantCorrelation {
    rho: Real,
}

impl ConstantCorrelation {
    /// A constant correlation.
    ///
    /// # Errors
    /// A domain error outside `[−1, 1]`.
    pub fn new(rho: Real) -> Result<Self> {
        ql_core::ensure_domain!((-1.0..=1.0).contains(&rho), "correlation {rho} is outside [-1, 1]");
        Ok(Self { rho })
    }

    /// The value.
    pub fn rho(&self) -> Real {
        self.rho
    }
}

impl CorrelationStructure for ConstantCorrelation {
    fn correlation(&self, start1: Time, start2: Time) -> Result<Real> {
        Ok(if start1 == start2 { 1.0 } else { self.rho })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;

    #[test]
    fn decays_towards_the_long_run_level() {
        let corr = TwoParameterCorrelation::linear(&[0.0, 10.0], &[0.3, 0.5], &[0.1, 0.1]).unwrap();
        assert_abs_diff_eq!(corr.correlation(2.0, 2.0).unwrap(), 1.0, epsilon = 1e-15);
        let rho_inf = 0.3 + 0.2 * 0.2;
        let expected = rho_inf + (1.0 - rho_inf) * (-0.1_f64 * 3.0).exp();
        assert_abs_diff_eq!(corr.correlation(5.0, 2.0).unwrap(), expected, epsilon = 1e-14);
        assert_abs_diff_eq!(
            corr.correlation(40.0, 30.0).unwrap(),
            0.5 + 0.5 * (-1.0_f64).exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn out_of_range_values_are_domain_errors() {
        let corr = TwoParameterCorrelation::linear(&[0.0, 10.0], &[-1.5, -1.5], &[1.0, 1.0]).unwrap();
        assert_eq!(corr.correlation(0.0, 5.0).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(ConstantCorrelation::new(1.2).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(ConstantCorrelation::new(0.4).unwrap().correlation(1.0, 1.0).unwrap(), 1.0);
    }
}
