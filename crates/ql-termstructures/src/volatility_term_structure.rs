//! `VolatilityTermStructure` — base trait for volatility term structures
//! (translates `ql/termstructures/voltermstructure.hpp`), together with the
//! quotation convention of interest-rate volatilities
//! (`ql/termstructures/volatility/volatilitytype.hpp`).

use crate::term_structure::TermStructure;
use ql_core::{errors::Error, errors::Result, Rate, Real, Volatility};
use ql_time::{BusinessDayConvention, Date, Period};
use std::fmt;
use std::str::FromStr;

/// Base trait for all volatility term structures.
///
/// Corresponds to `QuantLib::VolatilityTermStructure`.
pub trait VolatilityTermStructure: TermStructure {
    /// The business-day convention used for option-expiry adjustments.
    fn business_day_convention(&self) -> BusinessDayConvention {
        BusinessDayConvention::Following
    }

    /// The minimum strike for which the term structure is defined.
    fn min_strike(&self) -> Real {
        Real::NEG_INFINITY
    }

    /// The maximum strike for which the term structure is defined.
    fn max_strike(&self) -> Real {
        Real::INFINITY
    }

    /// Expiry date of an option with the given tenor.
    fn option_date_from_tenor(&self, tenor: Period) -> Date {
        self.calendar()
            .advance_period(self.reference_date(), tenor, self.business_day_convention(), false)
    }

    /// Check that `strike` lies in the structure's strike range.
    ///
    /// # Errors
    /// A domain error outside the range unless `extrapolate`.
    fn check_strike(&self, strike: Rate, extrapolate: bool) -> Result<()> {
        ql_core::ensure_domain!(
            extrapolate
                || self.allows_extrapolation()
                || (strike >= self.min_strike() && strike <= self.max_strike()),
            "strike ({strike}) is outside the curve domain [{}, {}]",
            self.min_strike(),
            self.max_strike()
        );
        Ok(())
    }
}

// ── Volatility type ───────────────────────────────────────────────────────────

/// How an interest-rate volatility is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolatilityType {
    /// Black volatility of the rate shifted by a displacement.
    #[default]
    ShiftedLognormal,
    /// Bachelier (absolute) volatility.
    Normal,
}

impl fmt::Display for VolatilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolatilityType::ShiftedLognormal => "ShiftedLognormal",
            VolatilityType::Normal => "Normal",
        })
    }
}

impl FromStr for VolatilityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shiftedlognormal" | "lognormal" | "black" => Ok(VolatilityType::ShiftedLognormal),
            "normal" | "bachelier" => Ok(VolatilityType::Normal),
            _ => Err(Error::Configuration(format!("unknown volatility type '{s}'"))),
        }
    }
}

/// Approximate normal volatility equivalent to a shifted-lognormal one,
/// `σ_N ≈ σ_LN·√((F+s)(K+s))`.
///
/// # Errors
/// A domain error when the shifted forward or strike is not positive.
pub fn shifted_lognormal_to_normal(
    volatility: Volatility,
    forward: Rate,
    strike: Rate,
    displacement: Real,
) -> Result<Volatility> {
    let (f, k) = (forward + displacement, strike + displacement);
    ql_core::ensure_domain!(
        f > 0.0 && k > 0.0,
        "shifted forward ({f}) and strike ({k}) must be positive"
    );
    Ok(volatility * (f * k).sqrt())
}

/// Inverse of [`shifted_lognormal_to_normal`].
///
/// # Errors
/// A domain error when the shifted forward or strike is not positive.
pub fn normal_to_shifted_lognormal(
    volatility: Volatility,
    forward: Rate,
    strike: Rate,
    displacement: Real,
) -> Result<Volatility> {
    let (f, k) = (forward + displacement, strike + displacement);
    ql_core::ensure_domain!(
        f > 0.0 && k > 0.0,
        "shifted forward ({f}) and strike ({k}) must be positive"
    );
    Ok(volatility / (f * k).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;

    #[test]
    fn conversions_invert_each_other() {
        let n = shifted_lognormal_to_normal(0.2, 0.03, 0.025, 0.01).unwrap();
        assert_abs_diff_eq!(n, 0.2 * (0.04_f64 * 0.035).sqrt(), epsilon = 1e-15);
        let ln = normal_to_shifted_lognormal(n, 0.03, 0.025, 0.01).unwrap();
        assert_abs_diff_eq!(ln, 0.2, epsilon = 1e-14);
        assert_eq!(
            shifted_lognormal_to_normal(0.2, -0.02, 0.01, 0.0).unwrap_err().kind(),
            ErrorKind::Domain
        );
    }

    #[test]
    fn parses_types() {
        assert_eq!("Normal".parse::<VolatilityType>().unwrap(), VolatilityType::Normal);
        assert_eq!("lognormal".parse::<VolatilityType>().unwrap(), VolatilityType::ShiftedLognormal);
        assert!("SABR".parse::<VolatilityType>().is_err());
    }
}
