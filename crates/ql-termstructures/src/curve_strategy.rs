//! The trait × interpolator matrix of interpolated yield curves (translates
//! the `Discount`/`ZeroYield`/`ForwardRate` traits of
//! `ql/termstructures/yield/bootstraptraits.hpp` and the interpolator
//! factories of `ql/math/interpolations/`).
//!
//! A [`CurveTraits`] says *what* is interpolated and an [`Interpolator`]
//! says *how*.  The pair is crossed into a single [`CurveStrategy`] through
//! [`INTERPOLATOR_TABLE`], so adding an interpolator is one table row rather
//! than a new curve type per trait.

use ql_core::{
    errors::{Error, Result},
    DiscountFactor, Real, Time,
};
use ql_math::{
    BackwardFlatInterpolation, CubicDerivativeApprox, CubicInterpolation, ForwardFlatInterpolation,
    Interpolation1D, LinearInterpolation, LogInterpolation,
};
use std::fmt;
use std::str::FromStr;

// ── Traits ────────────────────────────────────────────────────────────────────

/// The quantity stored at the nodes of an interpolated curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveTraits {
    /// Discount factors; the node at `t = 0` is 1.
    Discount,
    /// Continuously-compounded zero rates.
    ZeroYield,
    /// Instantaneous forward rates.
    ForwardRate,
}

impl CurveTraits {
    /// Host identifier.
    pub fn id(self) -> &'static str {
        match self {
            CurveTraits::Discount => "Discount",
            CurveTraits::ZeroYield => "ZeroYield",
            CurveTraits::ForwardRate => "ForwardRate",
        }
    }

    /// Node value at `t` when the forward rate is `r` over `(t_prev, t]`
    /// and the node at `t_prev` holds `previous`; seeds the bootstrap.
    pub fn extend(self, previous: Real, r: Real, t_prev: Time, t: Time) -> Real {
        match self {
            CurveTraits::Discount => previous * (-r * (t - t_prev)).exp(),
            CurveTraits::ZeroYield => (previous * t_prev + r * (t - t_prev)) / t,
            CurveTraits::ForwardRate => r,
        }
    }

    /// Search interval around `guess` for the node at `t`, as wide as a
    /// change of `width` in the forward rate over `(t_prev, t]`.
    pub fn bracket(self, guess: Real, t_prev: Time, t: Time, width: Real) -> (Real, Real) {
        match self {
            CurveTraits::Discount => {
                let dt = t - t_prev;
                (guess * (-width * dt).exp(), guess * (width * dt).exp())
            }
            CurveTraits::ZeroYield | CurveTraits::ForwardRate => (guess - width, guess + width),
        }
    }
}

impl fmt::Display for CurveTraits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CurveTraits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        [CurveTraits::Discount, CurveTraits::ZeroYield, CurveTraits::ForwardRate]
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Configuration(format!("unknown traits identifier '{s}'")))
    }
}

// ── Interpolators ─────────────────────────────────────────────────────────────

/// The interpolation scheme applied to the node values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Interpolator {
    BackwardFlat,
    ForwardFlat,
    Linear,
    LogLinear,
    CubicNaturalSpline,
    LogCubicNaturalSpline,
    MonotonicCubicNaturalSpline,
    MonotonicLogCubicNaturalSpline,
    KrugerCubic,
    KrugerLogCubic,
    FritschButlandCubic,
    FritschButlandLogCubic,
    Parabolic,
    LogParabolic,
    MonotonicParabolic,
    MonotonicLogParabolic,
}

/// How an [`Interpolator`] is realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Step function, value from the right node.
    BackwardFlat,
    /// Step function, value from the left node.
    ForwardFlat,
    /// Piecewise linear.
    Linear,
    /// Piecewise cubic with the given slopes and monotonicity filter.
    Cubic(CubicDerivativeApprox, bool),
}

/// One row of the interpolator lookup table.
#[derive(Debug, Clone, Copy)]
pub struct InterpolatorSpec {
    /// The interpolator.
    pub interpolator: Interpolator,
    /// Host identifier.
    pub id: &'static str,
    /// Underlying scheme.
    pub scheme: Scheme,
    /// Whether the scheme is applied to the logarithm of the data.
    pub log: bool,
}

macro_rules! row {
    ($variant:ident, $scheme:expr, $log:expr) => {
        InterpolatorSpec {
            interpolator: Interpolator::$variant,
            id: stringify!($variant),
            scheme: $scheme,
            log: $log,
        }
    };
}

use CubicDerivativeApprox::{FritschButland, Kruger, Parabolic as Para, Spline};

/// Every interpolator with its host identifier and realisation.
pub const INTERPOLATOR_TABLE: [InterpolatorSpec; 16] = [
    row!(BackwardFlat, Scheme::BackwardFlat, false),
    row!(ForwardFlat, Scheme::ForwardFlat, false),
    row!(Linear, Scheme::Linear, false),
    row!(LogLinear, Scheme::Linear, true),
    row!(CubicNaturalSpline, Scheme::Cubic(Spline, false), false),
    row!(LogCubicNaturalSpline, Scheme::Cubic(Spline, false), true),
    row!(MonotonicCubicNaturalSpline, Scheme::Cubic(Spline, true), false),
    row!(MonotonicLogCubicNaturalSpline, Scheme::Cubic(Spline, true), true),
    row!(KrugerCubic, Scheme::Cubic(Kruger, false), false),
    row!(KrugerLogCubic, Scheme::Cubic(Kruger, false), true),
    row!(FritschButlandCubic, Scheme::Cubic(FritschButland, false), false),
    row!(FritschButlandLogCubic, Scheme::Cubic(FritschButland, false), true),
    row!(Parabolic, Scheme::Cubic(Para, false), false),
    row!(LogParabolic, Scheme::Cubic(Para, false), true),
    row!(MonotonicParabolic, Scheme::Cubic(Para, true), false),
    row!(MonotonicLogParabolic, Scheme::Cubic(Para, true), true),
];

impl Interpolator {
    /// All interpolators, in table order.
    pub fn all() -> impl Iterator<Item = Interpolator> {
        INTERPOLATOR_TABLE.iter().map(|row| row.interpolator)
    }

    /// The table row for this interpolator.
    pub fn spec(self) -> &'static InterpolatorSpec {
        // the table is indexed by discriminant
        &INTERPOLATOR_TABLE[self as usize]
    }

    /// Host identifier.
    pub fn id(self) -> &'static str {
        self.spec().id
    }

    /// `true` for log-space schemes.
    pub fn is_log(self) -> bool {
        self.spec().log
    }

    /// `true` if a node value moves the curve beyond the segments adjacent
    /// to it, either directly (natural splines) or through the slopes of the
    /// neighbouring nodes (every cubic scheme).  Bootstrapping such curves
    /// a joint solve of all nodes.
    pub fn is_global(self) -> bool {
        matches!(self.spec().scheme, Scheme::Cubic(..))
    }

    /// `true` if every node affects the whole curve (natural splines).
    pub fn is_fully_coupled(self) -> bool {
        matches!(self.spec().scheme, Scheme::Cubic(approx, _) if approx.is_global())
    }

    /// `true` if the interpolant never leaves the range of the two
    /// bracketing node values.
    pub fn is_monotonic(self) -> bool {
        match self.spec().scheme {
            Scheme::BackwardFlat | Scheme::ForwardFlat | Scheme::Linear => true,
            Scheme::Cubic(approx, monotonic) => monotonic || approx == FritschButland,
        }
    }

    /// Minimum number of nodes for the scheme proper; with fewer nodes a
    /// bootstrap falls back to [`fallback`](Self::fallback).
    pub fn required_points(self) -> usize {
        match self.spec().scheme {
            Scheme::Cubic(..) => 3,
            _ => 2,
        }
    }

    /// The (log-)linear scheme used while too few nodes are known.
    pub fn fallback(self) -> Interpolator {
        if self.is_log() {
            Interpolator::LogLinear
        } else {
            Interpolator::Linear
        }
    }

    /// Build the interpolation of `ys` against `xs`.
    ///
    /// # Errors
    /// Invalid inputs for the scheme, e.g. non-positive data for log
    /// schemes.
    pub fn interpolate(self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>> {
        let spec = self.spec();
        Ok(match (spec.scheme, spec.log) {
            (Scheme::BackwardFlat, _) => Box::new(BackwardFlatInterpolation::new(xs, ys)?),
            (Scheme::ForwardFlat, _) => Box::new(ForwardFlatInterpolation::new(xs, ys)?),
            (Scheme::Linear, false) => Box::new(LinearInterpolation::new(xs, ys)?),
            (Scheme::Linear, true) => Box::new(LogInterpolation::log_linear(xs, ys)?),
            (Scheme::Cubic(approx, monotonic), false) => {
                Box::new(CubicInterpolation::new(xs, ys, approx, monotonic)?)
            }
            (Scheme::Cubic(approx, monotonic), true) => {
                Box::new(LogInterpolation::log_cubic(xs, ys, approx, monotonic)?)
            }
        })
    }
}

impl fmt::Display for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Interpolator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        INTERPOLATOR_TABLE
            .iter()
            .find(|row| row.id.eq_ignore_ascii_case(s.trim()))
            .map(|row| row.interpolator)
            .ok_or_else(|| Error::Configuration(format!("unknown interpolator identifier '{s}'")))
    }
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// Relative width of log-rate brackets per unit of additive width.
const LOG_RATE_BRACKET_SCALE: Real = 10.0;

/// Largest log-width of a multiplicative bracket.
const MAX_LOG_RATE_BRACKET: Real = 20.0;

/// A (traits, interpolator) pair: everything needed to turn node values
/// into discount factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveStrategy {
    /// What the nodes hold.
    pub traits: CurveTraits,
    /// How they are interpolated.
    pub interpolator: Interpolator,
}

impl CurveStrategy {
    /// Pair a traits with an interpolator.
    pub const fn new(traits: CurveTraits, interpolator: Interpolator) -> Self {
        Self {
            traits,
            interpolator,
        }
    }

    /// Parse host identifiers, e.g. `("Discount", "LogLinear")`.
    ///
    /// # Errors
    /// Unknown identifiers are configuration errors.
    pub fn from_ids(traits_id: &str, interpolator_id: &str) -> Result<Self> {
        Ok(Self::new(traits_id.parse()?, interpolator_id.parse()?))
    }

    /// Search interval around `guess` for a node between `t_prev` and `t`.
    ///
    /// Rate nodes under a log interpolator must stay positive, so their
    /// interval is multiplicative.
    pub fn bracket(&self, guess: Real, t_prev: Time, t: Time, width: Real) -> (Real, Real) {
        match self.traits {
            CurveTraits::ZeroYield | CurveTraits::ForwardRate if self.interpolator.is_log() && guess > 0.0 => {
                let factor = (LOG_RATE_BRACKET_SCALE * width).min(MAX_LOG_RATE_BRACKET).exp();
                (guess / factor, guess * factor)
            }
            _ => self.traits.bracket(guess, t_prev, t, width),
        }
    }

    /// `true` when a node only shapes the curve after its own date, so the
    /// bootstrap solves each pillar through the previous node.
    pub fn is_lagged(&self) -> bool {
        self.traits == CurveTraits::ForwardRate && self.interpolator == Interpolator::ForwardFlat
    }

    /// Discount factor at `t` from an interpolation of the node values.
    pub fn discount(&self, interpolation: &dyn Interpolation1D, t: Time) -> DiscountFactor {
        match self.traits {
            CurveTraits::Discount => interpolation.operator(t),
            CurveTraits::ZeroYield => (-interpolation.operator(t) * t).exp(),
            CurveTraits::ForwardRate => (-interpolation.primitive(t)).exp(),
        }
    }

    /// Instantaneous forward at `t` from the interpolation's value and
    /// derivative.
    pub fn forward(&self, interpolation: &dyn Interpolation1D, t: Time) -> Real {
        match self.traits {
            CurveTraits::ForwardRate => interpolation.operator(t),
            CurveTraits::ZeroYield => interpolation.operator(t) + t * interpolation.derivative(t),
            CurveTraits::Discount => -interpolation.derivative(t) / interpolation.operator(t),
        }
    }
}

impl fmt::Display for CurveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.traits, self.interpolator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_core::errors::ErrorKind;

    #[test]
    fn log_rate_brackets_stay_positive() {
        let s = CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::LogLinear);
        let (lo, hi) = s.bracket(0.01, 1.0, 2.0, 0.4);
        assert!(lo > 0.0 && lo < 0.01 && hi > 0.01);
        let linear = CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::Linear);
        assert_eq!(linear.bracket(0.01, 1.0, 2.0, 0.05), (0.01 - 0.05, 0.01 + 0.05));
        assert!(CurveStrategy::new(CurveTraits::ForwardRate, Interpolator::ForwardFlat).is_lagged());
        assert!(!CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::ForwardFlat).is_lagged());
    }

    #[test]
    fn log_rate_brackets_stay_finite_when_widened() {
        let s = CurveStrategy::new(CurveTraits::ForwardRate, Interpolator::LogParabolic);
        let width = 0.05 * 2f64.powi(10);
        let (lo, hi) = s.bracket(0.0384, 9.0, 10.0, width);
        assert!(lo > 0.0 && hi.is_finite());
        assert!(lo < 1e-9 && hi > 1e6);
    }

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (i, row) in INTERPOLATOR_TABLE.iter().enumerate() {
            assert_eq!(row.interpolator as usize, i);
            assert_eq!(row.interpolator.id(), row.id);
        }
    }

    #[test]
    fn parses_host_identifiers() {
        let s = CurveStrategy::from_ids("Discount", "MonotonicLogCubicNaturalSpline").unwrap();
        assert_eq!(s.traits, CurveTraits::Discount);
        assert_eq!(s.interpolator, Interpolator::MonotonicLogCubicNaturalSpline);
        assert_eq!(s.to_string(), "(Discount, MonotonicLogCubicNaturalSpline)");
        assert_eq!("zeroyield".parse::<CurveTraits>().unwrap(), CurveTraits::ZeroYield);
        for i in Interpolator::all() {
            assert_eq!(i.id().parse::<Interpolator>().unwrap(), i);
        }
    }

    #[test]
    fn unknown_identifiers_are_configuration_errors() {
        assert_eq!(
            "Akima".parse::<Interpolator>().unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            CurveStrategy::from_ids("Survival", "Linear").unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn classification() {
        assert!(Interpolator::CubicNaturalSpline.is_fully_coupled());
        assert!(Interpolator::MonotonicLogCubicNaturalSpline.is_global());
        assert!(Interpolator::KrugerCubic.is_global());
        assert!(!Interpolator::KrugerCubic.is_fully_coupled());
        assert!(!Interpolator::LogLinear.is_global());
        assert!(Interpolator::MonotonicParabolic.is_monotonic());
        assert!(!Interpolator::Parabolic.is_monotonic());
        assert_eq!(Interpolator::KrugerLogCubic.fallback(), Interpolator::LogLinear);
    }
}
