//! 1D interpolation trait and implementations (translates
//! `ql/math/interpolation.hpp` and `ql/math/interpolations/`).
//!
//! Every interpolation provides its value, first derivative and primitive
//! (the integral from `x_min`).  Outside `[x_min, x_max]` each scheme
//! extends the functional form of its first or last segment, so callers
//! that allow extrapolation get a continuation rather than a clamp.

use ql_core::{errors::Result, Real};

mod bilinear;
mod cubic;
mod flat;
mod linear;
mod log;

pub use bilinear::BilinearInterpolation;
pub use cubic::{CubicDerivativeApprox, CubicInterpolation};
pub use flat::{BackwardFlatInterpolation, ForwardFlatInterpolation};
pub use linear::LinearInterpolation;
pub use log::LogInterpolation;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
///
/// Corresponds to `QuantLib::Interpolation`.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// First derivative at `x`.
    ///
    /// Default: central finite difference.
    fn derivative(&self, x: Real) -> Real {
        let h = 1.0e-6 * (1.0 + x.abs());
        (self.operator(x + h) - self.operator(x - h)) / (2.0 * h)
    }

    /// Integral of the interpolation from `x_min` to `x`.
    fn primitive(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Index `i` of the segment `[xs[i], xs[i+1]]` used for `x`, clamped to
/// the first and last segments.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // first index with xs[i] > x, minus one
    xs.partition_point(|&v| v <= x) - 1
}

/// Validate interpolation inputs.
pub(crate) fn check_inputs(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ql_core::ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ql_core::ensure!(
        xs.len() >= min_points,
        "at least {min_points} points required, {} given",
        xs.len()
    );
    ql_core::ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "abscissae must be strictly increasing"
    );
    ql_core::ensure!(
        xs.iter().chain(ys.iter()).all(|v| v.is_finite()),
        "interpolation data must be finite"
    );
    Ok(())
}

/// Five-point Gauss–Legendre integral of `f` over `[a, b]`, split into
/// pieces no longer than one unit.
pub(crate) fn gauss_legendre<F: Fn(Real) -> Real>(f: F, a: Real, b: Real) -> Real {
    const NODES: [Real; 5] = [
        0.0,
        -0.538_469_310_105_683_1,
        0.538_469_310_105_683_1,
        -0.906_179_845_938_664,
        0.906_179_845_938_664,
    ];
    const WEIGHTS: [Real; 5] = [
        0.568_888_888_888_888_9,
        0.478_628_670_499_366_5,
        0.478_628_670_499_366_5,
        0.236_926_885_056_189_08,
        0.236_926_885_056_189_08,
    ];
    if a == b {
        return 0.0;
    }
    let pieces = ((b - a).abs().ceil() as usize).max(1);
    let h = (b - a) / pieces as Real;
    let mut sum = 0.0;
    for k in 0..pieces {
        let lo = a + k as Real * h;
        let mid = lo + 0.5 * h;
        let half = 0.5 * h;
        sum += half
            * NODES
                .iter()
                .zip(WEIGHTS.iter())
                .map(|(&z, &w)| w * f(mid + half * z))
                .sum::<Real>();
    }
    sum
}
