//! Interpolation in log space (translates
//! `ql/math/interpolations/loginterpolation.hpp`).
//!
//! `f(x) = exp(g(x))` where `g` interpolates `ln yᵢ`.  The primitive has no
//! closed form for cubic `g`, so it is integrated numerically segment by
//! segment.

use super::{check_inputs, gauss_legendre, locate, CubicDerivativeApprox, CubicInterpolation, Interpolation1D, LinearInterpolation};
use ql_core::{errors::Result, Real};

/// Log-space wrapper around any [`Interpolation1D`].
///
/// Corresponds to `QuantLib::LogInterpolationImpl`.
#[derive(Debug, Clone)]
pub struct LogInterpolation<I> {
    inner: I,
    xs: Vec<Real>,
    primitive_const: Vec<Real>,
}

impl<I: Interpolation1D> LogInterpolation<I> {
    /// Interpolate `ln ys` with the interpolation produced by `build`.
    ///
    /// # Errors
    /// Returns an error for inconsistent inputs or non-positive `ys`.
    pub fn new<F>(xs: &[Real], ys: &[Real], build: F) -> Result<Self>
    where
        F: FnOnce(&[Real], &[Real]) -> Result<I>,
    {
        check_inputs(xs, ys, 2)?;
        if let Some((i, y)) = ys.iter().enumerate().find(|(_, &y)| y <= 0.0) {
            ql_core::fail!("log interpolation requires positive values, got {y} at node {i}");
        }
        let log_ys: Vec<Real> = ys.iter().map(|y| y.ln()).collect();
        let inner = build(xs, &log_ys)?;
        let mut primitive_const = Vec::with_capacity(xs.len());
        primitive_const.push(0.0);
        for w in xs.windows(2) {
            let last = primitive_const[primitive_const.len() - 1];
            primitive_const.push(last + gauss_legendre(|x| inner.operator(x).exp(), w[0], w[1]));
        }
        Ok(Self {
            inner,
            xs: xs.to_vec(),
            primitive_const,
        })
    }

    /// The interpolation of the log values.
    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl LogInterpolation<LinearInterpolation> {
    /// Log-linear interpolation.
    pub fn log_linear(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::new(xs, ys, LinearInterpolation::new)
    }
}

impl LogInterpolation<CubicInterpolation> {
    /// Log-cubic interpolation.
    pub fn log_cubic(
        xs: &[Real],
        ys: &[Real],
        approx: CubicDerivativeApprox,
        monotonic: bool,
    ) -> Result<Self> {
        Self::new(xs, ys, |x, y| CubicInterpolation::new(x, y, approx, monotonic))
    }
}

impl<I: Interpolation1D> Interpolation1D for LogInterpolation<I> {
    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x).exp()
    }

    fn derivative(&self, x: Real) -> Real {
        self.operator(x) * self.inner.derivative(x)
    }

    fn primitive(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.primitive_const[i] + gauss_legendre(|s| self.operator(s), self.xs[i], x)
    }

    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }
}
