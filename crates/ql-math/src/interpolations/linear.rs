//! Linear interpolation (translates `ql/math/interpolations/linearinterpolation.hpp`).

use super::{check_inputs, locate, Interpolation1D};
use ql_core::{errors::Result, Real};

/// Linear interpolation.
///
/// `f(x) = y[i] + s[i] * (x - x[i])`, with the first and last segments
/// extended outside the node range.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    slopes: Vec<Real>,
    primitive_const: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths, fewer than 2
    /// points, or non-increasing abscissae.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_inputs(xs, ys, 2)?;
        let n = xs.len();
        let mut slopes = Vec::with_capacity(n - 1);
        let mut primitive_const = Vec::with_capacity(n);
        primitive_const.push(0.0);
        for i in 0..n - 1 {
            let dx = xs[i + 1] - xs[i];
            slopes.push((ys[i + 1] - ys[i]) / dx);
            primitive_const.push(primitive_const[i] + 0.5 * dx * (ys[i] + ys[i + 1]));
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
            primitive_const,
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slopes[i]
    }

    fn derivative(&self, x: Real) -> Real {
        self.slopes[locate(&self.xs, x)]
    }

    fn primitive(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.primitive_const[i] + dx * (self.ys[i] + 0.5 * dx * self.slopes[i])
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}
