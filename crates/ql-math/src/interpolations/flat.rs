//! Step-function interpolations (translates
//! `ql/math/interpolations/backwardflatinterpolation.hpp` and
//! `forwardflatinterpolation.hpp`).

use super::{check_inputs, locate, Interpolation1D};
use ql_core::{errors::Result, Real};

/// Backward-flat interpolation: `f(x) = y[i]` for `x` in `(x[i-1], x[i]]`.
#[derive(Debug, Clone)]
pub struct BackwardFlatInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    primitive_const: Vec<Real>,
}

impl BackwardFlatInterpolation {
    /// Construct from sorted `xs` and corresponding `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_inputs(xs, ys, 2)?;
        let mut primitive_const = vec![0.0; xs.len()];
        for i in 1..xs.len() {
            primitive_const[i] = primitive_const[i - 1] + (xs[i] - xs[i - 1]) * ys[i];
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            primitive_const,
        })
    }
}

impl Interpolation1D for BackwardFlatInterpolation {
    fn operator(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        let i = self.xs.partition_point(|&v| v < x);
        self.ys[i.min(n - 1)]
    }

    fn derivative(&self, _x: Real) -> Real {
        0.0
    }

    fn primitive(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return (x - self.xs[0]) * self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.primitive_const[n - 1] + (x - self.xs[n - 1]) * self.ys[n - 1];
        }
        let i = self.xs.partition_point(|&v| v < x);
        self.primitive_const[i - 1] + (x - self.xs[i - 1]) * self.ys[i]
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

/// Forward-flat interpolation: `f(x) = y[i]` for `x` in `[x[i], x[i+1])`.
#[derive(Debug, Clone)]
pub struct ForwardFlatInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    primitive_const: Vec<Real>,
}

impl ForwardFlatInterpolation {
    /// Construct from sorted `xs` and corresponding `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_inputs(xs, ys, 2)?;
        let mut primitive_const = vec![0.0; xs.len()];
        for i in 1..xs.len() {
            primitive_const[i] = primitive_const[i - 1] + (xs[i] - xs[i - 1]) * ys[i - 1];
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            primitive_const,
        })
    }
}

impl Interpolation1D for ForwardFlatInterpolation {
    fn operator(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        self.ys[locate(&self.xs, x)]
    }

    fn derivative(&self, _x: Real) -> Real {
        0.0
    }

    fn primitive(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return (x - self.xs[0]) * self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.primitive_const[n - 1] + (x - self.xs[n - 1]) * self.ys[n - 1];
        }
        let i = locate(&self.xs, x);
        self.primitive_const[i] + (x - self.xs[i]) * self.ys[i]
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const XS: [Real; 3] = [0.0, 1.0, 3.0];
    const YS: [Real; 3] = [0.01, 0.02, 0.03];

    #[test]
    fn backward_flat_takes_right_node() {
        let f = BackwardFlatInterpolation::new(&XS, &YS).unwrap();
        assert_eq!(f.operator(0.0), 0.01);
        assert_eq!(f.operator(0.5), 0.02);
        assert_eq!(f.operator(1.0), 0.02);
        assert_eq!(f.operator(1.5), 0.03);
        assert_eq!(f.operator(5.0), 0.03);
        assert_abs_diff_eq!(f.primitive(2.0), 0.02 + 0.03, epsilon = 1e-16);
        assert_abs_diff_eq!(f.primitive(4.0), 0.02 + 0.06 + 0.03, epsilon = 1e-16);
    }

    #[test]
    fn forward_flat_takes_left_node() {
        let f = ForwardFlatInterpolation::new(&XS, &YS).unwrap();
        assert_eq!(f.operator(0.0), 0.01);
        assert_eq!(f.operator(0.5), 0.01);
        assert_eq!(f.operator(1.0), 0.02);
        assert_eq!(f.operator(3.0), 0.03);
        assert_abs_diff_eq!(f.primitive(2.0), 0.01 + 0.02, epsilon = 1e-16);
        assert_abs_diff_eq!(f.primitive(4.0), 0.01 + 0.04 + 0.03, epsilon = 1e-16);
    }
}
