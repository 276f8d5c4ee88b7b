//! Optimization framework (translates `ql/math/optimization/`).
//!
//! An [`OptimizationMethod`] minimizes a [`CostFunction`] subject to a
//! [`Constraint`], stopping according to [`EndCriteria`].  Methods are
//! strategy objects: callers hold an `Arc<dyn OptimizationMethod>` and can
//! swap [`Simplex`] for [`LevenbergMarquardt`] without other changes.

mod levenberg_marquardt;
mod simplex;

pub use levenberg_marquardt::LevenbergMarquardt;
pub use simplex::Simplex;

use crate::array::{Array, Matrix};
use ql_core::{errors::Result, Real};
use std::fmt;

// ── Cost function ─────────────────────────────────────────────────────────────

/// A least-squares objective: a vector of residuals whose sum of squares
/// is minimized.
///
/// Corresponds to `QuantLib::CostFunction`.
pub trait CostFunction {
    /// Residual vector at `x`.
    fn values(&self, x: &Array) -> Result<Array>;

    /// Scalar cost `Σ rᵢ(x)²`.
    fn value(&self, x: &Array) -> Result<Real> {
        Ok(self.values(x)?.norm_squared())
    }

    /// Jacobian of the residuals (one row per residual).
    ///
    /// Default: forward differences.
    fn jacobian(&self, x: &Array) -> Result<Matrix> {
        let f0 = self.values(x)?;
        let mut jac = Matrix::zeros(f0.len(), x.len());
        for j in 0..x.len() {
            let h = 1e-8 * (1.0 + x[j].abs());
            let mut xp = x.clone();
            xp[j] += h;
            let fp = self.values(&xp)?;
            jac.set_column(j, &((fp - &f0) / h));
        }
        Ok(jac)
    }

    /// Gradient of [`value`](Self::value): `2 Jᵀ r`.
    fn gradient(&self, x: &Array) -> Result<Array> {
        let r = self.values(x)?;
        Ok(self.jacobian(x)?.transpose() * r * 2.0)
    }
}

// ── Constraints ───────────────────────────────────────────────────────────────

/// Feasible region of the parameter space.
///
/// Corresponds to `QuantLib::Constraint`.
pub trait Constraint: fmt::Debug + Send + Sync {
    /// `true` if `x` is feasible.
    fn test(&self, x: &Array) -> bool;
}

/// Every point is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraint;

impl Constraint for NoConstraint {
    fn test(&self, _x: &Array) -> bool {
        true
    }
}

/// Every parameter strictly positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveConstraint;

impl Constraint for PositiveConstraint {
    fn test(&self, x: &Array) -> bool {
        x.iter().all(|&v| v > 0.0)
    }
}

/// Every parameter within `[low, high]`.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryConstraint {
    low: Real,
    high: Real,
}

impl BoundaryConstraint {
    /// Constraint `low ≤ xᵢ ≤ high`.
    pub fn new(low: Real, high: Real) -> Self {
        Self { low, high }
    }
}

impl Constraint for BoundaryConstraint {
    fn test(&self, x: &Array) -> bool {
        x.iter().all(|&v| (self.low..=self.high).contains(&v))
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Stopping rules for an optimization.
///
/// Corresponds to `QuantLib::EndCriteria`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Maximum number of iterations (function evaluations for [`Simplex`]).
    pub max_iterations: usize,
    /// Iterations allowed without improvement beyond `function_epsilon`.
    pub max_stationary_state_iterations: usize,
    /// Stop once the cost falls below this, or the simplex is this small.
    pub root_epsilon: Real,
    /// Improvements smaller than this count as stationary.
    pub function_epsilon: Real,
    /// Stop once the gradient norm falls below this.
    pub gradient_norm_epsilon: Real,
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// Why an optimization stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Iteration budget exhausted.
    MaxIterations,
    /// Cost or simplex size below `root_epsilon`.
    RootEpsilon,
    /// Relative improvement below `function_epsilon`.
    FunctionEpsilon,
    /// Gradient norm below `gradient_norm_epsilon`.
    GradientNormEpsilon,
    /// Too many iterations without improvement.
    StationaryPoint,
}

/// Outcome of [`OptimizationMethod::minimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub x: Array,
    /// Cost at `x`.
    pub value: Real,
    /// Iterations performed.
    pub iterations: usize,
    /// Stopping reason.
    pub end_type: EndCriteriaType,
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// A pluggable minimizer.
///
/// Corresponds to `QuantLib::OptimizationMethod`.
pub trait OptimizationMethod: fmt::Debug + Send + Sync {
    /// Minimize `cost` over the feasible region starting from `initial`.
    ///
    /// # Errors
    /// An infeasible starting point, or any error from the cost function.
    fn minimize(
        &self,
        cost: &dyn CostFunction,
        constraint: &dyn Constraint,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult>;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod test_functions {
    use super::*;

    /// Rosenbrock as residuals: `(1 − x, 10 (y − x²))`.
    pub struct Rosenbrock;

    impl CostFunction for Rosenbrock {
        fn values(&self, x: &Array) -> Result<Array> {
            Ok(Array::from_vec(vec![1.0 - x[0], 10.0 * (x[1] - x[0] * x[0])]))
        }
    }

    /// Exponential decay fit: residuals `a·exp(−b tᵢ) − yᵢ`.
    pub struct DecayFit {
        pub ts: Vec<Real>,
        pub ys: Vec<Real>,
    }

    impl DecayFit {
        pub fn generated(a: Real, b: Real) -> Self {
            let ts: Vec<Real> = (0..12).map(|i| 0.5 * i as Real).collect();
            let ys = ts.iter().map(|t| a * (-b * t).exp()).collect();
            Self { ts, ys }
        }
    }

    impl CostFunction for DecayFit {
        fn values(&self, x: &Array) -> Result<Array> {
            Ok(Array::from_iterator(
                self.ts.len(),
                self.ts.iter().zip(&self.ys).map(|(t, y)| x[0] * (-x[1] * t).exp() - y),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_functions::Rosenbrock;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finite_difference_gradient() {
        let x = Array::from_vec(vec![0.5, 0.5]);
        let g = Rosenbrock.gradient(&x).unwrap();
        // d/dx [(1-x)² + 100(y-x²)²] = -2(1-x) - 400x(y-x²)
        assert_abs_diff_eq!(g[0], -1.0 - 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(g[1], 200.0 * 0.25, epsilon = 1e-4);
    }

    #[test]
    fn constraints() {
        let x = Array::from_vec(vec![0.5, -0.1]);
        assert!(NoConstraint.test(&x));
        assert!(!PositiveConstraint.test(&x));
        assert!(BoundaryConstraint::new(-1.0, 1.0).test(&x));
        assert!(!BoundaryConstraint::new(0.0, 1.0).test(&x));
    }
}
