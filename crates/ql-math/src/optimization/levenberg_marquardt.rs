//! Levenberg–Marquardt least squares (translates
//! `ql/math/optimization/levenbergmarquardt.hpp`).
//!
//! Each iteration solves the damped normal equations
//! `(JᵀJ + μ·diag(JᵀJ)) δ = −Jᵀr` by Cholesky factorization.  Accepted steps
//! shrink `μ`, rejected ones (higher cost or infeasible) grow it.

use super::{
    Constraint, CostFunction, EndCriteria, EndCriteriaType, OptimizationMethod, OptimizationResult,
};
use crate::array::{Array, Matrix};
use ql_core::{errors::Result, Real};

const MAX_DAMPING: Real = 1e16;

/// Levenberg–Marquardt minimizer for sums of squared residuals.
///
/// Corresponds to `QuantLib::LevenbergMarquardt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevenbergMarquardt {
    initial_damping: Real,
    x_tolerance: Real,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            initial_damping: 1e-3,
            x_tolerance: 1e-12,
        }
    }
}

impl LevenbergMarquardt {
    /// Minimizer with the given initial damping and relative step tolerance.
    pub fn new(initial_damping: Real, x_tolerance: Real) -> Self {
        Self {
            initial_damping,
            x_tolerance,
        }
    }
}

fn damped_step(jtj: &Matrix, jtr: &Array, mu: Real) -> Option<Array> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[(i, i)] += mu * jtj[(i, i)].max(1e-12);
    }
    a.cholesky().map(|c| -c.solve(jtr))
}

impl OptimizationMethod for LevenbergMarquardt {
    fn minimize(
        &self,
        cost: &dyn CostFunction,
        constraint: &dyn Constraint,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        ql_core::ensure!(constraint.test(initial), "initial guess violates the constraint");
        let mut x = initial.clone();
        let mut r = cost.values(&x)?;
        let mut value = r.norm_squared();
        let mut mu = self.initial_damping;
        let mut stationary = 0;

        for iteration in 0..end_criteria.max_iterations {
            let finish = |x: Array, value: Real, end_type| OptimizationResult {
                x,
                value,
                iterations: iteration,
                end_type,
            };
            if value < end_criteria.root_epsilon {
                return Ok(finish(x, value, EndCriteriaType::RootEpsilon));
            }
            let jac = cost.jacobian(&x)?;
            let jt = jac.transpose();
            let jtj = &jt * &jac;
            let jtr = &jt * &r;
            if 2.0 * jtr.norm() < end_criteria.gradient_norm_epsilon {
                return Ok(finish(x, value, EndCriteriaType::GradientNormEpsilon));
            }

            let mut accepted = false;
            while mu < MAX_DAMPING {
                let Some(step) = damped_step(&jtj, &jtr, mu) else {
                    mu *= 10.0;
                    continue;
                };
                if step.norm() <= self.x_tolerance * (x.norm() + self.x_tolerance) {
                    return Ok(finish(x, value, EndCriteriaType::FunctionEpsilon));
                }
                let trial = &x + &step;
                if constraint.test(&trial) {
                    let trial_r = cost.values(&trial)?;
                    let trial_value = trial_r.norm_squared();
                    if trial_value.is_finite() && trial_value < value {
                        let improvement = (value - trial_value) / value.max(Real::MIN_POSITIVE);
                        x = trial;
                        r = trial_r;
                        value = trial_value;
                        mu = (mu * 0.1).max(1e-12);
                        accepted = true;
                        if improvement < end_criteria.function_epsilon {
                            stationary += 1;
                        } else {
                            stationary = 0;
                        }
                        break;
                    }
                }
                mu *= 10.0;
            }
            if !accepted || stationary >= end_criteria.max_stationary_state_iterations {
                return Ok(finish(x, value, EndCriteriaType::StationaryPoint));
            }
        }
        Ok(OptimizationResult {
            x,
            value,
            iterations: end_criteria.max_iterations,
            end_type: EndCriteriaType::MaxIterations,
        })
    }

    fn name(&self) -> &'static str {
        "LevenbergMarquardt"
    }
}
