//! Nelder–Mead downhill simplex (translates `ql/math/optimization/simplex.hpp`).

use super::{
    Constraint, CostFunction, EndCriteria, EndCriteriaType, OptimizationMethod, OptimizationResult,
};
use crate::array::Array;
use ql_core::{errors::Result, Real};

/// Nelder–Mead simplex minimizer.
///
/// The initial simplex places one vertex at the guess and one at
/// `guess ± λ eᵢ` per dimension.  Infeasible trial points are given an
/// infinite cost.
///
/// Corresponds to `QuantLib::Simplex`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplex {
    lambda: Real,
}

impl Simplex {
    /// Simplex with initial edge length `lambda`.
    pub fn new(lambda: Real) -> Self {
        Self { lambda }
    }

    /// Initial edge length.
    pub fn lambda(&self) -> Real {
        self.lambda
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn cost_or_infinity(cost: &dyn CostFunction, constraint: &dyn Constraint, x: &Array) -> Result<Real> {
    if constraint.test(x) {
        let v = cost.value(x)?;
        Ok(if v.is_finite() { v } else { Real::INFINITY })
    } else {
        Ok(Real::INFINITY)
    }
}

impl OptimizationMethod for Simplex {
    fn minimize(
        &self,
        cost: &dyn CostFunction,
        constraint: &dyn Constraint,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        ql_core::ensure!(constraint.test(initial), "initial guess violates the constraint");
        let n = initial.len();
        ql_core::ensure!(n > 0, "nothing to optimize");

        let mut vertices: Vec<Array> = Vec::with_capacity(n + 1);
        vertices.push(initial.clone());
        for i in 0..n {
            let mut v = initial.clone();
            v[i] += self.lambda;
            if !constraint.test(&v) {
                v[i] = initial[i] - self.lambda;
            }
            vertices.push(v);
        }
        let mut values = vertices
            .iter()
            .map(|v| cost_or_infinity(cost, constraint, v))
            .collect::<Result<Vec<_>>>()?;
        let mut evaluations = n + 1;
        let mut stationary = 0;
        let mut previous_best = Real::INFINITY;

        loop {
            // best, worst, second worst
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let (ilo, ihi, inhi) = (order[0], order[n], order[n.saturating_sub(1)]);

            let finish = |end_type| OptimizationResult {
                x: vertices[ilo].clone(),
                value: values[ilo],
                iterations: evaluations,
                end_type,
            };

            let size = vertices
                .iter()
                .map(|v| (v - &vertices[ilo]).norm())
                .fold(0.0, Real::max);
            if values[ilo] < end_criteria.root_epsilon || size < end_criteria.root_epsilon {
                return Ok(finish(EndCriteriaType::RootEpsilon));
            }
            if previous_best - values[ilo] < end_criteria.function_epsilon {
                stationary += 1;
                if stationary >= end_criteria.max_stationary_state_iterations {
                    return Ok(finish(EndCriteriaType::StationaryPoint));
                }
            } else {
                stationary = 0;
            }
            previous_best = values[ilo];
            if evaluations >= end_criteria.max_iterations {
                return Ok(finish(EndCriteriaType::MaxIterations));
            }

            let centroid = vertices
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != ihi)
                .fold(Array::zeros(n), |acc, (_, v)| acc + v)
                / n as Real;

            let reflected = &centroid * 2.0 - &vertices[ihi];
            let fr = cost_or_infinity(cost, constraint, &reflected)?;
            evaluations += 1;

            if fr < values[ilo] {
                let expanded = &reflected * 2.0 - &centroid;
                let fe = cost_or_infinity(cost, constraint, &expanded)?;
                evaluations += 1;
                if fe < fr {
                    vertices[ihi] = expanded;
                    values[ihi] = fe;
                } else {
                    vertices[ihi] = reflected;
                    values[ihi] = fr;
                }
            } else if fr < values[inhi] {
                vertices[ihi] = reflected;
                values[ihi] = fr;
            } else {
                let contracted = if fr < values[ihi] {
                    (&centroid + &reflected) * 0.5
                } else {
                    (&centroid + &vertices[ihi]) * 0.5
                };
                let fc = cost_or_infinity(cost, constraint, &contracted)?;
                evaluations += 1;
                if fc < values[ihi].min(fr) {
                    vertices[ihi] = contracted;
                    values[ihi] = fc;
                } else {
                    let best = vertices[ilo].clone();
                    for i in (0..=n).filter(|&i| i != ilo) {
                        vertices[i] = (&best + &vertices[i]) * 0.5;
                        values[i] = cost_or_infinity(cost, constraint, &vertices[i])?;
                        evaluations += 1;
                    }
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "Simplex"
    }
}
