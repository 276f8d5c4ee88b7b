//! One-dimensional root finding (translates `ql/math/solver1d.hpp` and
//! `ql/math/solvers1d/brent.hpp`).
//!
//! Objectives return `Result<Real>` so that a failure inside the function
//! (for example a curve queried outside its range) aborts the search and is
//! returned unchanged.

use ql_core::{
    errors::{Error, Result},
    Real,
};

const DEFAULT_MAX_EVALUATIONS: usize = 100;
const GROWTH_FACTOR: Real = 1.6;

/// Brent's method: inverse quadratic interpolation and secant steps,
/// safeguarded by bisection.
///
/// Corresponds to `QuantLib::Brent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brent {
    max_evaluations: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl Brent {
    /// Solver with the given evaluation budget (bracketing included).
    pub fn with_max_evaluations(max_evaluations: usize) -> Self {
        Self {
            max_evaluations: max_evaluations.max(3),
        }
    }

    /// Evaluation budget.
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Find a root in `[x_min, x_max]`, which must bracket a sign change.
    ///
    /// # Errors
    /// [`Error::Convergence`] if the interval does not bracket a root or the
    /// budget runs out; any error returned by `f`.
    pub fn solve_bracketed<F>(&self, mut f: F, accuracy: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        ql_core::ensure!(x_min < x_max, "invalid bracket [{x_min}, {x_max}]");
        let fa = f(x_min)?;
        let fb = f(x_max)?;
        if fa * fb > 0.0 {
            return Err(Error::Convergence {
                context: format!("Brent: root not bracketed in [{x_min}, {x_max}]"),
                residual: fa.abs().min(fb.abs()),
                iterations: 2,
            });
        }
        self.iterate(&mut f, accuracy, (x_min, fa), (x_max, fb), 2)
    }

    /// Find a root starting from `guess`, expanding a bracket of initial
    /// half-width `step` geometrically until a sign change is found.
    pub fn solve<F>(&self, f: F, accuracy: Real, guess: Real, step: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        self.solve_bounded(f, accuracy, guess, step, Real::NEG_INFINITY, Real::INFINITY)
    }

    /// As [`solve`](Self::solve), with the bracket never leaving
    /// `[lower, upper]`.
    pub fn solve_bounded<F>(
        &self,
        mut f: F,
        accuracy: Real,
        guess: Real,
        step: Real,
        lower: Real,
        upper: Real,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        ql_core::ensure!(lower < upper, "invalid bounds [{lower}, {upper}]");
        ql_core::ensure!(step > 0.0, "bracketing step must be positive, got {step}");
        let guess = guess.clamp(lower, upper);
        let mut a = (guess - step).max(lower);
        let mut b = (guess + step).min(upper);
        let mut fa = f(a)?;
        let mut fb = f(b)?;
        let mut evaluations = 2;
        while fa * fb > 0.0 {
            if evaluations >= self.max_evaluations || (a <= lower && b >= upper) {
                return Err(Error::Convergence {
                    context: format!("Brent: unable to bracket a root around {guess} (last [{a}, {b}])"),
                    residual: fa.abs().min(fb.abs()),
                    iterations: evaluations,
                });
            }
            // extend on the side with the smaller residual
            if (fa.abs() < fb.abs() && a > lower) || b >= upper {
                a = (a + GROWTH_FACTOR * (a - b)).max(lower);
                fa = f(a)?;
            } else {
                b = (b + GROWTH_FACTOR * (b - a)).min(upper);
                fb = f(b)?;
            }
            evaluations += 1;
        }
        self.iterate(&mut f, accuracy, (a, fa), (b, fb), evaluations)
    }

    fn iterate<F>(
        &self,
        f: &mut F,
        accuracy: Real,
        (mut a, mut fa): (Real, Real),
        (mut b, mut fb): (Real, Real),
        mut evaluations: usize,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        let accuracy = accuracy.max(Real::EPSILON);
        let (mut c, mut fc) = (b, fb);
        let mut d = b - a;
        let mut e = d;

        while evaluations < self.max_evaluations {
            if fb * fc > 0.0 {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            let tol = 2.0 * Real::EPSILON * b.abs() + 0.5 * accuracy;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }
            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(xm) };
            fb = f(b)?;
            evaluations += 1;
        }
        Err(Error::Convergence {
            context: "Brent solver".into(),
            residual: fb.abs(),
            iterations: evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;

    #[test]
    fn finds_square_root() {
        let x = Brent::default()
            .solve_bracketed(|x| Ok(x * x - 2.0), 1e-14, 0.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(x, 2.0_f64.sqrt(), epsilon = 1e-13);
    }

    #[test]
    fn expands_bracket_from_guess() {
        let x = Brent::default()
            .solve(|x| Ok((-0.03 * x).exp() - 0.5), 1e-12, 1.0, 0.1)
            .unwrap();
        assert_abs_diff_eq!(x, 2.0_f64.ln() / 0.03, epsilon = 1e-9);
    }

    #[test]
    fn respects_bounds() {
        let err = Brent::default()
            .solve_bounded(|x| Ok(x - 5.0), 1e-12, 0.0, 0.1, -1.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Convergence);
    }

    #[test]
    fn unbracketed_interval_is_a_convergence_failure() {
        let err = Brent::default()
            .solve_bracketed(|x| Ok(x * x + 1.0), 1e-12, -1.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Convergence);
    }

    #[test]
    fn objective_errors_propagate() {
        let err = Brent::default()
            .solve_bracketed(|_| Err(Error::Domain("outside".into())), 1e-12, 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn budget_is_enforced() {
        let err = Brent::with_max_evaluations(4)
            .solve_bracketed(|x| Ok(x.powi(3) - 0.3), 1e-15, 0.0, 10.0)
            .unwrap_err();
        assert!(matches!(err, Error::Convergence { iterations: 4, .. }));
    }
}
