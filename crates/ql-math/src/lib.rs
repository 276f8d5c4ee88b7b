//! # ql-math
//!
//! Numerical building blocks for curve construction: 1D interpolations
//! with exact primitives, bilinear grids, Brent root finding, and
//! pluggable least-squares optimizers over nalgebra vectors.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `Array` and `Matrix` aliases over nalgebra.
pub mod array;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// Cost functions, constraints and minimizers.
pub mod optimization;

/// 1D root finding.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::{Array, Matrix};
pub use interpolations::{
    BackwardFlatInterpolation, BilinearInterpolation, CubicDerivativeApprox, CubicInterpolation,
    ForwardFlatInterpolation, Interpolation1D, LinearInterpolation, LogInterpolation,
};
pub use optimization::{
    BoundaryConstraint, Constraint, CostFunction, EndCriteria, EndCriteriaType, LevenbergMarquardt,
    NoConstraint, OptimizationMethod, OptimizationResult, PositiveConstraint, Simplex,
};
pub use solvers1d::Brent;
