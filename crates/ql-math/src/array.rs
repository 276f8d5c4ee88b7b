//! Dense vectors and matrices (translates `ql/math/array.hpp` and
//! `ql/math/matrix.hpp`).
//!
//! QuantLib's `Array` and `Matrix` map directly onto nalgebra's dynamically
//! sized types; the aliases keep signatures short.

use nalgebra::{DMatrix, DVector};
use ql_core::Real;

/// A dynamically-sized vector of reals.
///
/// Corresponds to `QuantLib::Array`.
pub type Array = DVector<Real>;

/// A dynamically-sized matrix of reals.
///
/// Corresponds to `QuantLib::Matrix`.
pub type Matrix = DMatrix<Real>;
