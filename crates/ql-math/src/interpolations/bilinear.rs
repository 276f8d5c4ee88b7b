//! Bilinear interpolation on a rectangular grid
//! (translates `ql/math/interpolations/bilinearinterpolation.hpp`).
//!
//! Used for volatility grids, so queries outside the grid are clamped to the
//! boundary (flat extrapolation) instead of extending the edge planes.  An
//! axis with a single node is constant along that direction.

use ql_core::{errors::Result, Real};

/// Bilinear interpolation of `z = f(x, y)`.
///
/// `z` is row-major: `z[j * nx + i] = f(xs[i], ys[j])`.
///
/// Corresponds to `QuantLib::BilinearInterpolation`.
#[derive(Debug, Clone)]
pub struct BilinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    z: Vec<Real>,
}

impl BilinearInterpolation {
    /// Build the interpolation.
    ///
    /// # Errors
    /// Empty or unsorted axes, a grid of the wrong size, or non-finite
    /// values.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        for (name, axis) in [("x", xs), ("y", ys)] {
            ql_core::ensure!(!axis.is_empty(), "{name} axis is empty");
            ql_core::ensure!(
                axis.windows(2).all(|w| w[0] < w[1]),
                "{name} axis must be strictly increasing"
            );
        }
        ql_core::ensure!(
            z.len() == xs.len() * ys.len(),
            "grid has {} values, expected {}×{}",
            z.len(),
            xs.len(),
            ys.len()
        );
        ql_core::ensure!(z.iter().all(|v| v.is_finite()), "grid values must be finite");
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            z: z.to_vec(),
        })
    }

    /// Grid abscissae.
    pub fn xs(&self) -> &[Real] {
        &self.xs
    }

    /// Grid ordinates.
    pub fn ys(&self) -> &[Real] {
        &self.ys
    }

    /// Node value `f(xs[i], ys[j])`.
    pub fn node(&self, i: usize, j: usize) -> Real {
        self.z[j * self.xs.len() + i]
    }

    /// Value at `(x, y)`.
    pub fn value(&self, x: Real, y: Real) -> Real {
        let (i0, i1, t) = bracket(&self.xs, x);
        let (j0, j1, u) = bracket(&self.ys, y);
        (1.0 - t) * (1.0 - u) * self.node(i0, j0)
            + t * (1.0 - u) * self.node(i1, j0)
            + (1.0 - t) * u * self.node(i0, j1)
            + t * u * self.node(i1, j1)
    }
}

/// Bracketing indices and weight of the upper node, clamped to the axis.
fn bracket(axis: &[Real], v: Real) -> (usize, usize, Real) {
    let n = axis.len();
    if n == 1 || v <= axis[0] {
        return (0, 0, 0.0);
    }
    if v >= axis[n - 1] {
        return (n - 1, n - 1, 0.0);
    }
    let hi = axis.partition_point(|&a| a <= v);
    let lo = hi - 1;
    (lo, hi, (v - axis[lo]) / (axis[hi] - axis[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane() -> BilinearInterpolation {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 2.0];
        let z: Vec<Real> = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| x + 2.0 * y))
            .collect();
        BilinearInterpolation::new(&xs, &ys, &z).unwrap()
    }

    #[test]
    fn reproduces_a_plane() {
        let f = plane();
        assert_abs_diff_eq!(f.value(0.5, 1.5), 3.5, epsilon = 1e-12);
        assert_abs_diff_eq!(f.value(2.0, 0.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn centre_is_average_of_corners() {
        let f = BilinearInterpolation::new(&[0.0, 1.0], &[0.0, 1.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(f.value(0.5, 0.5), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn flat_outside_the_grid() {
        let f = plane();
        assert_abs_diff_eq!(f.value(-1.0, -1.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.value(5.0, 1.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.value(5.0, 9.0), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn single_row_grid() {
        let f = BilinearInterpolation::new(&[1.0, 2.0], &[5.0], &[0.1, 0.2]).unwrap();
        assert_abs_diff_eq!(f.value(1.5, 0.0), 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(f.value(1.5, 9.0), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn rejects_wrong_grid_size() {
        assert!(BilinearInterpolation::new(&[0.0, 1.0], &[0.0, 1.0], &[1.0; 3]).is_err());
        assert!(BilinearInterpolation::new(&[1.0, 0.0], &[0.0], &[1.0; 2]).is_err());
    }
}
