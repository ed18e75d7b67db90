//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step solves a small, tall linear system:
//!
//! ```text
//! minimize ‖A δ - b‖²
//! ```
//!
//! where `A` stacks the Jacobian on top of the damping rows. The parameter
//! dimension is tiny (2–5 columns), so a full SVD is cheap.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Singular values below `rel_tol × σ_max` are treated as zero. Returns `None`
/// if the system is degenerate or the solution is not finite.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() != b.len() || a.ncols() == 0 {
        return None;
    }
    let svd = a.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }

    // Try progressively looser relative cutoffs if the strict solve fails.
    for &rel_tol in &[1e-14, 1e-12, 1e-10] {
        if let Ok(x) = svd.solve(b, rel_tol * sigma_max) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn zero_matrix_is_rejected() {
        let a = DMatrix::<f64>::zeros(3, 2);
        let b = DVector::from_row_slice(&[1.0, 1.0, 1.0]);
        assert!(solve_least_squares(&a, &b).is_none());
    }
}
