// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Dense linear-algebra primitives the interior-point solver needs but `argmin-math` does not
//! provide: a symmetric (possibly indefinite) solve, symmetric eigenvalues, a pseudoinverse and a
//! least-squares solve. All operate on `nalgebra::{DMatrix, DVector}` directly rather than through
//! a trait, since this crate has exactly one linear-algebra backend.

use crate::argmin_error;
use crate::core::Error;
use nalgebra::{DMatrix, DVector, RealField};

/// Solve `a * x = b` for symmetric (possibly indefinite) `a` via its eigendecomposition.
///
/// Unlike a Cholesky or LU factorization this never fails on an indefinite matrix, which is
/// exactly the case the augmented KKT system produces before inertia correction. Eigenvalues with
/// magnitude below `eps` are treated as singular directions and excluded from the solve (the
/// minimum-norm solution is returned on a singular system rather than an error), mirroring
/// [`least_squares`].
pub fn symmetric_solve<F: RealField + Copy>(a: &DMatrix<F>, b: &DVector<F>) -> Result<DVector<F>, Error> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(argmin_error!(
            ConfigurationError,
            "symmetric_solve: dimension mismatch"
        ));
    }
    let eig = a.clone().symmetric_eigen();
    let eps = F::default_epsilon();
    let bt = eig.eigenvectors.transpose() * b;
    let mut y = DVector::<F>::zeros(n);
    for i in 0..n {
        let w = eig.eigenvalues[i];
        if w.abs() > eps {
            y[i] = bt[i] / w;
        }
    }
    Ok(eig.eigenvectors * y)
}

/// All eigenvalues of a symmetric matrix.
pub fn symmetric_eigvals<F: RealField + Copy>(a: &DMatrix<F>) -> DVector<F> {
    a.clone().symmetric_eigen().eigenvalues
}

/// The ratio of smallest to largest eigenvalue magnitude, used to gauge near-singularity (§4.5).
pub fn rcond<F: RealField + Copy>(a: &DMatrix<F>) -> F {
    let w = symmetric_eigvals(a);
    let mags: Vec<F> = w.iter().map(|wi| wi.abs()).collect();
    let mut iter = mags.into_iter();
    let first = match iter.next() {
        Some(v) => v,
        None => return F::zero(),
    };
    let (min, max) = iter.fold((first, first), |(min, max), m| {
        (if m < min { m } else { min }, if m > max { m } else { max })
    });
    if max == F::zero() {
        F::zero()
    } else {
        min / max
    }
}

/// The ratio of smallest to largest singular value, for a general (possibly non-square,
/// non-symmetric) matrix. Used to gauge whether a square augmented Jacobian is well-conditioned
/// enough for a direct solve rather than the normal-equations path.
pub fn rcond_rect<F: RealField + Copy>(a: &DMatrix<F>) -> F {
    let sv = a.clone().svd(false, false).singular_values;
    if sv.is_empty() {
        return F::zero();
    }
    let (min, max) = sv.iter().fold((sv[0], sv[0]), |(min, max), &s| {
        (if s < min { s } else { min }, if s > max { s } else { max })
    });
    if max == F::zero() {
        F::zero()
    } else {
        min / max
    }
}

/// Count of eigenvalues strictly less than zero, by more than `eps`.
pub fn negative_eigenvalue_count<F: RealField + Copy>(a: &DMatrix<F>, eps: F) -> usize {
    symmetric_eigvals(a).iter().filter(|&&w| w < -eps).count()
}

/// Moore-Penrose pseudoinverse via the SVD.
pub fn pseudoinverse<F: RealField + Copy>(a: &DMatrix<F>) -> Result<DMatrix<F>, Error> {
    a.clone().pseudo_inverse(F::default_epsilon()).map_err(|e| {
        argmin_error!(
            SingularSystemError,
            format!("pseudoinverse failed: {e}")
        )
    })
}

/// Minimum-norm least-squares solution of `a * x = b` (used when `a` is rank-deficient, e.g. the
/// second-order correction of §4.9 when the constraint Jacobian is not full rank).
pub fn least_squares<F: RealField + Copy>(a: &DMatrix<F>, b: &DVector<F>) -> Result<DVector<F>, Error> {
    if a.nrows() != b.len() {
        return Err(argmin_error!(
            ConfigurationError,
            "least_squares: dimension mismatch"
        ));
    }
    let pinv = pseudoinverse(a)?;
    Ok(pinv * b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetric_solve_indefinite() {
        // [[0, 1], [1, 0]] has eigenvalues +-1, solving x for b=[1,1] gives x=[1,1]
        let a = DMatrix::from_row_slice(2, 2, &[0.0_f64, 1.0, 1.0, 0.0]);
        let b = DVector::from_row_slice(&[1.0_f64, 1.0]);
        let x = symmetric_solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rcond_rect_identity_is_one() {
        let a = DMatrix::<f64>::identity(3, 3);
        assert_relative_eq!(rcond_rect(&a), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_eigenvalue_count() {
        let a = DMatrix::from_row_slice(2, 2, &[-1.0_f64, 0.0, 0.0, 2.0]);
        assert_eq!(negative_eigenvalue_count(&a, 1e-12), 1);
    }

    #[test]
    fn test_least_squares_overdetermined() {
        // a*x = b with a 3x2 full column rank: exact solution recoverable
        let a = DMatrix::from_row_slice(3, 2, &[1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let x_true = DVector::from_row_slice(&[2.0_f64, 3.0]);
        let b = &a * &x_true;
        let x = least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-8);
    }
}
