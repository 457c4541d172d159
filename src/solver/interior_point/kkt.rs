// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! KKT residual assembly (§4.2) and the augmented symmetric KKT matrix (§4.3).

use crate::core::state::ipstate::KktNorms;
use crate::core::Error;
use crate::solver::interior_point::oracle::{ensure_finite, ConstrainedProblem};
use nalgebra::{DMatrix, DVector, RealField};

/// The four KKT residual blocks, in the fixed order [primal, complementarity, equality,
/// inequality] that both the Newton right-hand side and the reported convergence norms use.
pub struct KktBlocks<F> {
    /// ∇f(x) − Jᴱᵀ λ_E − Jᴵᵀ λ_I, size D.
    pub primal: DVector<F>,
    /// λ_I − μ/s, size N. Unscaled; this is the form the Newton system's right-hand side wants.
    /// Multiply elementwise by `s` to get the scaled complementarity residual sλ_I − μ used for
    /// convergence reporting.
    pub complementarity_raw: DVector<F>,
    /// c_E(x), size M.
    pub equality: DVector<F>,
    /// c_I(x) − s, size N.
    pub inequality: DVector<F>,
}

fn inf_norm<F: RealField + Copy>(v: &DVector<F>) -> F {
    v.iter().fold(F::zero(), |acc, &x| {
        let a = x.abs();
        if a > acc {
            a
        } else {
            acc
        }
    })
}

/// Compute the four residual blocks at `(x, s, lambda_e, lambda_i)`.
pub fn residual_blocks<P: ConstrainedProblem>(
    problem: &P,
    x: &DVector<P::Float>,
    s: &DVector<P::Float>,
    lambda_e: &DVector<P::Float>,
    lambda_i: &DVector<P::Float>,
    mu: P::Float,
) -> Result<KktBlocks<P::Float>, Error> {
    let grad = problem.gradient(x)?;
    ensure_finite(&grad, "gradient")?;
    let je = problem.equality_jacobian(x)?;
    let ji = problem.inequality_jacobian(x)?;

    let primal = grad - &je * lambda_e - &ji * lambda_i;

    let n = s.len();
    let mut complementarity_raw = DVector::zeros(n);
    for i in 0..n {
        complementarity_raw[i] = lambda_i[i] - mu / s[i];
    }

    let equality = problem.equality(x)?;
    ensure_finite(&equality, "equality")?;
    let inequality = problem.inequality(x)? - s;
    ensure_finite(&inequality, "inequality")?;

    Ok(KktBlocks {
        primal,
        complementarity_raw,
        equality,
        inequality,
    })
}

/// Stack the four blocks, in order, into a single vector of size D + N + M + N -- the layout the
/// Newton right-hand side and the augmented matrix `H` of [`assemble_matrix`] share.
pub fn stack<F: RealField + Copy>(blocks: &KktBlocks<F>) -> DVector<F> {
    let d = blocks.primal.len();
    let n = blocks.complementarity_raw.len();
    let m = blocks.equality.len();
    let mut g = DVector::zeros(d + n + m + n);
    g.rows_mut(0, d).copy_from(&blocks.primal);
    g.rows_mut(d, n).copy_from(&blocks.complementarity_raw);
    g.rows_mut(d + n, m).copy_from(&blocks.equality);
    g.rows_mut(d + n + m, n).copy_from(&blocks.inequality);
    g
}

/// Split a stacked vector of size D + N + M + N (the Newton step `dz`, in the same block order as
/// [`stack`]) back into its four pieces (dx, ds, dλ_E, dλ_I).
pub fn unstack<F: RealField + Copy>(
    dz: &DVector<F>,
    d: usize,
    n: usize,
    m: usize,
) -> (DVector<F>, DVector<F>, DVector<F>, DVector<F>) {
    let dx = DVector::from_column_slice(&dz.as_slice()[0..d]);
    let ds = DVector::from_column_slice(&dz.as_slice()[d..d + n]);
    let dlam_e = DVector::from_column_slice(&dz.as_slice()[d + n..d + n + m]);
    let dlam_i = DVector::from_column_slice(&dz.as_slice()[d + n + m..d + n + m + n]);
    (dx, ds, dlam_e, dlam_i)
}

/// Report the four residual norms (infinity norm) for convergence testing, scaling the
/// complementarity block by `s` (§4.2: "block 2 is elementwise multiplied by s so its scale
/// matches").
pub fn norms<F: RealField + Copy>(blocks: &KktBlocks<F>, s: &DVector<F>) -> KktNorms<F> {
    let scaled: DVector<F> = blocks
        .complementarity_raw
        .iter()
        .zip(s.iter())
        .map(|(&c, &si)| c * si)
        .collect::<Vec<_>>()
        .into();
    KktNorms {
        stationarity: inf_norm(&blocks.primal),
        complementarity: inf_norm(&scaled),
        equality: inf_norm(&blocks.equality),
        inequality: inf_norm(&blocks.inequality),
    }
}

/// Assemble the augmented symmetric KKT matrix `H` (§4.3), size (D + N + M + N)².
///
/// `w` is ∇²_xL(x, λ) (or its compact L-BFGS stand-in, applied elsewhere -- this function is only
/// used in exact-Hessian mode, see [`crate::solver::interior_point::direction`]).
pub fn assemble_matrix<F: RealField + Copy>(
    w: &DMatrix<F>,
    je: &DMatrix<F>,
    ji: &DMatrix<F>,
    lambda_i: &DVector<F>,
    s: &DVector<F>,
) -> DMatrix<F> {
    let d = w.nrows();
    let n = s.len();
    let m = je.ncols();
    let size = d + n + m + n;
    let mut h = DMatrix::<F>::zeros(size, size);

    h.view_mut((0, 0), (d, d)).copy_from(w);
    h.view_mut((0, d + n), (d, m)).copy_from(je);
    h.view_mut((0, d + n + m), (d, n)).copy_from(ji);
    h.view_mut((d + n, 0), (m, d)).copy_from(&je.transpose());
    h.view_mut((d + n + m, 0), (n, d)).copy_from(&ji.transpose());

    for i in 0..n {
        let sigma_i = lambda_i[i] / s[i];
        h[(d + i, d + i)] = sigma_i;
        h[(d + i, d + n + m + i)] = -F::one();
        h[(d + n + m + i, d + i)] = -F::one();
    }

    h
}

/// Assemble the augmented Jacobian `B = [[J_E, J_I], [0, -I_n]]` of §4.3, shape (D+N)×(M+N).
///
/// Used by the second-order correction of [`super::linesearch::line_search`] and by the
/// constrained branch of [`super::lbfgs::direction_constrained`].
pub fn augmented_jacobian<F: RealField + Copy>(
    je: &DMatrix<F>,
    ji: &DMatrix<F>,
    d: usize,
    m: usize,
    n: usize,
) -> DMatrix<F> {
    let mut b = DMatrix::<F>::zeros(d + n, m + n);
    b.view_mut((0, 0), (d, m)).copy_from(je);
    b.view_mut((0, m), (d, n)).copy_from(ji);
    for i in 0..n {
        b[(d + i, m + i)] = -F::one();
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stack_unstack_roundtrip() {
        let blocks = KktBlocks {
            primal: DVector::from_row_slice(&[1.0_f64, 2.0]),
            complementarity_raw: DVector::from_row_slice(&[3.0]),
            equality: DVector::from_row_slice(&[4.0]),
            inequality: DVector::from_row_slice(&[5.0]),
        };
        let g = stack(&blocks);
        assert_eq!(g.len(), 5);
        let (dx, ds, de, di) = unstack(&g, 2, 1, 1);
        assert_relative_eq!(dx[0], 1.0);
        assert_relative_eq!(dx[1], 2.0);
        assert_relative_eq!(ds[0], 3.0);
        assert_relative_eq!(de[0], 4.0);
        assert_relative_eq!(di[0], 5.0);
    }

    #[test]
    fn test_assemble_matrix_is_symmetric() {
        let w = DMatrix::<f64>::identity(2, 2);
        let je = DMatrix::from_row_slice(2, 1, &[1.0, 0.0]);
        let ji = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        let lambda_i = DVector::from_row_slice(&[2.0]);
        let s = DVector::from_row_slice(&[4.0]);
        let h = assemble_matrix(&w, &je, &ji, &lambda_i, &s);
        assert_eq!(h.nrows(), 5);
        assert_eq!(h.ncols(), 5);
        for i in 0..5 {
            for j in 0..5 {
                assert_relative_eq!(h[(i, j)], h[(j, i)], epsilon = 1e-12);
            }
        }
        assert_relative_eq!(h[(2, 2)], 0.5);
    }

    #[test]
    fn test_augmented_jacobian_layout() {
        let je = DMatrix::from_row_slice(2, 1, &[1.0_f64, 0.0]);
        let ji = DMatrix::from_row_slice(2, 1, &[0.0_f64, 1.0]);
        let b = augmented_jacobian(&je, &ji, 2, 1, 1);
        assert_eq!(b.nrows(), 3);
        assert_eq!(b.ncols(), 2);
        assert_relative_eq!(b[(2, 1)], -1.0);
        assert_relative_eq!(b[(2, 0)], 0.0);
    }
}
