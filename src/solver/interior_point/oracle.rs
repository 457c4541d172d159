// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The capability bundle a problem must implement to be solved by [`InteriorPoint`].
//!
//! Unlike the teacher's `CostFunction`/`Gradient`/`Hessian`/`Jacobian` split -- appropriate when
//! different solvers need different subsets of those capabilities -- the interior-point method
//! always needs the full bundle together, so it is collapsed into a single trait. Constraint and
//! Hessian methods default to "empty", so an unconstrained, Hessian-free problem only needs to
//! implement [`ConstrainedProblem::cost`] and [`ConstrainedProblem::gradient`].
//!
//! [`InteriorPoint`]: crate::solver::interior_point::InteriorPoint

use crate::core::{ArgminFloat, Error};
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

/// Reject a non-finite (`NaN` or `±inf`) oracle output with `ArgminError::NonFinite` (§7: fatal,
/// surfaced directly to the caller rather than absorbed into the iteration).
pub(crate) fn ensure_finite<F: ArgminFloat + RealField + Copy>(
    v: &DVector<F>,
    what: &str,
) -> Result<(), Error> {
    if v.iter().all(|&x| Float::is_finite(x)) {
        Ok(())
    } else {
        Err(crate::argmin_error!(
            NonFinite,
            format!("{what} returned a non-finite value")
        ))
    }
}

/// A smooth, possibly constrained minimization problem:
///
/// ```text
/// minimize    f(x)
/// subject to  c_E(x) = 0
///             c_I(x) >= 0
/// ```
pub trait ConstrainedProblem {
    /// Floating point precision used throughout the solve. Bounded by both `ArgminFloat` (the
    /// executor/state machinery) and `nalgebra::RealField` (the dense linear algebra the KKT
    /// assembler and L-BFGS direction solvers need).
    type Float: ArgminFloat + RealField + Copy;

    /// f(x)
    fn cost(&self, x: &DVector<Self::Float>) -> Result<Self::Float, Error>;

    /// ∇f(x)
    fn gradient(&self, x: &DVector<Self::Float>) -> Result<DVector<Self::Float>, Error>;

    /// Number of equality constraints M. Defaults to 0.
    fn num_equality(&self) -> usize {
        0
    }

    /// Number of inequality constraints N. Defaults to 0.
    fn num_inequality(&self) -> usize {
        0
    }

    /// c_E(x), size M. Defaults to an empty vector.
    fn equality(&self, x: &DVector<Self::Float>) -> Result<DVector<Self::Float>, Error> {
        let _ = x;
        Ok(DVector::zeros(0))
    }

    /// c_I(x), size N. Defaults to an empty vector.
    fn inequality(&self, x: &DVector<Self::Float>) -> Result<DVector<Self::Float>, Error> {
        let _ = x;
        Ok(DVector::zeros(0))
    }

    /// J_E(x) = ∂c_E/∂x, shape D×M. Defaults to an empty D×0 matrix.
    fn equality_jacobian(&self, x: &DVector<Self::Float>) -> Result<DMatrix<Self::Float>, Error> {
        Ok(DMatrix::zeros(x.len(), 0))
    }

    /// J_I(x) = ∂c_I/∂x, shape D×N. Defaults to an empty D×0 matrix.
    fn inequality_jacobian(&self, x: &DVector<Self::Float>) -> Result<DMatrix<Self::Float>, Error> {
        Ok(DMatrix::zeros(x.len(), 0))
    }

    /// ∇²_xL(x, λ) = ∇²f(x) − Σ λ_E,i ∇²c_E,i(x) − Σ λ_I,i ∇²c_I,i(x), shape D×D.
    ///
    /// `lambda` is the stacked multiplier vector, equality block first. Only called in
    /// exact-Hessian mode (`IpOptions::use_lbfgs == false`); the default implementation reports
    /// that the caller must either provide it or turn on `use_lbfgs`.
    fn lagrangian_hessian(
        &self,
        x: &DVector<Self::Float>,
        lambda: &DVector<Self::Float>,
    ) -> Result<DMatrix<Self::Float>, Error> {
        let _ = (x, lambda);
        Err(crate::argmin_error!(
            NotImplemented,
            "lagrangian_hessian is not implemented for this problem; enable IpOptions::use_lbfgs \
             to approximate it instead"
        ))
    }
}
