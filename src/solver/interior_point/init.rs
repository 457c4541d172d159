// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Initialization of slacks and multipliers (§4.11).

use crate::core::Error;
use crate::linalg::least_squares;
use crate::solver::interior_point::oracle::ConstrainedProblem;
use nalgebra::{DMatrix, DVector};

/// Default `s₀ = max(c_I(x₀), Ktol)` and `λ₀` (least-squares multiplier estimate, negative
/// inequality entries clipped to `Ktol`).
pub fn initialize<P: ConstrainedProblem>(
    problem: &P,
    x0: &DVector<P::Float>,
    ktol: P::Float,
) -> Result<(DVector<P::Float>, DVector<P::Float>), Error> {
    let m = problem.num_equality();
    let n = problem.num_inequality();
    let d = x0.len();

    let ci = problem.inequality(x0)?;
    let mut s0 = DVector::zeros(n);
    for i in 0..n {
        s0[i] = if ci[i] > ktol { ci[i] } else { ktol };
    }

    let lambda0 = if m + n > 0 {
        let je = problem.equality_jacobian(x0)?;
        let ji = problem.inequality_jacobian(x0)?;
        let mut jcomb = DMatrix::<P::Float>::zeros(d, m + n);
        jcomb.view_mut((0, 0), (d, m)).copy_from(&je);
        jcomb.view_mut((0, m), (d, n)).copy_from(&ji);

        let grad = problem.gradient(x0)?;
        let mut lambda = least_squares(&jcomb, &grad)?;
        for i in 0..n {
            let idx = m + i;
            if lambda[idx] < ktol {
                lambda[idx] = ktol;
            }
        }
        lambda
    } else {
        DVector::zeros(0)
    };

    Ok((s0, lambda0))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Circle;

    impl ConstrainedProblem for Circle {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(-(x[0] + x[1]))
        }

        fn gradient(&self, _x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[-1.0, -1.0]))
        }

        fn num_equality(&self) -> usize {
            1
        }

        fn equality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[x[0] * x[0] + x[1] * x[1] - 1.0]))
        }

        fn equality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_row_slice(2, 1, &[2.0 * x[0], 2.0 * x[1]]))
        }
    }

    #[test]
    fn test_initialize_equality_only_has_empty_slack() {
        let problem = Circle;
        let x0 = DVector::from_row_slice(&[1.0, 0.0]);
        let (s0, lambda0) = initialize(&problem, &x0, 1e-8).unwrap();
        assert_eq!(s0.len(), 0);
        assert_eq!(lambda0.len(), 1);
        assert!(lambda0[0].is_finite());
    }

    #[test]
    fn test_unconstrained_has_no_multipliers() {
        struct Quad;
        impl ConstrainedProblem for Quad {
            type Float = f64;
            fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
                Ok(x.dot(x))
            }
            fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
                Ok(x * 2.0)
            }
        }
        let problem = Quad;
        let x0 = DVector::from_row_slice(&[1.0, 1.0]);
        let (s0, lambda0) = initialize(&problem, &x0, 1e-8).unwrap();
        assert_eq!(s0.len(), 0);
        assert_eq!(lambda0.len(), 0);
    }
}
