// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Exact-Hessian Newton direction (§4.4): regularize, then solve `H * dz = -g`.

use crate::core::{ArgminFloat, Error};
use crate::linalg::symmetric_solve;
use crate::solver::interior_point::regularize::regularize;
use nalgebra::{DMatrix, DVector, RealField};

/// Solve for the Newton step `dz = (dx, ds, dλ_E, dλ_I)` given the stacked KKT residual `g` and
/// the (unregularized) augmented matrix `h`. Regularizes `h` first (§4.5), then negates the dual
/// blocks of the solution so their sign matches the update rule `λ ← λ + α·dλ`.
#[allow(clippy::too_many_arguments)]
pub fn newton_direction<F: ArgminFloat + RealField + Copy>(
    g: &DVector<F>,
    h: &DMatrix<F>,
    d: usize,
    m: usize,
    n: usize,
    delta: &mut F,
    delta0: F,
    eta: F,
    beta: F,
    mu: F,
) -> Result<DVector<F>, Error> {
    let h_reg = regularize(h, d, m, n, delta, delta0, eta, beta, mu);
    let neg_g = -g;
    let mut dz = symmetric_solve(&h_reg, &neg_g)?;

    for i in (d + n)..(d + n + m + n) {
        dz[i] = -dz[i];
    }

    Ok(dz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    #[test]
    fn test_unconstrained_newton_step_is_descent() {
        // d=2, m=0, n=0: H is just the (positive definite) Hessian, dz should solve H dx = -g
        let h = DMatrix::<f64>::identity(2, 2) * 2.0;
        let g = DVector::from_row_slice(&[4.0, -2.0]);
        let mut delta = 0.0_f64;
        let dz = newton_direction(&g, &h, 2, 0, 0, &mut delta, 1e-8, 1e-4, 0.4, 0.2).unwrap();
        assert_relative_eq!(dz[0], -2.0, epsilon = 1e-9);
        assert_relative_eq!(dz[1], 1.0, epsilon = 1e-9);
    }
}
