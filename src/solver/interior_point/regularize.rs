// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Inertia-correcting regularization of the augmented KKT matrix (§4.5).

use crate::core::ArgminFloat;
use crate::linalg::{negative_eigenvalue_count, rcond};
use nalgebra::{DMatrix, RealField};
use num_traits::Float;

/// `reg = sqrt(eps)`, the coefficient on the equality-block regularization term.
///
/// Uses `num_traits::Float::sqrt` explicitly (rather than `F::default_epsilon().sqrt()`) because
/// `F: ArgminFloat + RealField` gives two candidate `sqrt` impls (`Float` and `ComplexField`) and
/// plain method-call syntax would be ambiguous.
pub fn reg_constant<F: ArgminFloat + RealField>() -> F {
    Float::sqrt(F::default_epsilon())
}

/// Regularize `h` (the augmented KKT matrix of [`super::kkt::assemble_matrix`]) so that it has
/// inertia (D, M+N, 0), per §4.5.
///
/// `delta` is the solver's running diagonal offset (`IpState::delta`); a value of zero is taken
/// to mean "not yet used" and is replaced by `delta0` on the first call, matching the initializer
/// rule "δ is initialized to δ₀ on first use; on subsequent calls start from max(δ/2, δ₀)".
/// Returns the regularized matrix; `delta` is updated in place to whatever value achieved the
/// correct inertia, so the next call starts from it.
#[allow(clippy::too_many_arguments)]
pub fn regularize<F: ArgminFloat + RealField + Copy>(
    h: &DMatrix<F>,
    d: usize,
    m: usize,
    n: usize,
    delta: &mut F,
    delta0: F,
    eta: F,
    beta: F,
    mu: F,
) -> DMatrix<F> {
    let target_neg = m + n;
    let eps = F::default_epsilon();

    let mut h = h.clone();

    let rc = rcond(&h);
    let neg = negative_eigenvalue_count(&h, eps);
    if rc > eps && neg == target_neg {
        return h;
    }

    if m > 0 && rc <= eps {
        let shift = reg_constant::<F>() * eta * Float::powf(mu, beta);
        for i in 0..m {
            let idx = d + n + i;
            h[(idx, idx)] -= shift;
        }
    }

    let two = F::from_f64(2.0).unwrap();
    *delta = if *delta == F::zero() {
        delta0
    } else {
        let half = *delta / two;
        if half > delta0 {
            half
        } else {
            delta0
        }
    };

    let ten = F::from_f64(10.0).unwrap();
    loop {
        for i in 0..d {
            h[(i, i)] += *delta;
        }
        let neg = negative_eigenvalue_count(&h, eps);
        if neg == target_neg {
            break;
        }
        for i in 0..d {
            h[(i, i)] -= *delta;
        }
        *delta *= ten;
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn test_accepts_already_correct_inertia() {
        // diag(1, 1, -1) already has inertia (2, 1, 0) for d=2, m=1, n=0
        let h = DMatrix::<f64>::from_diagonal(&nalgebra::DVector::from_row_slice(&[1.0, 1.0, -1.0]));
        let mut delta = 0.0_f64;
        let out = regularize(&h, 2, 1, 0, &mut delta, 1e-8, 1e-4, 0.4, 0.2);
        assert_eq!(delta, 0.0);
        assert_eq!(out, h);
    }

    #[test]
    fn test_regularizes_indefinite_primal_block() {
        // d=1, m=0, n=0: a single negative diagonal entry needs target_neg = 0 negative
        // eigenvalues, so delta must grow (by repeated *10) until it flips the sign.
        let h = DMatrix::<f64>::from_diagonal(&nalgebra::DVector::from_row_slice(&[-5.0]));
        let mut delta = 0.0_f64;
        let out = regularize(&h, 1, 0, 0, &mut delta, 1e-8, 1e-4, 0.4, 0.2);
        assert!(delta > 5.0);
        assert!(out[(0, 0)] > 0.0);
    }
}
