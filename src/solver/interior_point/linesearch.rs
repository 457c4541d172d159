// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Fraction-to-boundary step bounds and the backtracking line search (§4.8, §4.9).

use crate::core::Error;
use crate::linalg::least_squares;
use crate::solver::interior_point::oracle::{ensure_finite, ConstrainedProblem};
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

/// Largest α ∈ [0, 1] with `p + α·dp ≥ (1 − τ)·p` elementwise (§4.8), in closed form.
pub fn fraction_to_boundary<F: RealField + Copy>(p: &DVector<F>, dp: &DVector<F>, tau: F) -> F {
    let mut alpha = F::one();
    for i in 0..p.len() {
        if dp[i] < F::zero() {
            let cand = -tau * p[i] / dp[i];
            if cand < alpha {
                alpha = cand;
            }
        }
    }
    alpha
}

fn l1_norm<F: RealField + Copy>(v: &DVector<F>) -> F {
    v.iter().fold(F::zero(), |acc, &x| acc + x.abs())
}

fn constraint_residual<P: ConstrainedProblem>(
    problem: &P,
    x: &DVector<P::Float>,
    s: &DVector<P::Float>,
) -> Result<DVector<P::Float>, Error> {
    let ce = problem.equality(x)?;
    let ci = problem.inequality(x)? - s;
    let m = ce.len();
    let n = ci.len();
    let mut c = DVector::zeros(m + n);
    c.rows_mut(0, m).copy_from(&ce);
    c.rows_mut(m, n).copy_from(&ci);
    Ok(c)
}

/// φ(x, s) = f(x) − μ·Σ log(s_i) + ν·(‖c_E‖₁ + ‖c_I − s‖₁) (§4.1).
pub fn phi<P: ConstrainedProblem>(
    problem: &P,
    x: &DVector<P::Float>,
    s: &DVector<P::Float>,
    mu: P::Float,
    nu: P::Float,
) -> Result<P::Float, Error> {
    let f = problem.cost(x)?;
    if !Float::is_finite(f) {
        return Err(crate::argmin_error!(
            NonFinite,
            "cost returned a non-finite value"
        ));
    }
    let barrier = s.iter().fold(P::Float::zero(), |acc, &si| acc + Float::ln(si));
    let c = constraint_residual(problem, x, s)?;
    ensure_finite(&c, "equality/inequality")?;
    Ok(f - mu * barrier + nu * l1_norm(&c))
}

/// φ'(x, s; d) = ∇f(x)·dx − μ·Σ ds_i/s_i − ν·(‖c_E‖₁ + ‖c_I − s‖₁) (§4.1).
///
/// The penalty term is independent of the sign of `d` by construction -- it is the conservative
/// one-sided estimate the merit function's own construction uses for the Armijo test, not a true
/// directional derivative of the ℓ₁ term.
pub fn phi_prime<P: ConstrainedProblem>(
    problem: &P,
    x: &DVector<P::Float>,
    s: &DVector<P::Float>,
    dx: &DVector<P::Float>,
    ds: &DVector<P::Float>,
    mu: P::Float,
    nu: P::Float,
) -> Result<P::Float, Error> {
    let grad = problem.gradient(x)?;
    ensure_finite(&grad, "gradient")?;
    let mut barrier_term = P::Float::zero();
    for i in 0..s.len() {
        barrier_term += ds[i] / s[i];
    }
    let c = constraint_residual(problem, x, s)?;
    ensure_finite(&c, "equality/inequality")?;
    Ok(grad.dot(dx) - mu * barrier_term - nu * l1_norm(&c))
}

/// Result of an accepted line-search step.
pub struct StepResult<F> {
    /// Accepted primal point.
    pub x: DVector<F>,
    /// Accepted slack point.
    pub s: DVector<F>,
    /// Step length ultimately applied to (x, s).
    pub alpha: F,
    /// True if a second-order correction was used to accept this step.
    pub used_correction: bool,
}

/// Backtracking Armijo line search with second-order feasibility correction (§4.9).
///
/// `dx`, `ds` are the primal/slack parts of the search direction; `alpha_max` is the
/// fraction-to-boundary cap on the slack part (§4.8). `b` is the augmented Jacobian of §4.3,
/// needed only by the second-order correction path.
#[allow(clippy::too_many_arguments)]
pub fn line_search<P: ConstrainedProblem>(
    problem: &P,
    x: &DVector<P::Float>,
    s: &DVector<P::Float>,
    dx: &DVector<P::Float>,
    ds: &DVector<P::Float>,
    alpha_max: P::Float,
    mu: P::Float,
    nu: P::Float,
    eta: P::Float,
    tau: P::Float,
    b: &DMatrix<P::Float>,
) -> Result<StepResult<P::Float>, Error> {
    let phi0 = phi(problem, x, s, mu, nu)?;
    let phi_prime0 = phi_prime(problem, x, s, dx, ds, mu, nu)?;
    let c_old = constraint_residual(problem, x, s)?;
    let c_old_norm = l1_norm(&c_old);

    let mut alpha = alpha_max;

    loop {
        let x_trial = x + dx * alpha;
        let s_trial = s + ds * alpha;
        let phi_trial = phi(problem, &x_trial, &s_trial, mu, nu)?;
        let sufficient_decrease = phi0 + eta * alpha * phi_prime0;

        if phi_trial <= sufficient_decrease {
            return Ok(StepResult {
                x: x_trial,
                s: s_trial,
                alpha,
                used_correction: false,
            });
        }

        let c_new = constraint_residual(problem, &x_trial, &s_trial)?;
        if l1_norm(&c_new) > c_old_norm {
            let dz_p = -least_squares(&b.transpose(), &c_new)?;
            let d = dx.len();
            let n = ds.len();
            let dx_p = DVector::from_column_slice(&dz_p.as_slice()[0..d]);
            let ds_p = DVector::from_column_slice(&dz_p.as_slice()[d..d + n]);

            let x_soc = &x_trial + &dx_p;
            let s_soc = &s_trial + &ds_p;
            let phi_soc = phi(problem, &x_soc, &s_soc, mu, nu)?;

            if phi_soc <= sufficient_decrease {
                let alpha_corr = fraction_to_boundary(&s_trial, &ds_p, tau);
                let x_final = &x_trial + &dx_p * alpha_corr;
                let s_final = &s_trial + &ds_p * alpha_corr;
                return Ok(StepResult {
                    x: x_final,
                    s: s_final,
                    alpha,
                    used_correction: true,
                });
            }
        }

        alpha = alpha * tau;
    }
}

/// Update ν after a step, per §4.9: ν ← max(ν, ∇φ_barrier(x,s)·d / ((1 − ρ)·‖c(x,s)‖₁)).
///
/// `phi_barrier_dot_d` is ∇f(x)·dx − μ·Σ ds_i/s_i (the barrier-only part of the directional
/// derivative, i.e. [`phi_prime`] without its penalty term).
pub fn update_nu<F: RealField + Copy>(nu: F, phi_barrier_dot_d: F, rho: F, c_norm: F) -> F {
    let eps = F::default_epsilon();
    let candidate = phi_barrier_dot_d / ((F::one() - rho) * c_norm + eps);
    if candidate > nu {
        candidate
    } else {
        nu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_to_boundary_caps_at_one_when_direction_increases() {
        let p = DVector::from_row_slice(&[1.0_f64, 2.0]);
        let dp = DVector::from_row_slice(&[1.0_f64, 1.0]);
        let alpha = fraction_to_boundary(&p, &dp, 0.995);
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn test_fraction_to_boundary_limits_negative_direction() {
        // p=1, dp=-2, tau=0.5: alpha <= -0.5*1/-2 = 0.25
        let p = DVector::from_row_slice(&[1.0_f64]);
        let dp = DVector::from_row_slice(&[-2.0_f64]);
        let alpha = fraction_to_boundary(&p, &dp, 0.5);
        assert!((alpha - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_update_nu_is_nondecreasing() {
        let nu = update_nu(1.0_f64, 2.0, 0.1, 1.0);
        assert!(nu >= 1.0);
        let nu2 = update_nu(nu, -5.0, 0.1, 1.0);
        assert_eq!(nu2, nu);
    }
}
