// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Compact L-BFGS representation (§4.6, §4.7).
//!
//! Only `S`, `Y`, the scaling `ζ`, the fail counter and the memory limit are stored; `SS`, `L` and
//! `D` differ in meaning between the unconstrained and constrained branches (§3: "SS: SᵀS
//! (constrained) or YᵀY (unconstrained)"), so rather than keep two mutually-exclusive
//! interpretations of the same fields, they are recomputed from `S`/`Y` on demand by whichever
//! branch needs them -- cheap, since memory is always small (order ten columns).

use crate::core::{ArgminError, ArgminFloat, Error};
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

fn solve_square<F: RealField + Copy>(a: &DMatrix<F>, b: &DVector<F>) -> Result<DVector<F>, Error> {
    a.clone().lu().solve(b).ok_or_else(|| {
        ArgminError::SingularSystemError {
            text: "L-BFGS compact representation: singular small system".to_string(),
        }
        .into()
    })
}

/// Compact L-BFGS buffers, owned by the solver (not the iterate state, since they are
/// optimization machinery rather than part of the primal-dual point).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct LbfgsState<F> {
    /// Scaling of the initial Hessian approximation, B₀ = ζI.
    pub zeta: F,
    /// Columns are successive Δx, most recent last.
    pub s: DMatrix<F>,
    /// Columns are successive −Δ(∇_xL), most recent last.
    pub y: DMatrix<F>,
    /// Consecutive rejected updates.
    pub fail_count: usize,
    /// Memory limit m_max.
    pub memory: usize,
    dim: usize,
}

impl<F: ArgminFloat + RealField + Copy> LbfgsState<F> {
    /// Create empty L-BFGS storage for a problem of dimension `dim`, with initial scaling `zeta0`
    /// and memory limit `memory`.
    pub fn new(dim: usize, memory: usize, zeta0: F) -> Self {
        LbfgsState {
            zeta: zeta0,
            s: DMatrix::zeros(dim, 0),
            y: DMatrix::zeros(dim, 0),
            fail_count: 0,
            memory,
            dim,
        }
    }

    /// Number of stored (Δx, Δg) pairs.
    pub fn len(&self) -> usize {
        self.s.ncols()
    }

    /// True if no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.s.ncols() == 0
    }

    /// Reset storage to empty, restoring `zeta0` (§4.7: "reset storage to empty with ζ ← initial
    /// ζ").
    pub fn reset(&mut self, zeta0: F) {
        self.zeta = zeta0;
        self.s = DMatrix::zeros(self.dim, 0);
        self.y = DMatrix::zeros(self.dim, 0);
        self.fail_count = 0;
    }

    /// Attempt an update after an accepted step (§4.7). `constrained` selects the ζ update rule:
    /// `(Δgᵀ Δx)/(Δxᵀ Δx + ε)` when true, `(Δgᵀ Δx)/(Δgᵀ Δg + ε)` when false.
    pub fn update(&mut self, dx: &DVector<F>, dg: &DVector<F>, constrained: bool) {
        let eps = F::default_epsilon();
        // `F: ArgminFloat + RealField` gives two candidate `sqrt` impls; disambiguate explicitly.
        let sqrt_eps = Float::sqrt(eps);
        let denom = if constrained { dx.dot(dx) } else { dg.dot(dg) };
        let zeta_new = dg.dot(dx) / (denom + eps);
        let curvature = dx.dot(dg);

        if curvature > sqrt_eps && zeta_new > sqrt_eps {
            self.zeta = zeta_new;
            if self.s.ncols() >= self.memory && self.memory > 0 {
                let keep = self.memory - 1;
                let start = self.s.ncols() - keep;
                self.s = self.s.columns(start, keep).into_owned();
                self.y = self.y.columns(start, keep).into_owned();
            }
            self.s = self.s.clone().insert_column(self.s.ncols(), F::zero());
            self.y = self.y.clone().insert_column(self.y.ncols(), F::zero());
            let last = self.s.ncols() - 1;
            self.s.set_column(last, dx);
            self.y.set_column(last, dg);
            self.fail_count = 0;
        } else {
            self.fail_count += 1;
            if self.fail_count > self.memory.max(1) && !self.is_empty() {
                let zeta0 = self.zeta;
                self.reset(zeta0);
            }
        }
    }

    /// SᵀY (the "L"/"R" and "D" source matrix shared by both branches).
    fn sty(&self) -> DMatrix<F> {
        self.s.transpose() * &self.y
    }
}

/// Unconstrained compact L-BFGS direction (§4.6, M = N = 0 branch).
///
/// `residual` is the raw (unnegated) stationarity residual ∇f(x); internally `g = -residual` is
/// used, matching "let g be the negative KKT residual".
pub fn direction_unconstrained<F: ArgminFloat + RealField + Copy>(
    state: &LbfgsState<F>,
    residual: &DVector<F>,
) -> Result<DVector<F>, Error> {
    let g = -residual;
    if state.is_empty() {
        return Ok(&g * state.zeta);
    }
    let (a, b) = compact_ab(state, &g)?;
    Ok(&g * state.zeta + &state.s * &a + (&state.y * &b) * state.zeta)
}

/// Shared A/B computation of §4.6's compact update, used both standalone (unconstrained branch)
/// and as the rank correction applied on top of the constrained branch's zero-order solve.
fn compact_ab<F: ArgminFloat + RealField + Copy>(
    state: &LbfgsState<F>,
    g: &DVector<F>,
) -> Result<(DVector<F>, DVector<F>), Error> {
    let l = state.sty();
    let m = l.nrows();
    let d_diag = l.diagonal();
    let yty = state.y.transpose() * &state.y;

    let wg_top = state.s.transpose() * g;
    let wg_bot = (state.y.transpose() * g) * state.zeta;

    let b = -solve_square(&l, &wg_top)?;

    let mut scaled = DVector::<F>::zeros(m);
    for i in 0..m {
        scaled[i] = d_diag[i] * b[i];
    }
    let ysb = (&yty * &b) * state.zeta;
    let rhs_a = scaled + ysb + wg_bot;
    let a = -solve_square(&l.transpose(), &rhs_a)?;

    Ok((a, b))
}

/// Constrained compact L-BFGS direction (§4.6, M + N > 0 branch).
///
/// `g_stack` is the raw (unnegated) stacked KKT residual in the usual [primal, complementarity,
/// equality, inequality] block order (sizes D, N, M, N). `b` is the §4.3 augmented Jacobian (shape
/// (D+N)×(M+N)); `sigma` is Σ's diagonal (λ_I[i] / s[i]).
///
/// When `B` is square and well-conditioned, the zero-order block system is solved directly ("the
/// reduce branch"): `Bᵀz₀ = rhs_dual` pins `z₀` without reference to `A_diag` at all, then
/// `Bw = r − A_diag·z₀` recovers `w` -- two solves on `B` itself, no `BᵀA_diag⁻¹B` ever formed.
/// Otherwise `A_diag = diag(ζ·1_D, Σ)` stands in for the exact Hessian in the normal-equations
/// form `BᵀA_diag⁻¹B`, regularizing its leading M×M block if ill-conditioned, and inverting via a
/// symmetric solve, exactly as §4.6 describes for the general case. Either way, the compact
/// rank-two correction of [`compact_ab`] -- evaluated on the primal residual block alone -- is then
/// added to the primal part of the result. The dual part is negated at the end to match the
/// convention `λ ← λ + α·dλ` used by [`super::direction::newton_direction`], so both direction
/// sources can be handled uniformly by the caller.
pub fn direction_constrained<F: ArgminFloat + RealField + Copy>(
    state: &LbfgsState<F>,
    g_stack: &DVector<F>,
    b: &DMatrix<F>,
    sigma: &DVector<F>,
    d: usize,
    m: usize,
    n: usize,
    reg_shift: F,
) -> Result<DVector<F>, Error> {
    let neg_g = -g_stack;
    let r = DVector::from_column_slice(&neg_g.as_slice()[0..d + n]);
    let rhs_dual = DVector::from_column_slice(&neg_g.as_slice()[d + n..d + n + m + n]);

    let mut a_diag = DVector::<F>::zeros(d + n);
    for i in 0..d {
        a_diag[i] = state.zeta;
    }
    for i in 0..n {
        a_diag[d + i] = sigma[i];
    }

    let square = b.nrows() == b.ncols();
    let reduce = square && crate::linalg::rcond_rect(b) > F::default_epsilon();

    let (mut z0, w) = if reduce {
        let bt = b.transpose();
        let z0_reduced = solve_square(&bt, &rhs_dual)?;
        let mut a_z0 = DVector::<F>::zeros(d + n);
        for i in 0..(d + n) {
            a_z0[i] = a_diag[i] * z0_reduced[i];
        }
        let rhs_w = &r - &a_z0;
        let w = solve_square(b, &rhs_w)?;
        (z0_reduced, w)
    } else {
        let mut inv_a_b = b.clone();
        for i in 0..(d + n) {
            let scale = F::one() / a_diag[i];
            for j in 0..b.ncols() {
                inv_a_b[(i, j)] *= scale;
            }
        }
        let mut bt_ainv_b = b.transpose() * &inv_a_b;

        if m > 0 {
            let leading = bt_ainv_b.view((0, 0), (m, m)).clone_owned();
            if crate::linalg::rcond(&leading) <= F::default_epsilon() {
                for i in 0..m {
                    bt_ainv_b[(i, i)] += reg_shift;
                }
            }
        }

        let mut r_over_a = DVector::<F>::zeros(d + n);
        for i in 0..(d + n) {
            r_over_a[i] = r[i] / a_diag[i];
        }
        let rhs_w = b.transpose() * &r_over_a - &rhs_dual;
        let w = crate::linalg::symmetric_solve(&bt_ainv_b, &rhs_w)?;

        let bw = b * &w;
        let mut z0_otherwise = DVector::<F>::zeros(d + n);
        for i in 0..(d + n) {
            z0_otherwise[i] = (r[i] - bw[i]) / a_diag[i];
        }
        (z0_otherwise, w)
    };

    if !state.is_empty() {
        let r_primal = DVector::from_column_slice(&r.as_slice()[0..d]);
        let (a, bb) = compact_ab(state, &r_primal)?;
        let corr = &state.s * &a + (&state.y * &bb) * state.zeta;
        for i in 0..d {
            z0[i] += corr[i];
        }
    }

    let mut dz = DVector::<F>::zeros(d + n + m + n);
    dz.rows_mut(0, d + n).copy_from(&z0);
    for i in 0..(m + n) {
        dz[d + n + i] = -w[i];
    }
    Ok(dz)
}

/// Powell-damped curvature correction for a rejected (Δx, Δg) pair, given the scalar initial
/// Hessian approximation B₀ = ζI. Not called by [`LbfgsState::update`] -- its curvature test
/// simply discards pairs that fail -- kept as a diagnostic for callers who want to rescue a
/// rejected pair instead of dropping it.
#[allow(dead_code)]
pub fn lbfgs_curvature_perturbation<F: ArgminFloat + RealField + Copy>(
    dx: &DVector<F>,
    dg: &DVector<F>,
    zeta: F,
) -> DVector<F> {
    let b0s = dx * zeta;
    let sty = dx.dot(dg);
    let stb0s = dx.dot(&b0s);
    let threshold = F::from_f64(0.2).unwrap() * stb0s;
    let theta = if sty >= threshold {
        F::one()
    } else {
        let denom = stb0s - sty;
        if denom > F::default_epsilon() {
            F::from_f64(0.8).unwrap() * stb0s / denom
        } else {
            F::zero()
        }
    };
    dg * theta + &b0s * (F::one() - theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_state_is_steepest_descent_scaled_by_zeta() {
        let state: LbfgsState<f64> = LbfgsState::new(2, 5, 2.0);
        let residual = DVector::from_row_slice(&[1.0, -2.0]);
        let dz = direction_unconstrained(&state, &residual).unwrap();
        assert_relative_eq!(dz[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(dz[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_accepts_good_curvature_pair() {
        let mut state: LbfgsState<f64> = LbfgsState::new(2, 5, 1.0);
        let dx = DVector::from_row_slice(&[1.0, 0.0]);
        let dg = DVector::from_row_slice(&[1.0, 0.0]);
        state.update(&dx, &dg, false);
        assert_eq!(state.len(), 1);
        assert_eq!(state.fail_count, 0);
    }

    #[test]
    fn test_update_rejects_bad_curvature_pair() {
        let mut state: LbfgsState<f64> = LbfgsState::new(2, 5, 1.0);
        let dx = DVector::from_row_slice(&[1.0, 0.0]);
        let dg = DVector::from_row_slice(&[-1.0, 0.0]);
        state.update(&dx, &dg, false);
        assert_eq!(state.len(), 0);
        assert_eq!(state.fail_count, 1);
    }

    #[test]
    fn test_memory_limit_drops_oldest_column() {
        let mut state: LbfgsState<f64> = LbfgsState::new(1, 2, 1.0);
        for i in 1..=3 {
            let dx = DVector::from_row_slice(&[i as f64]);
            let dg = DVector::from_row_slice(&[i as f64]);
            state.update(&dx, &dg, false);
        }
        assert_eq!(state.len(), 2);
        assert_relative_eq!(state.s[(0, 0)], 2.0);
        assert_relative_eq!(state.s[(0, 1)], 3.0);
    }

    #[test]
    fn test_direction_constrained_reduce_branch_square_b() {
        // d=1, n=0, m=1: B is 1x1, so the reduce branch (two direct solves on B) applies.
        let state: LbfgsState<f64> = LbfgsState::new(1, 5, 2.0);
        let g_stack = DVector::from_row_slice(&[1.0, 2.0]);
        let b = DMatrix::from_row_slice(1, 1, &[3.0]);
        let sigma = DVector::<f64>::zeros(0);
        let dz = direction_constrained(&state, &g_stack, &b, &sigma, 1, 1, 0, 1e-8).unwrap();
        assert_relative_eq!(dz[0], -2.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(dz[1], -1.0 / 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_curvature_perturbation_passes_through_good_pair() {
        let dx = DVector::from_row_slice(&[1.0_f64]);
        let dg = DVector::from_row_slice(&[1.0_f64]);
        let damped = lbfgs_curvature_perturbation(&dx, &dg, 1.0);
        assert_relative_eq!(damped[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_curvature_perturbation_blends_bad_pair_toward_b0s() {
        let dx = DVector::from_row_slice(&[1.0_f64]);
        let dg = DVector::from_row_slice(&[-1.0_f64]);
        let damped = lbfgs_curvature_perturbation(&dx, &dg, 1.0);
        // sty = -1 < 0.2*1 = 0.2, so theta < 1: result should lie strictly between dg and b0s=dx.
        assert!(damped[0] > -1.0 && damped[0] < 1.0);
    }
}
