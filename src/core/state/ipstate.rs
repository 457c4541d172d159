// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{ArgminFloat, Problem, State, TerminationReason};
use nalgebra::DVector;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::mem;

/// A primal/slack/multiplier triple. Plays the role of `Param` for [`IpState`]: the interior-point
/// method always advances x, s and λ together, so there is no useful notion of "best x" without
/// its matching s and λ.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Iterate<F> {
    /// Primal variables x
    pub x: DVector<F>,
    /// Slack variables s (empty when there are no inequality constraints)
    pub s: DVector<F>,
    /// Multipliers λ, equality block first, inequality block second
    pub lambda: DVector<F>,
}

impl<F: ArgminFloat> Iterate<F> {
    /// Construct an iterate from its three parts.
    pub fn new(x: DVector<F>, s: DVector<F>, lambda: DVector<F>) -> Self {
        Iterate { x, s, lambda }
    }
}

/// The norms of the four KKT residual blocks (§4.2), in block order
/// `[primal, slack, equality, inequality]`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct KktNorms<F> {
    /// ‖∇f(x) − Jᴱᵀλ_E − Jᴵᵀλ_I‖
    pub stationarity: F,
    /// ‖s ⊙ (λ_I − μ/s)‖, i.e. the complementarity residual scaled by s
    pub complementarity: F,
    /// ‖c_E(x)‖
    pub equality: F,
    /// ‖c_I(x) − s‖
    pub inequality: F,
}

impl<F: ArgminFloat> KktNorms<F> {
    /// True if every block is at most `tol`.
    pub fn converged(&self, tol: F) -> bool {
        self.stationarity <= tol
            && self.complementarity <= tol
            && self.equality <= tol
            && self.inequality <= tol
    }
}

/// State of a single interior-point solve.
///
/// Plays the role the generic `IterState<P, G, J, H, F>` plays for argmin's other solvers, but is
/// specialized to the quantities the interior-point method actually carries: the primal/slack/dual
/// iterate, the barrier and merit parameters, the Hessian regularization offset, the KKT residual
/// norms and the outer/inner iteration counters of §4.12.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct IpState<F> {
    /// Current iterate
    pub param: Option<Iterate<F>>,
    /// Previous iterate
    pub prev_param: Option<Iterate<F>>,
    /// Best iterate found so far (by KKT norm, not by cost alone -- an infeasible point with a
    /// lower cost is not "better")
    pub best_param: Option<Iterate<F>>,
    /// f(x) at the current iterate
    pub cost: F,
    /// f(x) at the best iterate
    pub best_cost: F,
    /// Target cost; solver stops early if reached (rarely used for constrained problems)
    pub target_cost: F,
    /// Current KKT residual norms
    pub kkt: KktNorms<F>,
    /// Best (smallest maximum) KKT residual norms seen so far
    pub best_kkt: KktNorms<F>,
    /// Barrier parameter μ
    pub mu: F,
    /// Merit penalty ν
    pub nu: F,
    /// Hessian regularization offset δ
    pub delta: F,
    /// Outer iteration counter (§4.12)
    pub outer_iter: u64,
    /// Inner iteration counter within the current outer iteration (§4.12)
    pub inner_iter: u64,
    /// Total iteration counter (outer + inner combined), what `State::get_iter` reports
    pub iter: u64,
    /// Maximum total iterations (`outer_iter_max * inner_iter_max`, an upper bound)
    pub max_iters: u64,
    /// Iteration at which `best_param` was last updated
    pub last_best_iter: u64,
    /// Termination reason
    pub termination_reason: TerminationReason,
    /// Time elapsed so far
    #[cfg_attr(feature = "serde1", serde(skip))]
    pub time: Option<instant::Duration>,
    /// Oracle evaluation counts, copied from `Problem` after every iteration
    pub func_counts: HashMap<&'static str, u64>,
}

impl<F: ArgminFloat> Default for IpState<F> {
    fn default() -> Self {
        IpState {
            param: None,
            prev_param: None,
            best_param: None,
            cost: F::infinity(),
            best_cost: F::infinity(),
            target_cost: F::neg_infinity(),
            kkt: KktNorms::default(),
            best_kkt: KktNorms::default(),
            mu: F::from_f64(0.2).unwrap(),
            nu: F::from_f64(10.0).unwrap(),
            delta: F::from_f64(0.0).unwrap(),
            outer_iter: 0,
            inner_iter: 0,
            iter: 0,
            max_iters: u64::MAX,
            last_best_iter: 0,
            termination_reason: TerminationReason::NotTerminated,
            time: None,
            func_counts: HashMap::new(),
        }
    }
}

impl<F: ArgminFloat> IpState<F> {
    /// Set the initial iterate.
    #[must_use]
    pub fn param(mut self, iterate: Iterate<F>) -> Self {
        mem::swap(&mut self.prev_param, &mut self.param);
        self.param = Some(iterate);
        self
    }

    /// Set the cost function value of the current iterate.
    #[must_use]
    pub fn cost(mut self, cost: F) -> Self {
        self.cost = cost;
        self
    }

    /// Set the current KKT residual norms.
    #[must_use]
    pub fn kkt(mut self, kkt: KktNorms<F>) -> Self {
        self.kkt = kkt;
        self
    }

    /// Set the barrier parameter.
    #[must_use]
    pub fn mu(mut self, mu: F) -> Self {
        self.mu = mu;
        self
    }

    /// Set the merit penalty.
    #[must_use]
    pub fn nu(mut self, nu: F) -> Self {
        self.nu = nu;
        self
    }

    /// Set the Hessian regularization offset.
    #[must_use]
    pub fn delta(mut self, delta: F) -> Self {
        self.delta = delta;
        self
    }

    /// Set the maximum total number of iterations.
    #[must_use]
    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the target cost.
    #[must_use]
    pub fn target_cost(mut self, target_cost: F) -> Self {
        self.target_cost = target_cost;
        self
    }

    /// Increment the outer iteration counter and reset the inner one.
    pub fn next_outer(&mut self) {
        self.outer_iter += 1;
        self.inner_iter = 0;
    }

    /// Increment the inner iteration counter.
    pub fn next_inner(&mut self) {
        self.inner_iter += 1;
    }
}

impl<F: ArgminFloat> State for IpState<F> {
    type Param = Iterate<F>;
    type Float = F;

    fn new() -> Self {
        IpState::default()
    }

    fn update(&mut self) {
        // "Better" means: strictly lower max KKT-block norm, falling back to cost when both are
        // (numerically) tied -- mirrors the cost-only tie-break the teacher's `IterState::update`
        // uses, generalized to account for feasibility.
        let current_worst = |k: &KktNorms<F>| {
            k.stationarity
                .max(k.complementarity)
                .max(k.equality)
                .max(k.inequality)
        };
        let is_better = if self.param.is_some() {
            let cur = current_worst(&self.kkt);
            let best = current_worst(&self.best_kkt);
            cur < best || (cur == best && self.cost < self.best_cost)
        } else {
            false
        };
        if is_better || self.best_param.is_none() {
            self.best_param = self.param.clone();
            self.best_cost = self.cost;
            self.best_kkt = self.kkt;
            self.last_best_iter = self.iter;
        }
    }

    fn get_best_param_ref(&self) -> Option<&Self::Param> {
        self.best_param.as_ref()
    }

    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    fn get_iter(&self) -> u64 {
        self.iter
    }

    fn get_cost(&self) -> Self::Float {
        self.cost
    }

    fn get_best_cost(&self) -> Self::Float {
        self.best_cost
    }

    fn get_target_cost(&self) -> Self::Float {
        self.target_cost
    }

    fn set_func_counts<O>(&mut self, problem: &Problem<O>) {
        for (k, &v) in problem.counts.iter() {
            self.func_counts.insert(k, v);
        }
    }

    fn terminated(&self) -> bool {
        self.termination_reason.terminated()
    }

    fn termination_reason(mut self, termination_reason: TerminationReason) -> Self {
        self.termination_reason = termination_reason;
        self
    }

    fn get_termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    fn time(&mut self, time: Option<instant::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    fn get_time(&self) -> Option<instant::Duration> {
        self.time
    }

    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    fn is_best(&self) -> bool {
        self.last_best_iter == self.iter
    }

    fn get_func_counts(&self) -> &HashMap<&'static str, u64> {
        &self.func_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iterate(x: f64) -> Iterate<f64> {
        Iterate::new(DVector::from_element(1, x), DVector::zeros(0), DVector::zeros(0))
    }

    #[test]
    fn test_update_prefers_feasibility_over_cost() {
        let mut state: IpState<f64> = IpState::new().param(iterate(1.0)).cost(100.0);
        state.kkt = KktNorms {
            stationarity: 1.0,
            complementarity: 0.0,
            equality: 0.0,
            inequality: 0.0,
        };
        state.update();
        assert_eq!(state.best_cost, 100.0);

        // Worse cost but strictly better KKT residual must still win.
        let mut state = state.param(iterate(2.0)).cost(200.0);
        state.kkt = KktNorms {
            stationarity: 0.1,
            complementarity: 0.0,
            equality: 0.0,
            inequality: 0.0,
        };
        state.update();
        assert_eq!(state.best_cost, 200.0);
    }

    #[test]
    fn test_increment_iter() {
        let mut state: IpState<f64> = IpState::new();
        assert_eq!(state.get_iter(), 0);
        state.increment_iter();
        assert_eq!(state.get_iter(), 1);
    }
}
