// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Solver state
//!
//! Every solver driven by [`Executor`](`crate::core::Executor`) needs a state type implementing
//! [`State`]. This crate has a single solver family (the interior-point method), so unlike the
//! generic `IterState<P, G, J, H, F>` used for argmin's dozens of solvers, state here is the one
//! concrete [`ipstate::IpState`] tailored to primal/slack/multiplier iterates.

pub mod ipstate;

pub use ipstate::IpState;

use crate::core::{ArgminFloat, Problem, TerminationReason};
use std::collections::HashMap;

/// Types implementing this trait can be used to keep track of a solver's state.
pub trait State {
    /// Type of the parameter vector
    type Param: Clone;
    /// Floating point precision
    type Float: ArgminFloat;

    /// Constructor
    fn new() -> Self;

    /// Called after each iteration; updates the best-so-far iterate if the new one is better.
    fn update(&mut self);

    /// Returns a reference to the best parameter vector found so far.
    fn get_best_param_ref(&self) -> Option<&Self::Param>;

    /// Returns the maximum number of iterations.
    fn get_max_iters(&self) -> u64;

    /// Increments the iteration counter by one.
    fn increment_iter(&mut self);

    /// Returns the current iteration number.
    fn get_iter(&self) -> u64;

    /// Returns the current cost function value.
    fn get_cost(&self) -> Self::Float;

    /// Returns the best cost function value found so far.
    fn get_best_cost(&self) -> Self::Float;

    /// Returns the target cost value.
    fn get_target_cost(&self) -> Self::Float;

    /// Copies the function evaluation counts out of a [`Problem`] wrapper.
    fn set_func_counts<O>(&mut self, problem: &Problem<O>);

    /// Returns whether the algorithm has terminated.
    fn terminated(&self) -> bool;

    /// Sets the termination reason.
    #[must_use]
    fn termination_reason(self, termination_reason: TerminationReason) -> Self;

    /// Returns the termination reason.
    fn get_termination_reason(&self) -> TerminationReason;

    /// Sets the time elapsed so far.
    fn time(&mut self, time: Option<instant::Duration>) -> &mut Self;

    /// Returns the time elapsed so far.
    fn get_time(&self) -> Option<instant::Duration>;

    /// Returns the iteration number at which the current best parameter vector was found.
    fn get_last_best_iter(&self) -> u64;

    /// Returns whether the current iterate is also the best one found so far.
    fn is_best(&self) -> bool;

    /// Returns the function evaluation counts.
    fn get_func_counts(&self) -> &HashMap<&'static str, u64>;
}
