// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # `OptimizationResult`
//!
//! Returned by [`Executor::run`](`crate::core::Executor::run`). Wraps the problem (to recover
//! function evaluation counts) and the final [`State`].

use crate::core::{Problem, State};

/// Final struct returned by `Executor::run`.
#[derive(Clone)]
pub struct OptimizationResult<O, I: State> {
    /// The (wrapped) problem
    pub problem: Problem<O>,
    /// The final iteration state
    pub state: I,
}

impl<O, I: State> OptimizationResult<O, I> {
    /// Constructor
    pub fn new(problem: Problem<O>, state: I) -> Self {
        OptimizationResult { problem, state }
    }

    /// Return a handle to the wrapped problem.
    pub fn problem(&self) -> &Problem<O> {
        &self.problem
    }

    /// Return a handle to the final state.
    pub fn state(&self) -> &I {
        &self.state
    }
}

impl<O, I> std::fmt::Display for OptimizationResult<O, I>
where
    I: State + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IpState;

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptimizationResult<(), IpState<f64>>>();
    }
}
