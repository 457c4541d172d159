// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{ArgminFloat, DeserializeOwnedAlias, Error, SerializeAlias};
use std::collections::HashMap;

/// Compute the cost function at a given point.
pub trait CostFunction {
    /// Type of the parameter vector
    type Param: Clone + SerializeAlias + DeserializeOwnedAlias;
    /// Output of the cost function
    type Output: Clone + SerializeAlias + DeserializeOwnedAlias;

    /// Compute cost function
    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error>;
}

/// Compute the gradient of the cost function at a given point.
pub trait Gradient {
    /// Type of the parameter vector
    type Param: Clone + SerializeAlias + DeserializeOwnedAlias;
    /// Type of the gradient
    type Gradient: Clone + SerializeAlias + DeserializeOwnedAlias;

    /// Compute gradient
    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error>;
}

/// Compute the Hessian of the cost function at a given point.
pub trait Hessian {
    /// Type of the parameter vector
    type Param: Clone + SerializeAlias + DeserializeOwnedAlias;
    /// Type of the Hessian
    type Hessian: Clone + SerializeAlias + DeserializeOwnedAlias;

    /// Compute Hessian
    fn hessian(&self, param: &Self::Param) -> Result<Self::Hessian, Error>;
}

/// Compute a Jacobian at a given point.
pub trait Jacobian {
    /// Type of the parameter vector
    type Param: Clone + SerializeAlias + DeserializeOwnedAlias;
    /// Type of the Jacobian
    type Jacobian: Clone + SerializeAlias + DeserializeOwnedAlias;

    /// Compute Jacobian
    fn jacobian(&self, param: &Self::Param) -> Result<Self::Jacobian, Error>;
}

/// Marker trait for precision used by a problem; pulled in so solvers can bound `O::Float` the
/// same way they bound `ArgminFloat` elsewhere.
pub trait Precision {
    /// Floating point type
    type Float: ArgminFloat;
}

/// Wrapper around problems defined by users.
///
/// Keeps track of how many times methods such as `cost`, `gradient`, `jacobian`, `hessian` and so
/// on are called. It is passed from one iteration of a solver to the next so call counts survive
/// across the whole run.
#[derive(Clone, Debug, Default)]
pub struct Problem<O> {
    /// Problem defined by the user
    pub problem: Option<O>,
    /// Keeps track of how often methods of `problem` have been called.
    pub counts: HashMap<&'static str, u64>,
}

impl<O> Problem<O> {
    /// Wraps a problem into an instance of `Problem`.
    pub fn new(problem: O) -> Self {
        Problem {
            problem: Some(problem),
            counts: HashMap::new(),
        }
    }

    /// Gives access to the stored `problem` via the closure `func` and keeps track of how many
    /// times the function has been called. The function counts are exposed to observers labeled
    /// `counts_string`; by convention `counts_string` is `<something>_count`.
    pub fn problem<T, F: FnOnce(&O) -> Result<T, Error>>(
        &mut self,
        counts_string: &'static str,
        func: F,
    ) -> Result<T, Error> {
        let count = self.counts.entry(counts_string).or_insert(0);
        *count += 1;
        func(self.problem.as_ref().unwrap())
    }
}

impl<O: CostFunction> Problem<O> {
    /// Compute the cost function, keeping count.
    pub fn cost(&mut self, param: &O::Param) -> Result<O::Output, Error> {
        self.problem("cost_count", |problem| problem.cost(param))
    }
}

impl<O: Gradient> Problem<O> {
    /// Compute the gradient, keeping count.
    pub fn gradient(&mut self, param: &O::Param) -> Result<O::Gradient, Error> {
        self.problem("gradient_count", |problem| problem.gradient(param))
    }
}

impl<O: Hessian> Problem<O> {
    /// Compute the Hessian, keeping count.
    pub fn hessian(&mut self, param: &O::Param) -> Result<O::Hessian, Error> {
        self.problem("hessian_count", |problem| problem.hessian(param))
    }
}

impl<O: Jacobian> Problem<O> {
    /// Compute the Jacobian, keeping count.
    pub fn jacobian(&mut self, param: &O::Param) -> Result<O::Jacobian, Error> {
        self.problem("jacobian_count", |problem| problem.jacobian(param))
    }
}
