// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A line-search primal-dual interior-point solver for smooth, possibly nonconvex, constrained
//! optimization problems of the form
//!
//! ```text
//! minimize    f(x)
//! subject to  c_E(x) = 0
//!             c_I(x) >= 0
//! ```
//!
//! following the barrier/penalty formulation of Nocedal & Wright, *Numerical Optimization*,
//! chapter 19. The Hessian of the Lagrangian can be supplied exactly, or approximated with a
//! compact-representation limited-memory BFGS update, so problems without a tractable Hessian can
//! still be solved.
//!
//! Problems are expressed by implementing a single trait,
//! [`ConstrainedProblem`](`crate::solver::interior_point::ConstrainedProblem`), which bundles
//! `cost`/`gradient` together with the optional constraint, Jacobian and Hessian capabilities, and
//! handed to an [`Executor`](`crate::core::Executor`) together with an
//! [`InteriorPoint`](`crate::solver::interior_point::InteriorPoint`) solver instance.
//!
//! Observers allow one to track the progress of iterations, either by using one of the provided
//! ones for logging to screen or disk or by implementing your own.
//!
//! An optional checkpointing mechanism helps to mitigate the negative effects of crashes in
//! unstable computing environments.
//!
//! # Highlights
//!
//! * [Checkpointing](`crate::core::checkpointing`)
//! * [Observers](`crate::core::observers`)
//!
//! # Algorithm
//!
//! - [Interior-point method](`crate::solver::interior_point::InteriorPoint`)
//!   - Exact or compact L-BFGS Hessian approximation
//!   - Fraction-to-boundary step control, Armijo backtracking with second-order correction
//!   - Inertia-correcting regularization of the augmented KKT system
//!
//! # License
//!
//! Licensed under either of
//!
//!   * Apache License, Version 2.0,
//!     ([LICENSE-APACHE](https://github.com/argmin-rs/argmin/blob/main/LICENSE-APACHE) or
//!     <http://www.apache.org/licenses/LICENSE-2.0>)
//!   * MIT License ([LICENSE-MIT](https://github.com/argmin-rs/argmin/blob/main/LICENSE-MIT) or
//!     <http://opensource.org/licenses/MIT>)
//!
//! at your option.
//!
//! ## Contribution
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion
//! in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above,
//! without any additional terms or conditions.

#![warn(missing_docs)]
#![allow(unused_attributes)]
// Explicitly disallow EQ comparison of floats. (This clippy lint is denied by default; however,
// this is just to make sure that it will always stay this way.)
#![deny(clippy::float_cmp)]

#[macro_use]
pub mod core;

/// Dense linear-algebra primitives (symmetric solve, eigenvalues, pseudoinverse, least squares)
pub mod linalg;

/// Solvers
pub mod solver;
