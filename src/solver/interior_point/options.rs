// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Solver configuration (§6 `configure` surface).

use crate::core::{ArgminError, ArgminFloat, ConsoleLogger, Error};

/// Configuration for [`InteriorPoint`](`crate::solver::interior_point::InteriorPoint`).
///
/// Every setter is `#[must_use]` and chainable, mirroring the teacher's `IterState` builder
/// methods. Dimension and range checks run eagerly in [`IpOptions::validate`], raising
/// `ArgminError::ConfigurationError` rather than failing deep inside a solve.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct IpOptions<F> {
    /// Initial barrier parameter μ₀
    pub mu0: F,
    /// Initial merit penalty ν₀
    pub nu0: F,
    /// ρ: denominator guard in the ν update (§4.9)
    pub rho: F,
    /// τ: fraction-to-boundary parameter (§4.8)
    pub tau: F,
    /// η: Armijo sufficient-decrease coefficient (§4.9) and regularization coefficient (§4.5)
    pub eta: F,
    /// β: exponent in the equality-block regularization term reg·η·μ^β (§4.5)
    pub beta: F,
    /// Maximum inner iterations per outer pass
    pub inner_iter_max: u64,
    /// Maximum outer iterations
    pub outer_iter_max: u64,
    /// Step-length convergence tolerance (unused by the default KKT-only convergence test, kept
    /// for parity with the external interface of §6)
    pub xtol: F,
    /// KKT residual convergence tolerance
    pub ktol: F,
    /// Use the compact L-BFGS Hessian approximation instead of an exact Hessian
    pub use_lbfgs: bool,
    /// L-BFGS memory (number of stored (Δx, Δg) pairs)
    pub lbfgs_memory: usize,
    /// Initial L-BFGS scaling ζ₀
    pub lbfgs_zeta0: F,
    /// Verbosity: -1 silent, 0 one-line result, 1 outer headers, 2 adds cost, 3 adds KKT norms
    pub verbosity: i32,
}

impl<F: ArgminFloat> Default for IpOptions<F> {
    fn default() -> Self {
        IpOptions {
            mu0: F::from_f64(0.2).unwrap(),
            nu0: F::from_f64(10.0).unwrap(),
            rho: F::from_f64(0.1).unwrap(),
            tau: F::from_f64(0.995).unwrap(),
            eta: F::from_f64(1e-4).unwrap(),
            beta: F::from_f64(0.4).unwrap(),
            inner_iter_max: 20,
            outer_iter_max: 100,
            xtol: F::from_f64(1e-8).unwrap(),
            ktol: F::from_f64(1e-8).unwrap(),
            use_lbfgs: true,
            lbfgs_memory: 10,
            lbfgs_zeta0: F::from_f64(1.0).unwrap(),
            verbosity: 0,
        }
    }
}

impl<F: ArgminFloat> IpOptions<F> {
    /// Construct the default options (`IpOptions::default()`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set μ₀.
    #[must_use]
    pub fn mu0(mut self, mu0: F) -> Self {
        self.mu0 = mu0;
        self
    }

    /// Set ν₀.
    #[must_use]
    pub fn nu0(mut self, nu0: F) -> Self {
        self.nu0 = nu0;
        self
    }

    /// Set ρ.
    #[must_use]
    pub fn rho(mut self, rho: F) -> Self {
        self.rho = rho;
        self
    }

    /// Set τ.
    #[must_use]
    pub fn tau(mut self, tau: F) -> Self {
        self.tau = tau;
        self
    }

    /// Set η.
    #[must_use]
    pub fn eta(mut self, eta: F) -> Self {
        self.eta = eta;
        self
    }

    /// Set β.
    #[must_use]
    pub fn beta(mut self, beta: F) -> Self {
        self.beta = beta;
        self
    }

    /// Set the maximum number of inner iterations.
    #[must_use]
    pub fn inner_iter_max(mut self, inner_iter_max: u64) -> Self {
        self.inner_iter_max = inner_iter_max;
        self
    }

    /// Set the maximum number of outer iterations.
    #[must_use]
    pub fn outer_iter_max(mut self, outer_iter_max: u64) -> Self {
        self.outer_iter_max = outer_iter_max;
        self
    }

    /// Set the KKT residual tolerance.
    #[must_use]
    pub fn ktol(mut self, ktol: F) -> Self {
        self.ktol = ktol;
        self
    }

    /// Set the step-length tolerance.
    #[must_use]
    pub fn xtol(mut self, xtol: F) -> Self {
        self.xtol = xtol;
        self
    }

    /// Use the compact L-BFGS approximation (`true`) or an exact Hessian (`false`).
    #[must_use]
    pub fn use_lbfgs(mut self, use_lbfgs: bool) -> Self {
        self.use_lbfgs = use_lbfgs;
        self
    }

    /// Set the L-BFGS memory.
    #[must_use]
    pub fn lbfgs_memory(mut self, lbfgs_memory: usize) -> Self {
        self.lbfgs_memory = lbfgs_memory;
        self
    }

    /// Set the initial L-BFGS scaling ζ₀.
    #[must_use]
    pub fn lbfgs_zeta0(mut self, lbfgs_zeta0: F) -> Self {
        self.lbfgs_zeta0 = lbfgs_zeta0;
        self
    }

    /// Set the verbosity level.
    #[must_use]
    pub fn verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Build the default console observer for this configuration's verbosity level, ready to be
    /// attached to an [`Executor`](`crate::core::Executor`) with `.add_observer(..)`.
    pub fn console_logger(&self) -> ConsoleLogger {
        ConsoleLogger::new(self.verbosity)
    }

    /// Validate the option values, raising `ArgminError::ConfigurationError` eagerly rather than
    /// failing deep inside a solve.
    pub fn validate(&self) -> Result<(), Error> {
        if self.mu0 <= F::zero() || self.nu0 <= F::zero() {
            return Err(ArgminError::ConfigurationError {
                text: "mu0 and nu0 must be strictly positive".to_string(),
            }
            .into());
        }
        if self.tau <= F::zero() || self.tau >= F::one() {
            return Err(ArgminError::ConfigurationError {
                text: "tau must lie in (0, 1)".to_string(),
            }
            .into());
        }
        if self.inner_iter_max == 0 || self.outer_iter_max == 0 {
            return Err(ArgminError::ConfigurationError {
                text: "inner_iter_max and outer_iter_max must be at least 1".to_string(),
            }
            .into());
        }
        if self.use_lbfgs && self.lbfgs_memory == 0 {
            return Err(ArgminError::ConfigurationError {
                text: "lbfgs_memory must be at least 1 when use_lbfgs is set".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let opts: IpOptions<f64> = IpOptions::default();
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_tau() {
        let opts: IpOptions<f64> = IpOptions::default().tau(1.5);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_console_logger_reads_verbosity() {
        let opts: IpOptions<f64> = IpOptions::default().verbosity(2);
        let _logger = opts.console_logger();
    }

    #[test]
    fn test_rejects_zero_lbfgs_memory() {
        let opts: IpOptions<f64> = IpOptions::default().use_lbfgs(true).lbfgs_memory(0);
        assert!(opts.validate().is_err());
    }
}
