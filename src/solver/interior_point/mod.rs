// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A line-search primal-dual interior-point method for smooth, possibly nonconvex, constrained
//! minimization (Nocedal & Wright, *Numerical Optimization*, ch. 19), with an optional compact
//! L-BFGS Hessian approximation.
//!
//! The outer loop drives the barrier parameter μ to zero; each outer pass runs an inner Newton
//! (or L-BFGS) iteration to approximately solve the barrier subproblem at fixed μ. See
//! [`kkt`], [`regularize`], [`direction`], [`lbfgs`], [`linesearch`] and [`init`] for the pieces,
//! and [`InteriorPoint::next_iter`] for how they are composed into one solver step.

pub mod direction;
pub mod init;
pub mod kkt;
pub mod lbfgs;
pub mod linesearch;
pub mod options;
pub mod oracle;
pub mod regularize;

use crate::core::state::ipstate::Iterate;
use crate::core::{ArgminFloat, Error, IpState, Problem, Solver, State, TerminationReason, KV};
use crate::make_kv;
use crate::solver::interior_point::lbfgs::LbfgsState;
use crate::solver::interior_point::oracle::ConstrainedProblem;
use crate::solver::interior_point::options::IpOptions;
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

fn split_lambda<F: RealField + Copy>(lambda: &DVector<F>, m: usize) -> (DVector<F>, DVector<F>) {
    let n = lambda.len() - m;
    let e = DVector::from_column_slice(&lambda.as_slice()[0..m]);
    let i = DVector::from_column_slice(&lambda.as_slice()[m..m + n]);
    (e, i)
}

fn stack_lambda<F: RealField + Copy>(e: &DVector<F>, i: &DVector<F>) -> DVector<F> {
    let m = e.len();
    let n = i.len();
    let mut out = DVector::zeros(m + n);
    out.rows_mut(0, m).copy_from(e);
    out.rows_mut(m, n).copy_from(i);
    out
}

/// Line-search primal-dual interior-point solver.
///
/// Needs a problem implementing [`ConstrainedProblem`]. The L-BFGS buffers (when
/// [`IpOptions::use_lbfgs`] is set) live on the solver rather than in [`IpState`], matching how
/// the teacher's quasi-Newton solvers keep their Hessian approximation out of the iteration state.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct InteriorPoint<F> {
    options: IpOptions<F>,
    lbfgs: Option<LbfgsState<F>>,
    init_s: Option<DVector<F>>,
    init_lambda: Option<DVector<F>>,
}

impl<F: ArgminFloat + RealField + Copy> InteriorPoint<F> {
    /// Construct a solver from the given options.
    pub fn new(options: IpOptions<F>) -> Self {
        InteriorPoint {
            options,
            lbfgs: None,
            init_s: None,
            init_lambda: None,
        }
    }

    /// Override the default §4.11 slack initialization.
    #[must_use]
    pub fn initial_slack(mut self, s0: DVector<F>) -> Self {
        self.init_s = Some(s0);
        self
    }

    /// Override the default §4.11 multiplier initialization.
    #[must_use]
    pub fn initial_multipliers(mut self, lambda0: DVector<F>) -> Self {
        self.init_lambda = Some(lambda0);
        self
    }

    /// Barrier-only directional derivative ∇f(x)·dx − μ·Σ ds_i/s_i, used by the §4.9 ν update
    /// (which happens before [`linesearch::phi_prime`]'s full penalty term would even be
    /// meaningful, since the step has not yet been capped to the feasible region).
    fn phi_barrier_dot_d<P: ConstrainedProblem<Float = F>>(
        problem: &P,
        x: &DVector<F>,
        s: &DVector<F>,
        dx: &DVector<F>,
        ds: &DVector<F>,
        mu: F,
    ) -> Result<F, Error> {
        let grad = problem.gradient(x)?;
        let mut barrier_term = F::zero();
        for i in 0..s.len() {
            barrier_term += ds[i] / s[i];
        }
        Ok(grad.dot(dx) - mu * barrier_term)
    }

    /// §4.10 barrier parameter update, evaluated at the iterate the inner loop just converged at.
    /// Guarded by the caller on `n > 0` -- with no inequality constraints μ stays pinned at Ktol.
    fn update_mu(s: &DVector<F>, lambda_i: &DVector<F>) -> F {
        let n = s.len();
        let eps = F::default_epsilon();
        let mut min_prod = s[0] * lambda_i[0];
        for i in 1..n {
            let p = s[i] * lambda_i[i];
            if p < min_prod {
                min_prod = p;
            }
        }
        let n_f = F::from_usize(n).unwrap();
        let sum_prod = s.dot(lambda_i);
        let xi = n_f * min_prod / (sum_prod + eps);

        let one = F::one();
        let two = F::from_f64(2.0).unwrap();
        let ratio = F::from_f64(0.05).unwrap() * (one - xi) / (xi + eps);
        let capped = if ratio < two { ratio } else { two };
        let cubed = capped * capped * capped;
        let mu_new = F::from_f64(0.1).unwrap() * cubed * (sum_prod / n_f);
        if mu_new > F::zero() {
            mu_new
        } else {
            F::zero()
        }
    }
}

impl<O, F> Solver<O, IpState<F>> for InteriorPoint<F>
where
    O: ConstrainedProblem<Float = F>,
    F: ArgminFloat + RealField + Copy,
{
    const NAME: &'static str = "InteriorPoint";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        mut state: IpState<F>,
    ) -> Result<(IpState<F>, Option<KV>), Error> {
        self.options.validate()?;

        let x0 = state
            .param
            .as_ref()
            .map(|it| it.x.clone())
            .ok_or_else(crate::argmin_error_closure!(
                NotInitialized,
                "InteriorPoint requires an initial x; set it via Executor::configure"
            ))?;

        let p = problem
            .problem
            .as_ref()
            .ok_or_else(crate::argmin_error_closure!(NotInitialized, "no problem set"))?;

        let d = x0.len();
        let m = p.num_equality();
        let n = p.num_inequality();

        let (s0_default, lambda0_default) = init::initialize(p, &x0, self.options.ktol)?;
        let s0 = self.init_s.clone().unwrap_or(s0_default);
        let lambda0 = self.init_lambda.clone().unwrap_or(lambda0_default);

        // §4.10: "no inequalities -> mu pinned at Ktol", which applies from the very first
        // evaluation, not just to later updates.
        let mu0 = if n > 0 { self.options.mu0 } else { self.options.ktol };

        if self.options.use_lbfgs {
            self.lbfgs = Some(LbfgsState::new(d, self.options.lbfgs_memory, self.options.lbfgs_zeta0));
        }

        let (lambda_e, lambda_i) = split_lambda(&lambda0, m);
        let blocks = kkt::residual_blocks(p, &x0, &s0, &lambda_e, &lambda_i, mu0)?;
        let norms = kkt::norms(&blocks, &s0);
        let cost = p.cost(&x0)?;

        let max_iters = self.options.outer_iter_max.saturating_mul(self.options.inner_iter_max);

        state = state
            .param(Iterate::new(x0, s0, lambda0))
            .cost(cost)
            .kkt(norms)
            .mu(mu0)
            .nu(self.options.nu0)
            .delta(F::zero())
            .max_iters(max_iters);

        let kv = make_kv!(
            "mu0" => mu0;
            "nu0" => self.options.nu0;
            "d" => d;
            "m" => m;
            "n" => n;
        );
        Ok((state, Some(kv)))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        mut state: IpState<F>,
    ) -> Result<(IpState<F>, Option<KV>), Error> {
        let opts = self.options.clone();

        // Coarse-grained oracle call accounting: the inner pipeline below (kkt/linesearch/lbfgs)
        // takes a bare `&O`, not a counted `&mut Problem<O>`, since those helpers are shared with
        // standalone unit tests that have no `Problem` wrapper at hand. One count per solver
        // iteration is recorded here rather than per individual oracle call.
        problem.problem("iterations", |_| Ok(()))?;

        let p = problem
            .problem
            .as_ref()
            .ok_or_else(crate::argmin_error_closure!(NotInitialized, "no problem set"))?;

        let iterate = state
            .param
            .clone()
            .ok_or_else(crate::argmin_error_closure!(
                NotInitialized,
                "InteriorPoint::next_iter called before init"
            ))?;
        let Iterate { x, s, lambda } = iterate;
        let m = p.num_equality();
        let n = p.num_inequality();
        let d = x.len();
        let (lambda_e, lambda_i) = split_lambda(&lambda, m);

        let inner_tol = if opts.ktol > state.mu { opts.ktol } else { state.mu };
        let inner_near_max = state.inner_iter + 1 >= opts.inner_iter_max;

        if n > 0 && (state.kkt.converged(inner_tol) || inner_near_max) {
            // §4.10: inner loop is done at this μ (or ran out of inner iterations); update the
            // barrier parameter and start a new outer pass without taking a step.
            let new_mu = Self::update_mu(&s, &lambda_i);
            state = state.mu(new_mu);
            state.next_outer();

            let mut kv = make_kv!("event" => "barrier_update"; "mu" => new_mu;);
            if !state.kkt.converged(inner_tol) {
                kv.push("diagnostic", "max_inner_iterations_exceeded");
            }
            return Ok((state, Some(kv)));
        }

        let je: DMatrix<F> = p.equality_jacobian(&x)?;
        let ji: DMatrix<F> = p.inequality_jacobian(&x)?;
        let b = kkt::augmented_jacobian(&je, &ji, d, m, n);

        let blocks = kkt::residual_blocks(p, &x, &s, &lambda_e, &lambda_i, state.mu)?;
        let g_stack = kkt::stack(&blocks);

        let dz = if opts.use_lbfgs {
            let lb = self
                .lbfgs
                .as_ref()
                .ok_or_else(crate::argmin_error_closure!(
                    NotInitialized,
                    "use_lbfgs is set but InteriorPoint::init was never called"
                ))?;
            if m == 0 && n == 0 {
                lbfgs::direction_unconstrained(lb, &blocks.primal)?
            } else {
                let mut sigma = DVector::<F>::zeros(n);
                for i in 0..n {
                    sigma[i] = lambda_i[i] / s[i];
                }
                let reg_shift =
                    regularize::reg_constant::<F>() * opts.eta * Float::powf(state.mu, opts.beta);
                lbfgs::direction_constrained(lb, &g_stack, &b, &sigma, d, m, n, reg_shift)?
            }
        } else {
            let lambda_stack = stack_lambda(&lambda_e, &lambda_i);
            let w = p.lagrangian_hessian(&x, &lambda_stack)?;
            let h = kkt::assemble_matrix(&w, &je, &ji, &lambda_i, &s);
            let delta0 = Float::sqrt(F::default_epsilon());
            direction::newton_direction(
                &g_stack, &h, d, m, n, &mut state.delta, delta0, opts.eta, opts.beta, state.mu,
            )?
        };

        let (dx, ds, dlam_e, dlam_i) = kkt::unstack(&dz, d, n, m);

        let phi_barrier_dot_d = Self::phi_barrier_dot_d(p, &x, &s, &dx, &ds, state.mu)?;
        let mut c_norm = F::zero();
        for i in 0..blocks.equality.len() {
            c_norm += Float::abs(blocks.equality[i]);
        }
        for i in 0..blocks.inequality.len() {
            c_norm += Float::abs(blocks.inequality[i]);
        }
        let new_nu = linesearch::update_nu(state.nu, phi_barrier_dot_d, opts.rho, c_norm);

        let alpha_s_max = if n > 0 {
            linesearch::fraction_to_boundary(&s, &ds, opts.tau)
        } else {
            F::one()
        };
        let alpha_lambda_max = if n > 0 {
            linesearch::fraction_to_boundary(&lambda_i, &dlam_i, opts.tau)
        } else {
            F::one()
        };

        let step = linesearch::line_search(
            p, &x, &s, &dx, &ds, alpha_s_max, state.mu, new_nu, opts.eta, opts.tau, &b,
        )?;

        let lambda_e_new = &lambda_e + &dlam_e * alpha_lambda_max;
        let lambda_i_new = &lambda_i + &dlam_i * alpha_lambda_max;

        let new_blocks = kkt::residual_blocks(p, &step.x, &step.s, &lambda_e_new, &lambda_i_new, state.mu)?;
        let new_norms = kkt::norms(&new_blocks, &step.s);

        if opts.use_lbfgs {
            let dx_actual = &step.x - &x;
            let dg = &blocks.primal - &new_blocks.primal;
            self.lbfgs
                .as_mut()
                .expect("use_lbfgs implies lbfgs was initialized in init()")
                .update(&dx_actual, &dg, m > 0 || n > 0);
        }

        let cost = p.cost(&step.x)?;
        let lambda_new = stack_lambda(&lambda_e_new, &lambda_i_new);

        state = state
            .param(Iterate::new(step.x, step.s, lambda_new))
            .cost(cost)
            .kkt(new_norms)
            .nu(new_nu);
        state.next_inner();

        let kv = make_kv!(
            "alpha" => step.alpha;
            "used_correction" => step.used_correction;
            "mu" => state.mu;
            "nu" => new_nu;
            "stationarity" => new_norms.stationarity;
            "complementarity" => new_norms.complementarity;
            "equality" => new_norms.equality;
            "inequality" => new_norms.inequality;
        );
        Ok((state, Some(kv)))
    }

    fn terminate(&mut self, state: &IpState<F>) -> TerminationReason {
        if state.kkt.converged(self.options.ktol) {
            TerminationReason::TargetToleranceReached
        } else if state.outer_iter >= self.options.outer_iter_max {
            TerminationReason::MaxItersReached
        } else {
            TerminationReason::NotTerminated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Executor;
    use approx::assert_relative_eq;

    /// f(x, y) = x^2 - 4x + y^2 - y - xy, minimized at (3, 2) (spec scenario 1).
    struct Quad;

    impl ConstrainedProblem for Quad {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(x[0] * x[0] - 4.0 * x[0] + x[1] * x[1] - x[1] - x[0] * x[1])
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[
                2.0 * x[0] - 4.0 - x[1],
                2.0 * x[1] - 1.0 - x[0],
            ]))
        }

        fn lagrangian_hessian(&self, x: &DVector<f64>, _lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let _ = x;
            Ok(DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]))
        }
    }

    fn run_quad(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-10);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[0.0, 0.0]);
        let res = Executor::new(Quad, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_unconstrained_quadratic_exact_hessian() {
        let it = run_quad(false);
        assert_relative_eq!(it.x[0], 3.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_unconstrained_quadratic_lbfgs() {
        let it = run_quad(true);
        assert_relative_eq!(it.x[0], 3.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 2.0, epsilon = 1e-3);
    }

    /// f(x, y) = 100(y - x^2)^2 + (1 - x)^2, minimized at (1, 1) (spec scenario 2).
    struct Rosenbrock;

    impl ConstrainedProblem for Rosenbrock {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            let a = x[1] - x[0] * x[0];
            Ok(100.0 * a * a + (1.0 - x[0]) * (1.0 - x[0]))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            let a = x[1] - x[0] * x[0];
            Ok(DVector::from_row_slice(&[
                -400.0 * x[0] * a - 2.0 * (1.0 - x[0]),
                200.0 * a,
            ]))
        }

        fn lagrangian_hessian(&self, x: &DVector<f64>, _lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let h00 = 1200.0 * x[0] * x[0] - 400.0 * x[1] + 2.0;
            let h01 = -400.0 * x[0];
            Ok(DMatrix::from_row_slice(2, 2, &[h00, h01, h01, 200.0]))
        }
    }

    fn run_rosenbrock(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-8);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[-1.2, 1.0]);
        let res = Executor::new(Rosenbrock, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_rosenbrock_exact_hessian() {
        let it = run_rosenbrock(false);
        assert_relative_eq!(it.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rosenbrock_lbfgs() {
        let it = run_rosenbrock(true);
        assert_relative_eq!(it.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 1.0, epsilon = 1e-3);
    }

    /// minimize -(x + y) s.t. x^2 + y^2 = 1, minimized at (sqrt(2)/2, sqrt(2)/2) (spec scenario 3).
    struct Circle;

    impl ConstrainedProblem for Circle {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(-(x[0] + x[1]))
        }

        fn gradient(&self, _x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[-1.0, -1.0]))
        }

        fn num_equality(&self) -> usize {
            1
        }

        fn equality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[x[0] * x[0] + x[1] * x[1] - 1.0]))
        }

        fn equality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_row_slice(2, 1, &[2.0 * x[0], 2.0 * x[1]]))
        }

        fn lagrangian_hessian(&self, _x: &DVector<f64>, lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let l = -2.0 * lambda[0];
            Ok(DMatrix::from_row_slice(2, 2, &[l, 0.0, 0.0, l]))
        }
    }

    fn run_circle(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-8);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[1.0, 0.0]);
        let res = Executor::new(Circle, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_circle_equality_only_exact_hessian() {
        let it = run_circle(false);
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(it.x[0], expected, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], expected, epsilon = 1e-3);
    }

    #[test]
    fn test_circle_equality_only_lbfgs() {
        let it = run_circle(true);
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(it.x[0], expected, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], expected, epsilon = 1e-3);
    }

    /// min x^2 + 2y^2 + 2x + 8y s.t. x + 2y >= 10, x >= 0, y >= 0, minimized at (4, 3)
    /// (spec scenario 4).
    struct InequalityOnly;

    impl ConstrainedProblem for InequalityOnly {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(x[0] * x[0] + 2.0 * x[1] * x[1] + 2.0 * x[0] + 8.0 * x[1])
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[2.0 * x[0] + 2.0, 4.0 * x[1] + 8.0]))
        }

        fn num_inequality(&self) -> usize {
            3
        }

        fn inequality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[x[0] + 2.0 * x[1] - 10.0, x[0], x[1]]))
        }

        fn inequality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let _ = x;
            Ok(DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, 2.0, 0.0, 1.0]))
        }

        fn lagrangian_hessian(&self, x: &DVector<f64>, _lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let _ = x;
            Ok(DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]))
        }
    }

    fn run_inequality_only(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-8);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[5.0, 5.0]);
        let res = Executor::new(InequalityOnly, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_inequality_only_exact_hessian() {
        let it = run_inequality_only(false);
        assert_relative_eq!(it.x[0], 4.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_inequality_only_lbfgs() {
        let it = run_inequality_only(true);
        assert_relative_eq!(it.x[0], 4.0, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], 3.0, epsilon = 1e-3);
    }

    /// max -Sum x_i log x_i s.t. Sum x_i = 1, x_i >= 0, D = 6, minimized (as -entropy) at a
    /// uniform point x* = (1/6, ..., 1/6) (spec scenario 5).
    struct MaxEntropyDie;

    const DIE_D: usize = 6;

    impl ConstrainedProblem for MaxEntropyDie {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(x.iter().fold(0.0, |acc, &xi| acc + xi * xi.ln()))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_iterator(DIE_D, x.iter().map(|&xi| xi.ln() + 1.0)))
        }

        fn num_equality(&self) -> usize {
            1
        }

        fn num_inequality(&self) -> usize {
            DIE_D
        }

        fn equality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[x.iter().sum::<f64>() - 1.0]))
        }

        fn equality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_element(x.len(), 1, 1.0))
        }

        fn inequality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(x.clone())
        }

        fn inequality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::identity(x.len(), DIE_D))
        }

        fn lagrangian_hessian(&self, x: &DVector<f64>, _lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let mut h = DMatrix::zeros(DIE_D, DIE_D);
            for i in 0..DIE_D {
                h[(i, i)] = 1.0 / x[i];
            }
            Ok(h)
        }
    }

    fn run_max_entropy_die(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-8);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[0.1, 0.15, 0.2, 0.15, 0.2, 0.2]);
        let res = Executor::new(MaxEntropyDie, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_max_entropy_die_exact_hessian() {
        let it = run_max_entropy_die(false);
        for i in 0..DIE_D {
            assert_relative_eq!(it.x[i], 1.0 / 6.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_max_entropy_die_lbfgs() {
        let it = run_max_entropy_die(true);
        for i in 0..DIE_D {
            assert_relative_eq!(it.x[i], 1.0 / 6.0, epsilon = 1e-3);
        }
    }

    /// min 4x1 - 2x2 s.t. 2x0 - x1 - x2 = 2, x0^2 + x1^2 = 1, minimized at
    /// (2/sqrt(13), -3/sqrt(13), -2 + 7/sqrt(13)) (spec scenario 6).
    struct Mixed;

    impl ConstrainedProblem for Mixed {
        type Float = f64;

        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(4.0 * x[1] - 2.0 * x[2])
        }

        fn gradient(&self, _x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[0.0, 4.0, -2.0]))
        }

        fn num_equality(&self) -> usize {
            2
        }

        fn equality(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_row_slice(&[
                2.0 * x[0] - x[1] - x[2] - 2.0,
                x[0] * x[0] + x[1] * x[1] - 1.0,
            ]))
        }

        fn equality_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_row_slice(
                3,
                2,
                &[2.0, 2.0 * x[0], -1.0, 2.0 * x[1], -1.0, 0.0],
            ))
        }

        fn lagrangian_hessian(&self, _x: &DVector<f64>, lambda: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            let l = -2.0 * lambda[1];
            Ok(DMatrix::from_row_slice(
                3,
                3,
                &[l, 0.0, 0.0, 0.0, l, 0.0, 0.0, 0.0, 0.0],
            ))
        }
    }

    fn run_mixed(use_lbfgs: bool) -> Iterate<f64> {
        let options = IpOptions::default().use_lbfgs(use_lbfgs).ktol(1e-8);
        let solver = InteriorPoint::new(options);
        let x0 = DVector::from_row_slice(&[1.0, 0.0, 0.0]);
        let res = Executor::new(Mixed, solver)
            .configure(|state| state.param(Iterate::new(x0, DVector::zeros(0), DVector::zeros(0))))
            .ctrlc(false)
            .timer(false)
            .run()
            .unwrap();
        res.state.best_param.unwrap()
    }

    #[test]
    fn test_mixed_equality_exact_hessian() {
        let it = run_mixed(false);
        let s13 = 13.0_f64.sqrt();
        assert_relative_eq!(it.x[0], 2.0 / s13, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], -3.0 / s13, epsilon = 1e-3);
        assert_relative_eq!(it.x[2], -2.0 + 7.0 / s13, epsilon = 1e-3);
    }

    #[test]
    fn test_mixed_equality_lbfgs() {
        let it = run_mixed(true);
        let s13 = 13.0_f64.sqrt();
        assert_relative_eq!(it.x[0], 2.0 / s13, epsilon = 1e-3);
        assert_relative_eq!(it.x[1], -3.0 / s13, epsilon = 1e-3);
        assert_relative_eq!(it.x[2], -2.0 + 7.0 / s13, epsilon = 1e-3);
    }
}
