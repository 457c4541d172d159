// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#[cfg(feature = "serde1")]
use crate::core::checkpointing::{load_checkpoint, Checkpoint, CheckpointMode};
use crate::core::{
    DeserializeOwnedAlias, Error, Observe, ObserverMode, Observers, OptimizationResult, Problem,
    Solver, State, TerminationReason, KV,
};
#[cfg(feature = "serde1")]
use crate::core::SerializeAlias;
use crate::make_kv;
#[cfg(feature = "serde1")]
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drives a [`Solver`] to completion on a given problem.
///
/// Implements the init / next_iter / terminate_internal lifecycle: calls `solver.init` once, then
/// repeatedly calls `solver.next_iter` until `solver.terminate_internal` reports termination,
/// dispatching to any attached observers and (optionally) writing checkpoints along the way.
#[derive(Clone)]
pub struct Executor<O, S, I> {
    /// The solver
    solver: S,
    /// The problem, wrapped to track evaluation counts
    pub problem: Problem<O>,
    /// The current state; `None` only while a call to `run` has taken temporary ownership of it
    pub(crate) state: Option<I>,
    /// Attached observers
    observers: Observers<I>,
    /// Checkpoint configuration
    #[cfg(feature = "serde1")]
    checkpoint: Checkpoint,
    /// Whether Ctrl-C should interrupt the run
    ctrlc: bool,
    /// Whether to measure wall-clock time
    timer: bool,
}

impl<O, S, I> Executor<O, S, I>
where
    S: Solver<O, I>,
    I: State,
{
    /// Create a new executor for `solver` acting on `problem`.
    pub fn new(problem: O, solver: S) -> Self {
        Executor {
            solver,
            problem: Problem::new(problem),
            state: Some(I::new()),
            observers: Observers::new(),
            #[cfg(feature = "serde1")]
            checkpoint: Checkpoint::default(),
            ctrlc: true,
            timer: true,
        }
    }

    /// Restore an executor from a checkpoint written by a previous run.
    #[cfg(feature = "serde1")]
    pub fn from_checkpoint<P: AsRef<Path>>(path: P, problem: O) -> Result<Self, Error>
    where
        Self: Sized + DeserializeOwnedAlias,
        I: DeserializeOwnedAlias,
    {
        let (mut executor, state): (Self, I) = load_checkpoint(path)?;
        executor.state = Some(state);
        executor.problem = Problem::new(problem);
        Ok(executor)
    }

    fn run_loop(
        &mut self,
        state: I,
        running: &Arc<AtomicBool>,
        total_time: Option<instant::Instant>,
    ) -> Result<I, Error> {
        let (mut state, kv) = self.solver.init(&mut self.problem, state)?;
        state.update();

        if !self.observers.is_empty() {
            let mut logs = make_kv!("max_iters" => state.get_max_iters(););
            if let Some(kv) = kv {
                logs = logs.merge(&mut kv.clone());
            }
            self.observers.observe_init(S::NAME, &logs)?;
        }

        state.set_func_counts(&self.problem);

        while running.load(Ordering::SeqCst) {
            state = if !state.terminated() {
                let term = self.solver.terminate_internal(&state);
                state.termination_reason(term)
            } else {
                state
            };
            if state.terminated() {
                break;
            }

            let start = if total_time.is_some() {
                Some(instant::Instant::now())
            } else {
                None
            };

            let (state_t, kv) = self.solver.next_iter(&mut self.problem, state)?;
            state = state_t;
            state.set_func_counts(&self.problem);

            let duration = start.map(|s| s.elapsed());
            state.update();

            if !self.observers.is_empty() {
                let mut log = kv.unwrap_or_else(KV::new);
                if let Some(duration) = duration {
                    let tmp = make_kv!(
                        "time" => duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) * 1e-9;
                    );
                    log = log.merge(&mut tmp.clone());
                }
                self.observers.observe_iter(&state, &log)?;
            }

            state.increment_iter();
            state = self.checkpoint_iter(state)?;

            if let Some(total_time) = total_time {
                state.time(Some(total_time.elapsed()));
            }

            if state.terminated() {
                break;
            }
        }

        if state.get_iter() < state.get_max_iters() && !state.terminated() {
            state = state.termination_reason(TerminationReason::Aborted);
        }
        Ok(state)
    }

    fn setup_ctrlc(&self, running: &Arc<AtomicBool>) -> Result<(), Error> {
        if self.ctrlc {
            #[cfg(feature = "ctrlc")]
            {
                let r = running.clone();
                match ctrlc::set_handler(move || {
                    r.store(false, Ordering::SeqCst);
                }) {
                    Err(ctrlc::Error::MultipleHandlers) => Ok(()),
                    r => r,
                }?;
            }
        }
        Ok(())
    }

    /// Run the solver to completion.
    pub fn run(mut self) -> Result<OptimizationResult<O, I>, Error> {
        let total_time = self.timer.then(instant::Instant::now);
        let state = self.state.take().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        self.setup_ctrlc(&running)?;
        let state = self.run_loop(state, &running, total_time)?;
        Ok(OptimizationResult::new(self.problem, state))
    }

    /// Attach an observer with a given [`ObserverMode`].
    #[must_use]
    pub fn add_observer<OBS: Observe<I> + 'static>(
        mut self,
        observer: OBS,
        mode: ObserverMode,
    ) -> Self {
        self.observers.push(observer, mode);
        self
    }

    /// Mutate the initial state before running, e.g. to set the starting iterate.
    #[must_use]
    pub fn configure<F: FnOnce(I) -> I>(mut self, init: F) -> Self {
        let state = self.state.take().unwrap();
        self.state = Some(init(state));
        self
    }

    /// Set the checkpoint directory.
    #[cfg(feature = "serde1")]
    #[must_use]
    pub fn checkpoint_dir(mut self, dir: &str) -> Self {
        self.checkpoint.set_dir(dir);
        self
    }

    /// Set the checkpoint file name.
    #[cfg(feature = "serde1")]
    #[must_use]
    pub fn checkpoint_name(mut self, name: &str) -> Self {
        self.checkpoint.set_name(name);
        self
    }

    /// Set the checkpoint frequency.
    #[cfg(feature = "serde1")]
    #[must_use]
    pub fn checkpoint_mode(mut self, mode: CheckpointMode) -> Self {
        self.checkpoint.set_mode(mode);
        self
    }

    /// Turn Ctrl-C handling on or off (default: on).
    #[must_use]
    pub fn ctrlc(mut self, ctrlc: bool) -> Self {
        self.ctrlc = ctrlc;
        self
    }

    /// Turn the wall-clock timer on or off (default: on).
    #[must_use]
    pub fn timer(mut self, timer: bool) -> Self {
        self.timer = timer;
        self
    }
}

#[cfg(feature = "serde1")]
impl<O, S, I> Executor<O, S, I>
where
    S: Solver<O, I>,
    I: State + SerializeAlias,
{
    fn checkpoint_iter(&self, state: I) -> Result<I, Error> {
        self.checkpoint
            .store_cond(&self.solver, &state, state.get_iter())?;
        Ok(state)
    }
}

#[cfg(not(feature = "serde1"))]
impl<O, S, I> Executor<O, S, I>
where
    S: Solver<O, I>,
    I: State,
{
    fn checkpoint_iter(&self, state: I) -> Result<I, Error> {
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IpState;
    #[cfg(feature = "serde1")]
    use serde::{Deserialize, Serialize};

    #[derive(Clone)]
    #[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
    struct TestSolver {}

    impl Solver<(), IpState<f64>> for TestSolver {
        const NAME: &'static str = "TestSolver";

        fn next_iter(
            &mut self,
            _problem: &mut Problem<()>,
            state: IpState<f64>,
        ) -> Result<(IpState<f64>, Option<KV>), Error> {
            Ok((state, None))
        }
    }

    #[test]
    fn test_run_terminates() {
        let executor =
            Executor::new((), TestSolver {}).configure(|s: IpState<f64>| s.max_iters(3));
        let res = executor.ctrlc(false).run().unwrap();
        assert!(res.state().get_termination_reason().terminated());
    }
}
