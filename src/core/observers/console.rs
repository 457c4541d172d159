// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A dependency-free observer that prints directly to stdout, gated by a verbosity level.
//!
//! This is the Rust-native replacement for the verbosity-gated `print` statements of the
//! original solver: rather than branch on a verbosity integer inline, the solver exposes
//! `IpOptions::verbosity` and a caller who wants console output attaches a `ConsoleLogger` built
//! from it, the same way `SlogLogger` is attached explicitly rather than auto-enabled.

use crate::core::observers::Observe;
use crate::core::{Error, State, KV};

/// Prints iteration progress to stdout. The verbosity level controls how much is printed:
///
/// * `< 0`: nothing.
/// * `0`: nothing beyond the initial "solver started" line.
/// * `1`: iteration number and cost.
/// * `2`: adds the best cost found so far.
/// * `>= 3`: adds the full key-value log entry for the iteration.
#[derive(Clone, Copy, Debug)]
pub struct ConsoleLogger {
    verbosity: i32,
}

impl ConsoleLogger {
    /// Build a logger at the given verbosity level.
    pub fn new(verbosity: i32) -> Self {
        ConsoleLogger { verbosity }
    }
}

impl<I: State> Observe<I> for ConsoleLogger {
    fn observe_init(&mut self, name: &str, _kv: &KV) -> Result<(), Error> {
        if self.verbosity >= 0 {
            println!("{name} started");
        }
        Ok(())
    }

    fn observe_iter(&mut self, state: &I, kv: &KV) -> Result<(), Error> {
        if self.verbosity < 1 {
            return Ok(());
        }
        if self.verbosity == 1 {
            println!("iter {}: cost = {}", state.get_iter(), state.get_cost());
        } else if self.verbosity == 2 {
            println!(
                "iter {}: cost = {}, best_cost = {}",
                state.get_iter(),
                state.get_cost(),
                state.get_best_cost()
            );
        } else {
            println!(
                "iter {}: cost = {}, best_cost = {}, {kv}",
                state.get_iter(),
                state.get_cost(),
                state.get_best_cost()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(console_logger, ConsoleLogger);
}
