// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Checkpointing
//!
//! Mitigates the effects of crashes in unstable computing environments by periodically writing
//! the solver and its state to disk. Only available with the `serde1` feature.

use crate::core::Error;
use serde::{de::DeserializeOwned, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Indicates at which intervals a checkpoint is written.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum CheckpointMode {
    /// Never checkpoint
    Never,
    /// Checkpoint every `N` iterations
    Every(u64),
    /// Checkpoint after every iteration
    Always,
}

impl Default for CheckpointMode {
    fn default() -> CheckpointMode {
        CheckpointMode::Never
    }
}

/// Where and how often a checkpoint is written.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Checkpoint {
    mode: CheckpointMode,
    directory: PathBuf,
    name: String,
}

impl Default for Checkpoint {
    fn default() -> Checkpoint {
        Checkpoint {
            mode: CheckpointMode::default(),
            directory: PathBuf::from(".checkpoints"),
            name: "solver".to_string(),
        }
    }
}

impl Checkpoint {
    /// Set the directory checkpoints are written to.
    pub fn set_dir(&mut self, dir: &str) -> &mut Self {
        self.directory = PathBuf::from(dir);
        self
    }

    /// Set the file name (without extension) used for checkpoints.
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_string();
        self
    }

    /// Set the checkpointing frequency.
    pub fn set_mode(&mut self, mode: CheckpointMode) -> &mut Self {
        self.mode = mode;
        self
    }

    fn path(&self) -> PathBuf {
        self.directory.join(format!("{}.arg", self.name))
    }

    /// Write a checkpoint unconditionally.
    pub fn store<S: Serialize, I: Serialize>(&self, solver: &S, state: &I) -> Result<(), Error> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory)?;
        }
        let f = BufWriter::new(File::create(self.path())?);
        bincode::serialize_into(f, &(solver, state))?;
        Ok(())
    }

    /// Write a checkpoint if `iter` falls on a checkpointing boundary for the configured mode.
    pub fn store_cond<S: Serialize, I: Serialize>(
        &self,
        solver: &S,
        state: &I,
        iter: u64,
    ) -> Result<(), Error> {
        match self.mode {
            CheckpointMode::Always => self.store(solver, state)?,
            CheckpointMode::Every(it) if it > 0 && iter % it == 0 => self.store(solver, state)?,
            CheckpointMode::Never | CheckpointMode::Every(_) => {}
        }
        Ok(())
    }
}

/// Load a solver and state previously written with [`Checkpoint::store`].
pub fn load_checkpoint<P: AsRef<Path>, S: DeserializeOwned, I: DeserializeOwned>(
    path: P,
) -> Result<(S, I), Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default() {
        assert_eq!(CheckpointMode::default(), CheckpointMode::Never);
    }
}
