// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solver output and the result assembler.

use crate::error::{Error, Result};

/// Index-aligned `(time, value)` samples of a solve.
///
/// Times are ordered in the direction of integration.
#[derive(Debug, Clone)]
pub struct Trajectory<S> {
    /// Sample times.
    pub times: Vec<f64>,
    /// Sample values, one per entry of `times`.
    pub values: Vec<S>,
}

impl<S> Trajectory<S> {
    /// Create a trajectory from aligned times and values.
    pub fn new(times: Vec<f64>, values: Vec<S>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self { times, values }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the trajectory holds no samples.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Last sample, if any.
    pub fn last(&self) -> Option<(f64, &S)> {
        Some((*self.times.last()?, self.values.last()?))
    }

    /// Value recorded at exactly time `t`.
    pub fn value_at(&self, t: f64) -> Option<&S> {
        self.times
            .iter()
            .position(|&ti| ti == t)
            .map(|i| &self.values[i])
    }

    /// Iterate over `(t, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &S)> + '_ {
        self.times.iter().copied().zip(self.values.iter())
    }
}

/// Restrict `trajectory` to exactly the `requested` times, in request order.
///
/// Every requested time must be one of the trajectory's breakpoints; the
/// grid builder guarantees this, so a miss is an internal consistency error.
pub fn trim<S: Clone>(trajectory: &Trajectory<S>, requested: &[f64]) -> Result<Trajectory<S>> {
    let mut times = Vec::with_capacity(requested.len());
    let mut values = Vec::with_capacity(requested.len());

    // Requests follow integration order, so the search resumes where the
    // previous match was found.
    let mut cursor = 0;
    for &t in requested {
        let offset = trajectory.times[cursor..]
            .iter()
            .position(|&ti| ti == t)
            .ok_or(Error::MissingPoint(t))?;
        cursor += offset;
        times.push(t);
        values.push(trajectory.values[cursor].clone());
    }

    Ok(Trajectory::new(times, values))
}
