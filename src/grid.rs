// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed-step time grid.
//!
//! Merges the integration interval `t_span` with the requested evaluation
//! points and divides each interval between consecutive breakpoints into the
//! fewest equal sub-steps no larger than `max_dt`. Step sizes are signed, so
//! backward integration (`tf < t0`) uses negative steps.

use tracing::debug;

use crate::error::{Error, Result, ValidationError};
use crate::validation::{validate_max_dt, validate_t_span};

/// Relative slack allowed before an extra sub-step is added to an interval.
const STEP_SIZE_RTOL: f64 = 1e-15;

/// One interval between consecutive breakpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Breakpoint at the start of the interval.
    pub start: f64,
    /// Signed sub-step size.
    pub h: f64,
    /// Number of sub-steps (≥ 1).
    pub n_steps: usize,
}

impl Interval {
    /// Start time of sub-step `k`.
    ///
    /// Computed as `start + k·h` rather than accumulated, so no drift builds
    /// up over long intervals.
    #[inline]
    pub fn step_time(&self, k: usize) -> f64 {
        self.start + k as f64 * self.h
    }
}

/// A single sub-step `(t, h)` in the flattened grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub t: f64,
    pub h: f64,
}

/// Validated breakpoints with per-interval step sizes and counts.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    breakpoints: Vec<f64>,
    step_sizes: Vec<f64>,
    step_counts: Vec<usize>,
    total_steps: usize,
}

impl TimeGrid {
    /// Build the grid for `t_span` with optional evaluation points.
    ///
    /// `t_eval` must lie within the span and be ordered in the direction of
    /// integration. Repeated points are allowed and collapse to a single
    /// breakpoint.
    ///
    /// # Errors
    /// - [`Error::InvalidGrid`] for malformed `t_eval`.
    /// - [`Error::Validation`] for a non-positive `max_dt` or non-finite span,
    ///   or when the sub-step count cannot be represented.
    pub fn build(t_span: (f64, f64), t_eval: Option<&[f64]>, max_dt: f64) -> Result<Self> {
        validate_max_dt(max_dt)?;
        validate_t_span(t_span)?;

        let breakpoints = merge_breakpoints(t_span, t_eval)?;

        let mut step_sizes = Vec::with_capacity(breakpoints.len().saturating_sub(1));
        let mut step_counts = Vec::with_capacity(breakpoints.len().saturating_sub(1));
        let mut total_steps: usize = 0;
        for pair in breakpoints.windows(2) {
            let delta = pair[1] - pair[0];
            let n_steps = steps_for(delta, max_dt)?;
            total_steps = total_steps
                .checked_add(n_steps)
                .ok_or_else(|| step_overflow(u64::MAX))?;
            step_counts.push(n_steps);
            step_sizes.push(delta / n_steps as f64);
        }

        let grid = Self {
            breakpoints,
            step_sizes,
            step_counts,
            total_steps,
        };
        debug!(
            breakpoints = grid.breakpoints.len(),
            total_steps = grid.total_steps(),
            max_dt,
            "Built fixed-step time grid"
        );
        Ok(grid)
    }

    /// Breakpoints `t_0, …, t_m` in integration order.
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Signed step size of each interval.
    pub fn step_sizes(&self) -> &[f64] {
        &self.step_sizes
    }

    /// Number of sub-steps in each interval.
    pub fn step_counts(&self) -> &[usize] {
        &self.step_counts
    }

    /// Intervals between consecutive breakpoints.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.breakpoints
            .iter()
            .zip(self.step_sizes.iter().zip(self.step_counts.iter()))
            .map(|(&start, (&h, &n_steps))| Interval { start, h, n_steps })
    }

    /// Total number of sub-steps across all intervals.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Every sub-step of every interval, in integration order.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.total_steps());
        for interval in self.intervals() {
            steps.extend((0..interval.n_steps).map(|k| Step {
                t: interval.step_time(k),
                h: interval.h,
            }));
        }
        steps
    }

    /// Index of each breakpoint in the cumulative sub-step sequence.
    ///
    /// Entry `i` is the number of sub-steps taken to reach breakpoint `i`, so
    /// the first entry is always 0 and the last is [`Self::total_steps`].
    pub fn breakpoint_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.breakpoints.len());
        offsets.push(0);
        let mut acc = 0;
        for &n in &self.step_counts {
            acc += n;
            offsets.push(acc);
        }
        offsets
    }
}

/// Merge `t_span` endpoints with `t_eval` into one strictly monotonic list.
fn merge_breakpoints(t_span: (f64, f64), t_eval: Option<&[f64]>) -> Result<Vec<f64>> {
    let (t0, tf) = t_span;
    let t_eval = t_eval.unwrap_or(&[]);
    let (lo, hi) = if t0 <= tf { (t0, tf) } else { (tf, t0) };
    let forward = tf >= t0;

    for (i, &t) in t_eval.iter().enumerate() {
        if !t.is_finite() {
            return Err(Error::InvalidGrid(format!(
                "t_eval[{}] is not finite ({})",
                i, t
            )));
        }
        if t < lo || t > hi {
            return Err(Error::InvalidGrid(format!(
                "t_eval[{}] = {} lies outside t_span [{}, {}]",
                i, t, t0, tf
            )));
        }
    }
    for (i, pair) in t_eval.windows(2).enumerate() {
        let ordered = if forward {
            pair[1] >= pair[0]
        } else {
            pair[1] <= pair[0]
        };
        if !ordered {
            return Err(Error::InvalidGrid(format!(
                "t_eval must be ordered in the direction of integration: \
                 t_eval[{}] = {} followed by {}",
                i,
                pair[0],
                pair[1]
            )));
        }
    }

    let mut breakpoints = Vec::with_capacity(t_eval.len() + 2);
    breakpoints.push(t0);
    for &t in t_eval.iter().chain(std::iter::once(&tf)) {
        if breakpoints.last() != Some(&t) {
            breakpoints.push(t);
        }
    }
    Ok(breakpoints)
}

/// Fewest equal sub-steps covering `delta` with steps no larger than `max_dt`.
///
/// Fails when the count does not fit in a `usize`.
fn steps_for(delta: f64, max_dt: f64) -> Result<usize> {
    let ratio = (delta / max_dt).abs();
    // usize::MAX as f64 rounds up, so `<` keeps the cast exact.
    if !ratio.is_finite() || ratio >= usize::MAX as f64 {
        return Err(step_overflow(ratio as u64));
    }
    let n = (ratio as usize).max(1);
    if (delta / n as f64).abs() / max_dt > 1.0 + STEP_SIZE_RTOL {
        n.checked_add(1).ok_or_else(|| step_overflow(u64::MAX))
    } else {
        Ok(n)
    }
}

fn step_overflow(requested: u64) -> Error {
    ValidationError::ResourceLimit {
        resource: "total_steps".into(),
        limit: usize::MAX as u64,
        requested,
    }
    .into()
}
