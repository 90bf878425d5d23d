// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solve entry point.
//!
//! A call is validated completely before the first step is taken:
//!
//! 1. method name and rule parameters
//! 2. `max_dt` and `t_span`
//! 3. evaluation points and the time grid
//! 4. total step count against `max_steps`
//! 5. rule/dynamics compatibility and a generator sample at `t0`
//! 6. execution mode
//!
//! The trajectory is then computed on the full grid and trimmed to the
//! requested points.

use tracing::debug;

use crate::error::{Error, Result, ValidationError};
use crate::grid::TimeGrid;
use crate::integrate::{compose, integrate, ExecutionMode};
use crate::rules::{Method, RuleParams, StepRule};
use crate::state::{Dynamics, State};
use crate::trajectory::{trim, Trajectory};
use crate::validation::{validate_generator, validate_max_dt, validate_step_budget, validate_t_span};

/// Where to record the solution.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAt {
    /// Exactly these times (same rules as `t_eval`).
    Times(Vec<f64>),
    /// `n ≥ 2` evenly spaced times including both endpoints.
    Uniform(usize),
}

/// Optional solve arguments.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Evaluation points, ordered in the direction of integration.
    pub t_eval: Option<Vec<f64>>,
    /// Alternative way to request evaluation points; exclusive with `t_eval`.
    pub save_at: Option<SaveAt>,
    /// Rule parameters (`k_dim` for Lanczos).
    pub params: RuleParams,
    /// Execution mode; detected from the rayon pool when unset.
    pub mode: Option<ExecutionMode>,
    /// Upper bound on the total number of sub-steps.
    pub max_steps: Option<usize>,
}

/// Solve `dynamics` over `t_span` from `y0` with the rule named `method`.
///
/// Accepted names: `rk4`, `magnus1`, `magnus2`, `magnus3`, `lanczos`
/// (case-insensitive).
pub fn solve<S: State>(
    method: &str,
    dynamics: Dynamics<'_, S>,
    t_span: (f64, f64),
    y0: S,
    max_dt: f64,
    options: &SolveOptions,
) -> Result<Trajectory<S>> {
    let method: Method = method.parse()?;
    let rule = method.build::<S>(&options.params)?;
    solve_with_rule(rule.as_ref(), dynamics, t_span, y0, max_dt, options)
}

/// Like [`solve`], with a pre-built rule.
pub fn solve_with_rule<S: State>(
    rule: &dyn StepRule<S>,
    dynamics: Dynamics<'_, S>,
    t_span: (f64, f64),
    y0: S,
    max_dt: f64,
    options: &SolveOptions,
) -> Result<Trajectory<S>> {
    validate_max_dt(max_dt)?;
    validate_t_span(t_span)?;

    let eval_points = evaluation_points(t_span, options)?;
    let grid = TimeGrid::build(t_span, eval_points.as_deref(), max_dt)?;
    validate_step_budget(grid.total_steps(), options.max_steps)?;

    if rule.requires_generator() && !dynamics.is_lmde() {
        return Err(ValidationError::Field {
            field: "method".into(),
            message: format!(
                "{} requires an LMDE generator, got a general right-hand side",
                rule.name()
            ),
        }
        .into());
    }
    if let Some(generator) = dynamics.as_generator() {
        validate_generator(generator, t_span.0, &y0)?;
    }

    let mode = ExecutionMode::resolve(options.mode, dynamics.is_lmde())?;
    debug!(
        rule = rule.name(),
        mode = %mode,
        steps = grid.total_steps(),
        breakpoints = grid.breakpoints().len(),
        "solving"
    );

    let full = match (mode, dynamics.as_generator()) {
        (ExecutionMode::DataParallel, Some(generator)) => compose(rule, generator, &grid, &y0)?,
        _ => integrate(rule, &dynamics, &grid, y0)?,
    };

    let requested = eval_points.unwrap_or_else(|| vec![t_span.0, t_span.1]);
    trim(&full, &requested)
}

/// Resolve `t_eval`/`save_at` into an explicit list of evaluation points.
fn evaluation_points(t_span: (f64, f64), options: &SolveOptions) -> Result<Option<Vec<f64>>> {
    match (&options.t_eval, &options.save_at) {
        (Some(_), Some(_)) => Err(Error::ConflictingArguments(
            "t_eval and save_at cannot both be specified".into(),
        )),
        (Some(t_eval), None) => Ok(Some(t_eval.clone())),
        (None, Some(SaveAt::Times(times))) => Ok(Some(times.clone())),
        (None, Some(SaveAt::Uniform(n))) => uniform_points(t_span, *n).map(Some),
        (None, None) => Ok(None),
    }
}

fn uniform_points((t0, tf): (f64, f64), n: usize) -> Result<Vec<f64>> {
    if n < 2 {
        return Err(ValidationError::Field {
            field: "save_at".into(),
            message: format!("uniform save points need at least 2 samples, got {}", n),
        }
        .into());
    }
    let last = n - 1;
    let delta = tf - t0;
    Ok((0..n)
        .map(|i| {
            if i == last {
                tf
            } else {
                t0 + delta * (i as f64 / last as f64)
            }
        })
        .collect())
}
