// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for solve requests.
//!
//! Everything here runs before the first step is taken, so a rejected
//! request never produces a partial trajectory.

use crate::error::{Error, Result, ValidationError};
use crate::state::{sample_generator, Generator, State};

/// Validate the maximum step size.
pub fn validate_max_dt(max_dt: f64) -> Result<()> {
    if max_dt.is_nan() || max_dt.is_infinite() {
        return Err(ValidationError::Field {
            field: "max_dt".into(),
            message: format!("must be finite, got {}", max_dt),
        }
        .into());
    }
    if max_dt <= 0.0 {
        return Err(ValidationError::Field {
            field: "max_dt".into(),
            message: format!("must be greater than 0, got {}", max_dt),
        }
        .into());
    }
    Ok(())
}

/// Validate the integration interval.
pub fn validate_t_span(t_span: (f64, f64)) -> Result<()> {
    for (name, value) in [("t_span.0", t_span.0), ("t_span.1", t_span.1)] {
        if !value.is_finite() {
            return Err(ValidationError::Field {
                field: name.into(),
                message: format!("must be finite, got {}", value),
            }
            .into());
        }
    }
    Ok(())
}

/// Validate the total number of sub-steps against an optional limit.
pub fn validate_step_budget(total_steps: usize, max_steps: Option<usize>) -> Result<()> {
    match max_steps {
        Some(limit) if total_steps > limit => Err(ValidationError::ResourceLimit {
            resource: "total_steps".into(),
            limit: limit as u64,
            requested: total_steps as u64,
        }
        .into()),
        _ => Ok(()),
    }
}

/// Validate the Krylov subspace dimension.
pub fn validate_k_dim(k_dim: usize) -> Result<()> {
    if k_dim == 0 {
        return Err(ValidationError::Field {
            field: "k_dim".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }
    Ok(())
}

/// Sample the generator once at `t0` and check it against the initial state.
///
/// The generator must be square with the same leading dimension as `y0`.
pub fn validate_generator<S: State>(generator: &dyn Generator, t0: f64, y0: &S) -> Result<()> {
    let dim = y0.leading_dim();
    if dim == 0 {
        return Err(ValidationError::Field {
            field: "y0".into(),
            message: "initial state is empty".into(),
        }
        .into());
    }
    sample_generator(generator, t0, dim).map_err(|e| match e {
        Error::DimensionMismatch {
            expected, actual, ..
        } => Error::DimensionMismatch {
            context: format!("initial state {} against generator", y0.shape_string()),
            expected,
            actual,
        },
        other => other,
    })?;
    Ok(())
}
