// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Drivers that run a step rule across a [`TimeGrid`](crate::grid::TimeGrid).
//!
//! Two execution strategies produce the same trajectory up to floating-point
//! summation order:
//!
//! - [`sequential::integrate`]: one step after another, any dynamics
//! - [`parallel::compose`]: all one-step propagators at once, then a
//!   parallel prefix scan to chain them (LMDE only)

pub mod parallel;
pub mod scan;
pub mod sequential;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};

pub use parallel::compose;
pub use scan::associative_scan;
pub use sequential::integrate;

/// How a solve is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Step-by-step, single thread.
    Sequential,
    /// Propagators computed and composed on the rayon pool.
    DataParallel,
}

impl ExecutionMode {
    /// Pick a mode from the current rayon pool size.
    ///
    /// Used only when asked for; an unspecified mode resolves to
    /// `Sequential`.
    pub fn detect() -> Self {
        if rayon::current_num_threads() > 1 {
            ExecutionMode::DataParallel
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Resolve the mode for one call.
    ///
    /// An explicit `DataParallel` request for a general right-hand side is an
    /// error. An unspecified mode is `Sequential`: the composer does
    /// O(N log N) matrix products against N for stepping, so it is opt-in.
    pub fn resolve(requested: Option<Self>, is_lmde: bool) -> Result<Self> {
        match (requested, is_lmde) {
            (Some(ExecutionMode::DataParallel), false) => Err(ValidationError::Field {
                field: "mode".into(),
                message: "data_parallel execution requires an LMDE generator".into(),
            }
            .into()),
            (Some(mode), _) => Ok(mode),
            (None, _) => Ok(ExecutionMode::Sequential),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::DataParallel => write!(f, "data_parallel"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "data_parallel" | "parallel" => Ok(ExecutionMode::DataParallel),
            other => Err(ValidationError::Field {
                field: "mode".into(),
                message: format!("unknown execution mode '{}'", other),
            }
            .into()),
        }
    }
}
