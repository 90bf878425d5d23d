// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solver configuration.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. solver.yaml file
//! 3. Environment variables (QUBITOS_SOLVER_*)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::integrate::ExecutionMode;
use crate::rules::{Method, RuleParams};
use crate::solve::{solve, SolveOptions};
use crate::state::{Dynamics, State};
use crate::trajectory::Trajectory;
use crate::validation::{validate_k_dim, validate_max_dt};

/// Default solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Step rule name (`rk4`, `magnus1`..`magnus3`, `lanczos`)
    #[serde(default = "default_method")]
    pub method: String,

    /// Maximum sub-step size
    #[serde(default = "default_max_dt")]
    pub max_dt: f64,

    /// Krylov dimension for the lanczos method
    #[serde(default)]
    pub k_dim: Option<usize>,

    /// Execution mode; sequential when unset
    #[serde(default)]
    pub execution: Option<ExecutionMode>,

    /// Upper bound on the number of sub-steps per solve
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            max_dt: default_max_dt(),
            k_dim: None,
            execution: None,
            max_steps: default_max_steps(),
        }
    }
}

fn default_method() -> String {
    "magnus2".into()
}

fn default_max_dt() -> f64 {
    0.01
}

fn default_max_steps() -> usize {
    10_000_000
}

impl SolverConfig {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = SolverConfig::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["solver.yaml", "solver.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QUBITOS_SOLVER_METHOD") {
            self.method = val.trim().to_string();
        }
        if let Some(val) = lookup("QUBITOS_SOLVER_MAX_DT") {
            match val.trim().parse() {
                Ok(max_dt) => self.max_dt = max_dt,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid QUBITOS_SOLVER_MAX_DT"),
            }
        }
        if let Some(val) = lookup("QUBITOS_SOLVER_K_DIM") {
            match val.trim().parse() {
                Ok(k_dim) => self.k_dim = Some(k_dim),
                Err(_) => tracing::warn!(value = %val, "ignoring invalid QUBITOS_SOLVER_K_DIM"),
            }
        }
        if let Some(val) = lookup("QUBITOS_SOLVER_EXECUTION") {
            if val.trim().eq_ignore_ascii_case("auto") {
                self.execution = Some(ExecutionMode::detect());
            } else {
                match val.parse() {
                    Ok(mode) => self.execution = Some(mode),
                    Err(_) => {
                        tracing::warn!(value = %val, "ignoring invalid QUBITOS_SOLVER_EXECUTION")
                    }
                }
            }
        }
        if let Some(val) = lookup("QUBITOS_SOLVER_MAX_STEPS") {
            match val.trim().parse() {
                Ok(max_steps) => self.max_steps = max_steps,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid QUBITOS_SOLVER_MAX_STEPS"),
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let method: Method = self.method.parse()?;
        validate_max_dt(self.max_dt)?;
        if let Some(k_dim) = self.k_dim {
            validate_k_dim(k_dim)?;
        }
        if method == Method::Lanczos && self.k_dim.is_none() {
            return Err(Error::Config("lanczos method requires k_dim".into()));
        }
        if self.max_steps == 0 {
            return Err(Error::Config("max_steps cannot be 0".into()));
        }
        Ok(())
    }

    /// Solve options derived from this configuration.
    pub fn options(&self, t_eval: Option<Vec<f64>>) -> SolveOptions {
        SolveOptions {
            t_eval,
            save_at: None,
            params: RuleParams { k_dim: self.k_dim },
            mode: self.execution,
            max_steps: Some(self.max_steps),
        }
    }

    /// Run a solve with the configured method, step size and limits.
    pub fn solve<S: State>(
        &self,
        dynamics: Dynamics<'_, S>,
        t_span: (f64, f64),
        y0: S,
        t_eval: Option<Vec<f64>>,
    ) -> Result<Trajectory<S>> {
        solve(
            &self.method,
            dynamics,
            t_span,
            y0,
            self.max_dt,
            &self.options(t_eval),
        )
    }
}
