// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS fixed-step dynamics engine
//!
//! This crate integrates linear matrix differential equations (LMDEs)
//! `dy/dt = G(t)·y`, and general ODEs `dy/dt = f(t, y)`, on a fixed time
//! grid, either step by step or by composing one-step propagators in parallel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        solve / SolverConfig::solve       │
//! ├─────────────────────────────────────────┤
//! │      TimeGrid builder + validation       │
//! ├──────────────────┬──────────────────────┤
//! │   Sequential     │  Parallel composer   │
//! │   integrator     │  (rayon prefix scan) │
//! ├──────────────────┴──────────────────────┤
//! │  Step rules: RK4, Magnus 1-3, Lanczos    │
//! ├─────────────────────────────────────────┤
//! │   linalg: expm (Padé 13), commutators    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use num_complex::Complex64;
//! use qubit_os_dynamics::{solve, ConstantGenerator, Dynamics, SolveOptions};
//!
//! // G = -iπZ rotates |0⟩ by a phase of -1 over unit time.
//! let i = Complex64::new(0.0, 1.0);
//! let z = array![[Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
//!                [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)]];
//! let g = ConstantGenerator(z * (-i * std::f64::consts::PI));
//! let y0 = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
//!
//! let traj = solve("magnus2", Dynamics::generator(&g), (0.0, 1.0), y0, 0.01,
//!                  &SolveOptions::default()).unwrap();
//! assert!((traj.values[1][0].re + 1.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! - [`grid`]: time grid construction
//! - [`rules`]: step rules and method selection
//! - [`integrate`]: sequential and data-parallel drivers
//! - [`trajectory`]: solver output and trimming
//! - [`solve`]: entry point
//! - [`config`]: configuration management
//! - [`validation`]: input validation utilities
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod grid;
pub mod integrate;
pub mod linalg;
pub mod rules;
pub mod solve;
pub mod state;
pub mod trajectory;
pub mod validation;

pub use config::SolverConfig;
pub use error::{Error, Result, ValidationError};
pub use grid::TimeGrid;
pub use integrate::ExecutionMode;
pub use rules::{Method, RuleParams, StepRule};
pub use solve::{solve, solve_with_rule, SaveAt, SolveOptions};
pub use state::{ConstantGenerator, Dynamics, Generator, Rhs, State};
pub use trajectory::Trajectory;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
