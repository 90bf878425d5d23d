// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed-step rules.
//!
//! Every rule advances a state by one sub-step of size `h` and, for LMDEs,
//! can also produce the one-step propagator `P` with `y(t+h) ≈ P·y(t)`:
//!
//! - [`Rk4`]: classical 4th-order Runge–Kutta, works with any right-hand side
//! - [`Magnus`]: exponential integrators of order 1, 2 and 3 (Gauss nodes)
//! - [`Lanczos`]: Krylov-projected exponential at the midpoint
//!
//! Rules are stateless and selected by name through [`Method`].
//!
//! # References
//!
//! - Blanes, Casas, Oteo & Ros (2009), "The Magnus expansion and some of its
//!   applications", Phys. Rep. 470, 151. arXiv:0810.5488
//! - Saad (1992), "Analysis of some Krylov subspace approximations to the
//!   matrix exponential operator", SIAM J. Numer. Anal. 29(1), 209.

pub mod lanczos;
pub mod magnus;
pub mod rk4;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};
use crate::linalg::Matrix;
use crate::state::{Dynamics, Generator, State};

pub use lanczos::Lanczos;
pub use magnus::{Magnus, MagnusOrder};
pub use rk4::Rk4;

/// One fixed-step rule.
pub trait StepRule<S: State>: Send + Sync {
    /// Rule name as accepted by [`Method::from_str`].
    fn name(&self) -> &'static str;

    /// Nominal order: 4 for RK4, the number of series terms for Magnus
    /// rules, 1 for the midpoint Krylov rule.
    fn order(&self) -> u32;

    /// Whether the rule only works with an LMDE generator.
    fn requires_generator(&self) -> bool;

    /// Advance `y` from `t` to `t + h`.
    fn step(&self, dynamics: &Dynamics<'_, S>, t: f64, y: &S, h: f64) -> Result<S>;

    /// One-step propagator over `[t, t + h]`.
    fn propagator(&self, generator: &dyn Generator, t: f64, h: f64) -> Result<Matrix>;
}

/// Parameters consumed by particular rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Krylov subspace dimension (Lanczos only).
    #[serde(default)]
    pub k_dim: Option<usize>,
}

/// Rule selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Rk4,
    Magnus(MagnusOrder),
    /// Krylov exponential; anti-Hermitian generators only.
    Lanczos,
}

impl Method {
    /// Whether the selected rule needs an LMDE generator.
    pub fn requires_generator(&self) -> bool {
        !matches!(self, Method::Rk4)
    }

    /// Construct the rule for state type `S`.
    pub fn build<S: State>(&self, params: &RuleParams) -> Result<Box<dyn StepRule<S>>> {
        let rule: Box<dyn StepRule<S>> = match *self {
            Method::Rk4 => Box::new(Rk4),
            Method::Magnus(order) => Box::new(Magnus::new(order)),
            Method::Lanczos => {
                let k_dim = params.k_dim.ok_or_else(|| ValidationError::Field {
                    field: "k_dim".into(),
                    message: "required by the lanczos method".into(),
                })?;
                Box::new(Lanczos::new(k_dim)?)
            }
        };
        Ok(rule)
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "rk4" => Ok(Method::Rk4),
            "lanczos" => Ok(Method::Lanczos),
            _ => match name.strip_prefix("magnus").map(str::parse::<u32>) {
                Some(Ok(order)) => Ok(Method::Magnus(MagnusOrder::try_from(order)?)),
                _ => Err(Error::UnknownMethod(s.to_string())),
            },
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Rk4 => write!(f, "rk4"),
            Method::Magnus(order) => write!(f, "magnus{}", order.value()),
            Method::Lanczos => write!(f, "lanczos"),
        }
    }
}

/// The generator behind `dynamics`, or an error naming the rule that needs it.
pub(crate) fn require_generator<'a, S: State>(
    rule: &str,
    dynamics: &Dynamics<'a, S>,
) -> Result<&'a dyn Generator> {
    dynamics.as_generator().ok_or_else(|| {
        ValidationError::Field {
            field: "method".into(),
            message: format!("{} requires an LMDE generator, got a general right-hand side", rule),
        }
        .into()
    })
}

/// Sample the generator at each of `times`.
///
/// With `dim = None` the first sample fixes the dimension; every sample must
/// be square of that dimension.
pub(crate) fn sample_nodes(
    generator: &dyn Generator,
    times: &[f64],
    dim: Option<usize>,
) -> Result<Vec<Matrix>> {
    let mut dim = dim;
    times
        .iter()
        .map(|&t| {
            let sample = generator.generator(t);
            let d = *dim.get_or_insert(sample.nrows());
            if sample.nrows() != d || sample.ncols() != d {
                return Err(Error::dimension_mismatch(
                    format!("generator at t={}", t),
                    format!("({}, {})", d, d),
                    format!("({}, {})", sample.nrows(), sample.ncols()),
                ));
            }
            Ok(sample)
        })
        .collect()
}
