// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Magnus-expansion exponential integrators.
//!
//! The exponent Ω is a truncated Magnus series with the time integrals
//! replaced by Gauss–Legendre quadrature; the step is then `exp(Ω)`:
//!
//! - order 1: one node (midpoint), `Ω = h·G(t + h/2)`
//! - order 2: two Gauss nodes plus one commutator term
//! - order 3: three Gauss nodes plus nested commutators
//!
//! "Order" here is the number of Magnus terms kept; the global accuracy
//! in `h` is twice that.

use crate::error::{Error, Result};
use crate::linalg::{c, commutator, matrix_exp, Matrix};
use crate::state::{Dynamics, Generator, State};

use super::{require_generator, sample_nodes, StepRule};

/// Supported truncation orders of the Magnus series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagnusOrder {
    First,
    Second,
    Third,
}

impl MagnusOrder {
    /// Numeric order (1, 2 or 3).
    pub fn value(self) -> u32 {
        match self {
            MagnusOrder::First => 1,
            MagnusOrder::Second => 2,
            MagnusOrder::Third => 3,
        }
    }
}

impl TryFrom<u32> for MagnusOrder {
    type Error = Error;

    fn try_from(order: u32) -> Result<Self> {
        match order {
            1 => Ok(MagnusOrder::First),
            2 => Ok(MagnusOrder::Second),
            3 => Ok(MagnusOrder::Third),
            other => Err(Error::UnsupportedOrder(other)),
        }
    }
}

/// Magnus exponential integrator of a fixed order.
#[derive(Debug, Clone, Copy)]
pub struct Magnus {
    order: MagnusOrder,
}

impl Magnus {
    pub fn new(order: MagnusOrder) -> Self {
        Self { order }
    }

    /// Build from a numeric order; anything outside 1..=3 is rejected.
    pub fn with_order(order: u32) -> Result<Self> {
        Ok(Self::new(MagnusOrder::try_from(order)?))
    }

    pub fn magnus_order(&self) -> MagnusOrder {
        self.order
    }

    /// Truncated Magnus exponent Ω over `[t, t + h]`.
    ///
    /// `dim` pins the expected generator dimension when the caller already
    /// knows it.
    pub fn exponent(
        &self,
        generator: &dyn Generator,
        t: f64,
        h: f64,
        dim: Option<usize>,
    ) -> Result<Matrix> {
        match self.order {
            MagnusOrder::First => {
                let g = sample_nodes(generator, &[t + 0.5 * h], dim)?;
                Ok(&g[0] * c(h))
            }
            MagnusOrder::Second => {
                let sqrt3 = 3.0_f64.sqrt();
                let c1 = 0.5 - sqrt3 / 6.0;
                let c2 = 0.5 + sqrt3 / 6.0;
                let p2 = sqrt3 / 12.0;

                let g = sample_nodes(generator, &[t + c1 * h, t + c2 * h], dim)?;
                let (g1, g2) = (&g[0], &g[1]);

                Ok((g1 + g2) * c(0.5 * h) + commutator(g2, g1) * c(p2 * h * h))
            }
            MagnusOrder::Third => {
                let sqrt15 = 15.0_f64.sqrt();
                let d1 = 0.5 - sqrt15 / 10.0;
                let d2 = 0.5;
                let d3 = 0.5 + sqrt15 / 10.0;
                let c0 = sqrt15 / 3.0;
                let c1 = 10.0 / 3.0;

                let g = sample_nodes(generator, &[t + d1 * h, t + d2 * h, t + d3 * h], dim)?;
                let (g1, g2, g3) = (&g[0], &g[1], &g[2]);

                let a1 = g2 * c(h);
                let a2 = (g3 - g1) * c(c0 * h);
                let a3 = (g3 - &(g2 * c(2.0)) + g1) * c(c1 * h);

                let comm1 = commutator(&a1, &a2);
                let comm2 = commutator(&(&a3 * c(2.0) + &comm1), &a1) * c(1.0 / 60.0);

                let lhs = &a1 * c(-20.0) - &a3 + &comm1;
                let rhs = &a2 + &comm2;

                Ok(&a1 + &(&a3 * c(1.0 / 12.0)) + commutator(&lhs, &rhs) * c(1.0 / 240.0))
            }
        }
    }
}

impl<S: State> StepRule<S> for Magnus {
    fn name(&self) -> &'static str {
        match self.order {
            MagnusOrder::First => "magnus1",
            MagnusOrder::Second => "magnus2",
            MagnusOrder::Third => "magnus3",
        }
    }

    fn order(&self) -> u32 {
        self.order.value()
    }

    fn requires_generator(&self) -> bool {
        true
    }

    fn step(&self, dynamics: &Dynamics<'_, S>, t: f64, y: &S, h: f64) -> Result<S> {
        let generator = require_generator(StepRule::<S>::name(self), dynamics)?;
        let omega = self.exponent(generator, t, h, Some(y.leading_dim()))?;
        Ok(y.left_mul(&matrix_exp(&omega)?))
    }

    fn propagator(&self, generator: &dyn Generator, t: f64, h: f64) -> Result<Matrix> {
        matrix_exp(&self.exponent(generator, t, h, None)?)
    }
}
