// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Classical 4th-order Runge–Kutta.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use crate::error::Result;
use crate::linalg::{c, identity, Matrix};
use crate::state::{Dynamics, Generator, State};

use super::{sample_nodes, StepRule};

/// Classical RK4. Works with a general right-hand side as well as a generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4;

impl<S: State> StepRule<S> for Rk4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn order(&self) -> u32 {
        4
    }

    fn requires_generator(&self) -> bool {
        false
    }

    fn step(&self, dynamics: &Dynamics<'_, S>, t: f64, y: &S, h: f64) -> Result<S> {
        let half = 0.5 * h;

        let k1 = dynamics.evaluate(t, y)?;
        let k2 = dynamics.evaluate(t + half, &y.add_scaled(half, &k1))?;
        let k3 = dynamics.evaluate(t + half, &y.add_scaled(half, &k2))?;
        let k4 = dynamics.evaluate(t + h, &y.add_scaled(h, &k3))?;

        let sum = k1.add_scaled(2.0, &k2).add_scaled(2.0, &k3).add_scaled(1.0, &k4);
        Ok(y.add_scaled(h / 6.0, &sum))
    }

    /// RK4 applied to the identity: the generator at the midpoint is shared
    /// by the two middle stages.
    fn propagator(&self, generator: &dyn Generator, t: f64, h: f64) -> Result<Matrix> {
        let nodes = sample_nodes(generator, &[t, t + 0.5 * h, t + h], None)?;
        let (g0, g_mid, g1) = (&nodes[0], &nodes[1], &nodes[2]);
        let eye = identity(g0.nrows());
        let half = c(0.5 * h);

        let k1 = g0.clone();
        let k2 = g_mid.dot(&(&eye + &(&k1 * half)));
        let k3 = g_mid.dot(&(&eye + &(&k2 * half)));
        let k4 = g1.dot(&(&eye + &(&k3 * c(h))));

        Ok(&eye + &((k1 + k2 * c(2.0) + k3 * c(2.0) + k4) * c(h / 6.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::matrix_exp;
    use crate::state::ConstantGenerator;
    use crate::test_utils::{assert_matrix_close, assert_vector_close, minus_i, pauli_x};
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};
    use num_complex::Complex64;

    #[test]
    fn test_rk4_exponential_decay() {
        // dy/dt = −y, y(0) = 1 ⇒ y(1) = e^{-1}
        let f = |_t: f64, y: &Array1<Complex64>| y * c(-1.0);
        let dynamics = Dynamics::rhs(&f);
        let h = 0.01;
        let mut y = array![c(1.0)];
        for k in 0..100 {
            y = Rk4.step(&dynamics, k as f64 * h, &y, h).unwrap();
        }
        assert_relative_eq!(y[0].re, (-1.0_f64).exp(), epsilon = 1e-10);
        assert!(y[0].im.abs() < 1e-15);
    }

    #[test]
    fn test_rk4_time_dependent_rhs() {
        // dy/dt = 2t ⇒ y(1) = 1, exact for RK4 (Simpson's rule)
        let f = |t: f64, _y: &Array1<Complex64>| array![c(2.0 * t)];
        let dynamics = Dynamics::rhs(&f);
        let y = StepRule::<Array1<Complex64>>::step(&Rk4, &dynamics, 0.0, &array![c(0.0)], 1.0)
            .unwrap();
        assert_relative_eq!(y[0].re, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_rk4_propagator_close_to_exponential() {
        let g = ConstantGenerator(minus_i(&pauli_x()));
        let h = 0.05;
        let p = StepRule::<Array1<Complex64>>::propagator(&Rk4, &g, 0.0, h).unwrap();
        let exact = matrix_exp(&(minus_i(&pauli_x()) * c(h))).unwrap();
        // local error O(h^5)
        assert_matrix_close(&p, &exact, 1e-7);
    }

    #[test]
    fn test_rk4_step_with_generator_matches_propagator() {
        let g = ConstantGenerator(minus_i(&pauli_x()));
        let dynamics = Dynamics::generator(&g);
        let y0 = array![c(1.0), c(0.0)];
        let p = StepRule::<Array1<Complex64>>::propagator(&Rk4, &g, 0.0, 0.1).unwrap();
        let y1 = Rk4.step(&dynamics, 0.0, &y0, 0.1).unwrap();
        assert_vector_close(&y1, &p.dot(&y0), 1e-15);
    }
}
