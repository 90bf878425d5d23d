// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Step-by-step integration over a time grid.

use tracing::debug;

use crate::error::Result;
use crate::grid::TimeGrid;
use crate::rules::StepRule;
use crate::state::{Dynamics, State};
use crate::trajectory::Trajectory;

/// Apply `rule` across every sub-step of `grid`, recording the state at
/// each breakpoint (including `y0` at the first).
pub fn integrate<S: State>(
    rule: &dyn StepRule<S>,
    dynamics: &Dynamics<'_, S>,
    grid: &TimeGrid,
    y0: S,
) -> Result<Trajectory<S>> {
    let n_points = grid.breakpoints().len();
    let mut times = Vec::with_capacity(n_points);
    let mut values = Vec::with_capacity(n_points);

    times.push(grid.breakpoints()[0]);
    values.push(y0.clone());

    let mut y = y0;
    for (interval, &t_end) in grid.intervals().zip(&grid.breakpoints()[1..]) {
        for k in 0..interval.n_steps {
            y = rule.step(dynamics, interval.step_time(k), &y, interval.h)?;
        }
        times.push(t_end);
        values.push(y.clone());
    }

    debug!(
        rule = rule.name(),
        steps = grid.total_steps(),
        breakpoints = n_points,
        "sequential integration complete"
    );
    Ok(Trajectory::new(times, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{c, identity, matrix_exp, Matrix};
    use crate::rules::{Magnus, MagnusOrder, Rk4};
    use crate::state::ConstantGenerator;
    use crate::test_utils::{assert_matrix_close, assert_vector_close, minus_i, pauli_x, pauli_z};
    use ndarray::{array, Array1};
    use num_complex::Complex64;
    use std::f64::consts::PI;

    #[test]
    fn test_records_every_breakpoint() {
        let g = ConstantGenerator(minus_i(&pauli_z()) * c(PI));
        let dynamics = Dynamics::generator(&g);
        let grid = TimeGrid::build((0.0, 1.0), Some(&[0.25, 0.5, 0.75]), 0.3).unwrap();
        let y0 = array![c(1.0), c(0.0)];

        let traj = integrate(&Magnus::new(MagnusOrder::First), &dynamics, &grid, y0.clone())
            .unwrap();
        assert_eq!(traj.times, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(traj.values[0], y0);

        for (t, y) in traj.iter() {
            let expected = matrix_exp(&(minus_i(&pauli_z()) * c(PI * t))).unwrap().dot(&y0);
            assert_vector_close(y, &expected, 1e-12);
        }
    }

    #[test]
    fn test_zero_length_span_returns_initial_state() {
        let f = |_t: f64, y: &Array1<Complex64>| y.clone();
        let dynamics = Dynamics::rhs(&f);
        let grid = TimeGrid::build((0.5, 0.5), None, 0.1).unwrap();
        let traj = integrate(&Rk4, &dynamics, &grid, array![c(2.0)]).unwrap();
        assert_eq!(traj.times, vec![0.5]);
        assert_eq!(traj.values[0][0], c(2.0));
    }

    #[test]
    fn test_backward_integration() {
        // dy/dt = y integrated from 1 back to 0 divides by e.
        let f = |_t: f64, y: &Array1<Complex64>| y.clone();
        let dynamics = Dynamics::rhs(&f);
        let grid = TimeGrid::build((1.0, 0.0), None, 0.01).unwrap();
        let traj = integrate(&Rk4, &dynamics, &grid, array![c(1.0)]).unwrap();
        let (t, y) = traj.last().unwrap();
        assert_eq!(t, 0.0);
        assert!((y[0].re - (-1.0_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_composition_identity() {
        // P(0→1) == P(0.4→1)·P(0→0.4) with y0 = I
        let g = |t: f64| minus_i(&(pauli_z() * c(0.5) + pauli_x() * c((3.0 * t).cos())));
        let dynamics = Dynamics::generator(&g);
        let eye = identity(2);
        let magnus = Magnus::new(MagnusOrder::Third);
        let rules: [&dyn StepRule<Matrix>; 2] = [&Rk4, &magnus];

        for rule in rules {
            let full_grid = TimeGrid::build((0.0, 1.0), Some(&[0.4]), 0.1).unwrap();
            let full = integrate(rule, &dynamics, &full_grid, eye.clone()).unwrap();

            let first_grid = TimeGrid::build((0.0, 0.4), None, 0.1).unwrap();
            let second_grid = TimeGrid::build((0.4, 1.0), None, 0.1).unwrap();
            let p01 = integrate(rule, &dynamics, &first_grid, eye.clone())
                .unwrap()
                .values[1]
                .clone();
            let p12 = integrate(rule, &dynamics, &second_grid, eye.clone())
                .unwrap()
                .values[1]
                .clone();

            assert_matrix_close(&full.values[2], &p12.dot(&p01), 1e-12);
        }
    }

    #[test]
    fn test_dimension_error_aborts() {
        let g = ConstantGenerator(pauli_x());
        let dynamics = Dynamics::generator(&g);
        let grid = TimeGrid::build((0.0, 1.0), None, 0.5).unwrap();
        let y0 = Array1::<Complex64>::zeros(3);
        assert!(integrate(&Rk4, &dynamics, &grid, y0).is_err());
    }
}
