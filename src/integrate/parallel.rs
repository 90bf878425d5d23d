// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Data-parallel propagator composition for LMDEs.
//!
//! 1. Flatten the grid into sub-steps `(t_j, h_j)`.
//! 2. Compute every one-step propagator `P_j` in a rayon map.
//! 3. Chain them with [`associative_scan`] so that entry `j` holds
//!    `P_j ⋯ P_1 P_0`.
//! 4. Read off the cumulative propagators at the breakpoints and apply `y0`.
//!
//! A square `y0` is folded into the scan as its first element. Any other
//! `y0` (a vector, or a rectangular block of columns) is applied after the
//! scan, by multiplying each retained cumulative propagator.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::grid::TimeGrid;
use crate::linalg::Matrix;
use crate::rules::StepRule;
use crate::state::{Generator, State};
use crate::trajectory::Trajectory;

use super::scan::{associative_scan, compose_propagators};

/// Integrate `dy/dt = G(t)·y` over `grid` by composing one-step propagators.
pub fn compose<S: State>(
    rule: &dyn StepRule<S>,
    generator: &dyn Generator,
    grid: &TimeGrid,
    y0: &S,
) -> Result<Trajectory<S>> {
    let threads = rayon::current_num_threads();
    if threads <= 1 {
        warn!(
            threads,
            "data-parallel propagator composition on a single worker thread; \
             sequential mode is likely faster"
        );
    }

    let steps = grid.steps();
    let dim = y0.leading_dim();

    let propagators: Vec<Matrix> = steps
        .par_iter()
        .map(|step| rule.propagator(generator, step.t, step.h))
        .collect::<Result<_>>()?;

    if let Some(p) = propagators
        .iter()
        .find(|p| p.nrows() != dim || p.ncols() != dim)
    {
        return Err(Error::dimension_mismatch(
            format!("propagator against initial state {}", y0.shape_string()),
            format!("({}, {})", dim, dim),
            format!("({}, {})", p.nrows(), p.ncols()),
        ));
    }

    let offsets = grid.breakpoint_offsets();
    let times = grid.breakpoints().to_vec();

    let values = match y0.as_square() {
        Some(square) => {
            // Cumulative entry k is then the state after k sub-steps.
            let mut items = Vec::with_capacity(propagators.len() + 1);
            items.push(square.clone());
            items.extend(propagators);
            let cumulative = associative_scan(items, compose_propagators);
            offsets
                .iter()
                .map(|&k| S::from_matrix(cumulative[k].clone()))
                .collect::<Result<Vec<S>>>()?
        }
        None => {
            let cumulative = associative_scan(propagators, compose_propagators);
            let mut values = Vec::with_capacity(offsets.len());
            values.push(y0.clone());
            for &k in &offsets[1..] {
                values.push(y0.left_mul(&cumulative[k - 1]));
            }
            values
        }
    };

    debug!(
        rule = rule.name(),
        steps = steps.len(),
        threads,
        breakpoints = times.len(),
        "propagator composition complete"
    );
    Ok(Trajectory::new(times, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrate::sequential::integrate;
    use crate::linalg::{c, identity};
    use crate::rules::{Magnus, MagnusOrder, Rk4};
    use crate::state::{ConstantGenerator, Dynamics};
    use crate::test_utils::{
        assert_matrix_close, assert_vector_close, max_abs_diff, minus_i, pauli_x, pauli_y, pauli_z,
    };
    use ndarray::{array, Array1, Array2};
    use num_complex::Complex64;

    fn driven(t: f64) -> Matrix {
        minus_i(&(pauli_z() * c(0.5) + pauli_x() * c((3.0 * t).cos()) + pauli_y() * c(0.2 * t)))
    }

    #[test]
    fn test_matches_sequential_for_square_state() {
        let grid = TimeGrid::build((0.0, 2.0), Some(&[0.3, 1.1]), 0.05).unwrap();
        let rule = Magnus::new(MagnusOrder::Second);
        let g = driven;
        let y0 = identity(2);

        let par = compose(&rule, &g, &grid, &y0).unwrap();
        let seq = integrate(&rule, &Dynamics::generator(&g), &grid, y0).unwrap();

        assert_eq!(par.times, seq.times);
        for (a, b) in par.values.iter().zip(&seq.values) {
            assert_matrix_close(a, b, 1e-12);
        }
    }

    #[test]
    fn test_matches_sequential_for_vector_state() {
        let grid = TimeGrid::build((0.0, 1.0), Some(&[0.5]), 0.1).unwrap();
        let g = driven;
        let y0 = array![c(0.6), Complex64::new(0.0, 0.8)];

        let par = compose(&Rk4, &g, &grid, &y0).unwrap();
        let seq = integrate(&Rk4, &Dynamics::generator(&g), &grid, y0.clone()).unwrap();

        assert_eq!(par.len(), 3);
        assert_eq!(par.values[0], y0);
        for (a, b) in par.values.iter().zip(&seq.values) {
            assert_vector_close(a, b, 1e-12);
        }
    }

    #[test]
    fn test_rectangular_state_applied_after_scan() {
        let grid = TimeGrid::build((0.0, 1.0), None, 0.25).unwrap();
        let g = driven;
        let mut y0 = Array2::<Complex64>::zeros((2, 1));
        y0[[0, 0]] = c(1.0);

        let par = compose(&Rk4, &g, &grid, &y0).unwrap();
        let seq = integrate(&Rk4, &Dynamics::generator(&g), &grid, y0.clone()).unwrap();
        assert_eq!(par.values[0], y0);
        assert!(max_abs_diff(&par.values[1], &seq.values[1]) < 1e-12);
    }

    #[test]
    fn test_composition_identity() {
        // P(0→1) == P(0.4→1)·P(0→0.4)
        let g = driven;
        let rule = Magnus::new(MagnusOrder::Third);
        let eye = identity(2);

        let full_grid = TimeGrid::build((0.0, 1.0), Some(&[0.4]), 0.1).unwrap();
        let full = compose(&rule, &g, &full_grid, &eye).unwrap();

        let first = compose(&rule, &g, &TimeGrid::build((0.0, 0.4), None, 0.1).unwrap(), &eye)
            .unwrap();
        let second = compose(&rule, &g, &TimeGrid::build((0.4, 1.0), None, 0.1).unwrap(), &eye)
            .unwrap();

        let p01 = &first.values[1];
        let p12 = &second.values[1];
        assert_matrix_close(&full.values[2], &p12.dot(p01), 1e-12);
    }

    #[test]
    fn test_zero_length_span() {
        let g = ConstantGenerator(pauli_x());
        let grid = TimeGrid::build((1.0, 1.0), None, 0.1).unwrap();
        let y0: Array1<Complex64> = array![c(1.0), c(0.0)];
        let traj = compose(&Rk4, &g, &grid, &y0).unwrap();
        assert_eq!(traj.times, vec![1.0]);
        assert_eq!(traj.values, vec![y0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let g = ConstantGenerator(pauli_x());
        let grid = TimeGrid::build((0.0, 1.0), None, 0.5).unwrap();
        let y0 = Array1::<Complex64>::zeros(3);
        assert!(matches!(
            compose(&Rk4, &g, &grid, &y0),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
