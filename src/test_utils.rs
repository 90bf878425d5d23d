// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for solver tests.

use ndarray::{array, Array1};
use num_complex::Complex64;

use crate::linalg::{c, Matrix};

const I: Complex64 = Complex64::new(0.0, 1.0);

pub fn pauli_x() -> Matrix {
    array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]]
}

pub fn pauli_y() -> Matrix {
    array![[c(0.0), -I], [I, c(0.0)]]
}

pub fn pauli_z() -> Matrix {
    array![[c(1.0), c(0.0)], [c(0.0), c(-1.0)]]
}

/// `-i·h` for a Hermitian `h`: the anti-Hermitian generator of `exp(-i h t)`.
pub fn minus_i(h: &Matrix) -> Matrix {
    h * (-I)
}

/// Largest elementwise deviation between two matrices.
pub fn max_abs_diff(a: &Matrix, b: &Matrix) -> f64 {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

pub fn assert_matrix_close(a: &Matrix, b: &Matrix, tol: f64) {
    let diff = max_abs_diff(a, b);
    assert!(
        diff < tol,
        "matrices differ by {:.3e} (tol {:.1e}):\n{}\nvs\n{}",
        diff,
        tol,
        a,
        b
    );
}

pub fn assert_vector_close(a: &Array1<Complex64>, b: &Array1<Complex64>, tol: f64) {
    assert_eq!(a.len(), b.len(), "length mismatch");
    let diff = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max);
    assert!(
        diff < tol,
        "vectors differ by {:.3e} (tol {:.1e}):\n{}\nvs\n{}",
        diff,
        tol,
        a,
        b
    );
}
