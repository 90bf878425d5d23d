// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear algebra used by the step rules.
//!
//! - [`matrix_exp`]: matrix exponential via scaling-and-squaring + Padé(13)
//! - [`commutator`]: `[A, B] = AB − BA`
//! - [`identity`]: complex identity matrix

pub mod expm;

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

pub use expm::matrix_exp;

/// Dense complex matrix.
pub type Matrix = Array2<Complex64>;

/// Helper: create Complex64 from f64
#[inline]
pub(crate) fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Complex identity matrix of size `n`.
pub fn identity(n: usize) -> Matrix {
    Array2::from_diag_elem(n, c(1.0))
}

/// Matrix commutator `[a, b] = a·b − b·a`.
pub fn commutator(a: &Matrix, b: &Matrix) -> Matrix {
    a.dot(b) - b.dot(a)
}

/// Euclidean norm of a complex vector.
pub(crate) fn vector_norm(v: ArrayView1<'_, Complex64>) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Hermitian inner product ⟨a, b⟩ = Σ conj(a_i)·b_i.
pub(crate) fn inner(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}
