// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with Padé(13) approximation.
//!
//! Implements the algorithm from:
//!   Higham (2005), "The Scaling and Squaring Method for the Matrix
//!   Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.
//!
//! Every Magnus step and every Lanczos projection ends in one call here,
//! usually on a small (d ≤ 8) or Krylov-sized matrix.

use ndarray::{s, Array2};
use num_complex::Complex64;

use super::{c, identity, Matrix};
use crate::error::{Error, Result};

/// Largest 1-norm for which Padé(13) is accurate without scaling
/// (Higham Table 10.2).
const THETA_13: f64 = 5.37;

/// Padé(13,13) approximation coefficients b_0..b_13.
/// From Higham (2005), equation (10.33).
const PADE_COEFFS: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_401_6e-5,
    5.175_983_437_008_01e-7,
    2.043_151_356_652_5e-8,
    6.306_022_705_717_593e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

/// Compute the matrix exponential exp(A).
///
/// # Errors
/// - [`Error::DimensionMismatch`] if `a` is not square.
/// - [`Error::Numerical`] if `a` has non-finite entries or the Padé
///   denominator is singular.
pub fn matrix_exp(a: &Matrix) -> Result<Matrix> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(Error::dimension_mismatch(
            "matrix exponential",
            "a square matrix",
            format!("({}, {})", n, a.ncols()),
        ));
    }

    if a.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(Error::Numerical(
            "matrix exponential of a matrix with non-finite entries".into(),
        ));
    }

    match n {
        0 => return Ok(Array2::zeros((0, 0))),
        1 => return Ok(Array2::from_elem((1, 1), a[[0, 0]].exp())),
        _ => {}
    }

    let norm = matrix_1_norm(a);
    if !norm.is_finite() {
        return Err(Error::Numerical(format!(
            "matrix exponential input norm overflows ({})",
            norm
        )));
    }

    // Scale so that ||A / 2^s||_1 < theta_13
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as i32
    } else {
        0
    };
    let scaled = a * c(0.5_f64.powi(squarings));

    let mut result = pade13(&scaled)?;

    // exp(A) = (exp(A / 2^s))^(2^s)
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// Padé(13,13) approximant r(A) = (V − U)^{-1} (V + U).
fn pade13(a: &Matrix) -> Result<Matrix> {
    let b = |k: usize| c(PADE_COEFFS[k]);
    let eye = identity(a.nrows());

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    // U = A [A6 (b13 A6 + b11 A4 + b9 A2) + b7 A6 + b5 A4 + b3 A2 + b1 I]
    let odd_high = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let odd = odd_high.dot(&a6) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &eye * b(1);
    let u = a.dot(&odd);

    // V = A6 (b12 A6 + b10 A4 + b8 A2) + b6 A6 + b4 A4 + b2 A2 + b0 I
    let even_high = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let v = even_high.dot(&a6) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &eye * b(0);

    solve_linear(&v - &u, &v + &u)
}

/// Solve A·X = B by Gaussian elimination with partial pivoting.
fn solve_linear(a: Matrix, b: Matrix) -> Result<Matrix> {
    let n = a.nrows();
    let m = b.ncols();

    // Augmented matrix [A | B]
    let mut aug = Array2::<Complex64>::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| aug[[i, col]].norm().total_cmp(&aug[[j, col]].norm()))
            .unwrap_or(col);

        if pivot_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot: Complex64 = aug[[col, col]];
        if pivot.norm().is_nan() || pivot.norm() < 1e-15 {
            return Err(Error::Numerical(format!(
                "singular Padé denominator (pivot {:.3e} in column {})",
                pivot.norm(),
                col
            )));
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            for j in col..(n + m) {
                let val = aug[[col, j]];
                aug[[row, j]] -= factor * val;
            }
        }
    }

    // Back substitution
    let mut x = Array2::<Complex64>::zeros((n, m));
    for row in (0..n).rev() {
        let pivot = aug[[row, row]];
        for j in 0..m {
            let mut sum = aug[[row, n + j]];
            for k in (row + 1)..n {
                sum -= aug[[row, k]] * x[[k, j]];
            }
            x[[row, j]] = sum / pivot;
        }
    }
    Ok(x)
}

/// 1-norm of a complex matrix: max column sum of absolute values.
fn matrix_1_norm(a: &Matrix) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_matrix_close, pauli_x, pauli_z};
    use std::f64::consts::PI;

    #[test]
    fn test_expm_zero_is_identity() {
        let zero = Array2::<Complex64>::zeros((4, 4));
        let result = matrix_exp(&zero).unwrap();
        assert_matrix_close(&result, &identity(4), 1e-14);
    }

    #[test]
    fn test_expm_diagonal() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(1.0);
        a[[1, 1]] = c(2.0);
        let result = matrix_exp(&a).unwrap();

        assert!((result[[0, 0]] - c(1.0_f64.exp())).norm() < 1e-12);
        assert!((result[[1, 1]] - c(2.0_f64.exp())).norm() < 1e-12);
        assert!(result[[0, 1]].norm() < 1e-14);
        assert!(result[[1, 0]].norm() < 1e-14);
    }

    #[test]
    fn test_expm_pauli_x_rotation() {
        // exp(-iθ/2 X) = cos(θ/2) I − i sin(θ/2) X
        let theta = PI / 2.0;
        let a = pauli_x() * Complex64::new(0.0, -theta / 2.0);
        let result = matrix_exp(&a).unwrap();

        let (sn, cs) = (theta / 2.0).sin_cos();
        let expected = identity(2) * c(cs) + pauli_x() * Complex64::new(0.0, -sn);
        assert_matrix_close(&result, &expected, 1e-12);
    }

    #[test]
    fn test_expm_pi_z_flips_sign() {
        // exp(-iπZ) = −I
        let a = pauli_z() * Complex64::new(0.0, -PI);
        let result = matrix_exp(&a).unwrap();
        assert_matrix_close(&result, &(identity(2) * c(-1.0)), 1e-12);
    }

    #[test]
    fn test_expm_scalar() {
        let a = Array2::from_elem((1, 1), Complex64::new(3.0, 1.0));
        let result = matrix_exp(&a).unwrap();
        assert!((result[[0, 0]] - Complex64::new(3.0, 1.0).exp()).norm() < 1e-12);
    }

    #[test]
    fn test_expm_large_norm_needs_scaling() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(100.0);
        a[[1, 1]] = c(-100.0);
        let result = matrix_exp(&a).unwrap();

        let e100 = 100.0_f64.exp();
        assert!((result[[0, 0]].re - e100).abs() / e100 < 1e-10);
        assert!(result[[1, 1]].re.abs() < 1e-30);
    }

    #[test]
    fn test_expm_rejects_non_square() {
        let a = Array2::<Complex64>::zeros((2, 3));
        assert!(matches!(
            matrix_exp(&a),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_expm_rejects_nan() {
        let mut a = Array2::<Complex64>::zeros((2, 2));
        a[[0, 1]] = c(f64::NAN);
        assert!(matches!(matrix_exp(&a), Err(Error::Numerical(_))));
    }

    #[test]
    fn test_expm_rejects_non_finite_scalar_and_imaginary() {
        let a = Array2::from_elem((1, 1), c(f64::NAN));
        assert!(matches!(matrix_exp(&a), Err(Error::Numerical(_))));

        let mut b = Array2::<Complex64>::zeros((3, 3));
        b[[2, 0]] = Complex64::new(0.0, f64::INFINITY);
        assert!(matches!(matrix_exp(&b), Err(Error::Numerical(_))));
    }

    #[test]
    fn test_solve_linear_rejects_nan_pivot() {
        let mut a = identity(2);
        a[[0, 0]] = c(f64::NAN);
        a[[1, 0]] = c(f64::NAN);
        let result = solve_linear(a, identity(2));
        assert!(matches!(result, Err(Error::Numerical(_))));
    }
}
