// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Krylov-subspace exponential via Lanczos tridiagonalization.
//!
//! For an anti-Hermitian generator `G = −iH` the action `exp(h·G)·v` is
//! approximated in the Krylov space `span{v, Hv, …, H^{k−1}v}`:
//!
//!   exp(h·G)·v ≈ ‖v‖ · Q · exp(−i·h·T) · e₁
//!
//! where `Q` is the orthonormal Lanczos basis and `T = Q†HQ` the real
//! symmetric tridiagonal projection. Only the small `k × k` exponential is
//! formed. The generator is sampled once, at the midpoint of the step.

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use tracing::debug;

use crate::error::Result;
use crate::linalg::{c, identity, inner, matrix_exp, vector_norm, Matrix};
use crate::state::{Dynamics, Generator, State};
use crate::validation::validate_k_dim;

use super::{require_generator, sample_nodes, StepRule};

/// Relative tolerance below which a Lanczos residual counts as breakdown.
const BREAKDOWN_TOL: f64 = 1e-12;

/// Relative size of `G + G†` above which a generator is reported as not
/// anti-Hermitian.
const ANTI_HERMITIAN_TOL: f64 = 1e-10;

/// Midpoint Krylov exponential with subspace dimension `k_dim`.
///
/// Only valid for anti-Hermitian generators (`G = −iH`, closed-system
/// Schrödinger dynamics). Other generators, e.g. a vectorized Lindbladian,
/// give a wrong result; use a Magnus rule for those. Steps with such a
/// generator are reported at debug level.
#[derive(Debug, Clone, Copy)]
pub struct Lanczos {
    k_dim: usize,
}

impl Lanczos {
    /// `k_dim` must be at least 1; values above the state dimension are
    /// clamped when stepping.
    pub fn new(k_dim: usize) -> Result<Self> {
        validate_k_dim(k_dim)?;
        Ok(Self { k_dim })
    }

    pub fn k_dim(&self) -> usize {
        self.k_dim
    }
}

impl<S: State> StepRule<S> for Lanczos {
    fn name(&self) -> &'static str {
        "lanczos"
    }

    fn order(&self) -> u32 {
        1
    }

    fn requires_generator(&self) -> bool {
        true
    }

    fn step(&self, dynamics: &Dynamics<'_, S>, t: f64, y: &S, h: f64) -> Result<S> {
        let generator = require_generator("lanczos", dynamics)?;
        let g = sample_nodes(generator, &[t + 0.5 * h], Some(y.leading_dim()))?;
        report_non_anti_hermitian(&g[0], t);
        y.map_columns(|col| lanczos_expm(&g[0], col, self.k_dim, h))
    }

    fn propagator(&self, generator: &dyn Generator, t: f64, h: f64) -> Result<Matrix> {
        let g = sample_nodes(generator, &[t + 0.5 * h], None)?;
        report_non_anti_hermitian(&g[0], t);
        identity(g[0].nrows()).map_columns(|col| lanczos_expm(&g[0], col, self.k_dim, h))
    }
}

/// `‖G + G†‖_F / max(‖G‖_F, 1)`; zero for an anti-Hermitian `G`.
pub fn anti_hermitian_defect(g: &Matrix) -> f64 {
    let n = g.nrows().min(g.ncols());
    let mut defect = 0.0;
    for i in 0..n {
        for j in 0..n {
            defect += (g[[i, j]] + g[[j, i]].conj()).norm_sqr();
        }
    }
    let norm = g.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    defect.sqrt() / norm.max(1.0)
}

fn report_non_anti_hermitian(g: &Matrix, t: f64) {
    let defect = anti_hermitian_defect(g);
    if defect > ANTI_HERMITIAN_TOL {
        debug!(t, defect, "lanczos generator is not anti-Hermitian; result is inaccurate");
    }
}

/// Approximate `exp(h·g)·v` in a Krylov space of dimension at most `k_dim`.
///
/// `g` is assumed anti-Hermitian. A zero vector maps to zero.
pub fn lanczos_expm(
    g: &Matrix,
    v: ArrayView1<'_, Complex64>,
    k_dim: usize,
    h: f64,
) -> Result<Array1<Complex64>> {
    let n = v.len();
    let beta0 = vector_norm(v);
    if beta0 == 0.0 {
        return Ok(Array1::zeros(n));
    }

    // H = i·G is Hermitian
    let hmat = g * Complex64::new(0.0, 1.0);
    let scale = hmat.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt().max(1.0);
    let rank = k_dim.min(n);

    let mut basis: Vec<Array1<Complex64>> = Vec::with_capacity(rank);
    basis.push(v.mapv(|z| z / beta0));
    let mut alphas: Vec<f64> = Vec::with_capacity(rank);
    let mut betas: Vec<f64> = Vec::with_capacity(rank);

    for j in 0..rank {
        let q = &basis[j];
        let mut w = hmat.dot(q);
        let alpha = inner(q, &w).re;
        alphas.push(alpha);
        if j + 1 == rank {
            break;
        }

        w = w - q * c(alpha);
        if j > 0 {
            w = w - &basis[j - 1] * c(betas[j - 1]);
        }
        // full reorthogonalization against the basis built so far
        for qi in &basis {
            let overlap = inner(qi, &w);
            w = w - qi * overlap;
        }

        let beta = vector_norm(w.view());
        if beta < BREAKDOWN_TOL * scale {
            debug!(step = j, beta, "Lanczos breakdown: Krylov space is invariant");
            break;
        }
        betas.push(beta);
        basis.push(w / c(beta));
    }

    // T = tridiag(β, α, β); exponentiate −i·h·T
    let k = alphas.len();
    let mut t = Array2::<Complex64>::zeros((k, k));
    for (i, &alpha) in alphas.iter().enumerate() {
        t[[i, i]] = c(alpha);
    }
    for (i, &beta) in betas.iter().take(k.saturating_sub(1)).enumerate() {
        t[[i, i + 1]] = c(beta);
        t[[i + 1, i]] = c(beta);
    }
    let small = matrix_exp(&(t * Complex64::new(0.0, -h)))?;

    let mut out = Array1::<Complex64>::zeros(n);
    for (j, q) in basis.iter().take(k).enumerate() {
        out = out + q * (small[[j, 0]] * beta0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_matrix_close, assert_vector_close, minus_i, pauli_x};
    use ndarray::array;

    /// A 4×4 Hermitian matrix with distinct eigenvalues.
    fn hermitian4() -> Matrix {
        let i = Complex64::new(0.0, 1.0);
        array![
            [c(1.0), c(0.5), i * 0.3, c(0.0)],
            [c(0.5), c(-0.4), c(0.2), -i * 0.1],
            [-i * 0.3, c(0.2), c(0.8), c(0.6)],
            [c(0.0), i * 0.1, c(0.6), c(-1.2)],
        ]
    }

    #[test]
    fn test_full_rank_matches_dense_exponential() {
        let g = minus_i(&hermitian4());
        let h = 0.7;
        let dense = matrix_exp(&(&g * c(h))).unwrap();
        let v = array![c(1.0), c(0.0), Complex64::new(0.5, 0.5), c(-0.25)];

        let approx = lanczos_expm(&g, v.view(), 4, h).unwrap();
        assert_vector_close(&approx, &dense.dot(&v), 1e-10);
    }

    #[test]
    fn test_k_dim_above_dimension_is_clamped() {
        let g = minus_i(&hermitian4());
        let v = array![c(0.0), c(1.0), c(0.0), c(0.0)];
        let clamped = lanczos_expm(&g, v.view(), 4, 0.3).unwrap();
        let oversized = lanczos_expm(&g, v.view(), 50, 0.3).unwrap();
        assert_vector_close(&clamped, &oversized, 1e-14);
    }

    #[test]
    fn test_invariant_subspace_breaks_down_exactly() {
        // v is an eigenvector of X: the Krylov space is one-dimensional.
        let g = minus_i(&pauli_x());
        let s = 1.0 / 2.0_f64.sqrt();
        let v = array![c(s), c(s)];
        let out = lanczos_expm(&g, v.view(), 2, 0.4).unwrap();
        let phase = Complex64::new(0.0, -0.4).exp();
        assert_vector_close(&out, &(&v * phase), 1e-14);
    }

    #[test]
    fn test_zero_vector() {
        let g = minus_i(&hermitian4());
        let v = Array1::<Complex64>::zeros(4);
        let out = lanczos_expm(&g, v.view(), 3, 1.0).unwrap();
        assert!(out.iter().all(|z| *z == c(0.0)));
    }

    #[test]
    fn test_small_k_dim_is_accurate_for_small_steps() {
        let g = minus_i(&hermitian4());
        let h = 1e-3;
        let v = array![c(1.0), c(1.0), c(0.0), c(0.0)];
        let dense = matrix_exp(&(&g * c(h))).unwrap().dot(&v);
        let approx = lanczos_expm(&g, v.view(), 2, h).unwrap();
        assert_vector_close(&approx, &dense, 1e-5);
    }

    #[test]
    fn test_propagator_matches_dense_at_full_rank() {
        let g = crate::state::ConstantGenerator(minus_i(&hermitian4()));
        let rule = Lanczos::new(4).unwrap();
        let p = StepRule::<Array1<Complex64>>::propagator(&rule, &g, 0.0, 0.5).unwrap();
        let dense = matrix_exp(&(minus_i(&hermitian4()) * c(0.5))).unwrap();
        assert_matrix_close(&p, &dense, 1e-10);
    }

    #[test]
    fn test_matrix_state_is_propagated_column_wise() {
        let g = crate::state::ConstantGenerator(minus_i(&hermitian4()));
        let dynamics = Dynamics::generator(&g);
        let rule = Lanczos::new(4).unwrap();
        let y0 = identity(4);
        let y1 = rule.step(&dynamics, 0.0, &y0, 0.5).unwrap();
        let dense = matrix_exp(&(minus_i(&hermitian4()) * c(0.5))).unwrap();
        assert_matrix_close(&y1, &dense, 1e-10);
    }

    #[test]
    fn test_zero_k_dim_rejected() {
        assert!(Lanczos::new(0).is_err());
        assert_eq!(Lanczos::new(3).unwrap().k_dim(), 3);
    }

    #[test]
    fn test_anti_hermitian_defect() {
        assert!(anti_hermitian_defect(&minus_i(&hermitian4())) < 1e-15);

        // A Hermitian matrix is as far from anti-Hermitian as possible: G + G† = 2G.
        let defect = anti_hermitian_defect(&hermitian4());
        assert!((defect - 2.0).abs() < 1e-12);

        // Decay term of a non-unitary generator
        let mut g = minus_i(&pauli_x());
        g[[1, 1]] = c(-0.5);
        assert!(anti_hermitian_defect(&g) > ANTI_HERMITIAN_TOL);
    }
}
