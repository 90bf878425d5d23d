// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! State types and the dynamics collaborator interfaces.
//!
//! A solve threads a [`State`] through the time grid: either a state vector
//! (`Array1<Complex64>`) or a matrix (`Array2<Complex64>`, e.g. a propagator or
//! a set of column states). The equation itself is supplied as [`Dynamics`]:
//!
//! - an LMDE generator `G(t)`, with `dy/dt = G(t)·y`, or
//! - a general right-hand side `f(t, y)`.
//!
//! Both collaborators must be `Sync`: in data-parallel mode the generator is
//! sampled from several worker threads at once.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::linalg::{c, Matrix};

/// Value threaded through a fixed-step solve.
pub trait State: Clone + Send + Sync + fmt::Debug {
    /// Leading dimension (the dimension a generator must match).
    fn leading_dim(&self) -> usize;

    /// Shape as a human-readable string, for error messages.
    fn shape_string(&self) -> String;

    /// Whether `other` has exactly the same shape.
    fn same_shape(&self, other: &Self) -> bool;

    /// `self + a·x`
    fn add_scaled(&self, a: f64, x: &Self) -> Self;

    /// `p·self`. The caller guarantees `p` is `leading_dim × leading_dim`.
    fn left_mul(&self, p: &Matrix) -> Self;

    /// View as a square matrix, if the state is one.
    fn as_square(&self) -> Option<&Matrix>;

    /// Rebuild a state of this type from a matrix.
    fn from_matrix(m: Matrix) -> Result<Self>;

    /// Apply `f` to every column (a vector is its own single column).
    fn map_columns<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(ArrayView1<'_, Complex64>) -> Result<Array1<Complex64>>;
}

impl State for Array1<Complex64> {
    fn leading_dim(&self) -> usize {
        self.len()
    }

    fn shape_string(&self) -> String {
        format!("({},)", self.len())
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.len() == other.len()
    }

    fn add_scaled(&self, a: f64, x: &Self) -> Self {
        self + &(x * c(a))
    }

    fn left_mul(&self, p: &Matrix) -> Self {
        p.dot(self)
    }

    fn as_square(&self) -> Option<&Matrix> {
        None
    }

    fn from_matrix(m: Matrix) -> Result<Self> {
        if m.ncols() != 1 {
            return Err(Error::dimension_mismatch(
                "vector state",
                format!("({}, 1)", m.nrows()),
                format!("({}, {})", m.nrows(), m.ncols()),
            ));
        }
        Ok(m.column(0).to_owned())
    }

    fn map_columns<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(ArrayView1<'_, Complex64>) -> Result<Array1<Complex64>>,
    {
        f(self.view())
    }
}

impl State for Array2<Complex64> {
    fn leading_dim(&self) -> usize {
        self.nrows()
    }

    fn shape_string(&self) -> String {
        format!("({}, {})", self.nrows(), self.ncols())
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.nrows() == other.nrows() && self.ncols() == other.ncols()
    }

    fn add_scaled(&self, a: f64, x: &Self) -> Self {
        self + &(x * c(a))
    }

    fn left_mul(&self, p: &Matrix) -> Self {
        p.dot(self)
    }

    fn as_square(&self) -> Option<&Matrix> {
        (self.nrows() == self.ncols()).then_some(self)
    }

    fn from_matrix(m: Matrix) -> Result<Self> {
        Ok(m)
    }

    fn map_columns<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(ArrayView1<'_, Complex64>) -> Result<Array1<Complex64>>,
    {
        let mut out = Array2::zeros(self.raw_dim());
        for (j, col) in self.columns().into_iter().enumerate() {
            let mapped = f(col)?;
            if mapped.len() != self.nrows() {
                return Err(Error::dimension_mismatch(
                    "column map",
                    self.nrows(),
                    mapped.len(),
                ));
            }
            out.column_mut(j).assign(&mapped);
        }
        Ok(out)
    }
}

/// LMDE generator `G(t)`.
pub trait Generator: Sync {
    /// Evaluate the generator at time `t`.
    fn generator(&self, t: f64) -> Matrix;
}

impl<F> Generator for F
where
    F: Fn(f64) -> Matrix + Sync,
{
    fn generator(&self, t: f64) -> Matrix {
        self(t)
    }
}

/// Time-independent generator.
#[derive(Debug, Clone)]
pub struct ConstantGenerator(pub Matrix);

impl Generator for ConstantGenerator {
    fn generator(&self, _t: f64) -> Matrix {
        self.0.clone()
    }
}

/// General right-hand side `f(t, y)`.
pub trait Rhs<S>: Sync {
    /// Evaluate `dy/dt` at `(t, y)`.
    fn rhs(&self, t: f64, y: &S) -> S;
}

impl<S, F> Rhs<S> for F
where
    F: Fn(f64, &S) -> S + Sync,
{
    fn rhs(&self, t: f64, y: &S) -> S {
        self(t, y)
    }
}

/// The equation being integrated.
pub enum Dynamics<'a, S> {
    /// Linear matrix differential equation `dy/dt = G(t)·y`.
    Generator(&'a dyn Generator),
    /// General ODE `dy/dt = f(t, y)`.
    Rhs(&'a dyn Rhs<S>),
}

impl<S> Clone for Dynamics<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Dynamics<'_, S> {}

impl<S> fmt::Debug for Dynamics<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamics::Generator(_) => f.write_str("Dynamics::Generator"),
            Dynamics::Rhs(_) => f.write_str("Dynamics::Rhs"),
        }
    }
}

impl<'a, S: State> Dynamics<'a, S> {
    /// Wrap an LMDE generator.
    pub fn generator<G: Generator + 'a>(g: &'a G) -> Self {
        Dynamics::Generator(g)
    }

    /// Wrap a general right-hand side.
    pub fn rhs<F: Rhs<S> + 'a>(f: &'a F) -> Self {
        Dynamics::Rhs(f)
    }

    /// The generator, if this is an LMDE.
    pub fn as_generator(&self) -> Option<&'a dyn Generator> {
        match *self {
            Dynamics::Generator(g) => Some(g),
            Dynamics::Rhs(_) => None,
        }
    }

    /// Whether the equation is a genuine LMDE.
    pub fn is_lmde(&self) -> bool {
        matches!(self, Dynamics::Generator(_))
    }

    /// Evaluate `dy/dt` at `(t, y)`.
    ///
    /// For a generator this is `G(t)·y`.
    pub fn evaluate(&self, t: f64, y: &S) -> Result<S> {
        match *self {
            Dynamics::Generator(g) => {
                let gt = sample_generator(g, t, y.leading_dim())?;
                Ok(y.left_mul(&gt))
            }
            Dynamics::Rhs(f) => {
                let dy = f.rhs(t, y);
                if !dy.same_shape(y) {
                    return Err(Error::dimension_mismatch(
                        format!("right-hand side at t={}", t),
                        y.shape_string(),
                        dy.shape_string(),
                    ));
                }
                Ok(dy)
            }
        }
    }
}

/// Sample `G(t)` and check it is a `dim × dim` matrix.
pub(crate) fn sample_generator(g: &dyn Generator, t: f64, dim: usize) -> Result<Matrix> {
    let gt = g.generator(t);
    if gt.nrows() != dim || gt.ncols() != dim {
        return Err(Error::dimension_mismatch(
            format!("generator at t={}", t),
            format!("({}, {})", dim, dim),
            format!("({}, {})", gt.nrows(), gt.ncols()),
        ));
    }
    Ok(gt)
}
