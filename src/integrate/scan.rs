// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parallel inclusive prefix scan.
//!
//! Hillis–Steele formulation: at depth `d` every element `i ≥ 2^d` is
//! replaced by `combine(x[i − 2^d], x[i])`. Each depth is one rayon map and
//! its `collect` is the barrier before the next depth, so `⌈log2 N⌉` depths
//! suffice. The combinator must be associative but need not commute.
//!
//! Ref: Hillis & Steele (1986), "Data parallel algorithms",
//! Commun. ACM 29(12), 1170.

use rayon::prelude::*;

use crate::linalg::Matrix;

/// Inclusive scan: `out[i] = x[0] ⊕ x[1] ⊕ … ⊕ x[i]` with
/// `a ⊕ b = combine(a, b)` and `a` always the earlier operand.
pub fn associative_scan<T, F>(items: Vec<T>, combine: F) -> Vec<T>
where
    T: Clone + Send + Sync,
    F: Fn(&T, &T) -> T + Sync,
{
    let n = items.len();
    let mut current = items;
    let mut offset = 1;
    while offset < n {
        let prev = &current;
        current = (0..n)
            .into_par_iter()
            .map(|i| {
                if i >= offset {
                    combine(&prev[i - offset], &prev[i])
                } else {
                    prev[i].clone()
                }
            })
            .collect();
        offset *= 2;
    }
    current
}

/// Propagator composition: `earlier` acts first, so the product is
/// `later · earlier`.
pub fn compose_propagators(earlier: &Matrix, later: &Matrix) -> Matrix {
    later.dot(earlier)
}
