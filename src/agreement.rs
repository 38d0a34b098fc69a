//! Agreement between two partitions of the same actors.
//!
//! Two uses inside the engine:
//!
//! - [`contingency`] is the K×K overlap table that crossover uses to line up
//!   the arbitrary cluster labels of two parents before mixing them.
//! - [`ari`] scores how similar two partitions are regardless of labelling,
//!   which the result time series uses to report how stable the camps are
//!   from one slice to the next.
//!
//! # Adjusted Rand Index
//!
//! ```text
//! ARI = (Σ_ij C(n_ij, 2) − E) / (½(Σ_i C(a_i, 2) + Σ_j C(b_j, 2)) − E)
//! E   = Σ_i C(a_i, 2) · Σ_j C(b_j, 2) / C(n, 2)
//! ```
//!
//! 1 for identical partitions (up to relabelling), around 0 for chance.
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions"

use ndarray::Array2;

/// Overlap counts: entry `[a, b]` counts the nodes labelled `a` in `left` and
/// `b` in `right`.
///
/// Labels `>= k` are ignored; callers validate ranges beforehand.
pub fn contingency(left: &[usize], right: &[usize], k: usize) -> Array2<usize> {
    let mut table = Array2::zeros((k, k));
    for (&a, &b) in left.iter().zip(right.iter()) {
        if a < k && b < k {
            table[[a, b]] += 1;
        }
    }
    table
}

/// Adjusted Rand Index between two clusterings.
///
/// Returns 0.0 when the lengths differ or the input is empty.
///
/// ```rust
/// use cleave::agreement::ari;
///
/// // Same partition, swapped labels.
/// assert!((ari(&[0, 0, 1, 1], &[1, 1, 0, 0]) - 1.0).abs() < 1e-12);
/// ```
pub fn ari(left: &[usize], right: &[usize]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let k_left = left.iter().max().map_or(0, |&m| m + 1);
    let k_right = right.iter().max().map_or(0, |&m| m + 1);
    let mut joint = Array2::<usize>::zeros((k_left, k_right));
    for (&a, &b) in left.iter().zip(right.iter()) {
        joint[[a, b]] += 1;
    }

    let sum_comb_ij: f64 = joint.iter().map(|&c| comb2(c)).sum();
    let sum_comb_a: f64 = joint.rows().into_iter().map(|r| comb2(r.sum())).sum();
    let sum_comb_b: f64 = joint.columns().into_iter().map(|c| comb2(c.sum())).sum();
    let comb_n = comb2(left.len());

    if comb_n == 0.0 {
        return 1.0;
    }

    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        // Both partitions trivial (all singletons or a single block).
        return 1.0;
    }

    (sum_comb_ij - expected) / denom
}

fn comb2(n: usize) -> f64 {
    if n < 2 {
        0.0
    } else {
        (n * (n - 1) / 2) as f64
    }
}
