//! Absolute deviation from the ideal polarized structure.
//!
//! For the current cluster sizes `s_c`, the ideal pair of networks spreads all
//! congruence evenly over the ordered within-cluster dyads and all conflict
//! evenly over the between-cluster dyads:
//!
//! ```text
//! W   = Σ_c s_c (s_c − 1)            within dyads (ordered, i ≠ j)
//! B   = N (N − 1) − W                between dyads
//! e_C = ‖C‖₁ / W                     expected congruence inside
//! e_F = ‖F‖₁ / B                     expected conflict across
//!
//! D = Σ_within  |C_ij − e_C| + Σ_between |C_ij|
//!   + Σ_between |F_ij − e_F| + Σ_within  |F_ij|
//!
//! quality = 1 − D / (2 (‖C‖₁ + ‖F‖₁))
//! ```
//!
//! Since `Σ |x − e| ≤ ‖x‖₁ + Σ e`, `D` never exceeds `2 (‖C‖₁ + ‖F‖₁)` and the
//! quality lies in `[0, 1]`, which keeps it usable as a roulette weight.

use super::check_partition;
use crate::error::Result;
use ndarray::ArrayView2;

/// Absdiff quality of `memberships` on a congruence/conflict pair.
///
/// Returns 0.0 when both matrices are empty.
pub fn absdiff(
    congruence: ArrayView2<'_, f64>,
    conflict: ArrayView2<'_, f64>,
    memberships: &[usize],
    k: usize,
) -> Result<f64> {
    check_partition(congruence, memberships, k)?;
    check_partition(conflict, memberships, k)?;
    let n = memberships.len();

    let norm_c: f64 = off_diagonal_norm(congruence);
    let norm_f: f64 = off_diagonal_norm(conflict);
    if norm_c + norm_f == 0.0 {
        return Ok(0.0);
    }

    let mut sizes = vec![0usize; k];
    for &m in memberships {
        sizes[m] += 1;
    }
    let within: usize = sizes.iter().map(|&s| s * s.saturating_sub(1)).sum();
    let between = n * (n - 1) - within;

    let expected_c = if within > 0 { norm_c / within as f64 } else { 0.0 };
    let expected_f = if between > 0 { norm_f / between as f64 } else { 0.0 };

    let mut deviation = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let c = congruence[[i, j]];
            let f = conflict[[i, j]];
            if memberships[i] == memberships[j] {
                deviation += (c - expected_c).abs() + f.abs();
            } else {
                deviation += c.abs() + (f - expected_f).abs();
            }
        }
    }

    Ok(1.0 - deviation / (2.0 * (norm_c + norm_f)))
}

fn off_diagonal_norm(matrix: ArrayView2<'_, f64>) -> f64 {
    matrix
        .indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, v)| v.abs())
        .sum()
}
