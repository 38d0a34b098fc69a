//! Weighted Newman modularity of a fixed partition.
//!
//! ```text
//! Q = (1/2m) × Σ_{i,j} [A_ij − k_i k_j / 2m] × δ(c_i, c_j)
//! ```
//!
//! The sum runs over all ordered pairs including `i == j`. `k_i` averages the
//! row and column sums (identical for a symmetric matrix) and `2m` is the total
//! weight of the matrix.

use super::check_partition;
use crate::error::Result;
use ndarray::ArrayView2;

/// Modularity of `memberships` on `matrix`.
///
/// Returns 0.0 for a matrix without weight.
pub fn modularity(matrix: ArrayView2<'_, f64>, memberships: &[usize], k: usize) -> Result<f64> {
    check_partition(matrix, memberships, k)?;
    let n = memberships.len();

    let two_m: f64 = matrix.sum();
    if two_m == 0.0 {
        return Ok(0.0);
    }

    let degrees: Vec<f64> = (0..n)
        .map(|i| (matrix.row(i).sum() + matrix.column(i).sum()) / 2.0)
        .collect();

    // Σ_{same cluster} A_ij, and Σ_c (Σ_{i∈c} k_i)² for the null-model term.
    let mut internal = 0.0;
    let mut cluster_degree = vec![0.0; k];
    for i in 0..n {
        cluster_degree[memberships[i]] += degrees[i];
        for j in 0..n {
            if memberships[i] == memberships[j] {
                internal += matrix[[i, j]];
            }
        }
    }
    let expected: f64 = cluster_degree.iter().map(|d| d * d).sum::<f64>() / two_m;

    Ok((internal - expected) / two_m)
}
