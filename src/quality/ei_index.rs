//! Krackhardt's EI-index.
//!
//! ```text
//! EI = (E − I) / (E + I)
//! ```
//!
//! with `E` the weight between actors in different clusters and `I` the weight
//! between distinct actors in the same cluster, over ordered pairs `i ≠ j`.
//! Ranges over `[−1, 1]`: −1 when all weight is internal, 1 when all of it
//! crosses cluster boundaries.

use crate::error::{Error, Result};
use ndarray::ArrayView2;

/// EI-index of `memberships` on `matrix`. Returns 0.0 when the matrix has no
/// off-diagonal weight.
pub fn ei_index(matrix: ArrayView2<'_, f64>, memberships: &[usize]) -> Result<f64> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(Error::ShapeMismatch {
            expected: "square matrix".to_string(),
            actual: format!("{rows}x{cols}"),
        });
    }
    if memberships.len() != rows {
        return Err(Error::DimensionMismatch {
            expected: rows,
            found: memberships.len(),
        });
    }

    let mut external = 0.0;
    let mut internal = 0.0;
    for ((i, j), &w) in matrix.indexed_iter() {
        if i == j {
            continue;
        }
        if memberships[i] == memberships[j] {
            internal += w;
        } else {
            external += w;
        }
    }

    let total = external + internal;
    if total == 0.0 {
        return Ok(0.0);
    }
    Ok((external - internal) / total)
}
