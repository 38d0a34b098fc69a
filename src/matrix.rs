//! Labelled square matrices for one time slice.
//!
//! A [`SignedMatrix`] holds congruence or conflict weights between actors. Row
//! labels and column labels are the same list, the diagonal is zero once the
//! slice builder has handed the matrix over, and each matrix carries the
//! start/middle/stop bounds of the slice it belongs to.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use ndarray::{Array2, ArrayView2};

/// Square weight matrix indexed by actor labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedMatrix {
    labels: Vec<String>,
    values: Array2<f64>,
    start: NaiveDateTime,
    middle: NaiveDateTime,
    stop: NaiveDateTime,
}

impl SignedMatrix {
    /// Wrap an existing matrix.
    ///
    /// Fails with [`Error::ShapeMismatch`] if `values` is not square or the
    /// label count differs from its dimension.
    pub fn new(
        labels: Vec<String>,
        values: Array2<f64>,
        start: NaiveDateTime,
        middle: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows != cols || labels.len() != rows {
            return Err(Error::ShapeMismatch {
                expected: format!("{n}x{n} matrix for {n} labels", n = labels.len()),
                actual: format!("{rows}x{cols}"),
            });
        }
        Ok(Self {
            labels,
            values,
            start,
            middle,
            stop,
        })
    }

    /// Empty (all-zero) matrix over `labels`.
    pub fn zeros(
        labels: Vec<String>,
        start: NaiveDateTime,
        middle: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> Self {
        let n = labels.len();
        Self {
            labels,
            values: Array2::zeros((n, n)),
            start,
            middle,
            stop,
        }
    }

    /// Copy of this matrix's labels and bounds with all weights set to zero.
    pub fn empty_like(&self) -> Self {
        Self::zeros(self.labels.clone(), self.start, self.middle, self.stop)
    }

    /// Number of actors.
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    /// Actor labels (rows and columns).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Read-only view of the weights.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Mutable access to the weights.
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    /// Start of the slice window.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Midpoint of the slice.
    pub fn middle(&self) -> NaiveDateTime {
        self.middle
    }

    /// End of the slice window.
    pub fn stop(&self) -> NaiveDateTime {
        self.stop
    }

    /// Set every diagonal cell to zero.
    pub fn zero_diagonal(&mut self) {
        self.values.diag_mut().fill(0.0);
    }

    /// Entrywise 1-norm, `Σ |a_ij|`.
    pub fn one_norm(&self) -> f64 {
        self.values.iter().map(|v| v.abs()).sum()
    }

    /// True when every weight is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Multiply every cell by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.values.mapv_inplace(|v| v * factor);
    }

    /// True when `other` has the same labels (in the same order).
    pub fn same_labels(&self, other: &SignedMatrix) -> bool {
        self.labels == other.labels
    }
}

/// Sum of the entrywise 1-norms of a congruence/conflict pair.
pub fn joint_norm(congruence: &SignedMatrix, conflict: &SignedMatrix) -> f64 {
    congruence.one_norm() + conflict.one_norm()
}

/// Divide both matrices by their joint norm.
///
/// Returns `false` (and leaves both untouched) when the joint norm is zero.
pub fn normalize_jointly(congruence: &mut SignedMatrix, conflict: &mut SignedMatrix) -> bool {
    let norm = joint_norm(congruence, conflict);
    if norm == 0.0 {
        return false;
    }
    congruence.scale(1.0 / norm);
    conflict.scale(1.0 / norm);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ndarray::array;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("a{i}")).collect()
    }

    #[test]
    fn test_new_rejects_non_square() {
        let values = Array2::zeros((2, 3));
        let err = SignedMatrix::new(labels(2), values, t0(), t0(), t0()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_label_mismatch() {
        let values = Array2::zeros((3, 3));
        assert!(SignedMatrix::new(labels(2), values, t0(), t0(), t0()).is_err());
    }

    #[test]
    fn test_zero_diagonal_and_norm() {
        let values = array![[5.0, 1.0, -2.0], [1.0, 3.0, 0.5], [-2.0, 0.5, 1.0]];
        let mut m = SignedMatrix::new(labels(3), values, t0(), t0(), t0()).unwrap();
        m.zero_diagonal();
        assert!(m.values().diag().iter().all(|&v| v == 0.0));
        assert!((m.one_norm() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_jointly() {
        let mut c = SignedMatrix::new(
            labels(2),
            array![[0.0, 3.0], [3.0, 0.0]],
            t0(),
            t0(),
            t0(),
        )
        .unwrap();
        let mut f = SignedMatrix::new(
            labels(2),
            array![[0.0, 1.0], [1.0, 0.0]],
            t0(),
            t0(),
            t0(),
        )
        .unwrap();
        assert!(normalize_jointly(&mut c, &mut f));
        assert!((joint_norm(&c, &f) - 1.0).abs() < 1e-12);
        assert!((c.values()[[0, 1]] - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_jointly_skips_zero() {
        let mut c = SignedMatrix::zeros(labels(3), t0(), t0(), t0());
        let mut f = c.empty_like();
        assert!(!normalize_jointly(&mut c, &mut f));
        assert!(c.is_zero() && f.is_zero());
    }
}
