//! Quality functions for scoring a partition of a signed network pair.
//!
//! A polarized discourse has two signatures at once: actors who agree sit in
//! the same camp (dense **congruence** inside clusters) and actors who disagree
//! sit in opposite camps (dense **conflict** between clusters). Each quality
//! function turns a membership vector plus the two matrices into one scalar,
//! higher being more polarized.
//!
//! ## The three measures
//!
//! | Measure | Source | Fitness |
//! |---------|--------|---------|
//! | [`modularity`] | Newman & Girvan (2004) | `2 × (Q(C) − Q(F))` |
//! | [`ei_index`] | Krackhardt & Stern (1988) | `2 × (EI(F) − EI(C))` |
//! | [`absdiff`] | deviation from ideal polarization | `absdiff(C, F)` |
//!
//! **Modularity** rewards congruence inside clusters beyond what the degree
//! sequence predicts; subtracting the conflict modularity penalizes camps that
//! also fight internally.
//!
//! **EI-index** is `(external − internal) / (external + internal)`. Conflict
//! should be external (EI → 1) and congruence internal (EI → −1), so the
//! difference ranges over `[−4, 4]` after scaling.
//!
//! **Absdiff** builds the ideal picture for the current cluster sizes (all
//! congruence spread evenly inside clusters, all conflict spread evenly between
//! them) and measures how far the observed matrices are from it, normalized to
//! `[0, 1]`.
//!
//! ## Selecting a measure
//!
//! ```rust
//! use cleave::quality::QualityFunction;
//!
//! let q: QualityFunction = "eiIndex".parse().unwrap();
//! assert_eq!(q, QualityFunction::EiIndex);
//! assert!("shannon".parse::<QualityFunction>().is_err());
//! ```
//!
//! Every function validates its inputs and returns an [`Error`] for a
//! non-square matrix, a membership vector of the wrong length, `k == 0`, or an
//! out-of-range label. Those are contract violations by the caller, not
//! runtime conditions.

mod absdiff;
mod ei_index;
mod modularity;

pub use absdiff::absdiff;
pub use ei_index::ei_index;
pub use modularity::modularity;

use crate::error::{Error, Result};
use ndarray::ArrayView2;
use std::fmt;
use std::str::FromStr;

/// Which polarization measure drives selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum QualityFunction {
    /// Signed modularity difference, congruence minus conflict.
    Modularity,
    /// Krackhardt EI-index difference, conflict minus congruence.
    EiIndex,
    /// Absolute deviation from the ideal polarized structure.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "absdiff"))]
    AbsDiff,
}

impl QualityFunction {
    /// Score one membership vector.
    pub fn evaluate(
        &self,
        congruence: ArrayView2<'_, f64>,
        conflict: ArrayView2<'_, f64>,
        memberships: &[usize],
        k: usize,
    ) -> Result<f64> {
        if congruence.dim() != conflict.dim() {
            return Err(Error::ShapeMismatch {
                expected: format!("{:?}", congruence.dim()),
                actual: format!("{:?}", conflict.dim()),
            });
        }
        match self {
            QualityFunction::Modularity => {
                let qc = modularity(congruence, memberships, k)?;
                let qf = modularity(conflict, memberships, k)?;
                Ok(2.0 * (qc - qf))
            }
            QualityFunction::EiIndex => {
                check_partition(congruence, memberships, k)?;
                Ok(2.0 * (ei_index(conflict, memberships)? - ei_index(congruence, memberships)?))
            }
            QualityFunction::AbsDiff => absdiff(congruence, conflict, memberships, k),
        }
    }
}

impl fmt::Display for QualityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityFunction::Modularity => write!(f, "modularity"),
            QualityFunction::EiIndex => write!(f, "eiIndex"),
            QualityFunction::AbsDiff => write!(f, "absdiff"),
        }
    }
}

impl FromStr for QualityFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "modularity" => Ok(QualityFunction::Modularity),
            "eiIndex" | "eiindex" | "ei" => Ok(QualityFunction::EiIndex),
            "absdiff" | "absDiff" => Ok(QualityFunction::AbsDiff),
            other => Err(Error::UnknownName {
                kind: "quality function",
                name: other.to_string(),
            }),
        }
    }
}

/// Shared argument checks for all measures.
pub(crate) fn check_partition(
    matrix: ArrayView2<'_, f64>,
    memberships: &[usize],
    k: usize,
) -> Result<()> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(Error::ShapeMismatch {
            expected: "square matrix".to_string(),
            actual: format!("{rows}x{cols}"),
        });
    }
    if rows == 0 {
        return Err(Error::EmptyInput);
    }
    if memberships.len() != rows {
        return Err(Error::DimensionMismatch {
            expected: rows,
            found: memberships.len(),
        });
    }
    if k == 0 {
        return Err(Error::InvalidClusterCount {
            requested: 0,
            n_items: rows,
        });
    }
    if memberships.iter().any(|&m| m >= k) {
        return Err(Error::InvalidParameter {
            name: "memberships",
            message: "cluster label out of range",
        });
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_parse_and_display_round_trip() {
        for q in [
            QualityFunction::Modularity,
            QualityFunction::EiIndex,
            QualityFunction::AbsDiff,
        ] {
            assert_eq!(q.to_string().parse::<QualityFunction>().unwrap(), q);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "louvain".parse::<QualityFunction>().unwrap_err();
        assert!(matches!(err, Error::UnknownName { .. }));
    }

    #[test]
    fn test_all_measures_prefer_true_split() {
        let c = two_triads();
        let f = cross_conflict();
        let truth = [0, 0, 0, 1, 1, 1];
        let mixed = [0, 1, 0, 1, 0, 1];

        for q in [
            QualityFunction::Modularity,
            QualityFunction::EiIndex,
            QualityFunction::AbsDiff,
        ] {
            let good = q.evaluate(c.view(), f.view(), &truth, 2).unwrap();
            let bad = q.evaluate(c.view(), f.view(), &mixed, 2).unwrap();
            assert!(good > bad, "{q}: {good} <= {bad}");
        }
    }

    #[test]
    fn test_ei_fitness_single_cluster_is_zero() {
        // Everything internal in both networks: EI(F) = EI(C) = -1.
        let c = two_triads();
        let f = cross_conflict();
        let all_one = [0; 6];
        let q = QualityFunction::EiIndex
            .evaluate(c.view(), f.view(), &all_one, 2)
            .unwrap();
        assert_eq!(q, 0.0);
    }

    #[test]
    fn test_shape_mismatch_between_pair() {
        let c = Array2::<f64>::zeros((3, 3));
        let f = Array2::<f64>::zeros((4, 4));
        let r = QualityFunction::AbsDiff.evaluate(c.view(), f.view(), &[0, 1, 0], 2);
        assert!(matches!(r, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_check_partition_errors() {
        let m = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            check_partition(m.view(), &[0, 1], 2),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            check_partition(m.view(), &[0, 1, 0], 0),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            check_partition(m.view(), &[0, 1, 2], 2),
            Err(Error::InvalidParameter { .. })
        ));
        let rect = Array2::<f64>::zeros((2, 3));
        assert!(check_partition(rect.view(), &[0, 1], 2).is_err());
        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(check_partition(empty.view(), &[], 2), Err(Error::EmptyInput));
    }
}
