//! Per-slice results and the time series that collects them.
//!
//! A [`PolarizationResult`] records what the genetic algorithm found for one
//! time slice: the best partition, the per-generation quality trajectories, and
//! whether the run stopped early. [`PolarizationResultTimeSeries`] keeps the
//! slices in time order and exposes column-oriented accessors for export.
//! Trajectory and membership lengths vary by slice, so those columns are
//! ragged (`Vec<Vec<_>>`); dates come out as a dense `Array2<i32>`.

use crate::agreement::ari;
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use ndarray::Array2;
use std::collections::HashMap;

/// Outcome of the genetic algorithm on one time slice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PolarizationResult {
    max_q: Vec<f64>,
    avg_q: Vec<f64>,
    sd_q: Vec<f64>,
    final_max_q: f64,
    memberships: Vec<usize>,
    names: Vec<String>,
    early_convergence: bool,
    start: NaiveDateTime,
    middle: NaiveDateTime,
    stop: NaiveDateTime,
}

impl PolarizationResult {
    /// Build a result, checking that the trajectories have equal length and
    /// that there is one name per membership entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_q: Vec<f64>,
        avg_q: Vec<f64>,
        sd_q: Vec<f64>,
        final_max_q: f64,
        memberships: Vec<usize>,
        names: Vec<String>,
        early_convergence: bool,
        start: NaiveDateTime,
        middle: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> Result<Self> {
        for len in [avg_q.len(), sd_q.len()] {
            if len != max_q.len() {
                return Err(Error::DimensionMismatch {
                    expected: max_q.len(),
                    found: len,
                });
            }
        }
        if memberships.len() != names.len() {
            return Err(Error::DimensionMismatch {
                expected: names.len(),
                found: memberships.len(),
            });
        }
        Ok(Self {
            max_q,
            avg_q,
            sd_q,
            final_max_q,
            memberships,
            names,
            early_convergence,
            start,
            middle,
            stop,
        })
    }

    /// Trivial result for a slice without usable network: one zero-quality
    /// generation, no memberships, flagged as converged.
    pub fn degenerate(start: NaiveDateTime, middle: NaiveDateTime, stop: NaiveDateTime) -> Self {
        Self {
            max_q: vec![0.0],
            avg_q: vec![0.0],
            sd_q: vec![0.0],
            final_max_q: 0.0,
            memberships: Vec::new(),
            names: Vec::new(),
            early_convergence: true,
            start,
            middle,
            stop,
        }
    }

    /// Best quality per executed generation.
    pub fn max_q(&self) -> &[f64] {
        &self.max_q
    }

    /// Mean quality per executed generation.
    pub fn avg_q(&self) -> &[f64] {
        &self.avg_q
    }

    /// Standard deviation of quality per executed generation.
    pub fn sd_q(&self) -> &[f64] {
        &self.sd_q
    }

    /// Quality of the best member of the final population.
    pub fn final_max_q(&self) -> f64 {
        self.final_max_q
    }

    /// Cluster label of each actor in the best partition.
    pub fn memberships(&self) -> &[usize] {
        &self.memberships
    }

    /// Actor labels, aligned with [`memberships`](Self::memberships).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when the run stopped before the iteration cap.
    pub fn early_convergence(&self) -> bool {
        self.early_convergence
    }

    /// Number of generations recorded.
    pub fn generations(&self) -> usize {
        self.max_q.len()
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

    /// Actor-to-cluster map.
    pub fn clusters_by_name(&self) -> HashMap<&str, usize> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.memberships.iter().copied())
            .collect()
    }
}

/// Time-ordered collection of slice results.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolarizationResultTimeSeries {
    results: Vec<PolarizationResult>,
}

impl PolarizationResultTimeSeries {
    /// Wrap results that are already in time order.
    pub fn new(results: Vec<PolarizationResult>) -> Self {
        Self { results }
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when there are no slices.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for slice `i`.
    pub fn get(&self, i: usize) -> Option<&PolarizationResult> {
        self.results.get(i)
    }

    /// Iterate over slices in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, PolarizationResult> {
        self.results.iter()
    }

    /// All slice results.
    pub fn results(&self) -> &[PolarizationResult] {
        &self.results
    }

    /// Final best quality per slice.
    pub fn final_max_q(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.final_max_q).collect()
    }

    /// Early-convergence flag per slice.
    pub fn early_convergence(&self) -> Vec<bool> {
        self.results.iter().map(|r| r.early_convergence).collect()
    }

    /// Date breakdown, one row per slice.
    ///
    /// Columns are year, month, day, hour, minute, second of the start, then
    /// of the middle, then of the stop (18 columns).
    pub fn date_parts(&self) -> Array2<i32> {
        let mut out = Array2::zeros((self.results.len(), 18));
        for (row, r) in self.results.iter().enumerate() {
            for (block, t) in [r.start, r.middle, r.stop].into_iter().enumerate() {
                let parts = [
                    t.year(),
                    t.month() as i32,
                    t.day() as i32,
                    t.hour() as i32,
                    t.minute() as i32,
                    t.second() as i32,
                ];
                for (col, v) in parts.into_iter().enumerate() {
                    out[[row, block * 6 + col]] = v;
                }
            }
        }
        out
    }

    /// Max-quality trajectory per slice.
    pub fn max_q(&self) -> Vec<Vec<f64>> {
        self.results.iter().map(|r| r.max_q.clone()).collect()
    }

    /// Mean-quality trajectory per slice.
    pub fn avg_q(&self) -> Vec<Vec<f64>> {
        self.results.iter().map(|r| r.avg_q.clone()).collect()
    }

    /// Quality standard deviation trajectory per slice.
    pub fn sd_q(&self) -> Vec<Vec<f64>> {
        self.results.iter().map(|r| r.sd_q.clone()).collect()
    }

    /// Best memberships per slice.
    pub fn memberships(&self) -> Vec<Vec<usize>> {
        self.results.iter().map(|r| r.memberships.clone()).collect()
    }

    /// Actor labels per slice.
    pub fn names(&self) -> Vec<Vec<String>> {
        self.results.iter().map(|r| r.names.clone()).collect()
    }

    /// Adjusted Rand index between each slice's partition and the previous
    /// slice's, over the actors present in both.
    ///
    /// One entry per consecutive pair (`len() - 1` entries). NaN when the two
    /// slices share fewer than two actors.
    pub fn membership_stability(&self) -> Vec<f64> {
        self.results
            .windows(2)
            .map(|pair| {
                let previous = pair[0].clusters_by_name();
                let mut left = Vec::new();
                let mut right = Vec::new();
                for (name, &m) in pair[1].names.iter().zip(&pair[1].memberships) {
                    if let Some(&p) = previous.get(name.as_str()) {
                        left.push(p);
                        right.push(m);
                    }
                }
                if left.len() < 2 {
                    f64::NAN
                } else {
                    ari(&left, &right)
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a PolarizationResultTimeSeries {
    type Item = &'a PolarizationResult;
    type IntoIter = std::slice::Iter<'a, PolarizationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
