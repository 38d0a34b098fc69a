//! Moving-midpoint construction of congruence and conflict networks.

use super::config::SliceConfig;
use super::exporter::{NetworkExporter, NetworkKind, StatementBucket};
use super::statement::{Statement, VariableRef};
use crate::error::{Error, Result};
use crate::matrix::{normalize_jointly, SignedMatrix};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Congruence and conflict matrices, one pair per slice, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceNetworks {
    /// Congruence matrix per slice.
    pub congruence: Vec<SignedMatrix>,
    /// Conflict matrix per slice, aligned with `congruence`.
    pub conflict: Vec<SignedMatrix>,
}

impl SliceNetworks {
    /// Number of slices.
    pub fn len(&self) -> usize {
        self.congruence.len()
    }

    /// True when there are no slices.
    pub fn is_empty(&self) -> bool {
        self.congruence.is_empty()
    }

    /// Iterate over (congruence, conflict) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SignedMatrix, &SignedMatrix)> {
        self.congruence.iter().zip(&self.conflict)
    }
}

impl FromIterator<(SignedMatrix, SignedMatrix)> for SliceNetworks {
    fn from_iter<I: IntoIterator<Item = (SignedMatrix, SignedMatrix)>>(iter: I) -> Self {
        let (congruence, conflict) = iter.into_iter().unzip();
        Self {
            congruence,
            conflict,
        }
    }
}

/// Labels shared by every slice (Gaussian kernel only).
struct FixedLabels {
    rows: Vec<String>,
    columns: Vec<String>,
    qualifiers: Vec<String>,
}

/// Builds the slice sequence from an exporter's statements.
pub struct TimeSliceBuilder<'a, E: NetworkExporter + ?Sized> {
    exporter: &'a E,
    config: SliceConfig,
}

impl<'a, E: NetworkExporter + ?Sized> TimeSliceBuilder<'a, E> {
    /// Create a builder. The configuration is used as given; validate it
    /// first with [`SliceConfig::validated`].
    pub fn new(exporter: &'a E, config: SliceConfig) -> Self {
        Self { exporter, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// Time range `[b, e]`: the requested range intersected with the data.
    ///
    /// `None` when there are no statements or the two ranges do not overlap.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let statements = self.exporter.statements();
        let first = statements.iter().map(|s| s.time).min()?;
        let last = statements.iter().map(|s| s.time).max()?;
        let b = self.config.start.map_or(first, |s| s.max(first));
        let e = self.config.stop.map_or(last, |s| s.min(last));
        (b <= e).then_some((b, e))
    }

    /// Slice midpoints, one time unit apart.
    pub fn midpoints(&self) -> Vec<NaiveDateTime> {
        let Some((b, e)) = self.bounds() else {
            return Vec::new();
        };
        let unit = self.config.time_unit;
        let (first, last) = if self.config.indent {
            (self.window(b).1, self.window(e).0)
        } else {
            (b, e)
        };

        let mut out = Vec::new();
        let mut i = 0;
        while let Some(m) = unit.shift(first, i) {
            if m > last {
                break;
            }
            out.push(m);
            i += 1;
        }
        out
    }

    /// Build every slice.
    pub fn build(&self) -> Result<SliceNetworks> {
        let Some((b, e)) = self.bounds() else {
            tracing::debug!("no statements in range; no slices");
            return Ok(SliceNetworks::default());
        };
        let midpoints = self.midpoints();
        let fixed = (!self.config.kernel.is_compact()).then(|| self.fixed_labels(b, e));
        tracing::debug!(
            slices = midpoints.len(),
            kernel = %self.config.kernel,
            unit = %self.config.time_unit,
            "building time slices"
        );

        #[cfg(feature = "parallel")]
        let slices = midpoints
            .par_iter()
            .map(|&m| self.slice(m, (b, e), fixed.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let slices = midpoints
            .iter()
            .map(|&m| self.slice(m, (b, e), fixed.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(slices.into_iter().collect())
    }

    fn window(&self, middle: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        self.config.time_unit.window(middle, self.config.window)
    }

    /// Indices of the statements within `[lo, hi]`.
    fn select(&self, lo: NaiveDateTime, hi: NaiveDateTime) -> Range<usize> {
        let statements = self.exporter.statements();
        let from = statements.partition_point(|s| s.time < lo);
        let to = statements.partition_point(|s| s.time <= hi);
        from..to.max(from)
    }

    fn labels(&self, subset: &[&Statement], variable: Option<&VariableRef>) -> Vec<String> {
        match variable {
            Some(v) => self.exporter.extract_labels(subset, v),
            None => vec![String::new()],
        }
    }

    fn fixed_labels(&self, b: NaiveDateTime, e: NaiveDateTime) -> FixedLabels {
        let all = &self.exporter.statements()[self.select(b, e)];
        let refs: Vec<&Statement> = all.iter().collect();
        FixedLabels {
            rows: self.labels(&refs, Some(&self.config.variable1)),
            columns: self.labels(&refs, Some(&self.config.variable2)),
            qualifiers: self.labels(&refs, self.config.qualifier.as_ref()),
        }
    }

    fn slice(
        &self,
        middle: NaiveDateTime,
        (b, e): (NaiveDateTime, NaiveDateTime),
        fixed: Option<&FixedLabels>,
    ) -> Result<(SignedMatrix, SignedMatrix)> {
        let statements = self.exporter.statements();
        let (lo, hi) = self.window(middle);
        let (start, stop) = (lo.max(b), hi.min(e));

        let range = match fixed {
            Some(_) => self.select(b, e),
            None => self.select(start, stop),
        };
        let refs: Vec<&Statement> = statements[range.clone()].iter().collect();
        let (rows, columns, qualifiers) = match fixed {
            Some(f) => (f.rows.clone(), f.columns.clone(), f.qualifiers.clone()),
            None => (
                self.labels(&refs, Some(&self.config.variable1)),
                self.labels(&refs, Some(&self.config.variable2)),
                self.labels(&refs, self.config.qualifier.as_ref()),
            ),
        };

        let bucket = self.bucket(range, rows, columns, qualifiers);
        let template = SignedMatrix::zeros(bucket.rows().to_vec(), start, middle, stop);

        let mut congruence = self.compute(&template, &bucket, NetworkKind::Congruence)?;
        let mut conflict = self.compute(&template, &bucket, NetworkKind::Conflict)?;
        congruence.zero_diagonal();
        conflict.zero_diagonal();
        if self.config.normalize {
            normalize_jointly(&mut congruence, &mut conflict);
        }
        Ok((congruence, conflict))
    }

    fn bucket(
        &self,
        range: Range<usize>,
        rows: Vec<String>,
        columns: Vec<String>,
        qualifiers: Vec<String>,
    ) -> StatementBucket {
        let index = |labels: &[String]| -> HashMap<String, usize> {
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| (l.clone(), i))
                .collect()
        };
        let (row_index, column_index, qualifier_index) =
            (index(&rows), index(&columns), index(&qualifiers));
        let render = |s: &Statement, v: &VariableRef| {
            s.render(v, self.exporter.data_type(&v.name))
        };

        let mut bucket = StatementBucket::new(
            rows,
            columns,
            qualifiers,
            self.config.kernel,
            self.config.time_unit,
            self.config.time_unit.half_width(self.config.window),
        );
        let statements = self.exporter.statements();
        for idx in range {
            let s = &statements[idx];
            let q = match &self.config.qualifier {
                Some(v) => render(s, v),
                None => Some(String::new()),
            };
            let cell = (
                render(s, &self.config.variable1).and_then(|v| row_index.get(&v).copied()),
                render(s, &self.config.variable2).and_then(|v| column_index.get(&v).copied()),
                q.and_then(|v| qualifier_index.get(&v).copied()),
            );
            if let (Some(r), Some(c), Some(q)) = cell {
                bucket.insert(r, c, q, idx);
            }
        }
        bucket
    }

    fn compute(
        &self,
        template: &SignedMatrix,
        bucket: &StatementBucket,
        kind: NetworkKind,
    ) -> Result<SignedMatrix> {
        let out = self.exporter.compute_matrix(template.clone(), bucket, kind);
        if !out.same_labels(template) {
            return Err(Error::ShapeMismatch {
                expected: format!("{kind:?} matrix over {} slice labels", template.dim()),
                actual: format!("{} labels", out.dim()),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::joint_norm;
    use crate::slice::exporter::DefaultExporter;
    use crate::slice::statement::DataType;
    use crate::slice::time::{Kernel, TimeUnit};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn stmt(id: u64, d: u32, org: &str, concept: &str, agree: bool) -> Statement {
        Statement::new(id, day(d), "DNA Statement")
            .with_value("organization", org)
            .with_value("concept", concept)
            .with_value("agreement", agree)
    }

    fn exporter(statements: Vec<Statement>) -> DefaultExporter {
        DefaultExporter::builder(statements)
            .with_data_type("agreement", DataType::Boolean)
            .build()
    }

    fn daily() -> DefaultExporter {
        let orgs = ["A", "B", "C", "D", "E"];
        exporter(
            (1..=5)
                .map(|d| stmt(d as u64, d, orgs[d as usize - 1], "tax", d % 2 == 0))
                .collect(),
        )
    }

    fn two_day_windows(indent: bool) -> SliceConfig {
        SliceConfig::new()
            .with_window(TimeUnit::Days, 2)
            .with_indent(indent)
    }

    #[test]
    fn test_daily_windows_overlap_and_count() {
        let e = daily();
        let builder = TimeSliceBuilder::new(&e, two_day_windows(false));
        assert_eq!(builder.bounds(), Some((day(1), day(5))));
        assert_eq!(builder.midpoints().len(), 5);

        let indented = TimeSliceBuilder::new(&e, two_day_windows(true));
        assert_eq!(indented.midpoints(), vec![day(2), day(3), day(4)]);

        // Neighbouring windows share the statements between their midpoints.
        let ranges: Vec<_> = [2, 3, 4]
            .iter()
            .map(|&d| {
                let (lo, hi) = indented.window(day(d));
                indented.select(lo, hi)
            })
            .collect();
        assert_eq!(ranges, vec![0..3, 1..4, 2..5]);

        let networks = indented.build().unwrap();
        assert_eq!(networks.len(), 3);
        let (c, f) = networks.iter().next().unwrap();
        assert_eq!(c.labels(), ["A", "B", "C"]);
        assert_eq!((c.start(), c.middle(), c.stop()), (day(1), day(2), day(3)));
        // A and C agree on tax, B disagrees with both.
        assert_eq!(c.values()[[0, 2]], 1.0);
        assert_eq!(f.values()[[0, 1]], 1.0);
        assert_eq!(f.values()[[1, 2]], 1.0);
    }

    #[test]
    fn test_windows_clip_to_range() {
        let e = daily();
        let cfg = two_day_windows(false).with_range(Some(day(2)), Some(day(30)));
        let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
        assert_eq!(networks.len(), 4);
        let first = &networks.congruence[0];
        assert_eq!((first.start(), first.middle(), first.stop()), (day(2), day(2), day(3)));
        let last = &networks.conflict[3];
        assert_eq!((last.start(), last.stop()), (day(4), day(5)));
    }

    #[test]
    fn test_oversized_window_covers_whole_range() {
        let e = daily();
        for unit in [TimeUnit::Days, TimeUnit::Years] {
            let cfg = SliceConfig::new().with_window(unit, u32::MAX);
            let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
            assert!(!networks.is_empty(), "{unit}");
            let first = &networks.congruence[0];
            assert_eq!((first.start(), first.stop()), (day(1), day(5)), "{unit}");
            assert_eq!(first.labels(), ["A", "B", "C", "D", "E"]);
        }

        let cfg = SliceConfig::new()
            .with_window(TimeUnit::Years, u32::MAX)
            .with_indent(true);
        assert!(TimeSliceBuilder::new(&e, cfg).build().unwrap().is_empty());
    }

    #[test]
    fn test_empty_inputs_give_no_slices() {
        let e = exporter(Vec::new());
        assert!(TimeSliceBuilder::new(&e, SliceConfig::new())
            .build()
            .unwrap()
            .is_empty());

        let e = daily();
        let cfg = SliceConfig::new().with_range(Some(day(20)), None);
        assert!(TimeSliceBuilder::new(&e, cfg).build().unwrap().is_empty());

        // A window wider than the range leaves nothing after indenting.
        let cfg = SliceConfig::new().with_window(TimeUnit::Days, 30).with_indent(true);
        assert!(TimeSliceBuilder::new(&e, cfg).build().unwrap().is_empty());
    }

    #[test]
    fn test_gaussian_labels_fixed_across_slices() {
        let e = exporter(vec![
            stmt(1, 1, "A", "tax", true),
            stmt(2, 1, "B", "tax", false),
            stmt(3, 10, "C", "wind", true),
            stmt(4, 10, "D", "wind", true),
        ]);
        let cfg = SliceConfig::new()
            .with_window(TimeUnit::Days, 2)
            .with_kernel(Kernel::Gaussian);
        let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
        assert_eq!(networks.len(), 10);
        for (c, f) in networks.iter() {
            assert_eq!(c.labels(), ["A", "B", "C", "D"]);
            assert!(c.same_labels(f));
        }
        // Early slices weigh the early conflict more than the late agreement.
        let early = &networks.conflict[0];
        let late = &networks.congruence[9];
        assert!(early.values()[[0, 1]] > 0.9);
        assert!(late.values()[[2, 3]] > 0.9);
        assert!(networks.congruence[0].values()[[2, 3]] < 1e-6);
    }

    #[test]
    fn test_compact_labels_follow_window() {
        let e = exporter(vec![
            stmt(1, 1, "A", "tax", true),
            stmt(2, 1, "B", "tax", false),
            stmt(3, 10, "C", "wind", true),
        ]);
        let cfg = SliceConfig::new()
            .with_window(TimeUnit::Days, 2)
            .with_kernel(Kernel::Epanechnikov);
        let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
        assert_eq!(networks.congruence[0].labels(), ["A", "B"]);
        assert_eq!(networks.congruence[9].labels(), ["C"]);
        assert_eq!(networks.congruence[5].dim(), 0);
    }

    #[test]
    fn test_without_qualifier_everything_is_congruence() {
        let e = daily();
        let cfg = two_day_windows(true).with_qualifier(None);
        let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
        for (c, f) in networks.iter() {
            assert!(f.is_zero());
            assert!(!c.is_zero());
        }
    }

    #[test]
    fn test_joint_normalization() {
        let e = daily();
        let cfg = two_day_windows(false).with_normalize(true);
        let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
        for (c, f) in networks.iter() {
            let norm = joint_norm(c, f);
            assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-12, "{norm}");
        }
    }

    struct Relabelling(DefaultExporter);

    impl NetworkExporter for Relabelling {
        fn statements(&self) -> &[Statement] {
            self.0.statements()
        }

        fn extract_labels(&self, subset: &[&Statement], variable: &VariableRef) -> Vec<String> {
            self.0.extract_labels(subset, variable)
        }

        fn data_type(&self, variable: &str) -> DataType {
            self.0.data_type(variable)
        }

        fn compute_matrix(
            &self,
            template: SignedMatrix,
            _bucket: &StatementBucket,
            _kind: NetworkKind,
        ) -> SignedMatrix {
            let labels = (0..=template.dim()).map(|i| format!("x{i}")).collect();
            SignedMatrix::zeros(labels, template.start(), template.middle(), template.stop())
        }
    }

    #[test]
    fn test_exporter_contract_violation_is_fatal() {
        let e = Relabelling(daily());
        let r = TimeSliceBuilder::new(&e, two_day_windows(false)).build();
        assert!(matches!(r, Err(Error::ShapeMismatch { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_diagonal_is_zero(
            raw in proptest::collection::vec((1u32..28, 0usize..4, 0usize..3, any::<bool>()), 1..40),
            window in 1u32..6,
            gaussian in any::<bool>(),
        ) {
            let statements = raw
                .iter()
                .enumerate()
                .map(|(i, &(d, a, c, agree))| {
                    stmt(i as u64, d, &format!("actor{a}"), &format!("concept{c}"), agree)
                })
                .collect();
            let e = exporter(statements);
            let kernel = if gaussian { Kernel::Gaussian } else { Kernel::Uniform };
            let cfg = SliceConfig::new()
                .with_window(TimeUnit::Days, window)
                .with_kernel(kernel);
            let networks = TimeSliceBuilder::new(&e, cfg).build().unwrap();
            prop_assert!(!networks.is_empty());
            for (c, f) in networks.iter() {
                prop_assert!(c.values().diag().iter().all(|&v| v == 0.0));
                prop_assert!(f.values().diag().iter().all(|&v| v == 0.0));
                prop_assert!(c.same_labels(f));
            }
        }
    }
}
