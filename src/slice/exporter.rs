//! Boundary to the network exporter, plus an in-memory reference exporter.
//!
//! The slice builder owns time handling: it picks midpoints, selects and
//! buckets statements, and checks what comes back. Everything about *which*
//! statements count and how they turn into weights sits behind
//! [`NetworkExporter`].
//!
//! [`DefaultExporter`] is a complete exporter over a statement list. With
//! `X_icq` the (kernel-weighted) evidence that actor `i` used qualifier level
//! `q` on concept `c`:
//!
//! ```text
//! congruence  C_ij = Σ_c Σ_q      X_icq · X_jcq
//! conflict    F_ij = Σ_c Σ_{q≠q'} X_icq · X_jcq'
//!                  = Σ_c (Σ_q X_icq)(Σ_q X_jcq) − C_ij
//! ```

use super::statement::{DataType, Statement, VariableRef};
use super::time::{Kernel, TimeUnit};
use crate::matrix::SignedMatrix;
use chrono::NaiveDateTime;
use ndarray::{s, Array2, Array3, Axis};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Which of the two networks of a slice to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    /// Agreement between actors.
    Congruence,
    /// Disagreement between actors.
    Conflict,
}

/// Source of statements and of signed network weights.
///
/// Implementations must be `Sync`: slices are built concurrently.
pub trait NetworkExporter: Sync {
    /// All statements of the run, filtered and sorted by time.
    fn statements(&self) -> &[Statement];

    /// Sorted, distinct, non-empty values of `variable` over `subset`.
    fn extract_labels(&self, subset: &[&Statement], variable: &VariableRef) -> Vec<String>;

    /// Declared data type of a variable.
    fn data_type(&self, variable: &str) -> DataType;

    /// Fill `template` (labels and bounds already set) with weights from the
    /// bucketed statements. The diagonal is left to the caller.
    fn compute_matrix(
        &self,
        template: SignedMatrix,
        bucket: &StatementBucket,
        kind: NetworkKind,
    ) -> SignedMatrix;
}

/// Statements of one slice, indexed by (row label, column label, qualifier
/// level).
///
/// Cells hold indices into [`NetworkExporter::statements`].
#[derive(Debug, Clone)]
pub struct StatementBucket {
    rows: Vec<String>,
    columns: Vec<String>,
    qualifiers: Vec<String>,
    cells: Array3<Vec<usize>>,
    kernel: Kernel,
    time_unit: TimeUnit,
    half_width: f64,
}

impl StatementBucket {
    /// Empty bucket over the given label sets.
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        qualifiers: Vec<String>,
        kernel: Kernel,
        time_unit: TimeUnit,
        half_width: f64,
    ) -> Self {
        let cells = Array3::default((rows.len(), columns.len(), qualifiers.len()));
        Self {
            rows,
            columns,
            qualifiers,
            cells,
            kernel,
            time_unit,
            half_width,
        }
    }

    /// Add statement `index` to a cell.
    pub fn insert(&mut self, row: usize, column: usize, qualifier: usize, index: usize) {
        if let Some(cell) = self.cells.get_mut([row, column, qualifier]) {
            cell.push(index);
        }
    }

    /// Row labels (variable 1).
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column labels (variable 2).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Qualifier levels; a single `""` level when no qualifier is set.
    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    /// Statement indices in one cell (empty when out of range).
    pub fn cell(&self, row: usize, column: usize, qualifier: usize) -> &[usize] {
        self.cells
            .get([row, column, qualifier])
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Kernel used for this slice.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Kernel weight of a statement relative to the slice midpoint.
    pub fn weight(&self, statement: &Statement, middle: NaiveDateTime) -> f64 {
        let distance = self.time_unit.distance(middle, statement.time);
        self.kernel.weight(distance, self.half_width)
    }
}

/// How repeated statements by the same actor on the same concept and
/// qualifier level count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Duplicates {
    /// Every statement adds its weight.
    #[default]
    Include,
    /// Only the strongest statement counts.
    Ignore,
}

/// In-memory exporter over a statement list.
#[derive(Debug, Clone)]
pub struct DefaultExporter {
    statements: Vec<Statement>,
    data_types: HashMap<String, DataType>,
    duplicates: Duplicates,
}

impl DefaultExporter {
    /// Exporter over all statements with default settings.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self::builder(statements).build()
    }

    /// Start configuring filters and data types.
    pub fn builder(statements: Vec<Statement>) -> DefaultExporterBuilder {
        DefaultExporterBuilder {
            statements,
            statement_type: None,
            data_types: HashMap::new(),
            duplicates: Duplicates::default(),
            exclusions: BTreeMap::new(),
            inverted: BTreeSet::new(),
        }
    }

    /// Duplicate policy in use.
    pub fn duplicates(&self) -> Duplicates {
        self.duplicates
    }

    fn evidence(&self, bucket: &StatementBucket, middle: NaiveDateTime) -> Array3<f64> {
        let shape = (
            bucket.rows().len(),
            bucket.columns().len(),
            bucket.qualifiers().len(),
        );
        Array3::from_shape_fn(shape, |(i, c, q)| {
            let weights = bucket
                .cell(i, c, q)
                .iter()
                .filter_map(|&idx| self.statements.get(idx))
                .map(|s| bucket.weight(s, middle));
            match self.duplicates {
                Duplicates::Include => weights.sum(),
                Duplicates::Ignore => weights.fold(0.0, f64::max),
            }
        })
    }
}

impl NetworkExporter for DefaultExporter {
    fn statements(&self) -> &[Statement] {
        &self.statements
    }

    fn extract_labels(&self, subset: &[&Statement], variable: &VariableRef) -> Vec<String> {
        let data_type = self.data_type(&variable.name);
        subset
            .iter()
            .filter_map(|s| s.render(variable, data_type))
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn data_type(&self, variable: &str) -> DataType {
        self.data_types.get(variable).copied().unwrap_or_default()
    }

    fn compute_matrix(
        &self,
        mut template: SignedMatrix,
        bucket: &StatementBucket,
        kind: NetworkKind,
    ) -> SignedMatrix {
        let n = bucket.rows().len();
        if template.dim() != n {
            tracing::warn!(
                template = template.dim(),
                bucket = n,
                "bucket rows do not match matrix labels"
            );
            return template;
        }

        let x = self.evidence(bucket, template.middle());
        let mut out = Array2::<f64>::zeros((n, n));
        for c in 0..bucket.columns().len() {
            let levels = x.slice(s![.., c, ..]);
            let same = levels.dot(&levels.t());
            match kind {
                NetworkKind::Congruence => out += &same,
                NetworkKind::Conflict => {
                    let total = levels.sum_axis(Axis(1));
                    let column = total.view().insert_axis(Axis(1));
                    let row = total.view().insert_axis(Axis(0));
                    out += &(column.dot(&row) - &same);
                }
            }
        }
        template.values_mut().assign(&out);
        template
    }
}

/// Builder for [`DefaultExporter`]. Filters apply once, in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DefaultExporterBuilder {
    statements: Vec<Statement>,
    statement_type: Option<String>,
    data_types: HashMap<String, DataType>,
    duplicates: Duplicates,
    exclusions: BTreeMap<VariableRef, BTreeSet<String>>,
    inverted: BTreeSet<VariableRef>,
}

impl DefaultExporterBuilder {
    /// Keep only statements of this type.
    pub fn with_statement_type(mut self, statement_type: impl Into<String>) -> Self {
        self.statement_type = Some(statement_type.into());
        self
    }

    /// Declare the data type of a statement variable.
    pub fn with_data_type(mut self, variable: impl Into<String>, data_type: DataType) -> Self {
        self.data_types.insert(variable.into(), data_type);
        self
    }

    /// Set the duplicate policy.
    pub fn with_duplicates(mut self, duplicates: Duplicates) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Drop statements whose `variable` renders to one of `values`.
    pub fn with_exclusion<I, S>(mut self, variable: VariableRef, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions
            .entry(variable)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Treat the exclusion list of `variable` as an inclusion list instead.
    pub fn with_inverted(mut self, variable: VariableRef) -> Self {
        self.inverted.insert(variable);
        self
    }

    /// Apply filters and sort by time, then id.
    pub fn build(self) -> DefaultExporter {
        let Self {
            statements,
            statement_type,
            data_types,
            duplicates,
            exclusions,
            inverted,
        } = self;
        let total = statements.len();

        let keep = |s: &Statement| {
            if let Some(t) = &statement_type {
                if &s.statement_type != t {
                    return false;
                }
            }
            exclusions.iter().all(|(variable, values)| {
                let data_type = data_types.get(&variable.name).copied().unwrap_or_default();
                let listed = s
                    .render(variable, data_type)
                    .is_some_and(|v| values.contains(&v));
                listed == inverted.contains(variable)
            })
        };
        let mut statements: Vec<Statement> = statements.into_iter().filter(|s| keep(s)).collect();
        statements.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));

        tracing::debug!(kept = statements.len(), total, "statements filtered");
        DefaultExporter {
            statements,
            data_types,
            duplicates,
        }
    }
}
