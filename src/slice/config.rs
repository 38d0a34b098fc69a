//! Parameters of time-slice network construction.

use super::statement::VariableRef;
use super::time::{Kernel, TimeUnit};
use crate::diagnostics::DiagnosticSink;
use chrono::NaiveDateTime;

/// What to slice, and how.
///
/// Fields are public so configurations can be deserialized directly; call
/// [`SliceConfig::validated`] before use.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SliceConfig {
    /// Row variable; its values become the actors.
    pub variable1: VariableRef,
    /// Column variable, usually concepts.
    pub variable2: VariableRef,
    /// Qualifier separating agreement from disagreement, if any.
    pub qualifier: Option<VariableRef>,
    /// Earliest time to consider; defaults to the first statement.
    pub start: Option<NaiveDateTime>,
    /// Latest time to consider; defaults to the last statement.
    pub stop: Option<NaiveDateTime>,
    /// Step of the moving midpoint.
    pub time_unit: TimeUnit,
    /// Window width in time units.
    pub window: u32,
    /// Statement weighting around the midpoint.
    pub kernel: Kernel,
    /// Keep midpoints half a window away from both ends of the range.
    pub indent: bool,
    /// Divide both matrices of a slice by their joint 1-norm.
    pub normalize: bool,
}

impl SliceConfig {
    /// Default window width.
    pub const DEFAULT_WINDOW: u32 = 100;

    /// Configuration with all defaults: organizations by concepts, qualified
    /// by agreement, 100-day uniform windows.
    pub fn new() -> Self {
        Self {
            variable1: VariableRef::statement("organization"),
            variable2: VariableRef::statement("concept"),
            qualifier: Some(VariableRef::statement("agreement")),
            start: None,
            stop: None,
            time_unit: TimeUnit::default(),
            window: Self::DEFAULT_WINDOW,
            kernel: Kernel::default(),
            indent: false,
            normalize: false,
        }
    }

    /// Set the row and column variables.
    pub fn with_variables(mut self, variable1: VariableRef, variable2: VariableRef) -> Self {
        self.variable1 = variable1;
        self.variable2 = variable2;
        self
    }

    /// Set or clear the qualifier.
    pub fn with_qualifier(mut self, qualifier: Option<VariableRef>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Restrict the time range.
    pub fn with_range(mut self, start: Option<NaiveDateTime>, stop: Option<NaiveDateTime>) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    /// Set the window as `width` units of `unit`.
    pub fn with_window(mut self, unit: TimeUnit, width: u32) -> Self {
        self.time_unit = unit;
        self.window = width;
        self
    }

    /// Set the kernel.
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Enable or disable indenting.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Enable or disable joint normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Replace invalid values with defaults, warning about each one.
    pub fn validated(mut self, sink: &dyn DiagnosticSink) -> Self {
        if self.window == 0 {
            sink.warn(
                "window must be positive",
                Some(format!("using {}", Self::DEFAULT_WINDOW)),
            );
            self.window = Self::DEFAULT_WINDOW;
        }
        if let (Some(start), Some(stop)) = (self.start, self.stop) {
            if start > stop {
                sink.warn(
                    "start date is after stop date",
                    Some(format!("{start} > {stop}; using the full data range")),
                );
                self.start = None;
                self.stop = None;
            }
        }
        if self.variable1 == self.variable2 {
            sink.warn(
                "row and column variables are identical",
                Some(format!("both are {:?}", self.variable1.name)),
            );
        }
        self
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self::new()
    }
}
