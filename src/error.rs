use core::fmt;

/// Result alias for `cleave`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned when the engine is handed structurally invalid input.
///
/// Configuration problems never surface here: they are repaired with defaults
/// and reported through a [`DiagnosticSink`](crate::diagnostics::DiagnosticSink).
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Length or dimension mismatch.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Shape mismatch (string description).
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A named option (quality function, kernel, time unit, data type) was not recognized.
    UnknownName {
        /// What kind of name was being parsed.
        kind: &'static str,
        /// The offending input.
        name: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::UnknownName { kind, name } => write!(f, "unknown {kind} '{name}'"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
