//! # cleave
//!
//! Polarization detection in time-sliced signed discourse networks.
//!
//! Coded statements (actor X agrees or disagrees with concept Y at time t) are
//! cut into overlapping time slices. Each slice becomes a pair of actor ×
//! actor matrices, congruence and conflict, and a genetic algorithm searches
//! for the partition of actors into K camps that is most polarized under the
//! chosen quality function. The output is a time series of best partitions
//! with convergence diagnostics.
//!
//! ```text
//! NetworkExporter ──► slice::TimeSliceBuilder ──► genetic::GeneticAlgorithm ──► PolarizationResultTimeSeries
//!   statements          (congruence, conflict)      one run per slice
//! ```
//!
//! [`Polarization`] wires the two stages together. Slices are processed in
//! parallel under the default `parallel` feature; every slice gets its own
//! seeded generator, so a non-zero seed reproduces a run exactly.

pub mod agreement;
pub mod diagnostics;
pub mod engine;
/// Error types used across `cleave`.
pub mod error;
pub mod genetic;
pub mod matrix;
pub mod quality;
pub mod result;
pub mod slice;

#[cfg(test)]
mod engine_tests;

pub use diagnostics::{Diagnostic, DiagnosticLog, DiagnosticSink, NullSink, Severity, TracingSink};
pub use engine::{Polarization, PolarizationConfig};
pub use error::{Error, Result};
pub use genetic::{ClusterSolution, GeneticAlgorithm, GeneticConfig};
pub use matrix::SignedMatrix;
pub use quality::QualityFunction;
pub use result::{PolarizationResult, PolarizationResultTimeSeries};
pub use slice::{DefaultExporter, NetworkExporter, SliceConfig, SliceNetworks, TimeSliceBuilder};
