//! End-to-end polarization runs: slice the statements, then optimize each
//! slice.
//!
//! Slices are independent. Each gets its own random generator, seeded from
//! the run's base seed and the slice index, so results do not depend on how
//! slices are scheduled across threads.

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::genetic::{GeneticAlgorithm, GeneticConfig};
use crate::matrix::SignedMatrix;
use crate::result::{PolarizationResult, PolarizationResultTimeSeries};
use crate::slice::{NetworkExporter, SliceConfig, SliceNetworks, TimeSliceBuilder};
use rand::prelude::*;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Network construction and optimization parameters of one run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolarizationConfig {
    /// How statements become slice networks.
    pub slices: SliceConfig,
    /// How each slice is partitioned.
    pub genetic: GeneticConfig,
}

/// Polarization engine.
///
/// ```rust
/// use cleave::slice::{DataType, DefaultExporter, Statement};
/// use cleave::{Polarization, PolarizationConfig};
/// use chrono::NaiveDate;
///
/// let t = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let statements = ["A", "B", "C", "D"]
///     .iter()
///     .enumerate()
///     .map(|(i, org)| {
///         Statement::new(i as u64, t, "DNA Statement")
///             .with_value("organization", *org)
///             .with_value("concept", "tax")
///             .with_value("agreement", i < 2)
///     })
///     .collect();
/// let exporter = DefaultExporter::builder(statements)
///     .with_data_type("agreement", DataType::Boolean)
///     .build();
///
/// let mut config = PolarizationConfig::default();
/// config.genetic.num_iterations = 30;
/// config.genetic.random_seed = 7;
/// let series = Polarization::new(config).run(&exporter).unwrap();
/// assert_eq!(series.len(), 1);
/// ```
pub struct Polarization {
    config: PolarizationConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Polarization {
    /// Engine reporting diagnostics through `tracing`.
    pub fn new(config: PolarizationConfig) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Send diagnostics to `sink` instead.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The configuration as given (before validation).
    pub fn config(&self) -> &PolarizationConfig {
        &self.config
    }

    /// Build slice networks from `exporter` and partition every slice.
    ///
    /// Invalid settings are repaired with a warning. Errors come only from
    /// contract violations such as an exporter returning matrices that do
    /// not fit the slice. Window bounds past the calendar saturate.
    pub fn run<E: NetworkExporter + ?Sized>(
        &self,
        exporter: &E,
    ) -> Result<PolarizationResultTimeSeries> {
        let slices = self.config.slices.clone().validated(self.sink.as_ref());
        let networks = TimeSliceBuilder::new(exporter, slices).build()?;
        self.run_networks(&networks)
    }

    /// Partition every slice of prebuilt networks.
    pub fn run_networks(&self, networks: &SliceNetworks) -> Result<PolarizationResultTimeSeries> {
        let sink = self.sink.as_ref();
        let genetic = self.config.genetic.clone().validated(sink);
        let base = base_seed(genetic.random_seed);
        let ga = GeneticAlgorithm::new(genetic);
        tracing::debug!(slices = networks.len(), "running genetic algorithm");

        let pairs: Vec<_> = networks.iter().enumerate().collect();

        #[cfg(feature = "parallel")]
        let results = pairs
            .into_par_iter()
            .map(|(i, (c, f))| solve(&ga, i, slice_seed(base, i), c, f, sink))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let results = pairs
            .into_iter()
            .map(|(i, (c, f))| solve(&ga, i, slice_seed(base, i), c, f, sink))
            .collect::<Result<Vec<_>>>()?;

        Ok(PolarizationResultTimeSeries::new(results))
    }
}

impl fmt::Debug for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Polarization")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn solve(
    ga: &GeneticAlgorithm,
    index: usize,
    seed: u64,
    congruence: &SignedMatrix,
    conflict: &SignedMatrix,
    sink: &dyn DiagnosticSink,
) -> Result<PolarizationResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    let result = ga.run(congruence, conflict, &mut rng, sink)?;
    tracing::debug!(
        index,
        generations = result.generations(),
        final_max_q = result.final_max_q(),
        early = result.early_convergence(),
        "slice done"
    );
    Ok(result)
}

/// The configured seed, or a fresh one from the thread generator for 0.
fn base_seed(seed: u64) -> u64 {
    if seed == 0 {
        rand::rng().random()
    } else {
        seed
    }
}

/// SplitMix64 finalizer over (base, index).
pub(crate) fn slice_seed(base: u64, index: usize) -> u64 {
    let mut z = base.wrapping_add((index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
