//! Genetic algorithm parameters.

use crate::diagnostics::DiagnosticSink;
use crate::quality::QualityFunction;

/// Parameters of the per-slice genetic algorithm.
///
/// Fields are public so configurations can be deserialized directly; call
/// [`GeneticConfig::validated`] before use to repair out-of-range values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GeneticConfig {
    /// Number of clusters K. Must exceed 1.
    pub num_clusters: usize,
    /// Population size.
    pub num_parents: usize,
    /// Generation cap per slice.
    pub num_iterations: usize,
    /// Share of the population carried over unchanged, in `[0, 1]`.
    pub elite_percentage: f64,
    /// Share of nodes (halved into pairs) swapped per mutated child, in `[0, 1]`.
    pub mutation_percentage: f64,
    /// Fitness used for ranking and roulette selection.
    pub quality: QualityFunction,
    /// Random seed; 0 requests a non-reproducible run.
    pub random_seed: u64,
}

impl GeneticConfig {
    /// Default number of clusters.
    pub const DEFAULT_NUM_CLUSTERS: usize = 2;
    /// Default population size.
    pub const DEFAULT_NUM_PARENTS: usize = 50;
    /// Default generation cap.
    pub const DEFAULT_NUM_ITERATIONS: usize = 1000;
    /// Default elite share.
    pub const DEFAULT_ELITE_PERCENTAGE: f64 = 0.1;
    /// Default mutation share.
    pub const DEFAULT_MUTATION_PERCENTAGE: f64 = 0.1;

    /// Configuration with all defaults.
    pub fn new() -> Self {
        Self {
            num_clusters: Self::DEFAULT_NUM_CLUSTERS,
            num_parents: Self::DEFAULT_NUM_PARENTS,
            num_iterations: Self::DEFAULT_NUM_ITERATIONS,
            elite_percentage: Self::DEFAULT_ELITE_PERCENTAGE,
            mutation_percentage: Self::DEFAULT_MUTATION_PERCENTAGE,
            quality: QualityFunction::default(),
            random_seed: 0,
        }
    }

    /// Set the number of clusters.
    pub fn with_num_clusters(mut self, k: usize) -> Self {
        self.num_clusters = k;
        self
    }

    /// Set the population size.
    pub fn with_num_parents(mut self, n: usize) -> Self {
        self.num_parents = n;
        self
    }

    /// Set the generation cap.
    pub fn with_num_iterations(mut self, n: usize) -> Self {
        self.num_iterations = n;
        self
    }

    /// Set the elite share.
    pub fn with_elite_percentage(mut self, p: f64) -> Self {
        self.elite_percentage = p;
        self
    }

    /// Set the mutation share.
    pub fn with_mutation_percentage(mut self, p: f64) -> Self {
        self.mutation_percentage = p;
        self
    }

    /// Set the quality function.
    pub fn with_quality(mut self, quality: QualityFunction) -> Self {
        self.quality = quality;
        self
    }

    /// Set the quality function by name, falling back to the default on an
    /// unrecognized name.
    pub fn with_quality_name(mut self, name: &str, sink: &dyn DiagnosticSink) -> Self {
        self.quality = match name.parse() {
            Ok(q) => q,
            Err(e) => {
                let fallback = QualityFunction::default();
                sink.warn(
                    "unrecognized quality function",
                    Some(format!("{e}; using {fallback}")),
                );
                fallback
            }
        };
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Replace invalid values with defaults, warning about each one.
    pub fn validated(mut self, sink: &dyn DiagnosticSink) -> Self {
        if self.num_parents == 0 {
            sink.warn(
                "numParents must be positive",
                Some(format!("using {}", Self::DEFAULT_NUM_PARENTS)),
            );
            self.num_parents = Self::DEFAULT_NUM_PARENTS;
        }
        if self.num_iterations == 0 {
            sink.warn(
                "numIterations must be positive",
                Some(format!("using {}", Self::DEFAULT_NUM_ITERATIONS)),
            );
            self.num_iterations = Self::DEFAULT_NUM_ITERATIONS;
        }
        if self.num_clusters <= 1 {
            sink.warn(
                "numClusters must be at least 2",
                Some(format!(
                    "got {}; using {}",
                    self.num_clusters,
                    Self::DEFAULT_NUM_CLUSTERS
                )),
            );
            self.num_clusters = Self::DEFAULT_NUM_CLUSTERS;
        }
        if !unit_interval(self.elite_percentage) {
            sink.warn(
                "elitePercentage must lie in [0, 1]",
                Some(format!(
                    "got {}; using {}",
                    self.elite_percentage,
                    Self::DEFAULT_ELITE_PERCENTAGE
                )),
            );
            self.elite_percentage = Self::DEFAULT_ELITE_PERCENTAGE;
        }
        if !unit_interval(self.mutation_percentage) {
            sink.warn(
                "mutationPercentage must lie in [0, 1]",
                Some(format!(
                    "got {}; using {}",
                    self.mutation_percentage,
                    Self::DEFAULT_MUTATION_PERCENTAGE
                )),
            );
            self.mutation_percentage = Self::DEFAULT_MUTATION_PERCENTAGE;
        }
        self
    }

    /// Number of elites: `max(1, round(elite_percentage × num_parents))`,
    /// never more than the population.
    pub fn num_elites(&self) -> usize {
        let raw = (self.elite_percentage * self.num_parents as f64).round() as usize;
        raw.max(1).min(self.num_parents.max(1))
    }

    /// Number of pair swaps per mutated child over `n` nodes.
    pub fn num_mutations(&self, n: usize) -> usize {
        (self.mutation_percentage * n as f64 / 2.0).round() as usize
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn unit_interval(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}
