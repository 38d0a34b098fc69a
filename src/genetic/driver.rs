//! Runs generations on one time slice until the cap or early convergence.

use super::config::GeneticConfig;
use super::iteration::{elite_indices, GeneticIteration};
use super::solution::ClusterSolution;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::matrix::{joint_norm, SignedMatrix};
use crate::result::PolarizationResult;
use rand::prelude::*;

/// Generations that must agree before a run counts as converged.
pub const CONVERGENCE_WINDOW: usize = 10;

/// Genetic algorithm driver for a single slice.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
}

impl GeneticAlgorithm {
    /// Create a driver. The configuration is used as given; validate it first
    /// with [`GeneticConfig::validated`].
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Find the most polarized partition of one congruence/conflict pair.
    ///
    /// Fails only if the two matrices do not share labels.
    pub fn run<R: Rng + ?Sized>(
        &self,
        congruence: &SignedMatrix,
        conflict: &SignedMatrix,
        rng: &mut R,
        sink: &dyn DiagnosticSink,
    ) -> Result<PolarizationResult> {
        if !congruence.same_labels(conflict) {
            return Err(Error::ShapeMismatch {
                expected: format!("{} shared labels", congruence.dim()),
                actual: format!("{} conflict labels", conflict.dim()),
            });
        }
        let (start, middle, stop) = (congruence.start(), congruence.middle(), congruence.stop());

        if joint_norm(congruence, conflict) == 0.0 {
            return Ok(PolarizationResult::degenerate(start, middle, stop));
        }

        let n = congruence.dim();
        let k = self.config.num_clusters;
        if n <= k {
            sink.warn(
                "too few actors for the requested number of clusters; slice skipped",
                Some(format!("{n} actors, {k} clusters, slice middle {middle}")),
            );
            return Ok(PolarizationResult::degenerate(start, middle, stop));
        }

        let step = GeneticIteration::new(&self.config, congruence, conflict, sink);
        let mut population = (0..self.config.num_parents)
            .map(|_| ClusterSolution::random(n, k, rng))
            .collect::<Result<Vec<_>>>()?;

        let mut max_q = Vec::new();
        let mut avg_q = Vec::new();
        let mut sd_q = Vec::new();
        let mut early_convergence = false;

        for generation in 0..self.config.num_iterations {
            let next = step.step(&population, rng)?;
            let (max, avg, sd) = summarize(&next.quality);
            max_q.push(max);
            avg_q.push(avg);
            sd_q.push(sd);
            population = next.population;

            if has_converged(&max_q, &avg_q, &sd_q) {
                early_convergence = true;
                tracing::debug!(generation, max_q = max, %middle, "early convergence");
                break;
            }
        }

        let quality = step.evaluate(&population)?;
        let best = elite_indices(&quality, 1).first().copied().unwrap_or(0);
        let final_max_q = quality.get(best).copied().unwrap_or(0.0);
        let memberships = population
            .into_iter()
            .nth(best)
            .map(ClusterSolution::into_memberships)
            .unwrap_or_default();

        PolarizationResult::new(
            max_q,
            avg_q,
            sd_q,
            final_max_q,
            memberships,
            congruence.labels().to_vec(),
            early_convergence,
            start,
            middle,
            stop,
        )
    }
}

/// Max, mean and sample standard deviation of a quality vector.
pub(crate) fn summarize(quality: &[f64]) -> (f64, f64, f64) {
    if quality.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = quality.len() as f64;
    let max = quality.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = quality.iter().sum::<f64>() / n;
    let sd = if quality.len() > 1 {
        (quality.iter().map(|q| (q - avg).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    (max, avg, sd)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// True once generation `i >= 10` and the [`CONVERGENCE_WINDOW`] generations
/// before it all show `sd == 0.00`, `max == avg`, and identical rounded
/// statistics.
pub(crate) fn has_converged(max_q: &[f64], avg_q: &[f64], sd_q: &[f64]) -> bool {
    let len = max_q.len();
    if len <= CONVERGENCE_WINDOW {
        return false;
    }
    let stats = |i: usize| (round2(max_q[i]), round2(avg_q[i]), round2(sd_q[i]));
    let last = stats(len - 1);
    (len - (CONVERGENCE_WINDOW + 1)..len).all(|i| {
        let (max, avg, sd) = stats(i);
        sd == 0.0 && max == avg && (max, avg, sd) == last
    })
}
