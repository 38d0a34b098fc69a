//! One generation: evaluate, keep elites, breed, mutate.

use super::config::GeneticConfig;
use super::solution::ClusterSolution;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::matrix::SignedMatrix;
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of one generation step.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The next population.
    pub population: Vec<ClusterSolution>,
    /// Quality of the population the step started from, aligned by index.
    pub quality: Vec<f64>,
}

/// Breeding step bound to one slice's matrices.
pub struct GeneticIteration<'a> {
    config: &'a GeneticConfig,
    congruence: &'a SignedMatrix,
    conflict: &'a SignedMatrix,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> GeneticIteration<'a> {
    /// Bind a step to a configuration and a congruence/conflict pair.
    pub fn new(
        config: &'a GeneticConfig,
        congruence: &'a SignedMatrix,
        conflict: &'a SignedMatrix,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            config,
            congruence,
            conflict,
            sink,
        }
    }

    /// Quality of every member of `population`.
    pub fn evaluate(&self, population: &[ClusterSolution]) -> Result<Vec<f64>> {
        #[cfg(feature = "parallel")]
        let scores = population.par_iter().map(|s| self.score(s)).collect();

        #[cfg(not(feature = "parallel"))]
        let scores = population.iter().map(|s| self.score(s)).collect();

        scores
    }

    fn score(&self, solution: &ClusterSolution) -> Result<f64> {
        self.config.quality.evaluate(
            self.congruence.values(),
            self.conflict.values(),
            solution.memberships(),
            solution.k(),
        )
    }

    /// Produce the next generation from `population`.
    pub fn step<R: Rng + ?Sized>(
        &self,
        population: &[ClusterSolution],
        rng: &mut R,
    ) -> Result<Generation> {
        let quality = self.evaluate(population)?;
        let target = self.config.num_parents;

        // Elites
        let num_elites = self.config.num_elites().min(population.len());
        let mut next: Vec<ClusterSolution> = elite_indices(&quality, num_elites)
            .into_iter()
            .map(|i| population[i].clone())
            .collect();

        // Crossover
        let weights = selection_weights(&quality);
        for _ in next.len()..target {
            let a = roulette(&weights, rng);
            let b = roulette(&weights, rng);
            match population[a].crossover(&population[b], rng) {
                Ok(child) => next.push(child),
                Err(e) => self.sink.error(
                    "crossover failed; child omitted",
                    Some(format!("parents {a} and {b}: {e}")),
                ),
            }
        }

        // Mutation of non-elites
        if let Some(first) = population.first() {
            let swaps = self.config.num_mutations(first.n());
            for child in next.iter_mut().skip(num_elites) {
                child.mutate(swaps, rng);
            }
        }

        Ok(Generation {
            population: next,
            quality,
        })
    }
}

/// Indices of the `count` best scores, best first; ties keep population order.
pub(crate) fn elite_indices(quality: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..quality.len()).collect();
    order.sort_by(|&a, &b| quality[b].total_cmp(&quality[a]));
    order.truncate(count);
    order
}

/// Negative (and non-finite) scores clipped to zero; all-zero becomes uniform.
fn selection_weights(quality: &[f64]) -> Vec<f64> {
    let clipped: Vec<f64> = quality
        .iter()
        .map(|&q| if q.is_finite() && q > 0.0 { q } else { 0.0 })
        .collect();
    if clipped.iter().sum::<f64>() > 0.0 {
        clipped
    } else {
        vec![1.0; quality.len()]
    }
}

/// Draw an index with probability proportional to its weight.
fn roulette<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    let threshold = rng.random::<f64>() * total;
    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if w > 0.0 && cumsum >= threshold {
            return i;
        }
    }
    // Rounding left the threshold past the last cumulative sum.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}
