//! Genetic algorithm for finding polarized partitions.
//!
//! Partitioning N actors into K camps that maximise a polarization measure is
//! a combinatorial search with no gradient and a rugged landscape. A genetic
//! algorithm keeps a population of balanced partitions and improves it one
//! generation at a time:
//!
//! ```text
//! evaluate ──► keep elites ──► roulette-select parents ──► align + crossover ──► mutate
//!     ▲                                                                           │
//!     └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`ClusterSolution`]: one membership vector with its operators.
//! - [`GeneticIteration`]: a single generation step.
//! - [`GeneticAlgorithm`]: repeats steps for one slice until the iteration cap
//!   or until the quality statistics stay flat for eleven generations.
//!
//! All randomness comes from the generator passed in, so a slice run with a
//! seeded generator is reproducible.
//!
//! ## Usage
//!
//! ```rust
//! use cleave::genetic::{GeneticAlgorithm, GeneticConfig};
//! use cleave::diagnostics::NullSink;
//! use cleave::SignedMatrix;
//! use chrono::NaiveDateTime;
//! use ndarray::Array2;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let labels: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
//! let t = NaiveDateTime::default();
//! let mut c = Array2::zeros((4, 4));
//! c[[0, 1]] = 1.0; c[[1, 0]] = 1.0;
//! c[[2, 3]] = 1.0; c[[3, 2]] = 1.0;
//! let congruence = SignedMatrix::new(labels.clone(), c, t, t, t).unwrap();
//! let conflict = SignedMatrix::zeros(labels, t, t, t);
//!
//! let ga = GeneticAlgorithm::new(GeneticConfig::new().with_num_iterations(50));
//! let result = ga
//!     .run(&congruence, &conflict, &mut StdRng::seed_from_u64(1), &NullSink)
//!     .unwrap();
//! assert_eq!(result.memberships()[0], result.memberships()[1]);
//! ```

mod config;
mod driver;
mod iteration;
mod solution;

pub use config::GeneticConfig;
pub use driver::{GeneticAlgorithm, CONVERGENCE_WINDOW};
pub use iteration::{GeneticIteration, Generation};
pub use solution::{target_sizes, ClusterSolution};
