//! A single candidate partition and its genetic operators.
//!
//! ## Why crossover needs label alignment
//!
//! Cluster labels are arbitrary: `[0, 0, 1, 1]` and `[1, 1, 0, 0]` are the same
//! partition. Mixing two parents node by node without first lining up their
//! labels destroys structure both parents agree on. Crossover therefore runs
//! in three steps:
//!
//! 1. **Align**: relabel `self` to maximise overlap with `other`, greedily on
//!    the K×K contingency table (rows with the strongest match pick first).
//! 2. **Recombine**: each node takes the aligned `self` label or the `other`
//!    label with probability ½.
//! 3. **Rebalance**: move random nodes from over-full to under-full clusters
//!    until every cluster has its target size (`⌊N/K⌋` or `⌈N/K⌉`, larger
//!    clusters first).
//!
//! Random initialization and mutation keep the same size profile, so every
//! solution in a population is balanced.

use crate::agreement::contingency;
use crate::error::{Error, Result};
use rand::prelude::*;
use std::collections::HashSet;

/// Membership vector of `n` actors over `k` clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSolution {
    k: usize,
    memberships: Vec<usize>,
}

impl ClusterSolution {
    /// Wrap an existing membership vector.
    ///
    /// Requires `n > k > 1` and every label in `0..k`.
    pub fn new(memberships: Vec<usize>, k: usize) -> Result<Self> {
        check_dimensions(memberships.len(), k)?;
        if memberships.iter().any(|&m| m >= k) {
            return Err(Error::InvalidParameter {
                name: "memberships",
                message: "cluster label out of range",
            });
        }
        Ok(Self { k, memberships })
    }

    /// Balanced random partition.
    ///
    /// Fills `0, 1, .., k-1, 0, 1, ..` up to `n` entries and shuffles, so each
    /// cluster gets `⌊n/k⌋` or `⌊n/k⌋ + 1` members.
    pub fn random<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Result<Self> {
        check_dimensions(n, k)?;
        let mut memberships: Vec<usize> = (0..n).map(|i| i % k).collect();
        memberships.shuffle(rng);
        Ok(Self { k, memberships })
    }

    /// Number of actors.
    pub fn n(&self) -> usize {
        self.memberships.len()
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Cluster label per actor.
    pub fn memberships(&self) -> &[usize] {
        &self.memberships
    }

    /// Consume the solution and return its membership vector.
    pub fn into_memberships(self) -> Vec<usize> {
        self.memberships
    }

    /// Member count per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &m in &self.memberships {
            sizes[m] += 1;
        }
        sizes
    }

    /// Breed a child from `self` and `other`.
    ///
    /// Fails with [`Error::DimensionMismatch`] if the parents differ in `n` or `k`.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> Result<Self> {
        if self.n() != other.n() {
            return Err(Error::DimensionMismatch {
                expected: self.n(),
                found: other.n(),
            });
        }
        if self.k != other.k {
            return Err(Error::DimensionMismatch {
                expected: self.k,
                found: other.k,
            });
        }

        let aligned = self.aligned_to(other);
        let mut child: Vec<usize> = aligned
            .iter()
            .zip(other.memberships.iter())
            .map(|(&mine, &theirs)| if rng.random_bool(0.5) { mine } else { theirs })
            .collect();

        rebalance(&mut child, self.k, rng);
        Ok(Self {
            k: self.k,
            memberships: child,
        })
    }

    /// Swap the labels of up to `num_mutations` distinct node pairs that sit in
    /// different clusters. Cluster sizes are unchanged.
    ///
    /// Pairs are drawn against the labels before any swap. When fewer than
    /// half of the cross-cluster pairs are needed they are sampled by
    /// rejection; otherwise all of them are enumerated and shuffled.
    pub fn mutate<R: Rng + ?Sized>(&mut self, num_mutations: usize, rng: &mut R) {
        let n = self.n();
        let within: usize = self
            .cluster_sizes()
            .iter()
            .map(|&s| s * s.saturating_sub(1) / 2)
            .sum();
        let available = n * n.saturating_sub(1) / 2 - within;
        let count = num_mutations.min(available);
        if count == 0 {
            return;
        }

        let pairs = if count * 2 > available {
            self.enumerate_cross_pairs(count, rng)
        } else {
            self.sample_cross_pairs(count, rng)
        };
        for (i, j) in pairs {
            self.memberships.swap(i, j);
        }
    }

    fn sample_cross_pairs<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<(usize, usize)> {
        let n = self.n();
        let mut seen = HashSet::with_capacity(count);
        let mut pairs = Vec::with_capacity(count);
        while pairs.len() < count {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if self.memberships[i] == self.memberships[j] {
                continue;
            }
            let pair = (i.min(j), i.max(j));
            if seen.insert(pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    fn enumerate_cross_pairs<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        let n = self.n();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.memberships[i] != self.memberships[j] {
                    pairs.push((i, j));
                }
            }
        }
        pairs.shuffle(rng);
        pairs.truncate(count);
        pairs
    }

    /// `self`'s memberships relabelled to best match `other`.
    fn aligned_to(&self, other: &Self) -> Vec<usize> {
        let k = self.k;
        let table = contingency(&self.memberships, &other.memberships, k);

        // Rows with the strongest single match choose first.
        let mut rows: Vec<usize> = (0..k).collect();
        rows.sort_by_key(|&r| std::cmp::Reverse(table.row(r).iter().copied().max().unwrap_or(0)));

        let mut mapping = vec![usize::MAX; k];
        let mut taken = vec![false; k];
        for r in rows {
            let mut cols: Vec<usize> = (0..k).collect();
            cols.sort_by_key(|&c| std::cmp::Reverse(table[[r, c]]));
            if let Some(&c) = cols.iter().find(|&&c| !taken[c]) {
                mapping[r] = c;
                taken[c] = true;
            }
        }

        self.memberships.iter().map(|&m| mapping[m]).collect()
    }
}

/// Exact cluster sizes for `n` nodes in `k` clusters: the first `n mod k`
/// clusters get one extra member.
pub fn target_sizes(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;
    (0..k).map(|c| base + usize::from(c < extra)).collect()
}

fn check_dimensions(n: usize, k: usize) -> Result<()> {
    if k <= 1 || n <= k {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }
    Ok(())
}

/// Move random members of over-full clusters into under-full ones until the
/// sizes equal [`target_sizes`].
fn rebalance<R: Rng + ?Sized>(memberships: &mut [usize], k: usize, rng: &mut R) {
    let targets = target_sizes(memberships.len(), k);
    let mut sizes = vec![0usize; k];
    for &m in memberships.iter() {
        sizes[m] += 1;
    }

    loop {
        let over = (0..k).find(|&c| sizes[c] > targets[c]);
        let under = (0..k).find(|&c| sizes[c] < targets[c]);
        let (Some(over), Some(under)) = (over, under) else {
            break;
        };

        let candidates: Vec<usize> = memberships
            .iter()
            .enumerate()
            .filter(|(_, &m)| m == over)
            .map(|(i, _)| i)
            .collect();
        let node = candidates[rng.random_range(0..candidates.len())];
        memberships[node] = under;
        sizes[over] -= 1;
        sizes[under] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_target_sizes() {
        assert_eq!(target_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(target_sizes(6, 2), vec![3, 3]);
        assert_eq!(target_sizes(7, 4), vec![2, 2, 2, 1]);
    }

    #[test]
    fn test_new_validates() {
        assert!(ClusterSolution::new(vec![0, 1, 0], 2).is_ok());
        assert!(ClusterSolution::new(vec![0, 1], 2).is_err()); // n == k
        assert!(ClusterSolution::new(vec![0, 0, 0], 1).is_err()); // k == 1
        assert!(ClusterSolution::new(vec![0, 2, 1], 2).is_err()); // out of range
    }

    #[test]
    fn test_random_is_balanced() {
        let s = ClusterSolution::random(11, 3, &mut rng(1)).unwrap();
        assert_eq!(s.n(), 11);
        assert_eq!(s.cluster_sizes(), target_sizes(11, 3));
    }

    #[test]
    fn test_random_rejects_too_few_nodes() {
        let err = ClusterSolution::random(2, 2, &mut rng(1)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidClusterCount {
                requested: 2,
                n_items: 2
            }
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let a = ClusterSolution::random(8, 2, &mut rng(3)).unwrap();
        let mut b = a.clone();
        b.mutate(2, &mut rng(4));
        assert_ne!(a, b);
        assert_eq!(a.cluster_sizes(), b.cluster_sizes());
    }

    #[test]
    fn test_alignment_undoes_label_permutation() {
        let a = ClusterSolution::new(vec![0, 0, 0, 1, 1, 1, 2, 2, 2], 3).unwrap();
        let b = ClusterSolution::new(vec![2, 2, 2, 0, 0, 0, 1, 1, 1], 3).unwrap();
        assert_eq!(a.aligned_to(&b), b.memberships());
    }

    #[test]
    fn test_crossover_of_permuted_twins_is_identity() {
        // Same partition under different labels: alignment makes the parents
        // identical, so recombination cannot change anything.
        let a = ClusterSolution::new(vec![1, 1, 1, 0, 0, 0], 2).unwrap();
        let b = ClusterSolution::new(vec![0, 0, 0, 1, 1, 1], 2).unwrap();
        for seed in 0..10 {
            let child = a.crossover(&b, &mut rng(seed)).unwrap();
            assert_eq!(child.memberships(), b.memberships());
        }
    }

    #[test]
    fn test_crossover_rejects_mismatched_parents() {
        let a = ClusterSolution::random(6, 2, &mut rng(1)).unwrap();
        let b = ClusterSolution::random(7, 2, &mut rng(1)).unwrap();
        let c = ClusterSolution::random(6, 3, &mut rng(1)).unwrap();
        assert!(a.crossover(&b, &mut rng(2)).is_err());
        assert!(a.crossover(&c, &mut rng(2)).is_err());
    }

    #[test]
    fn test_mutate_swaps_across_clusters() {
        let mut s = ClusterSolution::new(vec![0, 0, 0, 1, 1, 1], 2).unwrap();
        let before = s.clone();
        s.mutate(1, &mut rng(9));
        let changed = before
            .memberships()
            .iter()
            .zip(s.memberships())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 2);
        assert_eq!(s.cluster_sizes(), vec![3, 3]);
    }

    #[test]
    fn test_mutate_caps_at_available_pairs() {
        let mut s = ClusterSolution::new(vec![0, 0, 1], 2).unwrap();
        s.mutate(100, &mut rng(5));
        assert_eq!(s.cluster_sizes(), vec![2, 1]);
    }

    #[test]
    fn test_mutate_few_swaps_on_many_actors() {
        let mut r = rng(21);
        let mut s = ClusterSolution::random(3000, 3, &mut r).unwrap();
        let before = s.clone();
        s.mutate(15, &mut r);
        let changed = before
            .memberships()
            .iter()
            .zip(s.memberships())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 0 && changed <= 30, "{changed}");
        assert_eq!(s.cluster_sizes(), before.cluster_sizes());
    }

    proptest! {
        #[test]
        fn operators_preserve_range_and_sizes(
            n in 3usize..40,
            k_raw in 2usize..8,
            seed in any::<u64>(),
            swaps in 0usize..10,
        ) {
            let k = k_raw.min(n - 1);
            prop_assume!(k >= 2);
            let mut r = rng(seed);
            let a = ClusterSolution::random(n, k, &mut r).unwrap();
            let b = ClusterSolution::random(n, k, &mut r).unwrap();

            let mut child = a.crossover(&b, &mut r).unwrap();
            prop_assert_eq!(child.n(), n);
            prop_assert!(child.memberships().iter().all(|&m| m < k));
            prop_assert_eq!(child.cluster_sizes(), target_sizes(n, k));

            child.mutate(swaps, &mut r);
            prop_assert!(child.memberships().iter().all(|&m| m < k));
            prop_assert_eq!(child.cluster_sizes(), target_sizes(n, k));
        }
    }
}
