//! Network topology generation for agent populations.
//!
//! Builds the interaction graph under a chosen generative model and
//! derives the adjacency matrix, graph Laplacian, an approximate
//! spectral gap, and the mean clustering coefficient. Randomized models
//! draw from a seeded RNG so every graph is reproducible.

use crate::error::EngineError;
use crate::spectral::{OffDiagonalGap, SpectralEstimator};
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Preferential-attachment edge count per new node.
const ATTACHMENT_EDGES: usize = 2;

/// Ring-lattice neighbors per side for the small-world model (k = 4).
const LATTICE_HALF_K: usize = 2;

/// Small-world rewiring probability.
const REWIRE_PROBABILITY: f64 = 0.3;

/// Supported generative models for the interaction graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Every pair connected
    Complete,
    /// Cycle: each node linked to its two ring neighbors
    Ring,
    /// Node 0 linked to every other node
    Star,
    /// Erdős–Rényi at the connectivity threshold p = 2 ln(n) / n
    Random,
    /// Barabási–Albert preferential attachment
    ScaleFree,
    /// Watts–Strogatz rewired ring lattice
    SmallWorld,
}

impl TopologyKind {
    /// Returns all kinds.
    pub fn all() -> Vec<TopologyKind> {
        vec![
            TopologyKind::Complete,
            TopologyKind::Ring,
            TopologyKind::Star,
            TopologyKind::Random,
            TopologyKind::ScaleFree,
            TopologyKind::SmallWorld,
        ]
    }

    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            TopologyKind::Complete => "complete",
            TopologyKind::Ring => "ring",
            TopologyKind::Star => "star",
            TopologyKind::Random => "random",
            TopologyKind::ScaleFree => "scale_free",
            TopologyKind::SmallWorld => "small_world",
        }
    }
}

impl std::fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TopologyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" | "full" => Ok(TopologyKind::Complete),
            "ring" | "cycle" => Ok(TopologyKind::Ring),
            "star" => Ok(TopologyKind::Star),
            "random" | "erdos_renyi" => Ok(TopologyKind::Random),
            "scale_free" | "scalefree" | "barabasi_albert" => Ok(TopologyKind::ScaleFree),
            "small_world" | "smallworld" | "watts_strogatz" => Ok(TopologyKind::SmallWorld),
            other => Err(EngineError::unknown_topology(other)),
        }
    }
}

/// The generated interaction graph plus derived diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Generative model used
    pub kind: TopologyKind,
    /// Node count
    pub n: usize,
    /// Symmetric 0/1 matrix with zero diagonal
    pub adjacency: DMatrix<f64>,
    /// diag(degree) - adjacency
    pub laplacian: DMatrix<f64>,
    /// Approximate spectral gap (proxy, see `spectral`)
    pub spectral_gap: f64,
    /// Mean local triangle density
    pub clustering: f64,
}

impl Topology {
    /// Returns the neighbor indices of a node (its nonzero adjacency row).
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        (0..self.n)
            .filter(|&j| self.adjacency[(node, j)] > 0.0)
            .collect()
    }

    /// Returns the degree of a node.
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.row(node).iter().filter(|&&v| v > 0.0).count()
    }

    /// Returns the total edge count.
    pub fn edge_count(&self) -> usize {
        let nonzero = self
            .adjacency
            .iter()
            .filter(|&&v| v > 0.0)
            .count();
        nonzero / 2
    }
}

/// Seedable graph generator.
pub struct TopologyGenerator {
    rng: ChaCha8Rng,
    spectral: Box<dyn SpectralEstimator>,
}

impl TopologyGenerator {
    /// Creates a generator with the default spectral gap proxy.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            spectral: Box::new(OffDiagonalGap),
        }
    }

    /// Replaces the spectral gap estimator.
    pub fn with_estimator(mut self, spectral: Box<dyn SpectralEstimator>) -> Self {
        self.spectral = spectral;
        self
    }

    /// Generates a graph over `n` nodes.
    ///
    /// Fails closed on `n == 0`. For `n < 2` every kind yields the
    /// empty-edge graph.
    pub fn generate(&mut self, n: usize, kind: TopologyKind) -> Result<Topology, EngineError> {
        if n == 0 {
            return Err(EngineError::EmptyPopulation(n));
        }

        let mut adjacency = DMatrix::zeros(n, n);
        if n >= 2 {
            match kind {
                TopologyKind::Complete => complete_edges(&mut adjacency),
                TopologyKind::Ring => ring_edges(&mut adjacency),
                TopologyKind::Star => star_edges(&mut adjacency),
                TopologyKind::Random => self.random_edges(&mut adjacency),
                TopologyKind::ScaleFree => self.scale_free_edges(&mut adjacency),
                TopologyKind::SmallWorld => self.small_world_edges(&mut adjacency),
            }
        }

        let laplacian = laplacian_of(&adjacency);
        let spectral_gap = self.spectral.spectral_gap(&laplacian);
        let clustering = clustering_coefficient(&adjacency);

        Ok(Topology {
            kind,
            n,
            adjacency,
            laplacian,
            spectral_gap,
            clustering,
        })
    }

    fn random_edges(&mut self, adjacency: &mut DMatrix<f64>) {
        let n = adjacency.nrows();
        let p = (2.0 * (n as f64).ln() / n as f64).min(1.0);

        for i in 0..n {
            for j in (i + 1)..n {
                if self.rng.gen::<f64>() < p {
                    set_edge(adjacency, i, j);
                }
            }
        }
    }

    fn scale_free_edges(&mut self, adjacency: &mut DMatrix<f64>) {
        let n = adjacency.nrows();
        let seed_size = (ATTACHMENT_EDGES + 1).min(n);

        for i in 0..seed_size {
            for j in (i + 1)..seed_size {
                set_edge(adjacency, i, j);
            }
        }

        for node in seed_size..n {
            let mut targets: BTreeSet<usize> = BTreeSet::new();
            while targets.len() < ATTACHMENT_EDGES {
                // Weighted draw over current degrees; duplicates rejected.
                let total: f64 = (0..node).map(|u| degree_of(adjacency, u) as f64).sum();
                let mut draw = self.rng.gen_range(0.0..total);
                let mut pick = node - 1;
                for candidate in 0..node {
                    draw -= degree_of(adjacency, candidate) as f64;
                    if draw <= 0.0 {
                        pick = candidate;
                        break;
                    }
                }
                targets.insert(pick);
            }
            for &target in &targets {
                set_edge(adjacency, node, target);
            }
        }
    }

    fn small_world_edges(&mut self, adjacency: &mut DMatrix<f64>) {
        let n = adjacency.nrows();

        let mut lattice = Vec::new();
        for i in 0..n {
            for offset in 1..=LATTICE_HALF_K {
                let j = (i + offset) % n;
                if j != i && adjacency[(i, j)] == 0.0 {
                    set_edge(adjacency, i, j);
                    lattice.push((i, j));
                }
            }
        }

        for (u, v) in lattice {
            if self.rng.gen::<f64>() >= REWIRE_PROBABILITY {
                continue;
            }
            // Bounded retry; the edge is kept when no legal target exists.
            for _ in 0..n {
                let w = self.rng.gen_range(0..n);
                if w == u || adjacency[(u, w)] != 0.0 {
                    continue;
                }
                adjacency[(u, v)] = 0.0;
                adjacency[(v, u)] = 0.0;
                set_edge(adjacency, u, w);
                break;
            }
        }
    }
}

fn complete_edges(adjacency: &mut DMatrix<f64>) {
    let n = adjacency.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            set_edge(adjacency, i, j);
        }
    }
}

fn ring_edges(adjacency: &mut DMatrix<f64>) {
    let n = adjacency.nrows();
    for i in 0..n {
        set_edge(adjacency, i, (i + 1) % n);
    }
}

fn star_edges(adjacency: &mut DMatrix<f64>) {
    let n = adjacency.nrows();
    for i in 1..n {
        set_edge(adjacency, 0, i);
    }
}

fn set_edge(adjacency: &mut DMatrix<f64>, i: usize, j: usize) {
    adjacency[(i, j)] = 1.0;
    adjacency[(j, i)] = 1.0;
}

fn degree_of(adjacency: &DMatrix<f64>, node: usize) -> usize {
    adjacency.row(node).iter().filter(|&&v| v > 0.0).count()
}

fn laplacian_of(adjacency: &DMatrix<f64>) -> DMatrix<f64> {
    let n = adjacency.nrows();
    let mut laplacian = -adjacency.clone();
    for i in 0..n {
        laplacian[(i, i)] = degree_of(adjacency, i) as f64;
    }
    laplacian
}

/// Mean over nodes of 2 * triangles / (k * (k - 1)); degree-0 and
/// degree-1 nodes contribute 0.
fn clustering_coefficient(adjacency: &DMatrix<f64>) -> f64 {
    let n = adjacency.nrows();
    if n == 0 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let neighbors: Vec<usize> = (0..n).filter(|&j| adjacency[(i, j)] > 0.0).collect();
        let k = neighbors.len();
        if k < 2 {
            continue;
        }

        let mut triangles = 0usize;
        for a in 0..k {
            for b in (a + 1)..k {
                if adjacency[(neighbors[a], neighbors[b])] > 0.0 {
                    triangles += 1;
                }
            }
        }
        sum += 2.0 * triangles as f64 / (k as f64 * (k as f64 - 1.0));
    }
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn generate(n: usize, kind: TopologyKind) -> Topology {
        TopologyGenerator::new(42)
            .generate(n, kind)
            .expect("generation failed")
    }

    #[test]
    fn test_zero_population_fails_closed() {
        let result = TopologyGenerator::new(42).generate(0, TopologyKind::Ring);
        assert!(matches!(result, Err(EngineError::EmptyPopulation(0))));
    }

    #[test]
    fn test_single_node_is_empty_for_every_kind() {
        for kind in TopologyKind::all() {
            let topology = generate(1, kind);
            assert_eq!(topology.edge_count(), 0, "kind {kind}");
            assert_eq!(topology.spectral_gap, 0.0);
        }
    }

    #[test]
    fn test_complete_all_off_diagonal_ones() {
        let topology = generate(6, TopologyKind::Complete);
        for i in 0..6 {
            for j in 0..6 {
                let expected = if i == j { 0.0 } else { 1.0 };
                assert_eq!(topology.adjacency[(i, j)], expected);
            }
        }
        assert_relative_eq!(topology.clustering, 1.0);
    }

    #[test]
    fn test_ring_row_sums_are_two() {
        let topology = generate(7, TopologyKind::Ring);
        for i in 0..7 {
            assert_eq!(topology.degree(i), 2);
        }
    }

    #[test]
    fn test_star_hub_structure() {
        let topology = generate(5, TopologyKind::Star);
        assert_eq!(topology.degree(0), 4);
        for i in 1..5 {
            assert_eq!(topology.neighbors(i), vec![0]);
        }
        assert_relative_eq!(topology.clustering, 0.0);
    }

    #[test]
    fn test_scale_free_attachment_degrees() {
        let topology = generate(30, TopologyKind::ScaleFree);
        // Every node past the seed attaches with exactly m = 2 edges,
        // so minimum degree is 2 and the graph is connected.
        for i in 0..30 {
            assert!(topology.degree(i) >= 2, "node {i} under-attached");
        }
        assert_eq!(
            topology.edge_count(),
            3 + (30 - 3) * ATTACHMENT_EDGES
        );
    }

    #[test]
    fn test_small_world_preserves_edge_count() {
        let n = 20;
        let topology = generate(n, TopologyKind::SmallWorld);
        // Rewiring moves endpoints but never adds or removes edges.
        assert_eq!(topology.edge_count(), n * LATTICE_HALF_K);
    }

    #[test]
    fn test_random_reproducible_per_seed() {
        let a = generate(25, TopologyKind::Random);
        let b = generate(25, TopologyKind::Random);
        assert_eq!(a.adjacency, b.adjacency);

        let c = TopologyGenerator::new(43)
            .generate(25, TopologyKind::Random)
            .expect("generation failed");
        assert_ne!(a.adjacency, c.adjacency);
    }

    #[test]
    fn test_laplacian_rows_sum_to_zero() {
        for kind in TopologyKind::all() {
            let topology = generate(12, kind);
            for i in 0..12 {
                let row_sum: f64 = topology.laplacian.row(i).iter().sum();
                assert_relative_eq!(row_sum, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_connections_match_adjacency_rows() {
        let topology = generate(10, TopologyKind::SmallWorld);
        for i in 0..10 {
            for &j in &topology.neighbors(i) {
                assert!(topology.adjacency[(i, j)] > 0.0);
            }
        }
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in TopologyKind::all() {
            let parsed: TopologyKind = kind.name().parse().expect("parse failed");
            assert_eq!(parsed, kind);
        }
        assert!("hypercube".parse::<TopologyKind>().is_err());
    }

    proptest! {
        #[test]
        fn prop_adjacency_symmetric_zero_diagonal(
            n in 1usize..40,
            seed in any::<u64>(),
            kind_idx in 0usize..6,
        ) {
            let kind = TopologyKind::all()[kind_idx];
            let topology = TopologyGenerator::new(seed)
                .generate(n, kind)
                .expect("generation failed");

            for i in 0..n {
                prop_assert_eq!(topology.adjacency[(i, i)], 0.0);
                for j in 0..n {
                    prop_assert_eq!(
                        topology.adjacency[(i, j)],
                        topology.adjacency[(j, i)]
                    );
                    let v = topology.adjacency[(i, j)];
                    prop_assert!(v == 0.0 || v == 1.0);
                }
            }
        }
    }
}
