//! System assembly: wiring an agent population to a generated topology.

use crate::agent::{
    Agent, AgentMemory, AgentState, CoherenceTriple, Policy, PolicyKind, MEMORY_CAPACITY,
    STATE_DIM,
};
use crate::error::EngineError;
use crate::game::Equilibrium;
use crate::metrics::CollectiveMetrics;
use crate::spectral::{EigenEstimate, EigenEstimator, TracePairEstimator};
use crate::topology::{Topology, TopologyGenerator, TopologyKind};
use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Jacobian diagonal for the linearized aggregate dynamics.
const JACOBIAN_DIAGONAL: f64 = -0.1;

/// Standard deviation of the Jacobian off-diagonal perturbation.
const JACOBIAN_NOISE_STD: f64 = 0.01;

/// Family of the aggregate dynamics; selects the default agent policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicsKind {
    /// Noise-free stepping
    Deterministic,
    /// Temperature-scaled noise (the default)
    Stochastic,
    /// Learned policies (stepped without noise)
    Learned,
    /// Evolutionary policies (stepped without noise)
    Evolutionary,
}

impl DynamicsKind {
    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            DynamicsKind::Deterministic => "deterministic",
            DynamicsKind::Stochastic => "stochastic",
            DynamicsKind::Learned => "learned",
            DynamicsKind::Evolutionary => "evolutionary",
        }
    }

    fn policy_kind(&self) -> PolicyKind {
        match self {
            DynamicsKind::Deterministic => PolicyKind::Deterministic,
            DynamicsKind::Stochastic => PolicyKind::Stochastic,
            DynamicsKind::Learned => PolicyKind::Learned,
            DynamicsKind::Evolutionary => PolicyKind::Evolutionary,
        }
    }
}

impl std::fmt::Display for DynamicsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DynamicsKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deterministic" => Ok(DynamicsKind::Deterministic),
            "stochastic" => Ok(DynamicsKind::Stochastic),
            "learned" => Ok(DynamicsKind::Learned),
            "evolutionary" => Ok(DynamicsKind::Evolutionary),
            other => Err(EngineError::UnknownDynamics(other.to_string())),
        }
    }
}

/// Linearization snapshot of the aggregate dynamics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicsModel {
    /// Dynamics family
    pub kind: DynamicsKind,
    /// Perturbed-identity Jacobian snapshot
    pub jacobian: DMatrix<f64>,
    /// Eigenvalue estimates from the configured strategy
    pub eigenvalues: Vec<EigenEstimate>,
    /// System dimension (population size)
    pub dimension: usize,
}

impl DynamicsModel {
    /// Builds the linearization: diagonal -0.1 with small Gaussian
    /// off-diagonals, eigenvalues from the given estimator.
    pub fn linearized<R: Rng>(
        kind: DynamicsKind,
        dimension: usize,
        rng: &mut R,
        estimator: &dyn EigenEstimator,
    ) -> Self {
        let noise = Normal::new(0.0, JACOBIAN_NOISE_STD).unwrap();
        let jacobian = DMatrix::from_fn(dimension, dimension, |i, j| {
            if i == j {
                JACOBIAN_DIAGONAL
            } else {
                noise.sample(rng)
            }
        });
        let eigenvalues = estimator.estimate(&jacobian);

        Self {
            kind,
            jacobian,
            eigenvalues,
            dimension,
        }
    }
}

/// The assembled simulation unit: agents, their topology, the
/// linearized dynamics descriptor, discovered equilibria, and the
/// current collective metrics.
///
/// Each system owns its step RNG, so independent systems never share
/// entropy and a run is fully reproducible from (seed, call sequence).
#[derive(Debug)]
pub struct MultiAgentSystem {
    /// Seed-derived identifier
    pub id: Uuid,
    /// The population, indexed by agent id
    pub agents: Vec<Agent>,
    /// Interaction graph (read-only after assembly)
    pub topology: Topology,
    /// Linearization snapshot
    pub dynamics: DynamicsModel,
    /// Equilibria appended by game-theoretic analysis
    pub equilibria: Vec<Equilibrium>,
    /// Metrics recomputed after every step
    pub metrics: CollectiveMetrics,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) time: f64,
}

impl MultiAgentSystem {
    /// Assembles `n` agents over the given topology with the default
    /// estimator strategies.
    pub fn assemble(
        n: usize,
        topology_kind: TopologyKind,
        dynamics_kind: DynamicsKind,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::assemble_with(n, topology_kind, dynamics_kind, seed, &TracePairEstimator)
    }

    /// Assembles with an explicit eigenvalue estimation strategy.
    pub fn assemble_with(
        n: usize,
        topology_kind: TopologyKind,
        dynamics_kind: DynamicsKind,
        seed: u64,
        eigen: &dyn EigenEstimator,
    ) -> Result<Self, EngineError> {
        if n == 0 {
            return Err(EngineError::EmptyPopulation(n));
        }

        // Independent streams: graph wiring, initial state, step noise.
        let topology_seed = seed;
        let state_seed = seed.wrapping_mul(0x9e3779b97f4a7c15);
        let noise_seed = seed.wrapping_mul(0x517cc1b727220a95);

        let mut generator = TopologyGenerator::new(topology_seed);
        let topology = generator.generate(n, topology_kind)?;

        let mut state_rng = ChaCha8Rng::seed_from_u64(state_seed);
        let policy_kind = dynamics_kind.policy_kind();

        let agents: Vec<Agent> = (0..n)
            .map(|id| {
                let position =
                    DVector::from_fn(STATE_DIM, |_, _| state_rng.gen_range(-1.0..1.0));
                Agent {
                    id,
                    state: AgentState::new(position),
                    policy: Policy::new(policy_kind),
                    memory: AgentMemory::new(MEMORY_CAPACITY),
                    coherence: CoherenceTriple::default(),
                    connections: topology.neighbors(id),
                }
            })
            .collect();

        let dynamics = DynamicsModel::linearized(dynamics_kind, n, &mut state_rng, eigen);
        let metrics = CollectiveMetrics::compute(&agents);

        Ok(Self {
            id: Uuid::from_u64_pair(seed, n as u64),
            agents,
            topology,
            dynamics,
            equilibria: Vec::new(),
            metrics,
            rng: ChaCha8Rng::seed_from_u64(noise_seed),
            time: 0.0,
        })
    }

    /// Returns the population size.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Returns the current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }
}
