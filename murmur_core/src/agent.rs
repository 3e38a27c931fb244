//! Per-agent state, policy, and bounded interaction memory.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Default dimensionality of agent position/velocity vectors.
pub const STATE_DIM: usize = 4;

/// Default capacity of the per-agent observation memory.
pub const MEMORY_CAPACITY: usize = 64;

/// How an agent selects its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// No noise; forces alone drive the update
    Deterministic,
    /// Temperature-scaled uniform noise added each step
    Stochastic,
    /// Placeholder for learned policies (no noise applied)
    Learned,
    /// Placeholder for evolutionary policies (no noise applied)
    Evolutionary,
}

/// Policy descriptor: kind, free parameters, and action-space bounds.
///
/// The bounds double as the position clamp range for the stepper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Policy family
    pub kind: PolicyKind,
    /// Named scalar parameters ("temperature", ...)
    pub parameters: HashMap<String, f64>,
    /// Action space bounds [lo, hi]
    pub bounds: [f64; 2],
}

impl Policy {
    /// Creates a policy of the given kind with default parameters.
    pub fn new(kind: PolicyKind) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert("temperature".to_string(), 1.0);

        Self {
            kind,
            parameters,
            bounds: [-1.0, 1.0],
        }
    }

    /// Creates the default stochastic policy.
    pub fn stochastic() -> Self {
        Self::new(PolicyKind::Stochastic)
    }

    /// Returns the noise temperature (1.0 when unset).
    pub fn temperature(&self) -> f64 {
        self.parameters.get("temperature").copied().unwrap_or(1.0)
    }
}

/// One remembered observation from a simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Simulation time of the observation
    pub time: f64,
    /// Velocity magnitude at that time
    pub speed: f64,
    /// Utility after the step
    pub utility: f64,
}

/// Bounded FIFO memory: a capacity-checked deque with explicit
/// oldest-first eviction. Capacity is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMemory {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl AgentMemory {
    /// Creates an empty memory with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an observation, evicting the oldest when full.
    pub fn push(&mut self, observation: Observation) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// Returns the number of stored observations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }
}

/// Per-agent coherence triple (lambda, phi, gamma).
///
/// The decoherence term gamma grows with speed, the coherence term
/// lambda is its complement, and phi tracks lambda with exponential
/// smoothing. All three are clamped to fixed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoherenceTriple {
    /// Coherence term, complement of speed
    pub lambda: f64,
    /// Smoothed coherence
    pub phi: f64,
    /// Decoherence term, grows with speed
    pub gamma: f64,
}

impl Default for CoherenceTriple {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            phi: 1.0,
            gamma: 0.1,
        }
    }
}

impl CoherenceTriple {
    /// Updates the triple from the current velocity magnitude.
    pub fn update(&mut self, speed: f64) {
        self.gamma = (0.1 + speed).min(5.0);
        self.lambda = (1.0 - speed).clamp(0.01, 1.0);
        self.phi = (0.9 * self.phi + 0.1 * self.lambda).clamp(0.1, 2.0);
    }

    /// Derived efficiency ratio xi = lambda * phi / max(gamma, eps).
    pub fn efficiency_ratio(&self) -> f64 {
        self.lambda * self.phi / self.gamma.max(crate::metrics::EPSILON)
    }
}

/// Mutable per-agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Position vector, clamped to the policy bounds
    pub position: DVector<f64>,
    /// Velocity vector
    pub velocity: DVector<f64>,
    /// Exponentially smoothed neighborhood payoff
    pub utility: f64,
    /// Reputation in [0, 1]
    pub reputation: f64,
    /// Held resources, nonnegative
    pub resources: f64,
}

impl AgentState {
    /// Creates a state at the given position with zeroed velocity and
    /// the standard initial scalars.
    pub fn new(position: DVector<f64>) -> Self {
        let dim = position.len();
        Self {
            position,
            velocity: DVector::zeros(dim),
            utility: 0.0,
            reputation: 0.5,
            resources: 1.0,
        }
    }

    /// Returns the velocity magnitude.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// An agent embedded in the interaction network.
///
/// `connections` is derived from the topology adjacency row at assembly
/// and is never mutated independently; population size is fixed for the
/// lifetime of a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Index into the population
    pub id: usize,
    /// Mutable dynamical state
    pub state: AgentState,
    /// Action policy
    pub policy: Policy,
    /// Bounded observation memory
    pub memory: AgentMemory,
    /// Per-agent coherence triple
    pub coherence: CoherenceTriple,
    /// Neighbor indices from the topology
    pub connections: Vec<usize>,
}
