//! Murmur - collective dynamics of networked agent populations.
//!
//! This crate simulates a fixed population of interacting agents
//! embedded in a generated network, advances their joint state over
//! discrete time, and produces quantitative diagnostics of the
//! resulting collective dynamics.
//!
//! # Core Principle: Determinism
//!
//! All sources of randomness are intercepted and controlled: every draw
//! comes from a seeded ChaCha8 RNG, and subsystem seeds (graph wiring,
//! initial state, step noise) are derived from a single master seed so
//! runs are bit-reproducible.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CollectiveEngine                        │
//! │  ┌──────────┐    ┌──────────────────┐    ┌───────────────┐   │
//! │  │ Topology │───►│ MultiAgentSystem │───►│  step() loop  │   │
//! │  │ Generator│    │    (assembly)    │    │  + detector   │   │
//! │  └──────────┘    └──────────────────┘    └───────┬───────┘   │
//! │                                                  │           │
//! │                                            trajectory        │
//! │                                                  │           │
//! │            ┌─────────────────┬───────────────────┤           │
//! │       ┌────▼────┐      ┌─────▼─────┐      ┌──────▼──────┐    │
//! │       │  Chaos  │      │ Stability │      │ Convergence │    │
//! │       └─────────┘      └───────────┘      └─────────────┘    │
//! │                                                              │
//! │  ┌──────────────────────┐  (independent of the trajectory)   │
//! │  │ Game-Theoretic       │                                    │
//! │  │ Analyzer             │                                    │
//! │  └──────────────────────┘                                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use murmur_core::{CollectiveEngine, DynamicsKind, TopologyKind};
//!
//! let mut engine = CollectiveEngine::with_seed(42);
//! let id = engine.assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)?;
//! let run = engine.simulate(id, 200, 0.01)?;
//! let chaos = engine.analyze_chaos(id)?;
//! ```

pub mod agent;
pub mod chaos;
pub mod dynamics;
pub mod emergent;
pub mod engine;
pub mod error;
pub mod game;
pub mod metrics;
pub mod spectral;
pub mod system;
pub mod topology;

pub use agent::{Agent, AgentMemory, AgentState, CoherenceTriple, Observation, Policy, PolicyKind};
pub use chaos::{
    analyze_chaos, analyze_stability, convergence_time, ChaosIndicators, CriticalParameter,
    StabilityAnalysis,
};
pub use dynamics::{SimulationRun, TrajectoryPoint};
pub use emergent::{BehaviorDetector, BehaviorKind, EmergentBehavior};
pub use engine::{CollectiveEngine, EngineConfig};
pub use error::EngineError;
pub use game::{
    analyze_game, Equilibrium, EquilibriumKind, EquilibriumSolver, EquilibriumStability,
    GameTheoreticAnalysis, IllustrativeSolver, PayoffMatrix,
};
pub use metrics::CollectiveMetrics;
pub use spectral::{
    EigenEstimate, EigenEstimator, OffDiagonalGap, SpectralEstimator, TracePairEstimator,
};
pub use system::{DynamicsKind, DynamicsModel, MultiAgentSystem};
pub use topology::{Topology, TopologyGenerator, TopologyKind};
