//! The engine: owns assembled systems and exposes every analysis
//! operation behind a single object.
//!
//! The original formulation kept module-level singleton engines; here
//! all of that state lives in an explicit `CollectiveEngine` owned by
//! the caller, so independent simulations and tests never share state.

use crate::chaos::{self, ChaosIndicators, StabilityAnalysis};
use crate::dynamics::SimulationRun;
use crate::error::EngineError;
use crate::game::{self, EquilibriumSolver, GameTheoreticAnalysis, IllustrativeSolver};
use crate::spectral::{EigenEstimator, TracePairEstimator};
use crate::system::{DynamicsKind, MultiAgentSystem};
use crate::topology::TopologyKind;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Master seed; per-system seeds are derived from it
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

struct SystemEntry {
    system: MultiAgentSystem,
    last_run: Option<SimulationRun>,
}

/// Owns assembled systems, their recorded runs, and the swappable
/// estimation strategies.
pub struct CollectiveEngine {
    config: EngineConfig,
    eigen: Box<dyn EigenEstimator>,
    solver: Box<dyn EquilibriumSolver>,
    systems: HashMap<Uuid, SystemEntry>,
    assembled: u64,
}

impl CollectiveEngine {
    /// Creates an engine with the default strategies.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            eigen: Box::new(TracePairEstimator),
            solver: Box::new(IllustrativeSolver),
            systems: HashMap::new(),
            assembled: 0,
        }
    }

    /// Creates an engine from a bare seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(EngineConfig { seed })
    }

    /// Replaces the equilibrium solver strategy.
    pub fn with_solver(mut self, solver: Box<dyn EquilibriumSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Replaces the eigenvalue estimation strategy.
    pub fn with_eigen_estimator(mut self, eigen: Box<dyn EigenEstimator>) -> Self {
        self.eigen = eigen;
        self
    }

    /// Returns the master seed.
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Returns the number of assembled systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Assembles a new system and registers it under its id.
    pub fn assemble(
        &mut self,
        n: usize,
        topology: TopologyKind,
        dynamics: DynamicsKind,
    ) -> Result<Uuid, EngineError> {
        // The first system runs on the master seed directly; later ones
        // derive distinct streams.
        let seed = self.config.seed ^ self.assembled.wrapping_mul(0x9e3779b97f4a7c15);
        self.assembled += 1;

        let system = MultiAgentSystem::assemble_with(
            n,
            topology,
            dynamics,
            seed,
            self.eigen.as_ref(),
        )?;
        let id = system.id;

        info!(
            "assembled system {id}: n={n} topology={topology} dynamics={dynamics} seed={seed}"
        );
        self.systems.insert(
            id,
            SystemEntry {
                system,
                last_run: None,
            },
        );
        Ok(id)
    }

    /// Runs a simulation on a registered system, recording the run for
    /// later analysis. Zero steps is rejected as degenerate input.
    pub fn simulate(
        &mut self,
        id: Uuid,
        steps: usize,
        dt: f64,
    ) -> Result<&SimulationRun, EngineError> {
        if steps == 0 {
            return Err(EngineError::ZeroSteps);
        }
        let entry = self.entry_mut(id)?;
        let run = entry.system.simulate(steps, dt);
        info!(
            "simulated system {id}: {steps} steps, {} behaviors",
            run.behaviors.len()
        );
        Ok(entry.last_run.insert(run))
    }

    /// Returns chaos indicators for the system's last recorded run.
    ///
    /// A missing or short run is recoverable and yields the neutral
    /// defaults; an unknown id is a terminal error.
    pub fn analyze_chaos(&self, id: Uuid) -> Result<ChaosIndicators, EngineError> {
        let entry = self.entry(id)?;
        let trajectory = entry
            .last_run
            .as_ref()
            .map(|run| run.trajectory.as_slice())
            .unwrap_or(&[]);
        Ok(chaos::analyze_chaos(trajectory))
    }

    /// Assesses linear stability of a registered system.
    pub fn analyze_stability(&self, id: Uuid) -> Result<StabilityAnalysis, EngineError> {
        Ok(chaos::analyze_stability(&self.entry(id)?.system))
    }

    /// Analyzes the system's derived game and appends the discovered
    /// equilibria to the system record.
    pub fn analyze_game(&mut self, id: Uuid) -> Result<GameTheoreticAnalysis, EngineError> {
        let entry = self
            .systems
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found(id))?;
        let analysis = game::analyze_game(&entry.system, self.solver.as_ref());
        entry.system.equilibria = analysis.equilibria.clone();
        Ok(analysis)
    }

    /// Returns the convergence time of the system's last recorded run.
    pub fn convergence_time(&self, id: Uuid) -> Result<f64, EngineError> {
        let entry = self.entry(id)?;
        let trajectory = entry
            .last_run
            .as_ref()
            .map(|run| run.trajectory.as_slice())
            .unwrap_or(&[]);
        Ok(chaos::convergence_time(trajectory))
    }

    /// Returns a registered system.
    pub fn system(&self, id: Uuid) -> Result<&MultiAgentSystem, EngineError> {
        Ok(&self.entry(id)?.system)
    }

    /// Returns the system's last recorded run, if any.
    pub fn last_run(&self, id: Uuid) -> Result<Option<&SimulationRun>, EngineError> {
        Ok(self.entry(id)?.last_run.as_ref())
    }

    fn entry(&self, id: Uuid) -> Result<&SystemEntry, EngineError> {
        self.systems.get(&id).ok_or_else(|| EngineError::not_found(id))
    }

    fn entry_mut(&mut self, id: Uuid) -> Result<&mut SystemEntry, EngineError> {
        self.systems
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found(id))
    }
}
