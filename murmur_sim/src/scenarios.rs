//! Named scenario presets for the harness.

use murmur_core::{DynamicsKind, TopologyKind};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: 10-agent ring settling toward consensus
    RingConsensus,

    /// SIM-002: fully connected mesh under stochastic noise
    MeshPressure,

    /// SIM-003: star hub with noise-free leaves
    StarHub,

    /// SIM-004: Erdős–Rényi graph at the connectivity threshold
    RandomDiffusion,

    /// SIM-005: preferential-attachment hubs
    ScaleFreeHubs,

    /// SIM-006: rewired lattice, synchronization watch
    SmallWorldSync,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::RingConsensus,
            ScenarioId::MeshPressure,
            ScenarioId::StarHub,
            ScenarioId::RandomDiffusion,
            ScenarioId::ScaleFreeHubs,
            ScenarioId::SmallWorldSync,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::RingConsensus => "ring_consensus",
            ScenarioId::MeshPressure => "mesh_pressure",
            ScenarioId::StarHub => "star_hub",
            ScenarioId::RandomDiffusion => "random_diffusion",
            ScenarioId::ScaleFreeHubs => "scale_free_hubs",
            ScenarioId::SmallWorldSync => "small_world_sync",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::RingConsensus => "Ring topology settling toward consensus",
            ScenarioId::MeshPressure => "Complete graph: strong coupling plus noise",
            ScenarioId::StarHub => "Star topology, deterministic leaves around the hub",
            ScenarioId::RandomDiffusion => "Random graph at the connectivity threshold",
            ScenarioId::ScaleFreeHubs => "Scale-free hubs dominating the coupling",
            ScenarioId::SmallWorldSync => "Small-world shortcuts, synchronization watch",
        }
    }

    /// Returns the topology this scenario runs on.
    pub fn topology(&self) -> TopologyKind {
        match self {
            ScenarioId::RingConsensus => TopologyKind::Ring,
            ScenarioId::MeshPressure => TopologyKind::Complete,
            ScenarioId::StarHub => TopologyKind::Star,
            ScenarioId::RandomDiffusion => TopologyKind::Random,
            ScenarioId::ScaleFreeHubs => TopologyKind::ScaleFree,
            ScenarioId::SmallWorldSync => TopologyKind::SmallWorld,
        }
    }

    /// Returns the dynamics family this scenario runs under.
    pub fn dynamics(&self) -> DynamicsKind {
        match self {
            ScenarioId::StarHub => DynamicsKind::Deterministic,
            _ => DynamicsKind::Stochastic,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ring_consensus" | "ring" | "sim-001" => Ok(ScenarioId::RingConsensus),
            "mesh_pressure" | "mesh" | "complete" | "sim-002" => Ok(ScenarioId::MeshPressure),
            "star_hub" | "star" | "sim-003" => Ok(ScenarioId::StarHub),
            "random_diffusion" | "random" | "sim-004" => Ok(ScenarioId::RandomDiffusion),
            "scale_free_hubs" | "scale_free" | "sim-005" => Ok(ScenarioId::ScaleFreeHubs),
            "small_world_sync" | "small_world" | "sim-006" => Ok(ScenarioId::SmallWorldSync),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
