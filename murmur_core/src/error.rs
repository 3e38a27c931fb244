//! Error types for the murmur simulation core.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by engine operations.
///
/// Insufficient trajectory history is deliberately *not* represented
/// here: the analyzers treat it as recoverable and return documented
/// neutral defaults instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Referenced a system that was never assembled
    #[error("Unknown system: {0}")]
    SystemNotFound(Uuid),

    /// Population size below the minimum of one agent
    #[error("Population must hold at least one agent, got {0}")]
    EmptyPopulation(usize),

    /// Zero-step simulation requested through the engine boundary
    #[error("Step count must be positive")]
    ZeroSteps,

    /// Topology kind string the generator does not resolve
    #[error("Unknown topology kind: {0}")]
    UnknownTopology(String),

    /// Dynamics kind string assembly does not resolve
    #[error("Unknown dynamics kind: {0}")]
    UnknownDynamics(String),
}

impl EngineError {
    /// Creates a not-found error for a system id.
    pub fn not_found(id: Uuid) -> Self {
        Self::SystemNotFound(id)
    }

    /// Creates an unknown-topology error.
    pub fn unknown_topology(kind: impl Into<String>) -> Self {
        Self::UnknownTopology(kind.into())
    }
}
