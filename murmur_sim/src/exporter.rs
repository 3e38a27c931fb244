//! JSON exporter for run artifacts.
//!
//! Serializes a sampled view of the trajectory plus every analysis into
//! a single JSON artifact for downstream reporting or visualization.

use crate::runner::ScenarioArtifacts;

use murmur_core::{
    ChaosIndicators, CollectiveMetrics, EmergentBehavior, GameTheoreticAnalysis,
    StabilityAnalysis, TrajectoryPoint,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single sampled frame of the trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFrame {
    /// Simulation time in seconds
    pub time: f64,

    /// Collective metrics at that time
    pub metrics: CollectiveMetrics,

    /// Agent positions, one vector per agent
    pub positions: Vec<Vec<f64>>,
}

impl RunFrame {
    fn from_point(point: &TrajectoryPoint) -> Self {
        Self {
            time: point.time,
            metrics: point.metrics,
            positions: point
                .states
                .iter()
                .map(|s| s.position.iter().copied().collect())
                .collect(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Whether the run passed its assertions
    pub passed: bool,

    /// Sampled trajectory frames
    pub frames: Vec<RunFrame>,

    /// Every detected emergent behavior
    pub behaviors: Vec<EmergentBehavior>,

    /// Chaos indicators
    pub chaos: ChaosIndicators,

    /// Stability assessment
    pub stability: StabilityAnalysis,

    /// Game-theoretic report
    pub game: GameTheoreticAnalysis,

    /// Convergence time of the run
    pub convergence_time: f64,
}

impl RunExport {
    /// Builds an export from run artifacts, sampling every
    /// `frame_interval`-th trajectory point (the final point always
    /// included).
    pub fn from_artifacts(artifacts: &ScenarioArtifacts, frame_interval: usize) -> Self {
        let interval = frame_interval.max(1);
        let last = artifacts.run.trajectory.len().saturating_sub(1);

        let frames = artifacts
            .run
            .trajectory
            .iter()
            .enumerate()
            .filter(|(i, _)| i % interval == 0 || *i == last)
            .map(|(_, point)| RunFrame::from_point(point))
            .collect();

        Self {
            scenario: artifacts.report.scenario.name().to_string(),
            seed: artifacts.report.seed,
            passed: artifacts.report.passed,
            frames,
            behaviors: artifacts.run.behaviors.clone(),
            chaos: artifacts.chaos,
            stability: artifacts.stability.clone(),
            game: artifacts.game.clone(),
            convergence_time: artifacts.report.convergence_time,
        }
    }

    /// Writes the export to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScenarioRunner;
    use crate::scenarios::ScenarioId;

    #[test]
    fn test_export_samples_frames() {
        let artifacts = ScenarioRunner::new(42, 6)
            .with_steps(100)
            .run_with_artifacts(ScenarioId::RingConsensus)
            .expect("run failed");

        let export = RunExport::from_artifacts(&artifacts, 10);

        // 101 points sampled every 10th, final point included.
        assert_eq!(export.frames.len(), 11);
        assert_eq!(export.frames[0].positions.len(), 6);
        assert_eq!(export.scenario, "ring_consensus");
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let artifacts = ScenarioRunner::new(42, 4)
            .with_steps(50)
            .run_with_artifacts(ScenarioId::StarHub)
            .expect("run failed");

        let export = RunExport::from_artifacts(&artifacts, 25);
        let json = serde_json::to_string(&export).expect("serialization failed");
        let parsed: RunExport = serde_json::from_str(&json).expect("parse failed");

        assert_eq!(parsed.seed, export.seed);
        assert_eq!(parsed.frames.len(), export.frames.len());
        assert_eq!(parsed.game.price_of_anarchy, export.game.price_of_anarchy);
    }
}
