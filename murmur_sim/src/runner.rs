//! Scenario runner - assembles, simulates, analyzes, and judges a run.

use crate::scenarios::ScenarioId;

use murmur_core::{
    ChaosIndicators, CollectiveEngine, EngineError, GameTheoreticAnalysis, SimulationRun,
    StabilityAnalysis,
};
use tracing::{debug, error, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether all assertions held
    pub passed: bool,

    /// Steps executed
    pub steps: usize,

    /// Final simulation time in seconds
    pub final_time: f64,

    /// Final consensus value
    pub final_consensus: f64,

    /// Detected emergent behaviors
    pub behavior_count: usize,

    /// First time the consensus variance settled
    pub convergence_time: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Everything produced by one scenario run, for export.
#[derive(Debug)]
pub struct ScenarioArtifacts {
    /// Pass/fail report
    pub report: ScenarioReport,
    /// Full recorded run
    pub run: SimulationRun,
    /// Chaos indicators of the run
    pub chaos: ChaosIndicators,
    /// Linear stability assessment
    pub stability: StabilityAnalysis,
    /// Game-theoretic report
    pub game: GameTheoreticAnalysis,
}

/// Runs scenario presets against the core engine.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of agents
    num_agents: usize,

    /// Steps per run
    steps: usize,

    /// Time increment per step
    dt: f64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_agents: usize) -> Self {
        Self {
            seed,
            num_agents,
            steps: 200,
            dt: 0.01,
        }
    }

    /// Sets the step count.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the time increment.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Runs a scenario and returns the report.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioReport {
        match self.run_with_artifacts(scenario) {
            Ok(artifacts) => artifacts.report,
            Err(e) => self.failed_report(scenario, format!("engine error: {e}")),
        }
    }

    /// Runs a scenario and returns the full artifacts (trajectory and
    /// analyses included) for export.
    pub fn run_with_artifacts(
        &self,
        scenario: ScenarioId,
    ) -> Result<ScenarioArtifacts, EngineError> {
        info!(
            "Starting scenario: {} (seed={}, agents={}, steps={})",
            scenario.name(),
            self.seed,
            self.num_agents,
            self.steps
        );

        let mut engine = CollectiveEngine::with_seed(self.seed);
        let id = engine.assemble(self.num_agents, scenario.topology(), scenario.dynamics())?;

        let run = engine.simulate(id, self.steps, self.dt)?.clone();
        let chaos = engine.analyze_chaos(id)?;
        let stability = engine.analyze_stability(id)?;
        let game = engine.analyze_game(id)?;
        let convergence = engine.convergence_time(id)?;

        debug!(
            "scenario {} finished: {} points, {} behaviors",
            scenario.name(),
            run.trajectory.len(),
            run.behaviors.len()
        );

        let report = self.judge(scenario, &run, &chaos, &game, convergence);
        if report.passed {
            info!("✓ {} (seed={}) PASSED", scenario.name(), self.seed);
        } else {
            error!(
                "✗ {} (seed={}) FAILED: {}",
                scenario.name(),
                self.seed,
                report.failure_reason.as_deref().unwrap_or("unknown")
            );
        }

        Ok(ScenarioArtifacts {
            report,
            run,
            chaos,
            stability,
            game,
        })
    }

    /// Checks the run against the invariants every scenario must hold.
    fn judge(
        &self,
        scenario: ScenarioId,
        run: &SimulationRun,
        chaos: &ChaosIndicators,
        game: &GameTheoreticAnalysis,
        convergence: f64,
    ) -> ScenarioReport {
        let mut failure_reason = None;

        let final_point = run.trajectory.last();
        let final_time = final_point.map(|p| p.time).unwrap_or(0.0);
        let final_consensus = final_point.map(|p| p.metrics.consensus).unwrap_or(0.0);

        if run.trajectory.len() != self.steps + 1 {
            failure_reason = Some(format!(
                "trajectory holds {} points, expected {}",
                run.trajectory.len(),
                self.steps + 1
            ));
        } else if !(0.0..=1.0).contains(&final_consensus) {
            failure_reason = Some(format!("consensus {final_consensus} escaped [0, 1]"));
        } else if let Some(point) = final_point {
            let m = &point.metrics;
            let bounded = [m.polarization, m.fairness, m.stability, m.entropy]
                .iter()
                .all(|v| (0.0..=1.0).contains(v));
            if !bounded || !m.efficiency.is_finite() || !m.xi.is_finite() {
                failure_reason = Some("metrics escaped their bounds".to_string());
            }
        }

        if failure_reason.is_none() && !chaos.divergence_rate.is_finite() {
            failure_reason = Some("divergence rate is not finite".to_string());
        }

        if failure_reason.is_none() && (game.price_of_anarchy - 3.0).abs() > 1e-9 {
            failure_reason = Some(format!(
                "price of anarchy {} deviates from 3",
                game.price_of_anarchy
            ));
        }

        ScenarioReport {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            steps: self.steps,
            final_time,
            final_consensus,
            behavior_count: run.behaviors.len(),
            convergence_time: convergence,
            failure_reason,
        }
    }

    fn failed_report(&self, scenario: ScenarioId, reason: String) -> ScenarioReport {
        ScenarioReport {
            scenario,
            seed: self.seed,
            passed: false,
            steps: self.steps,
            final_time: 0.0,
            final_consensus: 0.0,
            behavior_count: 0,
            convergence_time: 0.0,
            failure_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_scenario_passes() {
        let report = ScenarioRunner::new(42, 10).run(ScenarioId::RingConsensus);

        assert!(report.passed, "{:?}", report.failure_reason);
        assert_eq!(report.steps, 200);
        assert!((0.0..=1.0).contains(&report.final_consensus));
    }

    #[test]
    fn test_all_scenarios_pass_default_config() {
        for scenario in ScenarioId::all() {
            let report = ScenarioRunner::new(42, 10).run(scenario);
            assert!(
                report.passed,
                "{} failed: {:?}",
                scenario.name(),
                report.failure_reason
            );
        }
    }

    #[test]
    fn test_runner_is_reproducible() {
        let a = ScenarioRunner::new(7, 12)
            .with_steps(150)
            .run(ScenarioId::SmallWorldSync);
        let b = ScenarioRunner::new(7, 12)
            .with_steps(150)
            .run(ScenarioId::SmallWorldSync);

        assert_eq!(a.final_consensus.to_bits(), b.final_consensus.to_bits());
        assert_eq!(a.behavior_count, b.behavior_count);
        assert_eq!(a.convergence_time.to_bits(), b.convergence_time.to_bits());
    }

    #[test]
    fn test_artifacts_expose_full_trajectory() {
        let artifacts = ScenarioRunner::new(42, 8)
            .with_steps(120)
            .run_with_artifacts(ScenarioId::MeshPressure)
            .expect("run failed");

        assert_eq!(artifacts.run.trajectory.len(), 121);
        assert_eq!(artifacts.game.payoffs.len(), 8);
        assert!(artifacts.chaos.dimension_estimate >= 1.0);
    }
}
