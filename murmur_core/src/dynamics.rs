//! Discrete-time dynamics: neighbor-coupled forces with policy noise.
//!
//! Stepping uses simultaneous-update semantics: all forces read a
//! pre-step snapshot of the population, so iteration order never leaks
//! into the result.

use crate::agent::{AgentState, Observation, PolicyKind};
use crate::emergent::{BehaviorDetector, EmergentBehavior};
use crate::metrics::CollectiveMetrics;
use crate::system::MultiAgentSystem;
use nalgebra::DVector;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attraction gain toward each neighbor, per dimension.
const CONSENSUS_GAIN: f64 = 0.1;

/// Component gap under which short-range repulsion kicks in.
const REPULSION_RANGE: f64 = 0.1;

/// Repulsion magnitude inside the range.
const REPULSION_GAIN: f64 = 0.05;

/// Velocity retention per step.
const DAMPING: f64 = 0.9;

/// Base scale of the stochastic-policy noise.
const NOISE_SCALE: f64 = 0.01;

/// Utility retention in the exponential smoothing update.
const UTILITY_RETENTION: f64 = 0.9;

/// One recorded instant of the simulation; immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Simulation time in seconds
    pub time: f64,
    /// Per-agent state snapshots
    pub states: Vec<AgentState>,
    /// Collective metrics at that time
    pub metrics: CollectiveMetrics,
}

/// The output of a simulation: the full trajectory plus every emergent
/// behavior detected along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Ordered trajectory, one point per step plus the initial state
    pub trajectory: Vec<TrajectoryPoint>,
    /// Append-only behavior log
    pub behaviors: Vec<EmergentBehavior>,
}

impl MultiAgentSystem {
    /// Advances every agent by one time increment.
    ///
    /// Stepping an empty system is a no-op that leaves the zero-filled
    /// metrics in place.
    pub fn step(&mut self, dt: f64) {
        if self.agents.is_empty() {
            self.metrics = CollectiveMetrics::default();
            return;
        }

        // Pre-step snapshot: every force and neighborhood mean below
        // reads this, never the half-updated population.
        let snapshot: Vec<AgentState> = self.agents.iter().map(|a| a.state.clone()).collect();
        let now = self.time + dt;

        for i in 0..self.agents.len() {
            let dim = snapshot[i].position.len();

            let mut force = DVector::zeros(dim);
            for &j in &self.agents[i].connections {
                for d in 0..dim {
                    let gap = snapshot[j].position[d] - snapshot[i].position[d];
                    force[d] += CONSENSUS_GAIN * gap;
                    if gap != 0.0 && gap.abs() < REPULSION_RANGE {
                        force[d] -= REPULSION_GAIN * gap.signum();
                    }
                }
            }

            let neighbor_resources = {
                let connections = &self.agents[i].connections;
                if connections.is_empty() {
                    0.0
                } else {
                    connections
                        .iter()
                        .map(|&j| snapshot[j].resources)
                        .sum::<f64>()
                        / connections.len() as f64
                }
            };

            if self.agents[i].policy.kind == PolicyKind::Stochastic {
                let temperature = self.agents[i].policy.temperature();
                for d in 0..dim {
                    force[d] += temperature * NOISE_SCALE * self.rng.gen_range(-0.5..0.5);
                }
            }

            let agent = &mut self.agents[i];
            let previous = &snapshot[i];

            agent.state.velocity = &previous.velocity * DAMPING + &force;

            let [lo, hi] = agent.policy.bounds;
            let mut position = &previous.position + &agent.state.velocity * dt;
            for d in 0..dim {
                position[d] = position[d].clamp(lo, hi);
            }
            agent.state.position = position;

            agent.state.utility =
                UTILITY_RETENTION * previous.utility + 0.1 * neighbor_resources;

            let speed = agent.state.speed();
            agent.coherence.update(speed);
            agent.memory.push(Observation {
                time: now,
                speed,
                utility: agent.state.utility,
            });
        }

        self.time = now;
        self.metrics = CollectiveMetrics::compute(&self.agents);
    }

    /// Runs `steps` increments of `dt`, recording a trajectory point at
    /// t = 0 and after every step, and feeding the behavior detector
    /// incrementally.
    ///
    /// `steps == 0` yields a single-point trajectory (the initial
    /// snapshot).
    pub fn simulate(&mut self, steps: usize, dt: f64) -> SimulationRun {
        let mut detector = BehaviorDetector::new();
        let mut trajectory = Vec::with_capacity(steps + 1);

        self.metrics = CollectiveMetrics::compute(&self.agents);
        trajectory.push(self.snapshot_point());

        for step in 0..steps {
            self.step(dt);
            trajectory.push(self.snapshot_point());
            detector.observe(&trajectory);

            if (step + 1) % 100 == 0 {
                debug!(
                    "t={:.2}s | consensus={:.3} | behaviors={}",
                    self.time,
                    self.metrics.consensus,
                    detector.events().len()
                );
            }
        }

        SimulationRun {
            trajectory,
            behaviors: detector.into_events(),
        }
    }

    fn snapshot_point(&self) -> TrajectoryPoint {
        TrajectoryPoint {
            time: self.time,
            states: self.agents.iter().map(|a| a.state.clone()).collect(),
            metrics: self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::DynamicsKind;
    use crate::topology::TopologyKind;
    use approx::assert_relative_eq;

    fn assemble(
        n: usize,
        topology: TopologyKind,
        dynamics: DynamicsKind,
    ) -> MultiAgentSystem {
        MultiAgentSystem::assemble(n, topology, dynamics, 42).expect("assembly failed")
    }

    #[test]
    fn test_isolated_agent_feels_no_force() {
        let mut system = assemble(1, TopologyKind::Ring, DynamicsKind::Deterministic);
        let before = system.agents[0].state.position.clone();

        system.step(0.01);

        // No neighbors and no noise: velocity stays zero, position
        // changes only through clamping (a no-op here).
        assert_eq!(system.agents[0].state.position, before);
        assert_relative_eq!(system.agents[0].state.speed(), 0.0);
        assert_relative_eq!(system.agents[0].state.utility, 0.0);
    }

    #[test]
    fn test_symmetric_pair_stays_symmetric() {
        let mut system = assemble(2, TopologyKind::Complete, DynamicsKind::Deterministic);
        let dim = system.agents[0].state.position.len();
        system.agents[0].state.position = DVector::from_element(dim, 0.5);
        system.agents[1].state.position = DVector::from_element(dim, -0.5);

        for _ in 0..10 {
            system.step(0.01);
        }

        // Simultaneous-update semantics keep the mirror symmetry exact;
        // sequential in-place mutation would break it.
        for d in 0..dim {
            assert_relative_eq!(
                system.agents[0].state.position[d],
                -system.agents[1].state.position[d],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_positions_stay_clamped() {
        let mut system = assemble(6, TopologyKind::Complete, DynamicsKind::Stochastic);
        for _ in 0..50 {
            system.step(0.1);
        }

        for agent in &system.agents {
            for d in 0..agent.state.position.len() {
                assert!(agent.state.position[d].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_utility_smooths_toward_neighbor_resources() {
        let mut system = assemble(3, TopologyKind::Complete, DynamicsKind::Deterministic);
        system.step(0.01);

        // One step from utility 0 with all resources at 1.0:
        // 0.9 * 0 + 0.1 * 1.0.
        for agent in &system.agents {
            assert_relative_eq!(agent.state.utility, 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_records_memory() {
        let mut system = assemble(4, TopologyKind::Ring, DynamicsKind::Stochastic);
        for _ in 0..5 {
            system.step(0.01);
        }
        for agent in &system.agents {
            assert_eq!(agent.memory.len(), 5);
        }
    }

    #[test]
    fn test_zero_steps_yields_single_point() {
        let mut system = assemble(5, TopologyKind::Ring, DynamicsKind::Stochastic);
        let run = system.simulate(0, 0.01);

        assert_eq!(run.trajectory.len(), 1);
        assert_eq!(run.trajectory[0].time, 0.0);
        assert!(run.behaviors.is_empty());
    }

    #[test]
    fn test_trajectory_length_and_times() {
        let mut system = assemble(5, TopologyKind::Ring, DynamicsKind::Stochastic);
        let run = system.simulate(20, 0.01);

        assert_eq!(run.trajectory.len(), 21);
        assert_relative_eq!(run.trajectory[20].time, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_simulation_reproducible_per_seed() {
        let mut a = assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic);
        let mut b = assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic);

        let run_a = a.simulate(50, 0.01);
        let run_b = b.simulate(50, 0.01);

        for (pa, pb) in run_a.trajectory.iter().zip(&run_b.trajectory) {
            assert_eq!(pa.metrics, pb.metrics);
            for (sa, sb) in pa.states.iter().zip(&pb.states) {
                assert_eq!(sa.position, sb.position);
                assert_eq!(sa.velocity, sb.velocity);
            }
        }
    }

    #[test]
    fn test_empty_step_is_noop() {
        let mut system = assemble(1, TopologyKind::Ring, DynamicsKind::Stochastic);
        system.agents.clear();

        system.step(0.01);
        assert_eq!(system.metrics, CollectiveMetrics::default());
    }
}
