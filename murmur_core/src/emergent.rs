//! Online detection of emergent collective patterns.
//!
//! The detector runs inside the simulation loop, comparing consecutive
//! collective metrics. Detections append immutable records and feed
//! nothing back into the dynamics.

use crate::dynamics::TrajectoryPoint;
use serde::{Deserialize, Serialize};

/// Minimum trajectory length before detection starts.
const MIN_HISTORY: usize = 10;

/// Consensus level whose upward crossing signals synchronization.
const SYNC_THRESHOLD: f64 = 0.9;

/// Polarization must rise above this...
const POLARIZATION_HIGH: f64 = 0.7;

/// ...from below this, within one step.
const POLARIZATION_LOW: f64 = 0.5;

/// Lookback window for oscillation counting.
const OSCILLATION_WINDOW: usize = 20;

/// Local consensus maxima required within the window.
const OSCILLATION_MIN_PEAKS: usize = 3;

/// Refractory period between oscillation events, in time units.
const OSCILLATION_REFRACTORY: f64 = 1.0;

/// Categories of detected collective patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Consensus locked in above the synchronization threshold
    Synchronization,
    /// Population split into opposing clusters
    Polarization,
    /// Sustained consensus oscillation
    Oscillation,
    /// Stable subgroup acting jointly
    Coalition,
    /// Chain reaction propagating through the network
    Cascade,
}

impl BehaviorKind {
    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            BehaviorKind::Synchronization => "synchronization",
            BehaviorKind::Polarization => "polarization",
            BehaviorKind::Oscillation => "oscillation",
            BehaviorKind::Coalition => "coalition",
            BehaviorKind::Cascade => "cascade",
        }
    }
}

impl std::fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One detected pattern; immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergentBehavior {
    /// Pattern category
    pub kind: BehaviorKind,
    /// Agents involved
    pub agents: Vec<usize>,
    /// Simulation time of onset
    pub onset_time: f64,
    /// Pattern strength (metric value or peak count)
    pub magnitude: f64,
    /// Human-readable summary
    pub description: String,
}

/// Scans a growing trajectory for behavior signatures.
#[derive(Debug, Default)]
pub struct BehaviorDetector {
    events: Vec<EmergentBehavior>,
}

impl BehaviorDetector {
    /// Creates an empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspects the latest trajectory point. Call after every append;
    /// does nothing until `MIN_HISTORY` points exist.
    pub fn observe(&mut self, trajectory: &[TrajectoryPoint]) {
        if trajectory.len() < MIN_HISTORY {
            return;
        }

        let current = &trajectory[trajectory.len() - 1];
        let previous = &trajectory[trajectory.len() - 2];
        let everyone: Vec<usize> = (0..current.states.len()).collect();

        if previous.metrics.consensus < SYNC_THRESHOLD
            && current.metrics.consensus >= SYNC_THRESHOLD
        {
            self.events.push(EmergentBehavior {
                kind: BehaviorKind::Synchronization,
                agents: everyone.clone(),
                onset_time: current.time,
                magnitude: current.metrics.consensus,
                description: format!(
                    "consensus crossed {SYNC_THRESHOLD} at t={:.2}",
                    current.time
                ),
            });
        }

        if previous.metrics.polarization < POLARIZATION_LOW
            && current.metrics.polarization > POLARIZATION_HIGH
        {
            self.events.push(EmergentBehavior {
                kind: BehaviorKind::Polarization,
                agents: everyone.clone(),
                onset_time: current.time,
                magnitude: current.metrics.polarization,
                description: format!(
                    "polarization jumped above {POLARIZATION_HIGH} at t={:.2}",
                    current.time
                ),
            });
        }

        let window_start = trajectory.len().saturating_sub(OSCILLATION_WINDOW);
        let peaks = consensus_maxima(&trajectory[window_start..]);
        if peaks >= OSCILLATION_MIN_PEAKS && !self.oscillation_within(current.time) {
            self.events.push(EmergentBehavior {
                kind: BehaviorKind::Oscillation,
                agents: everyone,
                onset_time: current.time,
                magnitude: peaks as f64,
                description: format!(
                    "{peaks} consensus maxima in the last {OSCILLATION_WINDOW} points"
                ),
            });
        }
    }

    fn oscillation_within(&self, now: f64) -> bool {
        self.events
            .iter()
            .rev()
            .take_while(|e| now - e.onset_time < OSCILLATION_REFRACTORY)
            .any(|e| e.kind == BehaviorKind::Oscillation)
    }

    /// Returns the detections so far.
    pub fn events(&self) -> &[EmergentBehavior] {
        &self.events
    }

    /// Consumes the detector, yielding the event log.
    pub fn into_events(self) -> Vec<EmergentBehavior> {
        self.events
    }
}

/// Counts strict interior local maxima of consensus.
fn consensus_maxima(points: &[TrajectoryPoint]) -> usize {
    if points.len() < 3 {
        return 0;
    }
    (1..points.len() - 1)
        .filter(|&i| {
            let c = points[i].metrics.consensus;
            c > points[i - 1].metrics.consensus && c > points[i + 1].metrics.consensus
        })
        .count()
}
