//! Trajectory analysis: divergence, dimensionality proxies, linear
//! stability, and convergence detection.
//!
//! The dimension estimates are named placeholders (scalar transforms of
//! the divergence estimate), not the textbook quantities that require a
//! full Lyapunov spectrum.

use crate::dynamics::TrajectoryPoint;
use crate::system::MultiAgentSystem;
use serde::{Deserialize, Serialize};

/// Minimum trajectory length for chaos analysis.
const MIN_POINTS: usize = 100;

/// Leading points skipped as transient.
const TRANSIENT_SKIP: usize = 50;

/// Consensus deltas below this are treated as numerically zero.
const DIVERGENCE_FLOOR: f64 = 1e-10;

/// Divergence rate above which a finite horizon is reported.
const HORIZON_THRESHOLD: f64 = 1e-6;

/// Sliding window width for convergence detection.
const CONVERGENCE_WINDOW: usize = 50;

/// Window variance under which consensus counts as converged.
const CONVERGENCE_VARIANCE: f64 = 1e-4;

/// Spectral gap under which connectivity is flagged.
const LOW_SPECTRAL_GAP: f64 = 0.1;

/// Stability margin under which the margin is flagged; also the global
/// stability requirement.
const MARGIN_THRESHOLD: f64 = 0.1;

/// Chaos indicators estimated from a recorded trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosIndicators {
    /// Approximate maximal divergence rate (Lyapunov-style estimate)
    pub divergence_rate: f64,
    /// Kaplan-Yorke-style dimension proxy
    pub dimension_estimate: f64,
    /// Correlation-dimension proxy (0.9 x dimension estimate)
    pub correlation_dimension: f64,
    /// Entropy change per recorded point
    pub entropy_rate: f64,
    /// 1 / divergence rate, infinite for non-diverging dynamics.
    /// Omitted from JSON when infinite (serde_json cannot carry it).
    #[serde(
        default = "infinite_horizon",
        skip_serializing_if = "is_infinite"
    )]
    pub predictability_horizon: f64,
}

fn infinite_horizon() -> f64 {
    f64::INFINITY
}

fn is_infinite(value: &f64) -> bool {
    value.is_infinite()
}

impl ChaosIndicators {
    /// The documented insufficient-history default: zero divergence,
    /// dimension 1, infinite horizon.
    pub fn neutral() -> Self {
        Self {
            divergence_rate: 0.0,
            dimension_estimate: 1.0,
            correlation_dimension: 0.9,
            entropy_rate: 0.0,
            predictability_horizon: f64::INFINITY,
        }
    }
}

/// Estimates chaos indicators from a trajectory.
///
/// Fewer than 100 points is recoverable and yields
/// [`ChaosIndicators::neutral`].
pub fn analyze_chaos(trajectory: &[TrajectoryPoint]) -> ChaosIndicators {
    if trajectory.len() < MIN_POINTS {
        return ChaosIndicators::neutral();
    }

    let mut log_sum = 0.0;
    let mut count = 0usize;
    for pair in trajectory[TRANSIENT_SKIP..].windows(2) {
        let delta = (pair[1].metrics.consensus - pair[0].metrics.consensus).abs();
        if delta > DIVERGENCE_FLOOR {
            log_sum += delta.ln();
            count += 1;
        }
    }
    let divergence_rate = if count == 0 {
        0.0
    } else {
        log_sum / count as f64
    };

    let dimension_estimate = if divergence_rate > 0.0 {
        1.0 + divergence_rate.abs()
    } else {
        1.0
    };
    let correlation_dimension = 0.9 * dimension_estimate;

    let first = &trajectory[0];
    let last = &trajectory[trajectory.len() - 1];
    let entropy_rate = (last.metrics.entropy - first.metrics.entropy) / trajectory.len() as f64;

    let predictability_horizon = if divergence_rate > HORIZON_THRESHOLD {
        1.0 / divergence_rate
    } else {
        f64::INFINITY
    };

    ChaosIndicators {
        divergence_rate,
        dimension_estimate,
        correlation_dimension,
        entropy_rate,
        predictability_horizon,
    }
}

/// A parameter flagged as limiting stability, with a remediation hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalParameter {
    /// Parameter name
    pub name: String,
    /// Observed value
    pub value: f64,
    /// Suggested remediation
    pub remediation: String,
}

/// Linear stability assessment of the aggregate dynamics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityAnalysis {
    /// All eigenvalue estimates have negative real part
    pub locally_stable: bool,
    /// Locally stable with margin above the threshold
    pub globally_stable: bool,
    /// Negated largest real part
    pub stability_margin: f64,
    /// Flagged parameters
    pub critical_parameters: Vec<CriticalParameter>,
}

/// Assesses linear stability from the recorded eigenvalue estimates
/// and the topology's spectral gap.
pub fn analyze_stability(system: &MultiAgentSystem) -> StabilityAnalysis {
    let eigenvalues = &system.dynamics.eigenvalues;

    let max_real = eigenvalues
        .iter()
        .map(|e| e.re)
        .fold(f64::NEG_INFINITY, f64::max);

    let locally_stable = !eigenvalues.is_empty() && eigenvalues.iter().all(|e| e.re < 0.0);
    let stability_margin = if eigenvalues.is_empty() { 0.0 } else { -max_real };
    let globally_stable = locally_stable && stability_margin > MARGIN_THRESHOLD;

    let mut critical_parameters = Vec::new();
    if system.topology.spectral_gap < LOW_SPECTRAL_GAP {
        critical_parameters.push(CriticalParameter {
            name: "spectral_gap".to_string(),
            value: system.topology.spectral_gap,
            remediation: "add edges or switch to a denser topology".to_string(),
        });
    }
    if stability_margin < MARGIN_THRESHOLD {
        critical_parameters.push(CriticalParameter {
            name: "stability_margin".to_string(),
            value: stability_margin,
            remediation: "increase damping or reduce coupling gain".to_string(),
        });
    }

    StabilityAnalysis {
        locally_stable,
        globally_stable,
        stability_margin,
        critical_parameters,
    }
}

/// Returns the first time at which the sliding-window variance of
/// consensus drops below the convergence threshold, or the final
/// trajectory time (also the insufficient-history default).
pub fn convergence_time(trajectory: &[TrajectoryPoint]) -> f64 {
    let Some(last) = trajectory.last() else {
        return 0.0;
    };
    if trajectory.len() < CONVERGENCE_WINDOW {
        return last.time;
    }

    for window in trajectory.windows(CONVERGENCE_WINDOW) {
        let mean = window.iter().map(|p| p.metrics.consensus).sum::<f64>()
            / CONVERGENCE_WINDOW as f64;
        let variance = window
            .iter()
            .map(|p| (p.metrics.consensus - mean).powi(2))
            .sum::<f64>()
            / CONVERGENCE_WINDOW as f64;

        if variance < CONVERGENCE_VARIANCE {
            return window[CONVERGENCE_WINDOW - 1].time;
        }
    }
    last.time
}
