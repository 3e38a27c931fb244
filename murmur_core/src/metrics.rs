//! Collective metrics recomputed over the whole population each step.
//!
//! Metrics are rebuilt from scratch rather than incrementally maintained
//! so that no drift accumulates across long runs.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};

/// Floor applied before any division that could hit zero.
pub const EPSILON: f64 = 1e-9;

/// Histogram resolution for the positional entropy measure.
const ENTROPY_BINS: usize = 10;

/// Population-level measures of the joint state.
///
/// consensus, polarization, fairness, stability, and entropy are bounded
/// to [0, 1] by construction; efficiency tracks mean utility and is
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectiveMetrics {
    /// 1 / (1 + positional variance)
    pub consensus: f64,
    /// Positional variance, saturated at 1
    pub polarization: f64,
    /// Mean agent utility
    pub efficiency: f64,
    /// 1 - Gini coefficient of resources
    pub fairness: f64,
    /// 1 / (1 + mean speed)
    pub stability: f64,
    /// Normalized Shannon entropy of the first position dimension
    pub entropy: f64,
    /// Mean coherence term
    pub lambda: f64,
    /// Mean smoothed coherence
    pub phi: f64,
    /// Mean decoherence term
    pub gamma: f64,
    /// Efficiency ratio lambda * phi / max(gamma, eps)
    pub xi: f64,
}

impl CollectiveMetrics {
    /// Computes all metrics from the current population.
    ///
    /// An empty population yields the zero-filled default.
    pub fn compute(agents: &[Agent]) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        let count = agents.len() as f64;

        let variance = position_variance(agents);
        let consensus = 1.0 / (1.0 + variance);
        let polarization = variance.min(1.0);

        let efficiency = agents.iter().map(|a| a.state.utility).sum::<f64>() / count;

        let resources: Vec<f64> = agents.iter().map(|a| a.state.resources).collect();
        let fairness = 1.0 - gini(&resources);

        let mean_speed = agents.iter().map(|a| a.state.speed()).sum::<f64>() / count;
        let stability = 1.0 / (1.0 + mean_speed);

        let entropy = position_entropy(agents);

        let lambda = agents.iter().map(|a| a.coherence.lambda).sum::<f64>() / count;
        let phi = agents.iter().map(|a| a.coherence.phi).sum::<f64>() / count;
        let gamma = agents.iter().map(|a| a.coherence.gamma).sum::<f64>() / count;
        let xi = lambda * phi / gamma.max(EPSILON);

        Self {
            consensus,
            polarization,
            efficiency,
            fairness,
            stability,
            entropy,
            lambda,
            phi,
            gamma,
            xi,
        }
    }
}

/// Variance of positions across agents, summed over dimensions.
fn position_variance(agents: &[Agent]) -> f64 {
    let count = agents.len() as f64;
    let dim = agents[0].state.position.len();

    let mut total = 0.0;
    for d in 0..dim {
        let mean = agents.iter().map(|a| a.state.position[d]).sum::<f64>() / count;
        total += agents
            .iter()
            .map(|a| (a.state.position[d] - mean).powi(2))
            .sum::<f64>()
            / count;
    }
    total
}

/// Standard Gini coefficient over a sorted-ascending copy of `values`.
fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n == 0 || total <= EPSILON {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i + 1) as f64 * x)
        .sum();

    let n = n as f64;
    (2.0 * weighted) / (n * total) - (n + 1.0) / n
}

/// Shannon entropy (natural log, normalized by ln(bin count)) of a
/// 10-bin histogram over the first position dimension.
fn position_entropy(agents: &[Agent]) -> f64 {
    let count = agents.len() as f64;
    let mut bins = [0usize; ENTROPY_BINS];

    for agent in agents {
        // Positions are clamped to [-1, 1] by the stepper.
        let x = agent.state.position[0].clamp(-1.0, 1.0);
        let idx = (((x + 1.0) / 2.0) * ENTROPY_BINS as f64) as usize;
        bins[idx.min(ENTROPY_BINS - 1)] += 1;
    }

    let mut entropy = 0.0;
    for &occupancy in &bins {
        if occupancy > 0 {
            let p = occupancy as f64 / count;
            entropy -= p * p.ln();
        }
    }
    entropy / (ENTROPY_BINS as f64).ln()
}
