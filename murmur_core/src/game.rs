//! Game-theoretic reading of an assembled system.
//!
//! Derives a symmetric two-action (cooperate/defect) payoff structure
//! and reports equilibria and efficiency-loss ratios. The default
//! solver is intentionally illustrative: it reports the textbook
//! outcomes of the fixed payoff table rather than searching for
//! equilibria. A real solver can be substituted through
//! [`EquilibriumSolver`] without changing callers.

use crate::metrics::EPSILON;
use crate::system::MultiAgentSystem;
use serde::{Deserialize, Serialize};

/// Reward for mutual cooperation.
pub const MUTUAL_COOPERATION: f64 = 3.0;

/// Temptation payoff for unilateral defection.
pub const UNILATERAL_DEFECTION: f64 = 4.0;

/// Sucker payoff for unilateral cooperation.
pub const SUCKER_PAYOFF: f64 = 0.0;

/// Punishment for mutual defection.
pub const MUTUAL_DEFECTION: f64 = 1.0;

/// Equilibrium concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquilibriumKind {
    /// No player gains from unilateral deviation
    Nash,
    /// No payoff improvable without hurting another player
    Pareto,
    /// Correlated equilibrium
    Correlated,
    /// Evolutionarily stable strategy
    EvolutionaryStable,
}

/// Stability classification of an equilibrium point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquilibriumStability {
    /// Deviations are self-correcting
    Stable,
    /// Deviations grow
    Unstable,
    /// Deviations neither grow nor decay
    Neutral,
}

/// A reported equilibrium point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equilibrium {
    /// Equilibrium concept
    pub kind: EquilibriumKind,
    /// Strategy profile, one entry per agent: 0.0 cooperate, 1.0 defect
    pub profile: Vec<f64>,
    /// Stability classification
    pub stability: EquilibriumStability,
    /// Fraction of initial conditions attracted to this point
    pub basin_size: f64,
    /// Likelihood that adaptive play reaches this point
    pub reachability: f64,
}

/// Per-agent payoff matrix indexed `[own action][opponent action]`
/// with action 0 = cooperate, 1 = defect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix(pub [[f64; 2]; 2]);

impl PayoffMatrix {
    /// The fixed prisoner's-dilemma-style table.
    pub fn prisoners_dilemma() -> Self {
        Self([
            [MUTUAL_COOPERATION, SUCKER_PAYOFF],
            [UNILATERAL_DEFECTION, MUTUAL_DEFECTION],
        ])
    }

    /// Payoff for playing `own` against `opponent`.
    pub fn payoff(&self, own: usize, opponent: usize) -> f64 {
        self.0[own][opponent]
    }
}

/// The full game-theoretic report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTheoreticAnalysis {
    /// One payoff matrix per agent
    pub payoffs: Vec<PayoffMatrix>,
    /// Reported equilibria
    pub equilibria: Vec<Equilibrium>,
    /// Social welfare at the reported Nash point
    pub social_welfare: f64,
    /// Welfare of the cooperative optimum
    pub cooperative_optimum: f64,
    /// Cooperative optimum over worst Nash welfare
    pub price_of_anarchy: f64,
    /// Cooperative optimum over best Nash welfare
    pub price_of_stability: f64,
}

/// Strategy for locating equilibria of the derived game.
pub trait EquilibriumSolver: Send + Sync {
    /// Reports the equilibria of the system's game.
    fn solve(&self, system: &MultiAgentSystem) -> Vec<Equilibrium>;

    /// Returns the name of this solver.
    fn name(&self) -> &'static str;
}

/// Constant-table solver: one all-defect Nash point and one
/// all-cooperate Pareto point with fixed basin/reachability estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IllustrativeSolver;

impl EquilibriumSolver for IllustrativeSolver {
    fn solve(&self, system: &MultiAgentSystem) -> Vec<Equilibrium> {
        let n = system.agent_count();
        vec![
            Equilibrium {
                kind: EquilibriumKind::Nash,
                profile: vec![1.0; n],
                stability: EquilibriumStability::Stable,
                basin_size: 0.8,
                reachability: 0.9,
            },
            Equilibrium {
                kind: EquilibriumKind::Pareto,
                profile: vec![0.0; n],
                stability: EquilibriumStability::Unstable,
                basin_size: 0.2,
                reachability: 0.3,
            },
        ]
    }

    fn name(&self) -> &'static str {
        "IllustrativeSolver"
    }
}

/// Analyzes the system's derived game with the given solver.
pub fn analyze_game(
    system: &MultiAgentSystem,
    solver: &dyn EquilibriumSolver,
) -> GameTheoreticAnalysis {
    let n = system.agent_count();
    let payoffs = vec![PayoffMatrix::prisoners_dilemma(); n];
    let equilibria = solver.solve(system);

    let social_welfare = n as f64 * MUTUAL_DEFECTION;
    let cooperative_optimum = n as f64 * MUTUAL_COOPERATION;
    let price_of_anarchy = cooperative_optimum / social_welfare.max(EPSILON);
    // A single reported Nash point: best and worst welfare coincide.
    let price_of_stability = price_of_anarchy;

    GameTheoreticAnalysis {
        payoffs,
        equilibria,
        social_welfare,
        cooperative_optimum,
        price_of_anarchy,
        price_of_stability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::DynamicsKind;
    use crate::topology::TopologyKind;
    use approx::assert_relative_eq;

    fn assembled(n: usize) -> MultiAgentSystem {
        MultiAgentSystem::assemble(n, TopologyKind::Complete, DynamicsKind::Stochastic, 42)
            .expect("assembly failed")
    }

    #[test]
    fn test_payoff_table_values() {
        let table = PayoffMatrix::prisoners_dilemma();
        assert_eq!(table.payoff(0, 0), 3.0);
        assert_eq!(table.payoff(0, 1), 0.0);
        assert_eq!(table.payoff(1, 0), 4.0);
        assert_eq!(table.payoff(1, 1), 1.0);
    }

    #[test]
    fn test_price_ratios_are_three_for_any_population() {
        for n in [1, 3, 10, 50] {
            let system = assembled(n);
            let analysis = analyze_game(&system, &IllustrativeSolver);

            assert_relative_eq!(analysis.price_of_anarchy, 3.0, epsilon = 1e-9);
            assert_relative_eq!(analysis.price_of_stability, 3.0, epsilon = 1e-9);
            assert_relative_eq!(analysis.social_welfare, n as f64);
            assert_relative_eq!(analysis.cooperative_optimum, 3.0 * n as f64);
        }
    }

    #[test]
    fn test_illustrative_solver_profiles() {
        let system = assembled(5);
        let equilibria = IllustrativeSolver.solve(&system);

        assert_eq!(equilibria.len(), 2);

        let nash = &equilibria[0];
        assert_eq!(nash.kind, EquilibriumKind::Nash);
        assert_eq!(nash.stability, EquilibriumStability::Stable);
        assert_eq!(nash.profile, vec![1.0; 5]);

        let pareto = &equilibria[1];
        assert_eq!(pareto.kind, EquilibriumKind::Pareto);
        assert_eq!(pareto.profile, vec![0.0; 5]);
    }

    #[test]
    fn test_one_payoff_matrix_per_agent() {
        let system = assembled(7);
        let analysis = analyze_game(&system, &IllustrativeSolver);
        assert_eq!(analysis.payoffs.len(), 7);
    }
}
