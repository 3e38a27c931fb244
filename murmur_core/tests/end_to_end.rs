//! End-to-end properties of a full simulation run.

use murmur_core::{
    ChaosIndicators, CollectiveEngine, DynamicsKind, TopologyKind,
};

/// 10-agent ring, 200 steps at dt = 0.01, seeded: the canonical run.
fn canonical_run(seed: u64) -> (CollectiveEngine, uuid::Uuid) {
    let mut engine = CollectiveEngine::with_seed(seed);
    let id = engine
        .assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)
        .expect("assembly failed");
    engine.simulate(id, 200, 0.01).expect("simulation failed");
    (engine, id)
}

#[test]
fn test_canonical_run_is_bit_reproducible() {
    let (engine_a, id_a) = canonical_run(42);
    let (engine_b, id_b) = canonical_run(42);

    assert_eq!(id_a, id_b);

    let run_a = engine_a.last_run(id_a).expect("lookup failed").expect("no run");
    let run_b = engine_b.last_run(id_b).expect("lookup failed").expect("no run");

    assert_eq!(run_a.trajectory.len(), 201);
    for (pa, pb) in run_a.trajectory.iter().zip(&run_b.trajectory) {
        assert_eq!(pa.time.to_bits(), pb.time.to_bits());
        assert_eq!(
            pa.metrics.consensus.to_bits(),
            pb.metrics.consensus.to_bits()
        );
        for (sa, sb) in pa.states.iter().zip(&pb.states) {
            for d in 0..sa.position.len() {
                assert_eq!(sa.position[d].to_bits(), sb.position[d].to_bits());
                assert_eq!(sa.velocity[d].to_bits(), sb.velocity[d].to_bits());
            }
        }
    }
}

#[test]
fn test_canonical_run_final_consensus_in_unit_interval() {
    let (engine, id) = canonical_run(42);
    let run = engine.last_run(id).expect("lookup failed").expect("no run");

    let final_metrics = run.trajectory.last().expect("empty trajectory").metrics;
    assert!((0.0..=1.0).contains(&final_metrics.consensus));
    assert!((0.0..=1.0).contains(&final_metrics.polarization));
    assert!((0.0..=1.0).contains(&final_metrics.fairness));
    assert!((0.0..=1.0).contains(&final_metrics.stability));
    assert!((0.0..=1.0).contains(&final_metrics.entropy));
    assert!(final_metrics.efficiency.is_finite());
}

#[test]
fn test_canonical_run_chaos_indicators_are_finite_or_infinite_horizon() {
    let (engine, id) = canonical_run(42);
    let indicators = engine.analyze_chaos(id).expect("analysis failed");

    assert!(indicators.divergence_rate.is_finite());
    assert!(indicators.dimension_estimate >= 1.0);
    assert!(indicators.correlation_dimension.is_finite());
    assert!(indicators.entropy_rate.is_finite());
    assert!(
        indicators.predictability_horizon.is_finite()
            || indicators.predictability_horizon.is_infinite()
    );
}

#[test]
fn test_short_run_yields_neutral_chaos_defaults() {
    let mut engine = CollectiveEngine::with_seed(42);
    let id = engine
        .assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)
        .expect("assembly failed");
    engine.simulate(id, 50, 0.01).expect("simulation failed");

    // 51 points is under the 100-point minimum.
    let indicators = engine.analyze_chaos(id).expect("analysis failed");
    assert_eq!(indicators, ChaosIndicators::neutral());
}

#[test]
fn test_fairness_stays_at_one_with_untouched_resources() {
    let (engine, id) = canonical_run(42);
    let run = engine.last_run(id).expect("lookup failed").expect("no run");

    // No operation redistributes resources, so Gini stays zero.
    for p in &run.trajectory {
        assert!((p.metrics.fairness - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_game_analysis_prices_for_canonical_system() {
    let (mut engine, id) = canonical_run(42);
    let analysis = engine.analyze_game(id).expect("analysis failed");

    assert!((analysis.price_of_anarchy - 3.0).abs() < 1e-9);
    assert!((analysis.price_of_stability - 3.0).abs() < 1e-9);
    assert_eq!(analysis.payoffs.len(), 10);
}

#[test]
fn test_convergence_time_within_run_bounds() {
    let (engine, id) = canonical_run(42);
    let time = engine.convergence_time(id).expect("analysis failed");

    let run = engine.last_run(id).expect("lookup failed").expect("no run");
    let final_time = run.trajectory.last().expect("empty trajectory").time;
    assert!(time >= 0.0 && time <= final_time + 1e-12);
}

#[test]
fn test_independent_systems_do_not_share_entropy() {
    let mut engine = CollectiveEngine::with_seed(42);
    let a = engine
        .assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)
        .expect("assembly failed");
    let b = engine
        .assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)
        .expect("assembly failed");

    engine.simulate(a, 100, 0.01).expect("simulation failed");
    engine.simulate(b, 100, 0.01).expect("simulation failed");

    // Simulating b must not perturb a's recorded run: the canonical
    // single-system run matches system a exactly.
    let (reference, ref_id) = {
        let mut fresh = CollectiveEngine::with_seed(42);
        let id = fresh
            .assemble(10, TopologyKind::Ring, DynamicsKind::Stochastic)
            .expect("assembly failed");
        fresh.simulate(id, 100, 0.01).expect("simulation failed");
        (fresh, id)
    };

    let run_a = engine.last_run(a).expect("lookup failed").expect("no run");
    let run_ref = reference
        .last_run(ref_id)
        .expect("lookup failed")
        .expect("no run");
    for (pa, pr) in run_a.trajectory.iter().zip(&run_ref.trajectory) {
        assert_eq!(pa.metrics, pr.metrics);
    }
}
