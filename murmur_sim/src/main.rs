//! Murmur simulation CLI
//!
//! Run collective dynamics scenarios with deterministic seeds.

use clap::Parser;
use murmur_sim::scenarios::ScenarioId;
use murmur_sim::{RunExport, ScenarioReport, ScenarioRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Murmur collective dynamics CLI
#[derive(Parser, Debug)]
#[command(name = "murmur-sim")]
#[command(about = "Run collective dynamics scenarios for murmur", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of agents
    #[arg(short, long, default_value = "10")]
    agents: usize,

    /// Scenario to run (ring_consensus, mesh_pressure, star_hub,
    /// random_diffusion, scale_free_hubs, small_world_sync, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Steps per run
    #[arg(long, default_value = "200")]
    steps: usize,

    /// Time increment per step
    #[arg(long, default_value = "0.01")]
    dt: f64,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export run artifacts to a JSON file (single scenario only)
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Murmur Collective Dynamics Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: ring_consensus, mesh_pressure, star_hub, \
                 random_diffusion, scale_free_hubs, small_world_sync, all"
            );
            std::process::exit(1);
        })]
    };

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    // Handle --export mode for a single scenario.
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        let runner = ScenarioRunner::new(base_seed, args.agents)
            .with_steps(args.steps)
            .with_dt(args.dt);

        match runner.run_with_artifacts(scenarios[0]) {
            Ok(artifacts) => {
                let passed = artifacts.report.passed;
                let export = RunExport::from_artifacts(&artifacts, 10);
                if let Err(e) = export.write_to_file(export_path) {
                    error!("Failed to write export: {:?}", e);
                    std::process::exit(1);
                }
                info!(
                    "Exported {} frames to {}",
                    export.frames.len(),
                    export_path
                );
                if !passed {
                    std::process::exit(1);
                }
            }
            Err(e) => {
                error!("✗ {} FAILED: {}", scenarios[0].name(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut all_reports: Vec<ScenarioReport> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed, args.agents)
            .with_steps(args.steps)
            .with_dt(args.dt);

        for scenario in &scenarios {
            let report = runner.run(*scenario);
            if !report.passed {
                failed_count += 1;
            }
            all_reports.push(report);
        }
    }

    let total = all_reports.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_reports.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "steps": r.steps,
                    "final_time": r.final_time,
                    "final_consensus": r.final_consensus,
                    "behaviors": r.behavior_count,
                    "convergence_time": r.convergence_time,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("Failed to serialize summary: {:?}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for report in &all_reports {
                if !report.passed {
                    error!(
                        "  - {} seed={}: {}",
                        report.scenario.name(),
                        report.seed,
                        report.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    if failed_count > 0 {
        std::process::exit(1);
    }
}
