//! Autocat headless simulator CLI
//!
//! Run the pond from flags or a JSON config, or run verification scenarios.

use autocat_core::{Reaction, ReactionSet};
use autocat_sim::scenarios::ScenarioId;
use autocat_sim::{
    PondWorld, ScenarioResult, ScenarioRunner, SimConfig, SimContext, SimError, SimExport,
    SimFrame,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Autocatalytic pond simulator
#[derive(Parser, Debug)]
#[command(name = "autocat-sim")]
#[command(about = "Run the autocatalytic pond headless", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time) [default: config or 42]
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of steps to run [default: config or 100000]
    #[arg(short = 'n', long)]
    steps: Option<u64>,

    /// Steps per observer tick [default: config or 100]
    #[arg(long, conflicts_with = "scenario")]
    steps_per_tick: Option<u64>,

    /// JSON config file (missing fields use the canonical pond)
    #[arg(short, long, conflicts_with = "scenario")]
    config: Option<PathBuf>,

    /// Seed count override, NAME=N (repeatable)
    #[arg(short = 'C', long = "count", value_name = "NAME=N", conflicts_with = "scenario")]
    counts: Vec<String>,

    /// Replace the rule set, e.g. "D + A -> E (Cat: E)" (repeatable)
    #[arg(short, long = "rule", value_name = "RULE", conflicts_with = "scenario")]
    rules: Vec<String>,

    /// Run with no rules at all
    #[arg(long, conflicts_with_all = ["rules", "scenario"])]
    empty_rules: bool,

    /// Scenario to run (canonical, empty_rules, starved_rule, uniformity,
    /// dimerization, catalyst_conservation, all). Scenarios bring their own
    /// pond, so pond-shaping flags are rejected alongside this one.
    #[arg(short = 'S', long)]
    scenario: Option<String>,

    /// Number of consecutive seeds to run each scenario with
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    seeds: u64,

    /// JSON output for scripted checks
    #[arg(long)]
    json: bool,

    /// Write one frame per tick to this JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_count(arg: &str) -> Result<(String, i64), SimError> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| SimError::invalid(format!("expected NAME=N, got {:?}", arg)))?;
    let count = value
        .trim()
        .parse::<i64>()
        .map_err(|e| SimError::invalid(format!("count for {}: {}", name.trim(), e)))?;
    Ok((name.trim().to_string(), count))
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            SimConfig::from_json_file(path)?
        }
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(steps_per_tick) = args.steps_per_tick {
        config.steps_per_tick = steps_per_tick;
    }
    for arg in &args.counts {
        let (species, count) = parse_count(arg)?;
        config = config.with_count(species, count);
    }
    if args.empty_rules {
        config.rules = ReactionSet::empty();
    } else if !args.rules.is_empty() {
        let rules = args
            .rules
            .iter()
            .map(|r| r.parse::<Reaction>())
            .collect::<Result<Vec<_>, _>>()?;
        config.rules = ReactionSet::new(rules)?;
    }

    Ok(config)
}

/// Runs the configured pond and prints final counts and the last event.
fn run_pond(args: &Args) -> Result<bool, SimError> {
    let config = build_config(args)?;
    let context = SimContext::from_cli_seed(config.seed);
    info!(
        "Pond: seed={} steps={} rules={}",
        context.seed(),
        config.steps,
        config.rules.len()
    );
    for rule in config.rules.iter() {
        debug!("  {}", rule);
    }

    let mut world = PondWorld::new(config, context)?;

    match &args.export {
        Some(path) => {
            let mut export = SimExport::for_world("pond", &world);
            world.run_observed(|w| export.add_frame(SimFrame::capture(w)));
            export.finalize(&world, true);
            export.write_to_file(path)?;
            info!("Exported {} frames to {}", export.frames.len(), path.display());
        }
        None => world.run(),
    }

    let output = if args.json {
        render_json(&world)?
    } else {
        render_text(&world)
    };
    print!("{}", output);

    Ok(true)
}

/// Final counts (sorted by species) and the last event, as a table.
fn render_text(world: &PondWorld) -> String {
    let pond = world.pond();
    let mut out = String::new();
    out.push_str(&format!(
        "Steps: {} | Ticks: {}\n",
        pond.steps_taken(),
        world.tick_count()
    ));
    out.push_str(&format!("Last Event: {}\n", pond.last_event()));
    out.push_str(&format!("{:<10} {:>10}\n", "Molecule", "Count"));
    for (species, count) in pond.counts() {
        out.push_str(&format!("{:<10} {:>10}\n", species, count));
    }
    if world.dominance_reached() {
        let species = &world.config().dominance_species;
        out.push_str(&format!(
            "Dominance achieved ({}: {})\n",
            species,
            pond.count(species)
        ));
    }
    out
}

fn render_json(world: &PondWorld) -> Result<String, SimError> {
    let pond = world.pond();
    let summary = serde_json::json!({
        "seed": world.context().seed(),
        "steps": pond.steps_taken(),
        "ticks": world.tick_count(),
        "counts": pond.counts(),
        "last_event": pond.last_event(),
        "fired": world.stats().fired,
        "dominance_tick": world.dominance_tick(),
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&summary)?))
}

/// Runs scenarios over one or more seeds; returns whether all passed.
fn run_scenarios(args: &Args, selection: &str) -> Result<bool, SimError> {
    let scenarios: Vec<ScenarioId> = if selection == "all" {
        ScenarioId::all()
    } else {
        vec![selection.parse().map_err(|_| SimError::UnknownScenario(selection.to_string()))?]
    };

    let base_seed = SimContext::from_cli_seed(args.seed.unwrap_or(42)).seed();
    let steps = args.steps.unwrap_or(100_000);

    if let Some(path) = &args.export {
        if scenarios.len() > 1 || args.seeds > 1 {
            return Err(SimError::invalid(
                "--export only supports a single scenario and seed",
            ));
        }
        let (result, export) = ScenarioRunner::new(base_seed)
            .with_steps(steps)
            .run_with_export(scenarios[0]);
        if let Some(export) = export {
            export.write_to_file(path)?;
            info!("Exported {} frames to {}", export.frames.len(), path.display());
        }
        return Ok(report(args, &[result]));
    }

    let mut results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset);
        let runner = ScenarioRunner::new(seed).with_steps(steps);
        for scenario in &scenarios {
            results.push(runner.run(*scenario));
        }
    }

    Ok(report(args, &results))
}

fn report(args: &Args, results: &[ScenarioResult]) -> bool {
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed,
            "failed": failed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "steps": r.total_steps,
                    "counts": r.final_counts,
                    "last_event": r.last_event,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to render summary: {}", e),
        }
        return failed == 0;
    }

    for r in results {
        if r.passed {
            info!("✓ {} (seed={}) PASSED | {}", r.scenario.name(), r.seed, r.last_event);
        } else {
            error!(
                "✗ {} (seed={}) FAILED: {}",
                r.scenario.name(),
                r.seed,
                r.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    if failed == 0 {
        info!("All {} scenario runs passed", total);
    } else {
        error!("{}/{} scenario runs failed", failed, total);
    }
    failed == 0
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let outcome = match &args.scenario {
        Some(selection) => run_scenarios(&args, selection),
        None => run_pond(&args),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
