use std::path::PathBuf;

use clap::Parser;

use threes_bench::config::{BenchmarkConfig, ResolvedOutputs};
use threes_bench::harness::BenchmarkRunner;
use threes_bench::logging::init_logging;

/// Benchmark harness for the Threes assistant.
#[derive(Debug, Parser)]
#[command(
    name = "threes-bench",
    author,
    version,
    about = "Deterministic Threes assistant benchmark harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the assistant mode (from_start or reconstruct).
    #[arg(long, value_name = "MODE")]
    mode: Option<String>,

    /// Exit after validating the configuration (no games are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(mode) = cli.mode {
        config.assistant.mode = mode;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let mode = config.assistant.mode.clone();
    let oracle = config.oracle.kind.label();

    println!(
        "Loaded configuration '{run_id}' ({games} game{}, mode {mode}, oracle {oracle})",
        if games == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = BenchmarkRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: benchmark execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Benchmark complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    println!(
        "Mean score {:.1} (95% CI [{:.1}, {:.1}]), {:.1} turns per game, {:.3} ms per turn",
        summary.report.mean_score,
        summary.report.ci95.0,
        summary.report.ci95.1,
        summary.report.mean_turns,
        summary.report.avg_ms_per_turn
    );
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
