mod sim;

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use threes_assist::{Assistant, AssistantConfig, AssistantError, RunOutcome, run};
use threes_core::game::GameSession;
use tracing::{Level, event};

use crate::agents;
use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use sim::session_pair;

/// Primary entry point for orchestrating benchmark runs.
#[derive(Debug)]
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    assistant_config: AssistantConfig,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub report: AnalyticsSummary,
}

impl BenchmarkRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let mode = config
            .assistant
            .run_mode()
            .ok_or_else(|| RunnerError::InvalidMode {
                mode: config.assistant.mode.clone(),
            })?;

        let assistant_config = AssistantConfig {
            mode,
            retry_delay: config.assistant.retry_delay(),
            parallel_oracle: config.assistant.parallel_oracle,
        };

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            assistant_config,
        })
    }

    /// Execute the benchmark, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let game = self.play_game(game_index, game_seed)?;
            analytics.record_game(&game);
            rows_written +=
                write_game_row(&mut writer, &self.config, game_index, game_seed, &game)?;
        }

        writer.flush()?;

        let report = analytics.finalize();
        report.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = if self.logging_enabled {
            let telemetry_dir = self
                .outputs
                .summary_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Some(telemetry_dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            report,
        })
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameRecord, RunnerError> {
        let oracle = agents::build_oracle(
            self.config.oracle.kind,
            self.config.oracle.seed.unwrap_or(0),
        );
        let mut assistant = Assistant::new(oracle, self.assistant_config);

        let session = Rc::new(RefCell::new(GameSession::with_seed(game_seed)));
        let (mut sensor, mut actuator) = session_pair(&session);

        let started = Instant::now();
        let outcome =
            run(&mut assistant, &mut sensor, &mut actuator).map_err(|source| {
                RunnerError::Assistant {
                    game_id: game_id(game_index),
                    source,
                }
            })?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "threes_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                game_seed,
                turns = outcome.stats.turns,
                score = outcome.score,
                reason = outcome.reason.as_str(),
                elapsed_ms
            );
        }

        Ok(GameRecord {
            outcome,
            elapsed_ms,
        })
    }
}

/// One finished game plus the wall-clock time it took to drive it.
pub struct GameRecord {
    pub outcome: RunOutcome,
    pub elapsed_ms: f64,
}

impl GameRecord {
    pub fn avg_ms_per_turn(&self) -> f64 {
        if self.outcome.stats.turns == 0 {
            0.0
        } else {
            self.elapsed_ms / f64::from(self.outcome.stats.turns)
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn game_id(game_index: usize) -> String {
    format!("G{game_index:05}")
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    game_seed: u64,
    game: &GameRecord,
) -> Result<usize, RunnerError> {
    let stats = game.outcome.stats;
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: game_id(game_index),
        game_index,
        game_seed,
        mode: config.assistant.mode.clone(),
        oracle: config.oracle.kind.label(),
        turns: stats.turns,
        score: game.outcome.score,
        max_tile: game.outcome.board.max_rank().value(),
        reason: game.outcome.reason.as_str(),
        repeats: stats.repeats,
        ambiguous: stats.ambiguous,
        impossible: stats.impossible,
        desyncs: stats.desyncs,
        speed_ms_turn: game.avg_ms_per_turn(),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(1)
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    mode: String,
    oracle: &'static str,
    turns: u32,
    score: u64,
    max_tile: u64,
    reason: &'static str,
    repeats: u32,
    ambiguous: u32,
    impossible: u32,
    desyncs: u32,
    speed_ms_turn: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("unknown assistant mode '{mode}'")]
    InvalidMode { mode: String },
    #[error("assistant aborted game {game_id}: {source}")]
    Assistant {
        game_id: String,
        #[source]
        source: AssistantError,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleKind;
    use threes_assist::RunMode;

    fn config_from_yaml(mode: &str, kind: &str) -> BenchmarkConfig {
        let yaml = format!(
            r#"
run_id: "harness_test"
games:
  seed: 11
  count: 2
assistant:
  mode: "{mode}"
  retry_delay_ms: 0
oracle:
  kind: "{kind}"
  seed: 3
outputs:
  jsonl: "out/{{run_id}}/games.jsonl"
  summary_md: "out/{{run_id}}/summary.md"
"#
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse yaml");
        cfg.validate().expect("validate");
        cfg
    }

    fn runner(mode: &str, kind: &str) -> BenchmarkRunner {
        let config = config_from_yaml(mode, kind);
        let outputs = config.resolved_outputs();
        BenchmarkRunner::new(config, outputs).expect("runner builds")
    }

    #[test]
    fn game_ids_have_stable_width() {
        assert_eq!(game_id(0), "G00000");
        assert_eq!(game_id(12345), "G12345");
    }

    #[test]
    fn runner_rejects_a_stale_mode() {
        let mut config = config_from_yaml("reconstruct", "random");
        config.assistant.mode = "sideways".to_string();
        let outputs = config.resolved_outputs();
        let err = BenchmarkRunner::new(config, outputs).expect_err("mode must be rejected");
        assert!(matches!(err, RunnerError::InvalidMode { .. }));
    }

    #[test]
    fn a_reconstructed_game_plays_to_completion() {
        let runner = runner("reconstruct", "random");
        assert_eq!(runner.assistant_config.mode, RunMode::Reconstruct);

        let game = runner.play_game(0, 99).expect("game completes");
        assert!(game.outcome.stats.turns > 0);
        assert_eq!(game.outcome.score, game.outcome.board.score());
        assert!(game.avg_ms_per_turn() >= 0.0);
    }

    #[test]
    fn a_from_start_game_plays_to_completion() {
        let runner = runner("from_start", "greedy");
        assert_eq!(runner.assistant_config.mode, RunMode::FromStart);

        let game = runner.play_game(0, 2).expect("game completes");
        assert!(game.outcome.stats.turns > 0);
        assert!(game.outcome.board.score() > 0);
    }

    #[test]
    fn same_seed_games_match_exactly() {
        let runner = runner("reconstruct", "random");
        let first = runner.play_game(0, 1234).expect("first run");
        let second = runner.play_game(1, 1234).expect("second run");
        assert_eq!(first.outcome.board, second.outcome.board);
        assert_eq!(first.outcome.score, second.outcome.score);
        assert_eq!(first.outcome.stats, second.outcome.stats);
    }

    #[test]
    fn oracle_kinds_build_correctly() {
        assert_eq!(agents::build_oracle(OracleKind::Random, 0).name(), "random");
        assert_eq!(agents::build_oracle(OracleKind::Greedy, 0).name(), "greedy");
    }
}
