use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::harness::GameRecord;

const CONFIDENCE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Streams per-game results into per-run aggregates.
pub struct AnalyticsCollector {
    run_id: String,
    mode: String,
    oracle: String,
    scores: Vec<f64>,
    turns: u64,
    elapsed_ms: f64,
    max_tiles: HashMap<u64, usize>,
    totals: AnomalyTotals,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            mode: config.assistant.mode.clone(),
            oracle: config.oracle.kind.label().to_string(),
            scores: Vec::new(),
            turns: 0,
            elapsed_ms: 0.0,
            max_tiles: HashMap::new(),
            totals: AnomalyTotals::default(),
        }
    }

    pub fn record_game(&mut self, game: &GameRecord) {
        let stats = game.outcome.stats;
        self.scores.push(game.outcome.score as f64);
        self.turns += u64::from(stats.turns);
        self.elapsed_ms += game.elapsed_ms;
        *self
            .max_tiles
            .entry(game.outcome.board.max_rank().value())
            .or_insert(0) += 1;

        self.totals.repeats += u64::from(stats.repeats);
        self.totals.ambiguous += u64::from(stats.ambiguous);
        self.totals.impossible += u64::from(stats.impossible);
        self.totals.desyncs += u64::from(stats.desyncs);
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let games = self.scores.len();
        let mean_score = if games == 0 {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / games as f64
        };
        let ci95 = confidence_interval(&self.scores);
        let mean_turns = if games == 0 {
            0.0
        } else {
            self.turns as f64 / games as f64
        };
        let avg_ms_per_turn = if self.turns == 0 {
            0.0
        } else {
            self.elapsed_ms / self.turns as f64
        };

        let mut max_tiles: Vec<TileCount> = self
            .max_tiles
            .into_iter()
            .map(|(value, games)| TileCount { value, games })
            .collect();
        max_tiles.sort_by(|a, b| b.value.cmp(&a.value));

        AnalyticsSummary {
            run_id: self.run_id,
            mode: self.mode,
            oracle: self.oracle,
            games,
            mean_score,
            ci95,
            mean_turns,
            avg_ms_per_turn,
            max_tiles,
            totals: self.totals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub mode: String,
    pub oracle: String,
    pub games: usize,
    pub mean_score: f64,
    pub ci95: (f64, f64),
    pub mean_turns: f64,
    pub avg_ms_per_turn: f64,
    pub max_tiles: Vec<TileCount>,
    pub totals: AnomalyTotals,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Benchmark Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`: {} games, mode `{}`, oracle `{}`\n\n",
            self.run_id, self.games, self.mode, self.oracle
        ));
        rows.push_str(&format!(
            "Mean score {mean:.1}, 95% CI [{low:.1}, {high:.1}]; {turns:.1} turns per game; {latency:.3} ms per turn\n\n",
            mean = self.mean_score,
            low = self.ci95.0,
            high = self.ci95.1,
            turns = self.mean_turns,
            latency = self.avg_ms_per_turn,
        ));

        rows.push_str("| Max tile | Games |\n");
        rows.push_str("|----------|-------|\n");
        for tile in &self.max_tiles {
            rows.push_str(&format!("| {} | {} |\n", tile.value, tile.games));
        }

        rows.push_str(&format!(
            "\nAnomalies: {} repeated inputs, {} ambiguous reconstructions, {} impossible transitions, {} deck desyncs\n",
            self.totals.repeats, self.totals.ambiguous, self.totals.impossible, self.totals.desyncs
        ));

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// How many games topped out at a given tile value.
#[derive(Debug, Clone, Serialize)]
pub struct TileCount {
    pub value: u64,
    pub games: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AnomalyTotals {
    pub repeats: u64,
    pub ambiguous: u64,
    pub impossible: u64,
    pub desyncs: u64,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let margin = normal.inverse_cdf(0.5 + CONFIDENCE / 2.0) * std_error;
    (mean - margin, mean + margin)
}
