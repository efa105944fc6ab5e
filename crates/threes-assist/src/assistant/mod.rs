//! The turn orchestrator: consumes board observations, reconciles them with
//! the tracked game, and decides what to do next.

mod driver;

pub use driver::{RunOutcome, run};

use core::fmt;
use std::time::Duration;

use tracing::{Level, event};

use threes_core::deck::{CandidateTracker, DeckCounts, DeckTracker, ExactTracker};
use threes_core::mechanics;
use threes_core::model::board::Board;
use threes_core::model::direction::Direction;
use threes_core::model::rank::Rank;
use threes_core::model::tileset::TileSet;
use threes_core::reconstruct::{self, ReconstructError, Reconstruction};

use crate::io::Observation;
use crate::oracle::{DirectionScore, MoveOracle, OracleSnapshot, best_direction, score_directions};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// How the assistant joined the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Watching since the opening deal; the pile is knowable exactly.
    FromStart,
    /// Attached to a game already underway; the pile must be inferred.
    #[default]
    Reconstruct,
}

impl RunMode {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw {
            "from_start" => Some(RunMode::FromStart),
            "reconstruct" => Some(RunMode::Reconstruct),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RunMode::FromStart => "from_start",
            RunMode::Reconstruct => "reconstruct",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssistantConfig {
    pub mode: RunMode,
    /// Pause before repeating an action after an unchanged frame.
    pub retry_delay: Duration,
    /// Fan oracle queries out across threads.
    pub parallel_oracle: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            mode: RunMode::default(),
            retry_delay: DEFAULT_RETRY_DELAY,
            parallel_oracle: true,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mode = read("THREES_MODE")
            .and_then(|raw| RunMode::from_name(raw.trim()))
            .unwrap_or_default();

        let retry_delay = read("THREES_RETRY_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY);

        let parallel_oracle = read("THREES_PARALLEL_ORACLE")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(true);

        AssistantConfig {
            mode,
            retry_delay,
            parallel_oracle,
        }
    }
}

/// Where the orchestrator stands in its observe/reconcile/decide/act cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitObservation,
    Reconciling,
    AwaitingDecision,
    ActionIssued,
    GameOver,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The observed board has no legal move left.
    BoardStuck,
    /// The oracle declined every direction on a board that still has moves.
    OracleExhausted,
    /// The sensor captured the game's own end screen.
    TerminalObserved,
}

impl GameOverReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameOverReason::BoardStuck => "board_stuck",
            GameOverReason::OracleExhausted => "oracle_exhausted",
            GameOverReason::TerminalObserved => "terminal_observed",
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller should do after feeding one observation in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Play this direction now.
    Play { direction: Direction },
    /// The board did not change; repeat the last direction after a pause.
    Repeat { direction: Direction, delay: Duration },
    /// Nothing to do for this frame.
    Hold,
    /// Stop; the game cannot continue.
    GameOver { reason: GameOverReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantError {
    /// The chosen direction is illegal on the tracked board: local and
    /// remote game state disagree beyond repair.
    IllegalMove { direction: Direction },
    /// Deck tracking could not be rebuilt from the observed board.
    Desynchronized,
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::IllegalMove { direction } => {
                write!(f, "chose {direction}, which the tracked board forbids")
            }
            AssistantError::Desynchronized => {
                f.write_str("no deck hypothesis fits the observed board")
            }
        }
    }
}

impl std::error::Error for AssistantError {}

/// Everything notable that happened during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Moves issued.
    pub turns: u32,
    /// Frames that repeated the previous board.
    pub repeats: u32,
    /// Transitions more than one move explained.
    pub ambiguous: u32,
    /// Transitions no move explained.
    pub impossible: u32,
    /// Deck tracker rebuilds forced by contradicting evidence.
    pub desyncs: u32,
}

/// Turn orchestrator. Feed it observations with [`Assistant::step`]; it
/// keeps the board and the deck in sync and answers with the next action.
pub struct Assistant {
    oracle: Box<dyn MoveOracle>,
    config: AssistantConfig,
    phase: Phase,
    board: Option<Board>,
    tracker: Option<Box<dyn DeckTracker>>,
    /// Deck strategy currently in force: an exact run falls back to
    /// candidate tracking once evidence contradicts its pile.
    tracking: RunMode,
    last_direction: Option<Direction>,
    finished: Option<GameOverReason>,
    stats: RunStats,
}

impl Assistant {
    pub fn new(oracle: Box<dyn MoveOracle>, config: AssistantConfig) -> Self {
        Assistant {
            oracle,
            config,
            phase: Phase::AwaitObservation,
            board: None,
            tracker: None,
            tracking: config.mode,
            last_direction: None,
            finished: None,
            stats: RunStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn board(&self) -> Option<Board> {
        self.board
    }

    pub fn mode(&self) -> RunMode {
        self.config.mode
    }

    pub fn oracle_name(&self) -> &'static str {
        self.oracle.name()
    }

    /// Current deck estimate, once the first observation seeded a tracker.
    pub fn deck_counts(&self) -> Option<DeckCounts> {
        self.tracker.as_ref().map(|tracker| tracker.counts())
    }

    /// Deck hypotheses still alive; zero before the first observation.
    pub fn hypothesis_count(&self) -> usize {
        self.tracker
            .as_ref()
            .map(|tracker| tracker.hypothesis_count())
            .unwrap_or(0)
    }

    /// Consumes one observation and answers with the next action.
    pub fn step(&mut self, observation: &Observation) -> Result<Action, AssistantError> {
        if let Some(reason) = self.finished {
            return Ok(Action::GameOver { reason });
        }
        if observation.terminal {
            self.board = Some(observation.board);
            return Ok(self.finish(GameOverReason::TerminalObserved));
        }
        self.phase = Phase::Reconciling;
        match self.board {
            None => {
                self.reseed(observation.board)?;
                self.board = Some(observation.board);
                self.note_announcement(observation)?;
                self.decide(observation)
            }
            Some(current) if current == observation.board => self.repeat_last(),
            Some(current) => {
                self.reconcile(current, observation)?;
                self.decide(observation)
            }
        }
    }

    /// The board did not move; either the actuator input was lost or the
    /// game is animating. Ask the caller to try the same direction again.
    fn repeat_last(&mut self) -> Result<Action, AssistantError> {
        self.stats.repeats += 1;
        match self.last_direction {
            Some(direction) => {
                self.phase = Phase::ActionIssued;
                Ok(Action::Repeat {
                    direction,
                    delay: self.config.retry_delay,
                })
            }
            None => {
                self.phase = Phase::AwaitObservation;
                Ok(Action::Hold)
            }
        }
    }

    /// Works out which move produced the new board and feeds the evidence
    /// into deck tracking.
    fn reconcile(
        &mut self,
        current: Board,
        observation: &Observation,
    ) -> Result<(), AssistantError> {
        match reconstruct::reconstruct(&current, &observation.board) {
            Ok(reconstruction) => {
                if let Reconstruction::Ambiguous(candidates) = &reconstruction {
                    self.stats.ambiguous += 1;
                    self.log_anomaly("ambiguous", candidates, &current, &observation.board);
                }
                let primary = reconstruction.primary();
                if self.tracking == RunMode::FromStart {
                    self.record_draw(primary.inserted, observation.board)?;
                }
            }
            Err(ReconstructError::ImpossibleTransition) => {
                self.stats.impossible += 1;
                self.log_anomaly("impossible", &[], &current, &observation.board);
                self.tracking = RunMode::Reconstruct;
                self.reseed(observation.board)?;
            }
        }
        self.board = Some(observation.board);
        self.note_announcement(observation)
    }

    /// In attached games the announced tileset is the only deck evidence:
    /// its lowest rank is about to leave the pile.
    fn note_announcement(&mut self, observation: &Observation) -> Result<(), AssistantError> {
        if self.tracking != RunMode::Reconstruct {
            return Ok(());
        }
        let Some(rank) = observation.upcoming.and_then(TileSet::smallest) else {
            return Ok(());
        };
        self.record_draw(rank, observation.board)
    }

    fn record_draw(&mut self, rank: Rank, board: Board) -> Result<(), AssistantError> {
        let Some(tracker) = self.tracker.as_mut() else {
            return Ok(());
        };
        if let Err(err) = tracker.record(rank) {
            self.stats.desyncs += 1;
            if tracing::enabled!(Level::WARN) {
                event!(
                    target: "threes_assist::desync",
                    Level::WARN,
                    rank = %rank,
                    error = %err,
                    "deck tracker reseeded from candidates"
                );
            }
            self.tracking = RunMode::Reconstruct;
            self.reseed(board)?;
        }
        Ok(())
    }

    /// Rebuilds deck tracking from nothing but the visible board. Exact
    /// seeding is only sound on an opening deal, so this builds an exact
    /// tracker solely for the first observation of a from-start run.
    fn reseed(&mut self, board: Board) -> Result<(), AssistantError> {
        let tracker: Box<dyn DeckTracker> = match self.tracking {
            RunMode::FromStart => Box::new(ExactTracker::from_board(&board)),
            RunMode::Reconstruct => Box::new(
                CandidateTracker::from_board(&board).map_err(|_| AssistantError::Desynchronized)?,
            ),
        };
        self.tracker = Some(tracker);
        Ok(())
    }

    fn decide(&mut self, observation: &Observation) -> Result<Action, AssistantError> {
        self.phase = Phase::AwaitingDecision;
        if observation.skip_decision {
            self.phase = Phase::AwaitObservation;
            return Ok(Action::Hold);
        }
        let board = observation.board;
        if mechanics::legal_moves(&board).is_empty() {
            return Ok(self.finish(GameOverReason::BoardStuck));
        }

        let snapshot = OracleSnapshot {
            board,
            deck: self.deck_counts().unwrap_or(DeckCounts::FULL),
            upcoming: observation.upcoming.unwrap_or(TileSet::EMPTY),
        };
        let scores = score_directions(self.oracle.as_ref(), snapshot, self.config.parallel_oracle);
        let Some(direction) = best_direction(&scores) else {
            return Ok(self.finish(GameOverReason::OracleExhausted));
        };
        if !mechanics::is_legal(&board, direction) {
            return Err(AssistantError::IllegalMove { direction });
        }

        self.stats.turns += 1;
        self.last_direction = Some(direction);
        self.phase = Phase::ActionIssued;
        self.log_decision(&scores, direction);
        Ok(Action::Play { direction })
    }

    fn finish(&mut self, reason: GameOverReason) -> Action {
        self.phase = Phase::GameOver;
        self.finished = Some(reason);
        if tracing::enabled!(Level::INFO) {
            event!(
                target: "threes_assist::turn",
                Level::INFO,
                turns = self.stats.turns,
                reason = %reason,
                "run finished"
            );
        }
        Action::GameOver { reason }
    }

    fn log_decision(&self, scores: &[DirectionScore], chosen: Direction) {
        if !tracing::enabled!(Level::INFO) {
            return;
        }
        let preview = scores
            .iter()
            .map(|entry| format!("{}:{:.3}", entry.direction.as_char(), entry.score))
            .collect::<Vec<_>>()
            .join(",");
        let deck = self
            .deck_counts()
            .map(|counts| counts.to_string())
            .unwrap_or_default();
        event!(
            target: "threes_assist::decision",
            Level::INFO,
            turn = self.stats.turns,
            chosen = %chosen,
            scores = %preview,
            deck = %deck,
            hypotheses = self.hypothesis_count(),
        );
    }

    fn log_anomaly(
        &self,
        kind: &str,
        candidates: &[reconstruct::ReconstructedMove],
        before: &Board,
        after: &Board,
    ) {
        if !tracing::enabled!(Level::WARN) {
            return;
        }
        let moves = candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        event!(
            target: "threes_assist::turn",
            Level::WARN,
            kind,
            candidates = candidates.len(),
            moves = %moves,
            turn = self.stats.turns,
            before = %before,
            after = %after,
            hypotheses = self.hypothesis_count(),
            "transition not uniquely explained"
        );
    }
}
