use std::thread;

use tracing::{Level, event};

use threes_core::model::board::Board;

use crate::io::{BoardSensor, MoveActuator};

use super::{Action, Assistant, AssistantError, GameOverReason, RunStats};

/// Where a finished run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: GameOverReason,
    pub board: Board,
    pub score: u64,
    pub stats: RunStats,
}

/// Drives the observe/decide/act loop until the game ends. Observations
/// come from `sensor`, chosen moves go to `actuator`; the pacing between
/// frames is whatever the sensor's blocking behavior provides.
pub fn run<S, A>(
    assistant: &mut Assistant,
    sensor: &mut S,
    actuator: &mut A,
) -> Result<RunOutcome, AssistantError>
where
    S: BoardSensor,
    A: MoveActuator,
{
    loop {
        let observation = sensor.observe();
        match assistant.step(&observation)? {
            Action::Play { direction } => actuator.perform(direction),
            Action::Repeat { direction, delay } => {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                actuator.perform(direction);
            }
            Action::Hold => {}
            Action::GameOver { reason } => {
                let board = assistant.board().unwrap_or(Board::empty());
                let outcome = RunOutcome {
                    reason,
                    board,
                    score: board.score(),
                    stats: assistant.stats(),
                };
                if tracing::enabled!(Level::INFO) {
                    event!(
                        target: "threes_assist::turn",
                        Level::INFO,
                        reason = %reason,
                        score = outcome.score,
                        turns = outcome.stats.turns,
                        "run complete"
                    );
                }
                return Ok(outcome);
            }
        }
    }
}
