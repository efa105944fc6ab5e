use core::fmt;

use serde::{Deserialize, Serialize};

use crate::mechanics::MoveError;
use crate::model::board::Board;
use crate::model::direction::Direction;

use super::session::GameSession;

/// A finished or in-progress game as a seed plus the moves played, one
/// character per move. Enough to reproduce the whole game, board by board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedGame {
    pub seed: u64,
    pub moves: String,
}

/// Final state reached by replaying a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub turns: u32,
    pub board: Board,
    pub score: u64,
    /// True when the final board has no legal move left.
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayError {
    /// A character outside the U/D/L/R move alphabet.
    BadMoveChar { index: usize, found: char },
    /// A recorded move its own board position does not allow.
    IllegalMove { index: usize, direction: Direction },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::BadMoveChar { index, found } => {
                write!(f, "move {index}: unknown move character {found:?}")
            }
            ReplayError::IllegalMove { index, direction } => {
                write!(f, "move {index}: {direction} is illegal at that point")
            }
        }
    }
}

impl std::error::Error for ReplayError {}

impl RecordedGame {
    pub fn new(seed: u64) -> Self {
        RecordedGame {
            seed,
            moves: String::new(),
        }
    }

    pub fn push(&mut self, direction: Direction) {
        self.moves.push(direction.as_char());
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Re-simulates the game and returns where it ends up. Moves recorded
    /// past the end of the game are ignored.
    pub fn replay(&self) -> Result<ReplayOutcome, ReplayError> {
        let mut session = GameSession::with_seed(self.seed);
        for (index, found) in self.moves.chars().enumerate() {
            if session.is_over() {
                break;
            }
            let direction =
                Direction::from_char(found).ok_or(ReplayError::BadMoveChar { index, found })?;
            session.advance(direction).map_err(|err| match err {
                MoveError::IllegalMove { direction } => {
                    ReplayError::IllegalMove { index, direction }
                }
            })?;
        }
        Ok(ReplayOutcome {
            turns: session.turn(),
            board: session.board(),
            score: session.score(),
            complete: session.is_over(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays a short seeded game and records it.
    fn recorded(seed: u64, turns: usize) -> (RecordedGame, GameSession) {
        let mut session = GameSession::with_seed(seed);
        let mut record = RecordedGame::new(seed);
        for _ in 0..turns {
            let Some(&direction) = session.legal_moves().first() else {
                break;
            };
            session.advance(direction).expect("legal move");
            record.push(direction);
        }
        (record, session)
    }

    #[test]
    fn replay_reaches_the_recorded_state() {
        let (record, session) = recorded(17, 25);
        let outcome = record.replay().expect("record replays");
        assert_eq!(outcome.turns, session.turn());
        assert_eq!(outcome.board, session.board());
        assert_eq!(outcome.score, session.score());
        assert_eq!(outcome.complete, session.is_over());
    }

    #[test]
    fn replay_rejects_unknown_characters() {
        let (mut record, _) = recorded(1, 2);
        let index = record.moves.chars().count();
        record.moves.push('X');
        assert_eq!(
            record.replay(),
            Err(ReplayError::BadMoveChar { index, found: 'X' })
        );
    }

    #[test]
    fn replay_rejects_moves_the_board_forbids() {
        // Walk until some direction is illegal mid-game, then record it.
        let mut session = GameSession::with_seed(3);
        let mut record = RecordedGame::new(3);
        for _ in 0..200 {
            let legal = session.legal_moves();
            if !legal.is_empty() && legal.len() < 4 {
                let illegal = Direction::ALL
                    .into_iter()
                    .find(|d| !legal.contains(d))
                    .expect("some direction is illegal");
                let index = record.moves.chars().count();
                record.push(illegal);
                assert_eq!(
                    record.replay(),
                    Err(ReplayError::IllegalMove {
                        index,
                        direction: illegal
                    })
                );
                return;
            }
            let Some(&direction) = legal.first() else {
                break;
            };
            session.advance(direction).expect("legal move");
            record.push(direction);
        }
        panic!("no live board with an illegal direction reached");
    }

    #[test]
    fn replay_ignores_moves_recorded_after_the_end() {
        // Play a real game to its end, then claim one more move.
        let mut session = GameSession::with_seed(4);
        let mut record = RecordedGame::new(4);
        for _ in 0..100_000 {
            let Some(&direction) = session.legal_moves().first() else {
                break;
            };
            session.advance(direction).expect("legal move");
            record.push(direction);
        }
        assert!(session.is_over(), "seeded game should finish");
        record.push(Direction::Up);
        let outcome = record.replay().expect("trailing moves are ignored");
        assert!(outcome.complete);
        assert_eq!(outcome.turns, session.turn());
        assert_eq!(outcome.board, session.board());
        assert_eq!(outcome.score, session.score());
    }

    #[test]
    fn json_roundtrip_tolerates_extra_fields() {
        let (record, _) = recorded(8, 10);
        let encoded = record.to_json().expect("record encodes");
        assert_eq!(
            RecordedGame::from_json(&encoded).expect("record decodes"),
            record
        );
        let extended = r#"{"seed":8,"moves":"UDLR","note":"from a newer writer"}"#;
        let decoded = RecordedGame::from_json(extended).expect("extra fields are ignored");
        assert_eq!(decoded.seed, 8);
        assert_eq!(decoded.moves, "UDLR");
    }
}
