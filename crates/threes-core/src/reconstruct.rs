//! Move reconstruction from board observations.
//!
//! Given two successive boards, recovers which direction was played and
//! which tile entered the board. Each direction is tried independently: the
//! before-board is folded without insertion, and the direction is a
//! candidate exactly when the after-board differs from that intermediate in
//! a single cell, that cell is a vacated entry slot, and it now holds a
//! tile. Zero candidates mean the transition is not a legal move at all;
//! more than one means the observation genuinely underdetermines the move.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::mechanics;
use crate::model::board::Board;
use crate::model::direction::Direction;
use crate::model::rank::Rank;

/// One way a before/after pair can be explained: the direction played plus
/// the rank that entered on the trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedMove {
    pub direction: Direction,
    pub inserted: Rank,
}

impl fmt::Display for ReconstructedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} +{}", self.direction, self.inserted)
    }
}

/// Outcome of a successful reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconstruction {
    Unique(ReconstructedMove),
    /// Two to four explanations fit, listed in canonical direction order.
    Ambiguous(Vec<ReconstructedMove>),
}

impl Reconstruction {
    /// The explanation to act on: the unique one, or the first candidate in
    /// canonical direction order when the pair is ambiguous.
    pub fn primary(&self) -> ReconstructedMove {
        match self {
            Reconstruction::Unique(candidate) => *candidate,
            Reconstruction::Ambiguous(candidates) => candidates[0],
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Reconstruction::Ambiguous(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructError {
    /// No direction turns the before-board into the after-board.
    ImpossibleTransition,
}

impl fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructError::ImpossibleTransition => {
                f.write_str("no move explains the board transition")
            }
        }
    }
}

impl std::error::Error for ReconstructError {}

/// Recovers the move that turned `before` into `after`.
pub fn reconstruct(before: &Board, after: &Board) -> Result<Reconstruction, ReconstructError> {
    let mut candidates = Vec::new();
    for direction in Direction::ALL {
        let outcome = mechanics::fold(before, direction);
        if !outcome.any_folded() {
            continue;
        }
        let intermediate = outcome.board();
        let diff = intermediate.differing_cells(after);
        let [(row, col)] = diff.as_slice() else {
            continue;
        };
        let (row, col) = (*row, *col);
        if !outcome.vacated_cells().any(|cell| cell == (row, col)) {
            continue;
        }
        let inserted = after.get(row, col);
        if inserted.is_empty() {
            continue;
        }
        candidates.push(ReconstructedMove { direction, inserted });
    }
    match candidates.len() {
        0 => Err(ReconstructError::ImpossibleTransition),
        1 => Ok(Reconstruction::Unique(candidates[0])),
        _ => Ok(Reconstruction::Ambiguous(candidates)),
    }
}
