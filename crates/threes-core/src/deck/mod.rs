//! Draw-pile tracking.
//!
//! The pile deals the base ranks in cycles of twelve, four of each. Knowing
//! how many of each rank remain in the current cycle is what makes tile
//! prediction better than a uniform guess. [`ExactTracker`] follows a game
//! watched from its first frame; [`CandidateTracker`] joins mid-game and
//! narrows a set of deck hypotheses by constraint propagation instead.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::rank::Rank;

mod candidate;
mod exact;

pub use candidate::CandidateTracker;
pub use exact::ExactTracker;

/// Remaining copies of each base rank in one deal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCounts {
    pub ones: u8,
    pub twos: u8,
    pub threes: u8,
}

impl DeckCounts {
    /// A freshly shuffled cycle.
    pub const FULL: DeckCounts = DeckCounts::new(4, 4, 4);
    pub const EMPTY: DeckCounts = DeckCounts::new(0, 0, 0);

    pub const fn new(ones: u8, twos: u8, threes: u8) -> Self {
        DeckCounts { ones, twos, threes }
    }

    /// Counts the base-rank tiles visible on `board`. Bonus tiles never
    /// came from the pile and are not counted.
    pub fn tally(board: &Board) -> Self {
        DeckCounts::new(
            board.count_of(Rank::ONE),
            board.count_of(Rank::TWO),
            board.count_of(Rank::THREE),
        )
    }

    pub const fn count(self, rank: Rank) -> u8 {
        match rank.raw() {
            1 => self.ones,
            2 => self.twos,
            3 => self.threes,
            _ => 0,
        }
    }

    fn count_mut(&mut self, rank: Rank) -> Option<&mut u8> {
        match rank.raw() {
            1 => Some(&mut self.ones),
            2 => Some(&mut self.twos),
            3 => Some(&mut self.threes),
            _ => None,
        }
    }

    pub const fn total(self) -> u8 {
        self.ones + self.twos + self.threes
    }

    pub const fn is_exhausted(self) -> bool {
        self.total() == 0
    }

    pub const fn saturating_sub(self, other: DeckCounts) -> Self {
        DeckCounts::new(
            self.ones.saturating_sub(other.ones),
            self.twos.saturating_sub(other.twos),
            self.threes.saturating_sub(other.threes),
        )
    }
}

impl fmt::Display for DeckCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1:{} 2:{} 3:{}", self.ones, self.twos, self.threes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    /// A drawn rank the tracked deck cannot supply; the tracker no longer
    /// matches the real pile and must be reseeded.
    Desynchronized { rank: Rank },
    /// No deck hypothesis is consistent with the observed board.
    NoConsistentDeck,
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Desynchronized { rank } => {
                write!(f, "deck cannot supply a {rank}; tracker is desynchronized")
            }
            DeckError::NoConsistentDeck => {
                f.write_str("no deck hypothesis is consistent with the board")
            }
        }
    }
}

impl std::error::Error for DeckError {}

/// Common surface of the two pile trackers.
pub trait DeckTracker: Send {
    /// Records a tile drawn from the pile. Bonus ranks bypass the pile and
    /// are accepted without effect.
    fn record(&mut self, rank: Rank) -> Result<(), DeckError>;

    /// Estimated remaining copies of `rank` in the current cycle.
    fn remaining(&self, rank: Rank) -> u8;

    /// Point estimate of the whole cycle.
    fn counts(&self) -> DeckCounts {
        DeckCounts::new(
            self.remaining(Rank::ONE),
            self.remaining(Rank::TWO),
            self.remaining(Rank::THREE),
        )
    }

    /// Number of deck hypotheses currently alive.
    fn hypothesis_count(&self) -> usize;

    fn label(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_ignores_empty_and_bonus_cells() {
        let board = Board::from_ranks([[1, 1, 2, 0], [3, 4, 5, 0], [0, 0, 3, 1], [6, 2, 0, 0]]);
        assert_eq!(DeckCounts::tally(&board), DeckCounts::new(3, 2, 2));
    }

    #[test]
    fn count_is_zero_outside_base_ranks() {
        let counts = DeckCounts::new(1, 2, 3);
        assert_eq!(counts.count(Rank::EMPTY), 0);
        assert_eq!(counts.count(Rank::new(4)), 0);
        assert_eq!(counts.count(Rank::TWO), 2);
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let lhs = DeckCounts::new(4, 4, 4);
        let rhs = DeckCounts::new(2, 5, 4);
        assert_eq!(lhs.saturating_sub(rhs), DeckCounts::new(2, 0, 0));
    }

    #[test]
    fn display_lists_all_three_ranks() {
        assert_eq!(DeckCounts::new(4, 0, 2).to_string(), "1:4 2:0 3:2");
    }
}
