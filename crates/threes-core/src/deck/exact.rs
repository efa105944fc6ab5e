use crate::model::board::Board;
use crate::model::rank::Rank;

use super::{DeckCounts, DeckError, DeckTracker};

/// Deck tracker for a game watched from its very first frame: the pile
/// contents are known exactly at every point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactTracker {
    counts: DeckCounts,
}

impl ExactTracker {
    /// Tracker for a fresh game; the opening deal has not been recorded yet.
    pub fn new() -> Self {
        ExactTracker {
            counts: DeckCounts::FULL,
        }
    }

    /// Tracker seeded from an opening board: whatever base tiles are visible
    /// were dealt from the first cycle. Saturates instead of underflowing
    /// because merged threes on the board never came from the pile.
    pub fn from_board(board: &Board) -> Self {
        ExactTracker {
            counts: DeckCounts::FULL.saturating_sub(DeckCounts::tally(board)),
        }
    }
}

impl Default for ExactTracker {
    fn default() -> Self {
        ExactTracker::new()
    }
}

impl DeckTracker for ExactTracker {
    fn record(&mut self, rank: Rank) -> Result<(), DeckError> {
        if !rank.is_base() {
            return Ok(());
        }
        if self.counts.is_exhausted() {
            self.counts = DeckCounts::FULL;
        }
        let slot = self
            .counts
            .count_mut(rank)
            .ok_or(DeckError::Desynchronized { rank })?;
        if *slot == 0 {
            return Err(DeckError::Desynchronized { rank });
        }
        *slot -= 1;
        if self.counts.is_exhausted() {
            self.counts = DeckCounts::FULL;
        }
        Ok(())
    }

    fn remaining(&self, rank: Rank) -> u8 {
        self.counts.count(rank)
    }

    fn counts(&self) -> DeckCounts {
        self.counts
    }

    fn hypothesis_count(&self) -> usize {
        1
    }

    fn label(&self) -> &'static str {
        "exact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_holds_a_full_cycle() {
        let tracker = ExactTracker::new();
        assert_eq!(tracker.counts(), DeckCounts::FULL);
        assert_eq!(tracker.remaining(Rank::TWO), 4);
        assert_eq!(tracker.hypothesis_count(), 1);
    }

    #[test]
    fn seeding_from_a_board_subtracts_visible_tiles() {
        let board = Board::from_ranks([[1, 1, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]);
        let tracker = ExactTracker::from_board(&board);
        assert_eq!(tracker.counts(), DeckCounts::new(2, 3, 4));
    }

    #[test]
    fn seeding_saturates_on_merged_threes() {
        // Seven threes on one board: at most four came from the pile.
        let board = Board::from_ranks([[3, 3, 3, 3], [3, 3, 3, 0], [0; 4], [0; 4]]);
        let tracker = ExactTracker::from_board(&board);
        assert_eq!(tracker.remaining(Rank::THREE), 0);
    }

    #[test]
    fn recording_decrements_until_desynchronized() {
        let mut tracker = ExactTracker::new();
        for _ in 0..4 {
            tracker.record(Rank::ONE).expect("four ones fit one cycle");
        }
        assert_eq!(tracker.remaining(Rank::ONE), 0);
        assert_eq!(
            tracker.record(Rank::ONE),
            Err(DeckError::Desynchronized { rank: Rank::ONE })
        );
    }

    #[test]
    fn exhausting_a_cycle_starts_the_next() {
        let mut tracker = ExactTracker::new();
        for rank in Rank::BASE {
            for _ in 0..4 {
                tracker.record(rank).expect("twelve draws fit one cycle");
            }
        }
        assert_eq!(tracker.counts(), DeckCounts::FULL);
    }

    #[test]
    fn seeding_exhausted_resets_before_the_next_draw() {
        let board = Board::from_ranks([[1, 1, 1, 1], [2, 2, 2, 2], [3, 3, 3, 3], [0; 4]]);
        let mut tracker = ExactTracker::from_board(&board);
        assert!(tracker.counts().is_exhausted());
        tracker.record(Rank::ONE).expect("new cycle supplies a one");
        assert_eq!(tracker.counts(), DeckCounts::new(3, 4, 4));
    }

    #[test]
    fn bonus_ranks_bypass_the_pile() {
        let mut tracker = ExactTracker::new();
        tracker.record(Rank::new(6)).expect("bonus draw is a no-op");
        assert_eq!(tracker.counts(), DeckCounts::FULL);
    }
}
