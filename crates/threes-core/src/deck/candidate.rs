use crate::model::board::Board;
use crate::model::rank::Rank;

use super::{DeckCounts, DeckError, DeckTracker};

/// Largest per-rank count a cycle can hold.
const CYCLE_PER_RANK: u8 = 4;

/// Deck tracker for a game joined mid-way: the pile contents are unknown,
/// so it carries every deck still consistent with the evidence and lets
/// observed draws kill hypotheses off.
///
/// The seed set uses one structural fact: a cycle deals as many ones as
/// twos, so remaining ones plus visible ones must equal remaining twos plus
/// visible twos. Visible threes say nothing because threes are also made by
/// merging. Duplicate hypotheses are kept on purpose; they weight the
/// estimate toward the decks more paths lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTracker {
    hypotheses: Vec<DeckCounts>,
}

impl CandidateTracker {
    /// Seeds the hypothesis set from a mid-game board.
    pub fn from_board(board: &Board) -> Result<Self, DeckError> {
        let seen = DeckCounts::tally(board);
        let mut hypotheses = Vec::new();
        for ones in 0..=CYCLE_PER_RANK {
            for twos in 0..=CYCLE_PER_RANK {
                for threes in 0..=CYCLE_PER_RANK {
                    let candidate = DeckCounts::new(ones, twos, threes);
                    if candidate.is_exhausted() {
                        continue;
                    }
                    if candidate.ones + seen.ones != candidate.twos + seen.twos {
                        continue;
                    }
                    hypotheses.push(candidate);
                }
            }
        }
        if hypotheses.is_empty() {
            return Err(DeckError::NoConsistentDeck);
        }
        Ok(CandidateTracker { hypotheses })
    }

    pub fn hypotheses(&self) -> &[DeckCounts] {
        &self.hypotheses
    }

    /// True once a single hypothesis survives; from here the tracker is as
    /// sharp as an exact one.
    pub fn is_converged(&self) -> bool {
        self.hypotheses.len() == 1
    }
}

impl DeckTracker for CandidateTracker {
    fn record(&mut self, rank: Rank) -> Result<(), DeckError> {
        if !rank.is_base() {
            return Ok(());
        }
        let next: Vec<DeckCounts> = self
            .hypotheses
            .iter()
            .copied()
            .filter_map(|mut candidate| {
                let slot = candidate.count_mut(rank)?;
                if *slot == 0 {
                    return None;
                }
                *slot -= 1;
                Some(if candidate.is_exhausted() {
                    DeckCounts::FULL
                } else {
                    candidate
                })
            })
            .collect();
        if next.is_empty() {
            return Err(DeckError::Desynchronized { rank });
        }
        self.hypotheses = next;
        Ok(())
    }

    /// Mean over the surviving hypotheses, rounded half away from zero.
    fn remaining(&self, rank: Rank) -> u8 {
        match self.hypotheses.as_slice() {
            [] => 0,
            [only] => only.count(rank),
            all => {
                let sum: u32 = all.iter().map(|c| u32::from(c.count(rank))).sum();
                (f64::from(sum) / all.len() as f64).round() as u8
            }
        }
    }

    fn hypothesis_count(&self) -> usize {
        self.hypotheses.len()
    }

    fn label(&self) -> &'static str {
        "candidate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_admits_every_balanced_deck() {
        let tracker = CandidateTracker::from_board(&Board::empty()).expect("seed succeeds");
        // ones == twos in {0..4} crossed with free threes, minus the empty deck.
        assert_eq!(tracker.hypothesis_count(), 24);
        assert_eq!(tracker.remaining(Rank::ONE), 2);
        assert_eq!(tracker.remaining(Rank::THREE), 2);
    }

    #[test]
    fn visible_imbalance_narrows_the_seed() {
        let board = Board::from_ranks([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let tracker = CandidateTracker::from_board(&board).expect("seed succeeds");
        // Four visible ones force a deck with zero ones and four twos.
        assert_eq!(tracker.hypothesis_count(), 5);
        assert_eq!(tracker.remaining(Rank::ONE), 0);
        assert_eq!(tracker.remaining(Rank::TWO), 4);
    }

    #[test]
    fn estimate_rounds_half_away_from_zero() {
        let board = Board::from_ranks([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let mut tracker = CandidateTracker::from_board(&board).expect("seed succeeds");
        tracker.record(Rank::THREE).expect("a three is drawable");
        // Surviving threes counts are 0..=3; their mean 1.5 rounds to 2.
        assert_eq!(tracker.hypothesis_count(), 4);
        assert_eq!(tracker.remaining(Rank::THREE), 2);
    }

    #[test]
    fn observed_draws_converge_to_a_single_deck() {
        let board = Board::from_ranks([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let mut tracker = CandidateTracker::from_board(&board).expect("seed succeeds");
        for _ in 0..4 {
            tracker.record(Rank::THREE).expect("threes remain drawable");
        }
        assert!(tracker.is_converged());
        assert_eq!(tracker.counts(), DeckCounts::new(0, 4, 0));
        assert_eq!(tracker.remaining(Rank::TWO), 4);
    }

    #[test]
    fn contradicted_hypotheses_desynchronize() {
        let board = Board::from_ranks([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let mut tracker = CandidateTracker::from_board(&board).expect("seed succeeds");
        assert_eq!(
            tracker.record(Rank::ONE),
            Err(DeckError::Desynchronized { rank: Rank::ONE })
        );
        // The set is left untouched for the caller to reseed or continue.
        assert_eq!(tracker.hypothesis_count(), 5);
    }

    #[test]
    fn exhausted_hypotheses_reshuffle_to_full() {
        let board = Board::from_ranks([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let mut tracker = CandidateTracker::from_board(&board).expect("seed succeeds");
        for _ in 0..4 {
            tracker.record(Rank::TWO).expect("twos remain drawable");
        }
        assert_eq!(tracker.hypothesis_count(), 5);
        assert!(tracker.hypotheses().contains(&DeckCounts::FULL));
    }

    #[test]
    fn bonus_ranks_do_not_touch_the_set() {
        let tracker_before = CandidateTracker::from_board(&Board::empty()).expect("seed succeeds");
        let mut tracker = tracker_before.clone();
        tracker.record(Rank::new(7)).expect("bonus draw is a no-op");
        assert_eq!(tracker, tracker_before);
    }
}
