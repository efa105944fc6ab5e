use rayon::prelude::*;

use threes_core::deck::DeckCounts;
use threes_core::model::board::Board;
use threes_core::model::direction::Direction;
use threes_core::model::tileset::TileSet;

/// Read-only game state handed to every oracle query. Queries for the four
/// directions each get their own copy, so evaluations never share state.
#[derive(Debug, Clone, Copy)]
pub struct OracleSnapshot {
    pub board: Board,
    pub deck: DeckCounts,
    pub upcoming: TileSet,
}

/// Desirability the oracle assigned to one direction.
#[derive(Debug, Clone, Copy)]
pub struct DirectionScore {
    pub direction: Direction,
    pub score: f64,
}

/// Move scorer consulted once per direction each turn.
pub trait MoveOracle: Send + Sync {
    /// Scores playing `direction` from `snapshot`. NaN means the oracle sees
    /// no playable move that way.
    fn evaluate(&self, snapshot: &OracleSnapshot, direction: Direction) -> f64;

    fn name(&self) -> &'static str;
}

/// Scores all four directions in canonical order, fanning the queries out
/// across threads when asked to.
pub fn score_directions(
    oracle: &dyn MoveOracle,
    snapshot: OracleSnapshot,
    parallel: bool,
) -> Vec<DirectionScore> {
    let evaluate = |direction: Direction| DirectionScore {
        direction,
        score: oracle.evaluate(&snapshot, direction),
    };
    if parallel {
        Direction::ALL.par_iter().copied().map(evaluate).collect()
    } else {
        Direction::ALL.iter().copied().map(evaluate).collect()
    }
}

/// The highest-scoring direction the oracle is willing to play; earlier
/// directions win ties.
pub fn best_direction(scores: &[DirectionScore]) -> Option<Direction> {
    let mut best: Option<DirectionScore> = None;
    for entry in scores {
        if entry.score.is_nan() {
            continue;
        }
        match best {
            Some(leader) if entry.score <= leader.score => {}
            _ => best = Some(*entry),
        }
    }
    best.map(|entry| entry.direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TableOracle {
        up: f64,
        down: f64,
        left: f64,
        right: f64,
    }

    impl MoveOracle for TableOracle {
        fn evaluate(&self, _snapshot: &OracleSnapshot, direction: Direction) -> f64 {
            match direction {
                Direction::Up => self.up,
                Direction::Down => self.down,
                Direction::Left => self.left,
                Direction::Right => self.right,
            }
        }

        fn name(&self) -> &'static str {
            "table"
        }
    }

    fn snapshot() -> OracleSnapshot {
        OracleSnapshot {
            board: Board::empty(),
            deck: DeckCounts::FULL,
            upcoming: TileSet::EMPTY,
        }
    }

    #[test]
    fn scores_keep_canonical_direction_order() {
        let oracle = TableOracle {
            up: 1.0,
            down: 2.0,
            left: 3.0,
            right: 4.0,
        };
        for parallel in [false, true] {
            let scores = score_directions(&oracle, snapshot(), parallel);
            let order: Vec<Direction> = scores.iter().map(|entry| entry.direction).collect();
            assert_eq!(order, Direction::ALL.to_vec());
            assert_eq!(scores[2].score, 3.0);
        }
    }

    #[test]
    fn best_direction_picks_the_maximum() {
        let oracle = TableOracle {
            up: 0.25,
            down: 1.5,
            left: 0.75,
            right: -2.0,
        };
        let scores = score_directions(&oracle, snapshot(), false);
        assert_eq!(best_direction(&scores), Some(Direction::Down));
    }

    #[test]
    fn ties_go_to_the_earlier_direction() {
        let oracle = TableOracle {
            up: 1.0,
            down: 5.0,
            left: 5.0,
            right: 5.0,
        };
        let scores = score_directions(&oracle, snapshot(), false);
        assert_eq!(best_direction(&scores), Some(Direction::Down));
    }

    #[test]
    fn declined_directions_are_skipped() {
        let oracle = TableOracle {
            up: f64::NAN,
            down: f64::NAN,
            left: 0.5,
            right: f64::NAN,
        };
        let scores = score_directions(&oracle, snapshot(), true);
        assert_eq!(best_direction(&scores), Some(Direction::Left));
    }

    #[test]
    fn an_oracle_declining_everything_yields_none() {
        let oracle = TableOracle {
            up: f64::NAN,
            down: f64::NAN,
            left: f64::NAN,
            right: f64::NAN,
        };
        let scores = score_directions(&oracle, snapshot(), true);
        assert_eq!(best_direction(&scores), None);
    }
}
