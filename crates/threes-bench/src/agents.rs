use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use threes_assist::oracle::{MoveOracle, OracleSnapshot};
use threes_core::mechanics;
use threes_core::model::direction::Direction;

use crate::config::OracleKind;

pub fn build_oracle(kind: OracleKind, seed: u64) -> Box<dyn MoveOracle> {
    match kind {
        OracleKind::Random => Box::new(RandomOracle::new(seed)),
        OracleKind::Greedy => Box::new(GreedyOracle),
    }
}

/// Stand-in for the real scoring backend: answers every query with a
/// seeded uniform score derived from (board, direction), so runs stay
/// reproducible without favouring any direction. Declines directions
/// the board cannot fold.
pub struct RandomOracle {
    seed: u64,
}

impl RandomOracle {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn query_seed(&self, snapshot: &OracleSnapshot, direction: Direction) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        for rank in snapshot.board.iter() {
            rank.raw().hash(&mut hasher);
        }
        direction.index().hash(&mut hasher);
        hasher.finish()
    }
}

impl MoveOracle for RandomOracle {
    fn evaluate(&self, snapshot: &OracleSnapshot, direction: Direction) -> f64 {
        if !mechanics::is_legal(&snapshot.board, direction) {
            return f64::NAN;
        }
        let mut rng = StdRng::seed_from_u64(self.query_seed(snapshot, direction));
        rng.gen_range(0.0..1.0)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Scores a direction by the board value right after the fold, before
/// the new tile lands. A weak but honest baseline.
pub struct GreedyOracle;

impl MoveOracle for GreedyOracle {
    fn evaluate(&self, snapshot: &OracleSnapshot, direction: Direction) -> f64 {
        let outcome = mechanics::fold(&snapshot.board, direction);
        if !outcome.any_folded() {
            return f64::NAN;
        }
        outcome.board().score() as f64
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}
