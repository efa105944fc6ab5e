use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::deck::DeckCounts;
use crate::mechanics::{self, MoveError};
use crate::model::board::{BOARD_SIZE, Board};
use crate::model::direction::Direction;
use crate::model::rank::Rank;
use crate::model::tileset::TileSet;

/// Tiles placed before the first move.
const OPENING_TILES: usize = 9;
/// Copies of each base rank in one pile cycle.
const CYCLE_PER_RANK: usize = 4;
/// One bonus draw per this many tileset draws, once bonus tiles unlock.
const BONUS_ODDS: f64 = 1.0 / 24.0;
/// Smallest board rank at which bonus draws start appearing.
const BONUS_UNLOCK_RANK: u8 = 7;

/// A self-played game with the full hidden state: the shuffled pile, the
/// announced upcoming tileset, and the rng that resolves every choice. The
/// same seed always replays the same game.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    pile: Vec<Rank>,
    upcoming: TileSet,
    rng: StdRng,
    seed: u64,
    turn: u32,
}

/// What one move actually did, from the dealer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub direction: Direction,
    pub inserted: Rank,
}

impl GameSession {
    /// Deals an opening board and announces the first upcoming tileset.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pile = Self::shuffled_pile(&mut rng);
        let mut board = Board::empty();
        let cells = rand::seq::index::sample(&mut rng, BOARD_SIZE * BOARD_SIZE, OPENING_TILES);
        for (tile, cell) in pile.drain(..OPENING_TILES).zip(cells.iter()) {
            board.set(cell / BOARD_SIZE, cell % BOARD_SIZE, tile);
        }
        let mut session = GameSession {
            board,
            pile,
            upcoming: TileSet::EMPTY,
            rng,
            seed,
            turn: 0,
        };
        session.upcoming = session.draw_tileset();
        session
    }

    /// Plays one move: slides the board, inserts a tile drawn from the
    /// announced tileset, and announces the next one.
    pub fn advance(&mut self, direction: Direction) -> Result<MoveRecord, MoveError> {
        let choices: Vec<Rank> = self.upcoming.iter().collect();
        let inserted = choices
            .as_slice()
            .choose(&mut self.rng)
            .copied()
            .expect("announced tileset is never empty");
        self.board = mechanics::apply_move(&self.board, direction, inserted, &mut self.rng)?;
        self.turn += 1;
        self.upcoming = self.draw_tileset();
        Ok(MoveRecord { direction, inserted })
    }

    pub fn board(&self) -> Board {
        self.board
    }

    /// The announced tileset for the next insertion.
    pub fn upcoming(&self) -> TileSet {
        self.upcoming
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    pub fn legal_moves(&self) -> Vec<Direction> {
        mechanics::legal_moves(&self.board)
    }

    pub fn is_over(&self) -> bool {
        self.legal_moves().is_empty()
    }

    /// Base tiles still in the pile. Ground truth for deck-tracking checks;
    /// a real opponent never reveals this.
    pub fn pile_counts(&self) -> DeckCounts {
        let count = |rank: Rank| self.pile.iter().filter(|&&r| r == rank).count() as u8;
        DeckCounts::new(count(Rank::ONE), count(Rank::TWO), count(Rank::THREE))
    }

    fn shuffled_pile(rng: &mut StdRng) -> Vec<Rank> {
        let mut pile = Vec::with_capacity(CYCLE_PER_RANK * Rank::BASE.len());
        for rank in Rank::BASE {
            for _ in 0..CYCLE_PER_RANK {
                pile.push(rank);
            }
        }
        pile.shuffle(rng);
        pile
    }

    fn draw_from_pile(&mut self) -> Rank {
        if self.pile.is_empty() {
            self.pile = Self::shuffled_pile(&mut self.rng);
        }
        self.pile.pop().expect("freshly shuffled pile holds twelve tiles")
    }

    /// Draws the next announced tileset from the post-move board state.
    fn draw_tileset(&mut self) -> TileSet {
        let max_rank = self.board.max_rank().raw();
        if max_rank >= BONUS_UNLOCK_RANK && self.rng.gen_bool(BONUS_ODDS) {
            let ceiling = max_rank - 3;
            if max_rank <= 9 {
                return (4..=ceiling).map(Rank::new).collect();
            }
            let top = self.rng.gen_range(6..=ceiling);
            return [top - 2, top - 1, top].into_iter().map(Rank::new).collect();
        }
        TileSet::single(self.draw_from_pile())
    }
}
