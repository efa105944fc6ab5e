//! Pure board mechanics: line extraction per direction, fold detection and
//! application, legality, and move application.
//!
//! Lines are copied out of the board and written back explicitly; nothing
//! here holds a view into a board while mutating it.

use core::fmt;

use rand::Rng;

use crate::model::board::{BOARD_SIZE, Board};
use crate::model::direction::Direction;
use crate::model::rank::Rank;

/// One row or column in move-order: slot 0 is where tiles fold toward,
/// slot 3 is the trailing edge where new tiles enter.
pub type Line = [Rank; BOARD_SIZE];

/// Board coordinates of a line slot under the given direction's mapping.
const fn cell_at(direction: Direction, line: usize, slot: usize) -> (usize, usize) {
    match direction {
        Direction::Up => (slot, line),
        Direction::Down => (BOARD_SIZE - 1 - slot, line),
        Direction::Left => (line, slot),
        Direction::Right => (line, BOARD_SIZE - 1 - slot),
    }
}

/// Copies the four lines of `board` in move-order for `direction`.
pub fn lines_for(board: &Board, direction: Direction) -> [Line; 4] {
    let mut lines = [[Rank::EMPTY; BOARD_SIZE]; 4];
    for (index, line) in lines.iter_mut().enumerate() {
        for (slot, cell) in line.iter_mut().enumerate() {
            let (row, col) = cell_at(direction, index, slot);
            *cell = board.get(row, col);
        }
    }
    lines
}

/// Inverse of [`lines_for`]: writes four move-order lines back into a board.
pub fn write_lines(lines: &[Line; 4], direction: Direction) -> Board {
    let mut board = Board::empty();
    for (index, line) in lines.iter().enumerate() {
        for (slot, &cell) in line.iter().enumerate() {
            let (row, col) = cell_at(direction, index, slot);
            board.set(row, col, cell);
        }
    }
    board
}

/// First slot index at which `line` folds, scanning from the front. A slot
/// folds when a tile slides into an empty cell or when adjacent tiles merge.
pub fn find_fold(line: &Line) -> Option<usize> {
    for i in 0..BOARD_SIZE - 1 {
        if line[i].is_empty() && !line[i + 1].is_empty() {
            return Some(i);
        }
        if line[i].merges_with(line[i + 1]).is_some() {
            return Some(i);
        }
    }
    None
}

/// Folds `line` at `pos`: combines the pair, shifts the tail forward, and
/// leaves slot 3 vacated.
pub fn apply_fold(line: &mut Line, pos: usize) {
    if line[pos].is_empty() {
        line[pos] = line[pos + 1];
    } else if line[pos] < Rank::THREE {
        line[pos] = Rank::THREE;
    } else {
        line[pos] = line[pos].successor();
    }
    for slot in pos + 1..BOARD_SIZE - 1 {
        line[slot] = line[slot + 1];
    }
    line[BOARD_SIZE - 1] = Rank::EMPTY;
}

/// Folded-but-uninserted intermediate of one move: every foldable line has
/// been folded, and each folded line's slot 3 sits vacated.
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    direction: Direction,
    lines: [Line; 4],
    folded: [bool; 4],
}

impl FoldOutcome {
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub fn any_folded(&self) -> bool {
        self.folded.iter().any(|&f| f)
    }

    pub fn is_folded(&self, line: usize) -> bool {
        self.folded[line]
    }

    pub fn folded_lines(&self) -> impl Iterator<Item = usize> + '_ {
        (0..4).filter(|&line| self.folded[line])
    }

    /// Board coordinates of every vacated slot.
    pub fn vacated_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.folded_lines()
            .map(|line| cell_at(self.direction, line, BOARD_SIZE - 1))
    }

    /// The intermediate as a full board, insertion still pending.
    pub fn board(&self) -> Board {
        write_lines(&self.lines, self.direction)
    }

    /// Completes the move by placing `rank` on the vacated slot of `line`.
    fn insert(mut self, line: usize, rank: Rank) -> Board {
        self.lines[line][BOARD_SIZE - 1] = rank;
        write_lines(&self.lines, self.direction)
    }
}

/// Folds every foldable line of `board` for `direction`. The result may have
/// no folded lines at all, which is what makes the direction illegal.
pub fn fold(board: &Board, direction: Direction) -> FoldOutcome {
    let mut lines = lines_for(board, direction);
    let mut folded = [false; 4];
    for (index, line) in lines.iter_mut().enumerate() {
        if let Some(pos) = find_fold(line) {
            apply_fold(line, pos);
            folded[index] = true;
        }
    }
    FoldOutcome {
        direction,
        lines,
        folded,
    }
}

pub fn is_legal(board: &Board, direction: Direction) -> bool {
    lines_for(board, direction)
        .iter()
        .any(|line| find_fold(line).is_some())
}

/// Directions with at least one foldable line, in canonical order.
pub fn legal_moves(board: &Board) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&direction| is_legal(board, direction))
        .collect()
}

/// Applies a full move: folds every foldable line, then drops `inserted`
/// onto the vacated slot of one folded line chosen uniformly at random.
pub fn apply_move<R: Rng + ?Sized>(
    board: &Board,
    direction: Direction,
    inserted: Rank,
    rng: &mut R,
) -> Result<Board, MoveError> {
    let outcome = fold(board, direction);
    let folded: Vec<usize> = outcome.folded_lines().collect();
    if folded.is_empty() {
        return Err(MoveError::IllegalMove { direction });
    }
    let line = folded[rng.gen_range(0..folded.len())];
    Ok(outcome.insert(line, inserted))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The direction has no foldable line; callers must check legality first.
    IllegalMove { direction: Direction },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::IllegalMove { direction } => {
                write!(f, "move {direction} has no foldable line")
            }
        }
    }
}

impl std::error::Error for MoveError {}
