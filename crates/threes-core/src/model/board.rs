use core::fmt;
use serde::{Deserialize, Serialize};

use crate::model::rank::Rank;

/// Number of rows and columns of the playing grid.
pub const BOARD_SIZE: usize = 4;

/// A 4x4 grid of ranks. Boards are small plain values; every turn replaces
/// the whole board rather than mutating cells in place, so copies are cheap
/// and nothing aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Rank; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub const fn empty() -> Self {
        Board {
            cells: [[Rank::EMPTY; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Builds a board from raw rank numbers, row-major.
    pub fn from_ranks(raw: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        let mut board = Board::empty();
        for (r, row) in raw.iter().enumerate() {
            for (c, &rank) in row.iter().enumerate() {
                board.cells[r][c] = Rank::new(rank);
            }
        }
        board
    }

    pub const fn get(&self, row: usize, col: usize) -> Rank {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, rank: Rank) {
        self.cells[row][col] = rank;
    }

    pub fn iter(&self) -> impl Iterator<Item = Rank> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }

    /// How many cells currently hold `rank`.
    pub fn count_of(&self, rank: Rank) -> u8 {
        self.iter().filter(|&cell| cell == rank).count() as u8
    }

    pub fn max_rank(&self) -> Rank {
        self.iter().max().unwrap_or(Rank::EMPTY)
    }

    pub fn occupied(&self) -> u8 {
        self.iter().filter(|cell| !cell.is_empty()).count() as u8
    }

    /// Total score over all cells.
    pub fn score(&self) -> u64 {
        self.iter().map(Rank::score).sum()
    }

    /// The coordinates where the two boards disagree.
    pub fn differing_cells(&self, other: &Board) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if self.cells[row][col] != other.cells[row][col] {
                    cells.push((row, col));
                }
            }
        }
        cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                if cell.is_empty() {
                    write!(f, "{:>4}", ".")?;
                } else {
                    write!(f, "{:>4}", cell.value())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::model::rank::Rank;

    #[test]
    fn from_ranks_places_cells_row_major() {
        let board = Board::from_ranks([[0, 1, 0, 0], [0, 0, 0, 0], [0, 0, 2, 0], [0, 0, 0, 3]]);
        assert_eq!(board.get(0, 1), Rank::ONE);
        assert_eq!(board.get(2, 2), Rank::TWO);
        assert_eq!(board.get(3, 3), Rank::THREE);
        assert_eq!(board.occupied(), 3);
    }

    #[test]
    fn tallies_and_max() {
        let board = Board::from_ranks([[1, 1, 2, 0], [0, 3, 0, 0], [5, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(board.count_of(Rank::ONE), 2);
        assert_eq!(board.count_of(Rank::TWO), 1);
        assert_eq!(board.count_of(Rank::THREE), 1);
        assert_eq!(board.max_rank(), Rank::new(5));
    }

    #[test]
    fn score_sums_cells() {
        let board = Board::from_ranks([[1, 2, 3, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(board.score(), 1 + 2 + 3 + 9);
    }

    #[test]
    fn differing_cells_reports_coordinates() {
        let a = Board::from_ranks([[0, 0, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let b = Board::from_ranks([[0, 0, 0, 0], [0, 2, 0, 0], [0, 0, 0, 3], [0, 0, 0, 0]]);
        assert_eq!(a.differing_cells(&b), vec![(1, 1), (2, 3)]);
        assert!(a.differing_cells(&a).is_empty());
    }

    #[test]
    fn display_renders_aligned_grid() {
        let board = Board::from_ranks([[0, 1, 0, 0], [0, 0, 12, 0], [0, 0, 0, 0], [0, 0, 0, 2]]);
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("1"));
        assert!(lines[1].contains("1536"));
    }
}
