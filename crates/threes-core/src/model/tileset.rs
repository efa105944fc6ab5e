use core::fmt;
use serde::{Deserialize, Serialize};

use crate::model::rank::Rank;

/// Bit-mask over ranks describing the sensed "next tile" hint: a singleton
/// when the sensor read an exact tile, several bits for a bonus-range hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSet(u16);

impl TileSet {
    pub const EMPTY: Self = TileSet(0);

    pub fn single(rank: Rank) -> Self {
        TileSet::EMPTY.with(rank)
    }

    pub fn with(mut self, rank: Rank) -> Self {
        if (rank.raw() as usize) < u16::BITS as usize {
            self.0 |= 1 << rank.raw();
        }
        self
    }

    pub fn contains(self, rank: Rank) -> bool {
        if (rank.raw() as usize) >= u16::BITS as usize {
            return false;
        }
        self.0 & (1 << rank.raw()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Lowest rank present, the one the candidate tracker records.
    pub fn smallest(self) -> Option<Rank> {
        if self.is_empty() {
            None
        } else {
            Some(Rank::new(self.0.trailing_zeros() as u8))
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Rank> {
        (0..u16::BITS as u8).filter_map(move |raw| {
            if self.0 & (1 << raw) != 0 {
                Some(Rank::new(raw))
            } else {
                None
            }
        })
    }
}

impl FromIterator<Rank> for TileSet {
    fn from_iter<I: IntoIterator<Item = Rank>>(iter: I) -> Self {
        iter.into_iter().fold(TileSet::EMPTY, TileSet::with)
    }
}

impl fmt::Display for TileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rank in self.iter() {
            if !first {
                write!(f, "/")?;
            }
            write!(f, "{}", rank.value())?;
            first = false;
        }
        if first {
            write!(f, "-")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TileSet;
    use crate::model::rank::Rank;

    #[test]
    fn single_contains_only_that_rank() {
        let tiles = TileSet::single(Rank::TWO);
        assert!(tiles.contains(Rank::TWO));
        assert!(!tiles.contains(Rank::ONE));
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn smallest_picks_lowest_bit() {
        let tiles = TileSet::single(Rank::new(6)).with(Rank::new(4)).with(Rank::new(5));
        assert_eq!(tiles.smallest(), Some(Rank::new(4)));
        assert_eq!(TileSet::EMPTY.smallest(), None);
    }

    #[test]
    fn iter_yields_ranks_in_order() {
        let tiles: TileSet = [Rank::new(5), Rank::ONE, Rank::new(3)].into_iter().collect();
        let ranks: Vec<u8> = tiles.iter().map(Rank::raw).collect();
        assert_eq!(ranks, vec![1, 3, 5]);
    }

    #[test]
    fn display_joins_face_values() {
        let tiles = TileSet::single(Rank::new(4)).with(Rank::new(5)).with(Rank::new(6));
        assert_eq!(tiles.to_string(), "6/12/24");
        assert_eq!(TileSet::EMPTY.to_string(), "-");
    }
}
