use core::fmt;
use serde::{Deserialize, Serialize};

/// Internal encoding of a tile. Rank 0 is an empty cell, ranks 1 and 2 are
/// the base tiles with face values 1 and 2, and rank n >= 3 displays as
/// 3·2^(n-3). All board storage works in ranks, never display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rank(u8);

impl Rank {
    pub const EMPTY: Rank = Rank(0);
    pub const ONE: Rank = Rank(1);
    pub const TWO: Rank = Rank(2);
    pub const THREE: Rank = Rank(3);

    /// The three ranks drawn from the physical deck.
    pub const BASE: [Rank; 3] = [Rank::ONE, Rank::TWO, Rank::THREE];

    pub const fn new(raw: u8) -> Self {
        Rank(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Ranks 1..=3, the ones a draw pile cycle contains four of each.
    pub const fn is_base(self) -> bool {
        self.0 >= 1 && self.0 <= 3
    }

    /// Ranks >= 4 spawn through the bonus rule, outside the deck cycle.
    pub const fn is_bonus(self) -> bool {
        self.0 >= 4
    }

    /// Displayed face value of this rank.
    pub const fn value(self) -> u64 {
        match self.0 {
            0 => 0,
            1 => 1,
            2 => 2,
            n => {
                let shift = (n - 3) as u32;
                if shift >= 61 {
                    u64::MAX
                } else {
                    3u64 << shift
                }
            }
        }
    }

    /// Score contribution of this rank: face value below 3, 3^(n-2) above.
    pub const fn score(self) -> u64 {
        match self.0 {
            0 => 0,
            1 => 1,
            2 => 2,
            n => {
                let mut total = 3u64;
                let mut step = 3u8;
                while step < n {
                    total *= 3;
                    step += 1;
                }
                total
            }
        }
    }

    /// Inverse of [`Rank::value`]; `None` for values no rank displays as.
    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            0 => Some(Rank::EMPTY),
            1 => Some(Rank::ONE),
            2 => Some(Rank::TWO),
            _ => {
                if value % 3 != 0 {
                    return None;
                }
                let base = value / 3;
                if !base.is_power_of_two() {
                    return None;
                }
                let raw = 3 + base.trailing_zeros();
                u8::try_from(raw).ok().map(Rank)
            }
        }
    }

    /// Rank produced when this tile merges with `other`, if the pair can
    /// merge at all: 1 and 2 combine into 3, equal ranks >= 3 promote by one.
    pub const fn merges_with(self, other: Rank) -> Option<Rank> {
        match (self.0, other.0) {
            (1, 2) | (2, 1) => Some(Rank::THREE),
            (a, b) if a == b && a >= 3 => Some(Rank(a + 1)),
            _ => None,
        }
    }

    pub const fn successor(self) -> Rank {
        Rank(self.0 + 1)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
