//! Board tiles and the label <-> coordinate bijection.
//!
//! A [`Tile`] is always on the board: every constructor is fallible, so
//! off-grid coordinates never reach the move logic.

use std::fmt;
use std::str::FromStr;

use crate::constants::{N, TILES};
use crate::error::TileError;

/// Labels indexed by `row * N + col`, bottom row first.
const LABELS: [&str; TILES] = [
    "a1", "b1", "c1", "d1", "e1", "f1", //
    "a2", "b2", "c2", "d2", "e2", "f2", //
    "a3", "b3", "c3", "d3", "e3", "f3", //
    "a4", "b4", "c4", "d4", "e4", "f4", //
    "a5", "b5", "c5", "d5", "e5", "f5", //
    "a6", "b6", "c6", "d6", "e6", "f6", //
];

/// Moore-neighbourhood bitmask per tile.
const NEIGHBOR_MASKS: [u64; TILES] = build_neighbor_masks();

const fn build_neighbor_masks() -> [u64; TILES] {
    let mut masks = [0u64; TILES];
    let mut idx = 0;
    while idx < TILES {
        let row = (idx / N) as isize;
        let col = (idx % N) as isize;
        let mut dr = -1;
        while dr <= 1 {
            let mut dc = -1;
            while dc <= 1 {
                let r = row + dr;
                let c = col + dc;
                if (dr != 0 || dc != 0) && r >= 0 && r < N as isize && c >= 0 && c < N as isize {
                    masks[idx] |= 1u64 << (r as usize * N + c as usize);
                }
                dc += 1;
            }
            dr += 1;
        }
        idx += 1;
    }
    masks
}

/// One of the 36 board cells.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(u8);

impl Tile {
    /// Tile at flat index `row * 6 + col`.
    pub const fn from_index(index: usize) -> Option<Tile> {
        if index < TILES {
            Some(Tile(index as u8))
        } else {
            None
        }
    }

    /// Label lookup usable in constant tables. Panics on a bad label.
    pub const fn of(label: &str) -> Tile {
        let b = label.as_bytes();
        if b.len() != 2
            || b[0] < b'a'
            || b[0] >= b'a' + N as u8
            || b[1] < b'1'
            || b[1] >= b'1' + N as u8
        {
            panic!("invalid tile label");
        }
        Tile(((b[1] - b'1') as usize * N + (b[0] - b'a') as usize) as u8)
    }

    /// Tile at signed coordinates, `None` when off the board.
    pub fn at(row: isize, col: isize) -> Option<Tile> {
        if (0..N as isize).contains(&row) && (0..N as isize).contains(&col) {
            Some(Tile((row as usize * N + col as usize) as u8))
        } else {
            None
        }
    }

    /// Like [`Tile::at`] but reports the failure.
    pub fn try_at(row: isize, col: isize) -> Result<Tile, TileError> {
        Tile::at(row, col).ok_or(TileError::OffBoard { row, col })
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.0 as usize / N
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.0 as usize % N
    }

    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    pub fn label(self) -> &'static str {
        LABELS[self.index()]
    }

    /// The tile `(d_row, d_col)` away, if it is on the board.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Tile> {
        Tile::at(self.row() as isize + d_row, self.col() as isize + d_col)
    }

    /// Manhattan distance.
    pub fn distance(self, other: Tile) -> usize {
        self.row().abs_diff(other.row()) + self.col().abs_diff(other.col())
    }

    /// Bitmask of the up to 8 surrounding tiles.
    #[inline]
    pub fn neighbor_mask(self) -> u64 {
        NEIGHBOR_MASKS[self.index()]
    }

    pub fn neighbors(self) -> impl Iterator<Item = Tile> {
        tiles_in(self.neighbor_mask())
    }

    /// All tiles in index order.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..TILES as u8).map(Tile)
    }
}

/// Iterate the tiles set in `mask`, lowest index first.
pub fn tiles_in(mut mask: u64) -> impl Iterator<Item = Tile> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let idx = mask.trailing_zeros();
        mask &= mask - 1;
        Some(Tile(idx as u8))
    })
}

impl FromStr for Tile {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LABELS
            .iter()
            .position(|label| *label == s)
            .map(|idx| Tile(idx as u8))
            .ok_or_else(|| TileError::BadLabel(s.to_string()))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(label: &str) -> Tile {
        label.parse().unwrap()
    }

    #[test]
    fn test_label_to_coords() {
        assert_eq!((t("a1").row(), t("a1").col()), (0, 0));
        assert_eq!((t("f6").row(), t("f6").col()), (5, 5));
        assert_eq!((t("b4").row(), t("b4").col()), (3, 1));
        assert!("h8".parse::<Tile>().is_err());
        assert!("a0".parse::<Tile>().is_err());
        assert!("a".parse::<Tile>().is_err());
    }

    #[test]
    fn test_coords_to_label() {
        assert_eq!(Tile::at(0, 0).unwrap().label(), "a1");
        assert_eq!(Tile::at(5, 5).unwrap().label(), "f6");
        assert!(Tile::at(7, 7).is_none());
        assert!(Tile::at(-1, 0).is_none());
        assert!(matches!(Tile::try_at(6, 0), Err(TileError::OffBoard { .. })));
    }

    #[test]
    fn test_bijection() {
        for tile in Tile::all() {
            assert_eq!(tile.label().parse::<Tile>().unwrap(), tile);
            assert_eq!(Tile::at(tile.row() as isize, tile.col() as isize), Some(tile));
        }
    }

    #[test]
    fn test_neighbor_counts() {
        assert_eq!(t("a1").neighbors().count(), 3);
        assert_eq!(t("a3").neighbors().count(), 5);
        assert_eq!(t("c3").neighbors().count(), 8);
        let around_b2: Vec<_> = t("b2").neighbors().map(Tile::label).collect();
        assert_eq!(around_b2, ["a1", "b1", "c1", "a2", "c2", "a3", "b3", "c3"]);
    }

    #[test]
    fn test_distance() {
        assert_eq!(t("a1").distance(t("f6")), 10);
        assert_eq!(t("c2").distance(t("c2")), 0);
        assert_eq!(t("a4").distance(t("b3")), 2);
    }
}
