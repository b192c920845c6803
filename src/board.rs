//! Board state, move legality, and game outcome.
//!
//! A piece may travel in a straight line (never diagonally) exactly as many
//! tiles as there are occupied tiles around it, over empty tiles only, and may
//! not enter its own home tile. A side wins by occupying the opponent's home
//! tile, or when the side to move has no legal move.

use std::fmt;

use crate::constants::{DIRECTIONS, FIRST_HOME, FIRST_START, N, SECOND_HOME, SECOND_START, TILES};
use crate::error::IllegalMove;
use crate::moves::Move;
use crate::tile::{Tile, tiles_in};

const FIRST_HOME_TILE: Tile = Tile::of(FIRST_HOME);
const SECOND_HOME_TILE: Tile = Tile::of(SECOND_HOME);

/// Tile owner, side to move, or winner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    None,
    First,
    Second,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
            Side::None => Side::None,
        }
    }

    /// +1 for First, -1 for Second, 0 for None.
    pub fn sign(self) -> f64 {
        match self {
            Side::First => 1.0,
            Side::Second => -1.0,
            Side::None => 0.0,
        }
    }

    fn slot(self) -> Option<usize> {
        match self {
            Side::First => Some(0),
            Side::Second => Some(1),
            Side::None => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::None => "None",
            Side::First => "First",
            Side::Second => "Second",
        };
        f.write_str(name)
    }
}

/// How a game was decided.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WinReason {
    None,
    HomeReached,
    NoMovesLeft,
}

/// Result of [`Board::outcome`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Side,
    pub reason: WinReason,
}

impl Outcome {
    pub const UNDECIDED: Outcome = Outcome {
        winner: Side::None,
        reason: WinReason::None,
    };

    pub fn is_decided(&self) -> bool {
        self.reason != WinReason::None
    }
}

/// The 6x6 game state.
///
/// `neighbor_count[t]` is kept equal to the number of occupied tiles around
/// `t` by every placement change, so move generation never recounts.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    grid: [Side; TILES],
    neighbor_count: [u8; TILES],
    pieces: [u64; 2],
    home: [Tile; 2],
    side_to_move: Side,
    ply: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The opening position, First to move.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for label in FIRST_START {
            board.place(Tile::of(label), Side::First);
        }
        for label in SECOND_START {
            board.place(Tile::of(label), Side::Second);
        }
        board
    }

    /// A board with no pieces, First to move.
    pub(crate) fn empty() -> Self {
        Self {
            grid: [Side::None; TILES],
            neighbor_count: [0; TILES],
            pieces: [0; 2],
            home: [FIRST_HOME_TILE, SECOND_HOME_TILE],
            side_to_move: Side::First,
            ply: 0,
        }
    }

    /// Put a piece on an empty tile. `side` must not be `None`.
    pub(crate) fn place(&mut self, tile: Tile, side: Side) {
        let Some(slot) = side.slot() else { return };
        debug_assert_eq!(self.grid[tile.index()], Side::None);
        self.grid[tile.index()] = side;
        self.pieces[slot] |= tile.bit();
        for n in tile.neighbors() {
            self.neighbor_count[n.index()] += 1;
        }
    }

    /// Take the piece off an occupied tile.
    fn lift(&mut self, tile: Tile) -> Side {
        let side = self.grid[tile.index()];
        if let Some(slot) = side.slot() {
            self.grid[tile.index()] = Side::None;
            self.pieces[slot] &= !tile.bit();
            for n in tile.neighbors() {
                self.neighbor_count[n.index()] -= 1;
            }
        }
        side
    }

    #[inline]
    pub fn content(&self, tile: Tile) -> Side {
        self.grid[tile.index()]
    }

    /// Occupied tiles around `tile`; also the distance a piece there must travel.
    #[inline]
    pub fn neighbor_count(&self, tile: Tile) -> usize {
        self.neighbor_count[tile.index()] as usize
    }

    /// Tiles held by `side`, lowest index first.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Tile> {
        tiles_in(self.piece_mask(side))
    }

    pub fn piece_count(&self, side: Side) -> usize {
        self.piece_mask(side).count_ones() as usize
    }

    pub(crate) fn piece_mask(&self, side: Side) -> u64 {
        side.slot().map_or(0, |slot| self.pieces[slot])
    }

    /// The tile `side` may never enter and the opponent wins by reaching.
    pub fn home_tile(&self, side: Side) -> Option<Tile> {
        side.slot().map(|slot| self.home[slot])
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// For restoring a position from a placement-only codec.
    pub fn set_side_to_move(&mut self, side: Side) {
        if side != Side::None {
            self.side_to_move = side;
        }
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub(crate) fn set_ply(&mut self, ply: u32) {
        self.ply = ply;
    }

    /// Check `mv` for `mover` without touching the board.
    pub fn check_move(&self, mv: &Move, mover: Side) -> Result<(), IllegalMove> {
        let owner = self.content(mv.from);
        if owner == Side::None {
            return Err(IllegalMove::EmptyOrigin(mv.from));
        }
        if owner != mover {
            return Err(IllegalMove::WrongSide {
                tile: mv.from,
                owner,
                mover,
            });
        }
        let Some((dr, dc)) = mv.direction() else {
            return Err(IllegalMove::NotStraight);
        };
        let expected = self.neighbor_count(mv.from);
        let actual = mv.distance();
        if actual != expected {
            return Err(IllegalMove::WrongDistance { expected, actual });
        }
        for step in 1..=actual as isize {
            if let Some(tile) = mv.from.offset(dr * step, dc * step) {
                if self.content(tile) != Side::None {
                    return Err(IllegalMove::PathBlocked(tile));
                }
            }
        }
        if Some(mv.to) == self.home_tile(owner) {
            return Err(IllegalMove::OwnHome(mv.to));
        }
        Ok(())
    }

    pub fn is_move_legal(&self, mv: &Move, mover: Side) -> bool {
        self.check_move(mv, mover).is_ok()
    }

    /// Play `mv` for the side to move. The board is unchanged on error.
    pub fn apply_move(&mut self, mv: &Move) -> Result<(), IllegalMove> {
        self.check_move(mv, self.side_to_move)?;
        let side = self.lift(mv.from);
        self.place(mv.to, side);
        self.side_to_move = self.side_to_move.opposite();
        self.ply += 1;
        Ok(())
    }

    /// Copy of the board with `mv` applied.
    pub fn after(&self, mv: &Move) -> Result<Board, IllegalMove> {
        let mut next = *self;
        next.apply_move(mv)?;
        Ok(next)
    }

    /// Legal moves for `side`: pieces in ascending tile order, each probed
    /// left, right, down, up.
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(16);
        for tile in self.pieces(side) {
            self.moves_from(tile, side, |mv| {
                moves.push(mv);
                true
            });
        }
        moves
    }

    /// Whether `side` has at least one legal move.
    pub fn has_legal_move(&self, side: Side) -> bool {
        self.pieces(side)
            .any(|tile| !self.moves_from(tile, side, |_| false))
    }

    /// Feed each legal move from `tile` to `visit` until it returns false.
    /// Returns false if stopped early.
    fn moves_from(&self, tile: Tile, side: Side, mut visit: impl FnMut(Move) -> bool) -> bool {
        let distance = self.neighbor_count(tile) as isize;
        if distance == 0 {
            return true;
        }
        let own_home = self.home_tile(side);
        for (dc, dr) in DIRECTIONS {
            let Some(dest) = tile.offset(dr * distance, dc * distance) else {
                continue;
            };
            if Some(dest) == own_home {
                continue;
            }
            let clear = (1..=distance).all(|step| {
                tile.offset(dr * step, dc * step)
                    .is_some_and(|t| self.content(t) == Side::None)
            });
            if clear && !visit(Move::new(tile, dest)) {
                return false;
            }
        }
        true
    }

    /// Home capture is checked before running out of moves.
    pub fn outcome(&self) -> Outcome {
        for side in [Side::First, Side::Second] {
            let intruder = side.opposite();
            if let Some(home) = self.home_tile(side) {
                if self.content(home) == intruder {
                    return Outcome {
                        winner: intruder,
                        reason: WinReason::HomeReached,
                    };
                }
            }
        }
        if !self.has_legal_move(self.side_to_move) {
            return Outcome {
                winner: self.side_to_move.opposite(),
                reason: WinReason::NoMovesLeft,
            };
        }
        Outcome::UNDECIDED
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  a b c d e f")?;
        for row in (0..N).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..N {
                let Some(tile) = Tile::at(row as isize, col as isize) else {
                    continue;
                };
                let glyph = match self.content(tile) {
                    Side::None => '·',
                    Side::First => '●',
                    Side::Second => '○',
                };
                write!(f, "{glyph} ")?;
            }
            writeln!(f, "{}", row + 1)?;
        }
        writeln!(f, "  a b c d e f")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("code", &self.to_code())
            .field("side_to_move", &self.side_to_move)
            .field("ply", &self.ply)
            .finish()
    }
}
