//! Error types for board operations, codecs, and the search engine.
//!
//! Legality and format failures are recoverable: they are reported to the
//! caller and the game or search continues. [`SearchError::InvariantViolation`]
//! is the one fatal case and should never be retried.

use thiserror::Error;

use crate::board::Side;
use crate::tile::Tile;

/// Why a move is not legal for the side attempting it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("origin {0} is empty")]
    EmptyOrigin(Tile),

    #[error("piece on {tile} belongs to {owner}, not {mover}")]
    WrongSide { tile: Tile, owner: Side, mover: Side },

    #[error("move is diagonal or zero-length")]
    NotStraight,

    #[error("move covers {actual} tiles but the origin has {expected} occupied neighbours")]
    WrongDistance { expected: usize, actual: usize },

    #[error("path is blocked at {0}")]
    PathBlocked(Tile),

    #[error("piece cannot enter its own home tile {0}")]
    OwnHome(Tile),
}

/// A tile label or coordinate outside the 6x6 grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    #[error("invalid tile label '{0}' (expected a1..f6)")]
    BadLabel(String),

    #[error("coordinates ({row}, {col}) are off the board")]
    OffBoard { row: isize, col: isize },
}

/// A move string that is not of the form `(a1 b2)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("move must be wrapped in parentheses, got '{0}'")]
    MissingParens(String),

    #[error("move must contain exactly two tiles, got '{0}'")]
    WrongArity(String),

    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Malformed placement code or fingerprint. Values are never clamped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("code must be exactly {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("invalid character '{ch}' at position {index} (expected 'W', 'B' or '-')")]
    BadChar { index: usize, ch: char },

    #[error("{side} has {count} pieces, expected {expected}")]
    PieceCount {
        side: Side,
        count: usize,
        expected: usize,
    },

    #[error("fingerprint {0:#x} uses bits above the 48-bit range")]
    FingerprintOutOfRange(u64),

    #[error("fingerprint field {field} holds tile index {index}, outside 0..36")]
    TileOutOfRange { field: usize, index: u64 },

    #[error("fingerprint places two pieces on {0}")]
    DuplicateTile(Tile),

    #[error("fingerprint field {field} is not above the previous field of the same side")]
    UnsortedFields { field: usize },
}

/// Failures of the exploration graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The position is already decided; there is no move to pick.
    #[error("position {0} has no legal continuation")]
    NoLegalContinuation(String),

    #[error("position {0} is not in the exploration graph")]
    UnknownPosition(String),

    /// A position with no outcome produced no legal moves.
    #[error("invariant violated: undecided position {0} has no legal moves")]
    InvariantViolation(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
