//! Constants for board geometry, the opening setup, and engine defaults.
//!
//! Tiles are stored as a flat index `row * N + col`, with row 0 being the
//! bottom rank (`1`) and column 0 the `a` file.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const N: usize = 6;

/// Number of tiles on the board.
pub const TILES: usize = N * N;

/// Pieces each side owns for the whole game (there are no captures).
pub const PIECES_PER_SIDE: usize = 4;

/// Bits per tile index in the packed fingerprint.
pub const FINGERPRINT_FIELD_BITS: u32 = 6;

/// Total width of a packed fingerprint.
pub const FINGERPRINT_BITS: u32 = FINGERPRINT_FIELD_BITS * (2 * PIECES_PER_SIDE) as u32;

/// Length of the textual placement code (one character per tile).
pub const CODE_LEN: usize = TILES;

/// Orthogonal probe directions as `(d_col, d_row)`: left, right, down, up.
pub const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

// =============================================================================
// Opening Setup
// =============================================================================

/// First side's starting tiles.
pub const FIRST_START: [&str; PIECES_PER_SIDE] = ["a4", "b3", "c2", "d1"];

/// Second side's starting tiles.
pub const SECOND_START: [&str; PIECES_PER_SIDE] = ["c6", "d5", "e4", "f3"];

/// First side's home tile (Second wins by occupying it).
pub const FIRST_HOME: &str = "a1";

/// Second side's home tile (First wins by occupying it).
pub const SECOND_HOME: &str = "f6";

// =============================================================================
// Search Parameters
// =============================================================================

/// Default thinking time per move.
pub const DEFAULT_THINKING_TIME: Duration = Duration::from_secs(5);

/// Largest magnitude a heuristic value may take. Infinities are reserved for
/// decided positions.
pub const HEURISTIC_LIMIT: f64 = 1.0e12;

// =============================================================================
// Heuristic Weights
// =============================================================================

pub const SIMPLE_INITIATIVE_FACTOR: f64 = 1.0;
pub const SIMPLE_DISTANCE_FACTOR: f64 = 1.0;
pub const SIMPLE_AVAILABLE_MOVES_FACTOR: f64 = 1.0;

pub const EXP_DISTANCE_FACTOR: f64 = 1.0;
pub const EXP_FLEXIBILITY_FACTOR: f64 = 1.0;
pub const EXP_DISTANCE_EXPONENT: f64 = 1.5;
pub const EXP_FLEXIBILITY_EXPONENT: f64 = 1.5;

/// Distance from which the exponential heuristic counts progress
/// (the longest Manhattan distance on the board is 10).
pub const EXP_DISTANCE_BASE: f64 = 12.0;
