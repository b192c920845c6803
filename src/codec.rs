//! Placement codecs: the packed 48-bit fingerprint and the 36-character code.
//!
//! Both encode piece placement only. Side to move and ply count are not
//! recoverable; decoding yields First to move at ply 0 unless the caller
//! restores them.
//!
//! Fingerprint layout: bits `[6i, 6i+5]` hold the i-th tile index. First's
//! four tiles come first in ascending order, then Second's four.
//!
//! Code layout: row 6 down to row 1, `a` to `f` within a row, one of
//! `W` (First), `B` (Second), `-` (empty) per tile.

use crate::board::{Board, Side};
use crate::constants::{CODE_LEN, FINGERPRINT_BITS, FINGERPRINT_FIELD_BITS, N, PIECES_PER_SIDE};
use crate::error::CodecError;
use crate::tile::Tile;

const FIELD_MASK: u64 = (1 << FINGERPRINT_FIELD_BITS) - 1;

impl Board {
    /// Pack the sorted piece locations into a single integer.
    pub fn fingerprint(&self) -> u64 {
        self.pieces(Side::First)
            .chain(self.pieces(Side::Second))
            .enumerate()
            .fold(0u64, |acc, (i, tile)| {
                acc | (tile.index() as u64) << (i as u32 * FINGERPRINT_FIELD_BITS)
            })
    }

    /// Rebuild a board from [`Board::fingerprint`], First to move at ply 0.
    ///
    /// Only canonical values decode: each side's fields must ascend.
    pub fn from_fingerprint(value: u64) -> Result<Board, CodecError> {
        if value >> FINGERPRINT_BITS != 0 {
            return Err(CodecError::FingerprintOutOfRange(value));
        }
        let mut board = Board::empty();
        let mut previous = None;
        for field in 0..2 * PIECES_PER_SIDE {
            if field == PIECES_PER_SIDE {
                previous = None;
            }
            let index = (value >> (field as u32 * FINGERPRINT_FIELD_BITS)) & FIELD_MASK;
            let tile = Tile::from_index(index as usize)
                .ok_or(CodecError::TileOutOfRange { field, index })?;
            // Equal fields fall through to the duplicate check.
            if previous.is_some_and(|prev| index < prev) {
                return Err(CodecError::UnsortedFields { field });
            }
            previous = Some(index);
            if board.content(tile) != Side::None {
                return Err(CodecError::DuplicateTile(tile));
            }
            let side = if field < PIECES_PER_SIDE {
                Side::First
            } else {
                Side::Second
            };
            board.place(tile, side);
        }
        Ok(board)
    }

    /// Replace the placement with the one in `value`, keeping side to move
    /// and ply count. The board is unchanged on error.
    pub fn restore_fingerprint(&mut self, value: u64) -> Result<(), CodecError> {
        let decoded = Board::from_fingerprint(value)?;
        self.replace_placement(decoded);
        Ok(())
    }

    fn replace_placement(&mut self, decoded: Board) {
        let side = self.side_to_move();
        let ply = self.ply();
        *self = decoded;
        self.set_side_to_move(side);
        self.set_ply(ply);
    }

    /// Human-inspectable placement key.
    pub fn to_code(&self) -> String {
        let mut code = String::with_capacity(CODE_LEN);
        for row in (0..N).rev() {
            for col in 0..N {
                let Some(tile) = Tile::at(row as isize, col as isize) else {
                    continue;
                };
                code.push(match self.content(tile) {
                    Side::First => 'W',
                    Side::Second => 'B',
                    Side::None => '-',
                });
            }
        }
        code
    }

    /// Parse a placement code. Requires exactly four pieces per side.
    pub fn from_code(code: &str) -> Result<Board, CodecError> {
        let count = code.chars().count();
        if count != CODE_LEN {
            return Err(CodecError::WrongLength {
                expected: CODE_LEN,
                actual: count,
            });
        }
        let mut board = Board::empty();
        for (index, ch) in code.chars().enumerate() {
            let side = match ch {
                'W' => Side::First,
                'B' => Side::Second,
                '-' => continue,
                _ => return Err(CodecError::BadChar { index, ch }),
            };
            let row = N - 1 - index / N;
            let col = index % N;
            if let Some(tile) = Tile::at(row as isize, col as isize) {
                board.place(tile, side);
            }
        }
        for side in [Side::First, Side::Second] {
            let count = board.piece_count(side);
            if count != PIECES_PER_SIDE {
                return Err(CodecError::PieceCount {
                    side,
                    count,
                    expected: PIECES_PER_SIDE,
                });
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    #[test]
    fn test_initial_code() {
        assert_eq!(
            Board::new().to_code(),
            concat!("--B---", "---B--", "W---B-", "-W---B", "--W---", "---W--")
        );
    }

    #[test]
    fn test_code_round_trip_resets_turn() {
        let mut board = Board::new();
        let mv: Move = "(a4 b4)".parse().unwrap();
        board.apply_move(&mv).unwrap();
        let decoded = Board::from_code(&board.to_code()).unwrap();
        assert_eq!(decoded.to_code(), board.to_code());
        assert_eq!(decoded.side_to_move(), Side::First);
        assert_eq!(decoded.ply(), 0);
        for tile in Tile::all() {
            assert_eq!(decoded.neighbor_count(tile), board.neighbor_count(tile));
        }
    }

    #[test]
    fn test_code_rejects_bad_input() {
        assert_eq!(
            Board::from_code("W-B"),
            Err(CodecError::WrongLength {
                expected: 36,
                actual: 3
            })
        );
        let mut bad = Board::new().to_code();
        bad.replace_range(5..6, "x");
        assert_eq!(Board::from_code(&bad), Err(CodecError::BadChar { index: 5, ch: 'x' }));
        let extra = Board::new().to_code().replacen('-', "W", 1);
        assert!(matches!(
            Board::from_code(&extra),
            Err(CodecError::PieceCount {
                side: Side::First,
                count: 5,
                ..
            })
        ));
        assert!(matches!(
            Board::from_code(&"-".repeat(36)),
            Err(CodecError::PieceCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_fingerprint_layout() {
        // First: d1=3, c2=8, b3=13, a4=18; Second: f3=17, e4=22, d5=27, c6=32.
        let fields = [3u64, 8, 13, 18, 17, 22, 27, 32];
        let expected = fields
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, v)| acc | v << (6 * i));
        assert_eq!(Board::new().fingerprint(), expected);
        assert!(Board::new().fingerprint() < 1 << 48);
    }

    #[test]
    fn test_fingerprint_round_trip() {
        let board = Board::new();
        let decoded = Board::from_fingerprint(board.fingerprint()).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_restore_keeps_turn() {
        let mut board = Board::new();
        board.apply_move(&"(a4 b4)".parse().unwrap()).unwrap();
        let target = Board::new().fingerprint();
        board.restore_fingerprint(target).unwrap();
        assert_eq!(board.fingerprint(), target);
        assert_eq!(board.side_to_move(), Side::Second);
        assert_eq!(board.ply(), 1);
    }

    #[test]
    fn test_fingerprint_rejects_bad_values() {
        assert!(matches!(
            Board::from_fingerprint(1 << 48),
            Err(CodecError::FingerprintOutOfRange(_))
        ));
        // Field 0 holds 63.
        let value = Board::new().fingerprint() | 0b111111;
        assert!(matches!(
            Board::from_fingerprint(value),
            Err(CodecError::TileOutOfRange { field: 0, index: 63 })
        ));
        // All zero: eight pieces on a1.
        assert!(matches!(
            Board::from_fingerprint(0),
            Err(CodecError::DuplicateTile(_))
        ));
        let mut board = Board::new();
        assert!(board.restore_fingerprint(0).is_err());
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_fingerprint_rejects_unsorted_fields() {
        let pack = |fields: [u64; 8]| {
            fields
                .iter()
                .enumerate()
                .fold(0u64, |acc, (i, v)| acc | v << (6 * i))
        };
        // First's tiles descending: same placement as the opening, wrong order.
        assert_eq!(
            Board::from_fingerprint(pack([18, 13, 8, 3, 17, 22, 27, 32])),
            Err(CodecError::UnsortedFields { field: 1 })
        );
        // Second's group restarts the ordering, then breaks it.
        assert_eq!(
            Board::from_fingerprint(pack([3, 8, 13, 18, 17, 27, 22, 32])),
            Err(CodecError::UnsortedFields { field: 6 })
        );
        // A lower Second tile after First's fields is still canonical.
        let canonical = pack([3, 8, 13, 18, 0, 22, 27, 32]);
        let board = Board::from_fingerprint(canonical).unwrap();
        assert_eq!(board.fingerprint(), canonical);
    }
}
