//! Random play from a position.
//!
//! Produces positions reachable from a given board by uniformly random legal
//! moves. Callers pass a seeded `fastrand::Rng`, so walks are reproducible.

use fastrand::Rng;

use crate::board::Board;
use crate::moves::Move;

/// A uniformly random legal move for the side to move, `None` if the position
/// is already decided.
pub fn random_move(board: &Board, rng: &mut Rng) -> Option<Move> {
    if board.outcome().is_decided() {
        return None;
    }
    let moves = board.legal_moves(board.side_to_move());
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}

/// Play up to `plies` random moves from `board`, stopping early at a decided
/// position. Returns the moves played and the final board.
pub fn random_walk(board: &Board, plies: usize, rng: &mut Rng) -> (Vec<Move>, Board) {
    let mut current = *board;
    let mut played = Vec::with_capacity(plies);
    for _ in 0..plies {
        let Some(mv) = random_move(&current, rng) else {
            break;
        };
        if current.apply_move(&mv).is_err() {
            break;
        }
        played.push(mv);
    }
    (played, current)
}
