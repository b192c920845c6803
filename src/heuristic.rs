//! Static position evaluation.
//!
//! A [`Heuristic`] maps a board to a score where positive favours First.
//! Implementations are stateless and must stay finite: the search reserves
//! `±inf` for decided positions.

use crate::board::{Board, Side};
use crate::constants::{
    EXP_DISTANCE_BASE, EXP_DISTANCE_EXPONENT, EXP_DISTANCE_FACTOR, EXP_FLEXIBILITY_EXPONENT,
    EXP_FLEXIBILITY_FACTOR, SIMPLE_AVAILABLE_MOVES_FACTOR, SIMPLE_DISTANCE_FACTOR,
    SIMPLE_INITIATIVE_FACTOR,
};
use crate::tile::Tile;

/// Pluggable evaluation used by the exploration graph.
pub trait Heuristic: Send + Sync {
    /// Score `board`; positive favours First. Pure and deterministic.
    fn evaluate(&self, board: &Board) -> f64;

    /// Human-readable description including parameters.
    fn name(&self) -> String;
}

/// Distance of `tile`'s owner to the opposing home tile.
fn distance_to_target(board: &Board, side: Side, tile: Tile) -> f64 {
    board
        .home_tile(side.opposite())
        .map_or(0.0, |home| tile.distance(home) as f64)
}

/// Linear mix of distance to the opposing home and mobility.
#[derive(Clone, Debug)]
pub struct SimpleHeuristic {
    /// Divides the distance term of the side to move.
    pub initiative_factor: f64,
    pub distance_factor: f64,
    pub available_moves_factor: f64,
}

impl Default for SimpleHeuristic {
    fn default() -> Self {
        Self {
            initiative_factor: SIMPLE_INITIATIVE_FACTOR,
            distance_factor: SIMPLE_DISTANCE_FACTOR,
            available_moves_factor: SIMPLE_AVAILABLE_MOVES_FACTOR,
        }
    }
}

impl Heuristic for SimpleHeuristic {
    fn evaluate(&self, board: &Board) -> f64 {
        let mut evaluation = 0.0;
        for side in [Side::First, Side::Second] {
            let initiative = if side == board.side_to_move() && self.initiative_factor != 0.0 {
                1.0 / self.initiative_factor
            } else {
                1.0
            };
            for tile in board.pieces(side) {
                evaluation -= side.sign()
                    * initiative
                    * self.distance_factor
                    * distance_to_target(board, side, tile);
            }
            evaluation +=
                side.sign() * self.available_moves_factor * board.legal_moves(side).len() as f64;
        }
        evaluation
    }

    fn name(&self) -> String {
        format!(
            "Simple Heuristic (if:{}, df:{}, amf:{})",
            self.initiative_factor, self.distance_factor, self.available_moves_factor
        )
    }
}

/// Rewards closeness to the opposing home and mobility on power curves.
#[derive(Clone, Debug)]
pub struct ExponentialHeuristic {
    pub distance_factor: f64,
    pub flexibility_factor: f64,
    pub distance_exponent: f64,
    pub flexibility_exponent: f64,
}

impl Default for ExponentialHeuristic {
    fn default() -> Self {
        Self {
            distance_factor: EXP_DISTANCE_FACTOR,
            flexibility_factor: EXP_FLEXIBILITY_FACTOR,
            distance_exponent: EXP_DISTANCE_EXPONENT,
            flexibility_exponent: EXP_FLEXIBILITY_EXPONENT,
        }
    }
}

impl ExponentialHeuristic {
    fn distance_evaluation(&self, board: &Board) -> f64 {
        [Side::First, Side::Second]
            .into_iter()
            .flat_map(|side| board.pieces(side).map(move |tile| (side, tile)))
            .map(|(side, tile)| {
                let progress = EXP_DISTANCE_BASE - distance_to_target(board, side, tile);
                side.sign() * progress.powf(self.distance_exponent)
            })
            .sum()
    }

    fn flexibility_evaluation(&self, board: &Board) -> f64 {
        [Side::First, Side::Second]
            .into_iter()
            .map(|side| {
                let moves = board.legal_moves(side).len() as f64;
                side.sign() * moves.powf(self.flexibility_exponent)
            })
            .sum()
    }
}

impl Heuristic for ExponentialHeuristic {
    fn evaluate(&self, board: &Board) -> f64 {
        let mut evaluation = 0.0;
        if self.distance_factor != 0.0 {
            evaluation += self.distance_factor * self.distance_evaluation(board);
        }
        if self.flexibility_factor != 0.0 {
            evaluation += self.flexibility_factor * self.flexibility_evaluation(board);
        }
        evaluation
    }

    fn name(&self) -> String {
        format!(
            "Exponential Heuristic (df:{}, ff:{}) (de:{}, fe:{})",
            self.distance_factor,
            self.flexibility_factor,
            self.distance_exponent,
            self.flexibility_exponent
        )
    }
}
