//! Topcap: a 6x6 jumping-distance board game and a graph search engine for it.
//!
//! Each side has four pieces and a home tile in its own corner. A piece moves
//! in a straight line exactly as far as the number of occupied tiles around
//! it, over empty tiles only. Reaching the opponent's home tile wins, and so
//! does leaving the opponent without a legal move.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, opening setup, and engine defaults
//! - [`tile`] - Tiles and the label <-> coordinate bijection
//! - [`moves`] - Moves, paths, and the `(a1 b2)` text form
//! - [`board`] - Game state, legality, move generation, and outcome
//! - [`codec`] - Fingerprint and 36-character placement codes
//! - [`heuristic`] - Pluggable position evaluation
//! - [`search`] - Anytime exploration graph with minimax backup
//! - [`playout`] - Seeded random play
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use topcap::board::Board;
//! use topcap::heuristic::ExponentialHeuristic;
//! use topcap::search::{ExplorationGraph, SearchLimits};
//!
//! let mut board = Board::new();
//! let mut engine = ExplorationGraph::with_heuristic(ExponentialHeuristic::default());
//!
//! let mv = engine.choose_move(&board, SearchLimits::expansions(200)).unwrap();
//! board.apply_move(&mv).unwrap();
//! println!("{board}");
//! ```

pub mod board;
pub mod codec;
pub mod constants;
pub mod error;
pub mod heuristic;
pub mod moves;
pub mod playout;
pub mod search;
pub mod tile;
