//! Anytime exploration graph with minimax backup.
//!
//! The engine keeps every position it has reached in an arena keyed by
//! placement fingerprint plus side to move, so transpositions share one node
//! and the structure is a graph rather than a tree. Exploration is
//! level-ordered from the current root: the first unexplored node of the
//! current level is expanded, and when a level is exhausted the next level is
//! the de-duplicated set of its children. After each expansion the new value
//! is backed up through every recorded parent.
//!
//! Evaluations are `f64` with positive favouring First. `+inf` / `-inf` mark
//! positions won by First / Second and are never produced by a heuristic.
//!
//! ## Example
//!
//! ```
//! use topcap::board::Board;
//! use topcap::heuristic::SimpleHeuristic;
//! use topcap::search::{ExplorationGraph, SearchLimits};
//!
//! let mut graph = ExplorationGraph::with_heuristic(SimpleHeuristic::default());
//! let board = Board::new();
//! let mv = graph.choose_move(&board, SearchLimits::expansions(50)).unwrap();
//! assert!(board.is_move_legal(&mv, board.side_to_move()));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::board::{Board, Side};
use crate::constants::{DEFAULT_THINKING_TIME, FINGERPRINT_BITS, HEURISTIC_LIMIT};
use crate::error::{SearchError, SearchResult};
use crate::heuristic::Heuristic;
use crate::moves::Move;

/// Index of a node in the arena.
pub type NodeId = usize;

/// Graph key: placement fingerprint with side to move folded into bit 48.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(u64);

impl NodeKey {
    pub fn of(board: &Board) -> Self {
        let turn = match board.side_to_move() {
            Side::Second => 1u64 << FINGERPRINT_BITS,
            _ => 0,
        };
        NodeKey(board.fingerprint() | turn)
    }
}

/// The last two moves on the path that first reached a node.
///
/// Two moves are enough to tell whether the next one makes three identical
/// moves in a row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentMoves {
    last: Option<Move>,
    previous: Option<Move>,
}

impl RecentMoves {
    /// Keep the tail of a played move list.
    pub fn from_slice(moves: &[Move]) -> Self {
        let mut recent = RecentMoves::default();
        for mv in moves.iter().rev().take(2).rev() {
            recent = recent.push(*mv);
        }
        recent
    }

    pub fn push(self, mv: Move) -> Self {
        RecentMoves {
            last: Some(mv),
            previous: self.last,
        }
    }

    /// Whether playing `mv` next repeats the same move a third time.
    pub fn is_third_repeat(&self, mv: &Move) -> bool {
        self.last.as_ref() == Some(mv) && self.previous.as_ref() == Some(mv)
    }
}

/// Whether the last three entries of `moves` are the same move.
fn ends_in_triple(moves: &[Move]) -> bool {
    match moves {
        [.., a, b, c] => a == b && b == c,
        _ => false,
    }
}

/// When to stop exploring.
///
/// The wall-clock budget is always checked after a full expansion, so at
/// least one expansion happens per call. `expansions` additionally caps the
/// number of expanded nodes, which makes a run independent of machine speed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub time: Duration,
    pub expansions: Option<usize>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::time(DEFAULT_THINKING_TIME)
    }
}

impl SearchLimits {
    pub fn time(time: Duration) -> Self {
        Self {
            time,
            expansions: None,
        }
    }

    /// Expansion cap with no wall-clock limit.
    pub fn expansions(expansions: usize) -> Self {
        Self {
            time: Duration::MAX,
            expansions: Some(expansions),
        }
    }
}

/// Summary of one `explore` call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchStats {
    pub expansions: usize,
    pub nodes_added: usize,
    pub graph_size: usize,
    pub elapsed: Duration,
    /// Every position reachable from the root is terminal or explored.
    pub exhausted: bool,
    pub root_evaluation: f64,
}

struct Node {
    board: Board,
    evaluation: f64,
    best_child: Option<NodeId>,
    parents: Vec<NodeId>,
    children: Vec<(Move, NodeId)>,
    explored: bool,
    terminal: bool,
    recent: RecentMoves,
    /// Reached by a third identical move in a row.
    repetition_loss: bool,
}

impl Node {
    fn new(board: Board, evaluation: f64, recent: RecentMoves, repetition_loss: bool) -> Self {
        Self {
            board,
            evaluation,
            best_child: None,
            parents: Vec::new(),
            children: Vec::new(),
            explored: false,
            terminal: false,
            recent,
            repetition_loss,
        }
    }

    fn maximizing(&self) -> bool {
        self.board.side_to_move() == Side::First
    }
}

/// Value of a decided position, `None` if play continues.
///
/// A repetition loss goes against the side that made the repeated move, which
/// is the side not to move in `board`.
fn terminal_value(board: &Board, repetition_loss: bool) -> Option<f64> {
    let outcome = board.outcome();
    if outcome.is_decided() {
        return Some(outcome.winner.sign() * f64::INFINITY);
    }
    if repetition_loss {
        let offender = board.side_to_move().opposite();
        return Some(-offender.sign() * f64::INFINITY);
    }
    None
}

/// Best edge among `children`: max for First to move, min for Second.
/// Ties keep the earliest child.
fn best_edge(nodes: &[Node], node: &Node) -> Option<(Move, NodeId, f64)> {
    let maximizing = node.maximizing();
    let mut edges = node.children.iter();
    let &(mv, id) = edges.next()?;
    let mut best = (mv, id, nodes[id].evaluation);
    for &(mv, id) in edges {
        let value = nodes[id].evaluation;
        let better = if maximizing {
            value > best.2
        } else {
            value < best.2
        };
        if better {
            best = (mv, id, value);
        }
    }
    Some(best)
}

/// Graph-based anytime minimax search.
pub struct ExplorationGraph {
    heuristic: Box<dyn Heuristic>,
    nodes: Vec<Node>,
    index: HashMap<NodeKey, NodeId>,
    root: Option<NodeId>,
    /// Current level, in discovery order.
    frontier: Vec<NodeId>,
    /// Entries of `frontier` before this index are explored.
    cursor: usize,
    /// Nodes already placed in some level since the root was bound.
    leveled: HashSet<NodeId>,
}

impl ExplorationGraph {
    pub fn new(heuristic: Box<dyn Heuristic>) -> Self {
        Self {
            heuristic,
            nodes: Vec::new(),
            index: HashMap::new(),
            root: None,
            frontier: Vec::new(),
            cursor: 0,
            leveled: HashSet::new(),
        }
    }

    pub fn with_heuristic<H: Heuristic + 'static>(heuristic: H) -> Self {
        Self::new(Box::new(heuristic))
    }

    pub fn heuristic_name(&self) -> String {
        self.heuristic.name()
    }

    /// Number of positions in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The position the last `explore` call started from.
    pub fn root(&self) -> Option<&Board> {
        self.root.map(|id| &self.nodes[id].board)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.root = None;
        self.frontier.clear();
        self.cursor = 0;
        self.leveled.clear();
    }

    fn lookup(&self, board: &Board) -> Option<NodeId> {
        self.index.get(&NodeKey::of(board)).copied()
    }

    pub fn contains(&self, board: &Board) -> bool {
        self.lookup(board).is_some()
    }

    /// Current backed-up evaluation of a known position.
    pub fn evaluation(&self, board: &Board) -> Option<f64> {
        self.lookup(board).map(|id| self.nodes[id].evaluation)
    }

    /// Whether a known position was resolved as decided.
    pub fn is_terminal(&self, board: &Board) -> Option<bool> {
        self.lookup(board).map(|id| self.nodes[id].terminal)
    }

    /// Whether a known position has been expanded or resolved.
    pub fn is_explored(&self, board: &Board) -> Option<bool> {
        self.lookup(board).map(|id| self.nodes[id].explored)
    }

    /// Heuristic score kept finite and within `±HEURISTIC_LIMIT`.
    fn score(&self, board: &Board) -> f64 {
        let value = self.heuristic.evaluate(board);
        if value.is_nan() {
            warn!(code = %board.to_code(), "heuristic returned NaN, using 0");
            return 0.0;
        }
        if value.is_infinite() {
            warn!(code = %board.to_code(), value, "heuristic returned an infinite value, clamping");
        }
        value.clamp(-HEURISTIC_LIMIT, HEURISTIC_LIMIT)
    }

    /// Make `board` the root and restart level ordering from it.
    fn bind_root(&mut self, board: &Board, played: &[Move]) -> NodeId {
        let recent = RecentMoves::from_slice(played);
        let repetition_loss = ends_in_triple(played);
        let id = match self.lookup(board) {
            Some(id) => {
                let node = &mut self.nodes[id];
                if !node.explored && !played.is_empty() {
                    node.recent = recent;
                    node.repetition_loss = repetition_loss;
                }
                debug!(id, size = self.nodes.len(), "reusing known root");
                id
            }
            None => {
                let evaluation = self.score(board);
                let id = self.nodes.len();
                self.nodes
                    .push(Node::new(*board, evaluation, recent, repetition_loss));
                self.index.insert(NodeKey::of(board), id);
                debug!(id, evaluation, "inserted new root");
                id
            }
        };
        self.root = Some(id);
        self.frontier = vec![id];
        self.cursor = 0;
        self.leveled = HashSet::from([id]);
        id
    }

    /// First unexplored node in level order, advancing levels as needed.
    /// `None` once nothing reachable is left to expand.
    fn next_unexplored(&mut self) -> Option<NodeId> {
        loop {
            while self.cursor < self.frontier.len() {
                let id = self.frontier[self.cursor];
                if !self.nodes[id].explored {
                    return Some(id);
                }
                self.cursor += 1;
            }
            let mut next = Vec::new();
            for &id in &self.frontier {
                for &(_, child) in &self.nodes[id].children {
                    if self.leveled.insert(child) {
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                return None;
            }
            trace!(width = next.len(), "advancing to next level");
            self.frontier = next;
            self.cursor = 0;
        }
    }

    /// Resolve `id` as terminal or generate all its children, then back up.
    fn expand(&mut self, id: NodeId) -> SearchResult<()> {
        let board = self.nodes[id].board;
        if let Some(value) = terminal_value(&board, self.nodes[id].repetition_loss) {
            let node = &mut self.nodes[id];
            node.explored = true;
            node.terminal = true;
            node.evaluation = value;
            trace!(id, value, "terminal node");
        } else {
            let moves = board.legal_moves(board.side_to_move());
            if moves.is_empty() {
                error!(code = %board.to_code(), "undecided position without legal moves");
                return Err(SearchError::InvariantViolation(board.to_code()));
            }
            for mv in moves {
                self.add_child(id, mv)?;
            }
            self.nodes[id].explored = true;
            trace!(id, children = self.nodes[id].children.len(), "expanded node");
        }
        self.backpropagate(id);
        Ok(())
    }

    /// Link the position after `mv` under `parent`, creating it if new.
    fn add_child(&mut self, parent: NodeId, mv: Move) -> SearchResult<()> {
        let from = &self.nodes[parent];
        let board = from
            .board
            .after(&mv)
            .map_err(|_| SearchError::InvariantViolation(from.board.to_code()))?;
        let child = match self.lookup(&board) {
            // A known node keeps the repetition history of the path that
            // first reached it, so this path's history is not re-checked.
            Some(existing) => existing,
            None => {
                let repetition_loss = from.recent.is_third_repeat(&mv);
                let recent = from.recent.push(mv);
                let node = match terminal_value(&board, repetition_loss) {
                    Some(value) => {
                        let mut node = Node::new(board, value, recent, repetition_loss);
                        node.explored = true;
                        node.terminal = true;
                        node
                    }
                    None => Node::new(board, self.score(&board), recent, repetition_loss),
                };
                let id = self.nodes.len();
                self.nodes.push(node);
                self.index.insert(NodeKey::of(&board), id);
                id
            }
        };
        if !self.nodes[child].parents.contains(&parent) {
            self.nodes[child].parents.push(parent);
        }
        self.nodes[parent].children.push((mv, child));
        Ok(())
    }

    /// Recompute minimax values from `start` towards every ancestor whose
    /// value depends on it. Childless nodes keep their own evaluation.
    fn backpropagate(&mut self, start: NodeId) {
        // Positions can repeat, so bound the walk in case values keep moving
        // around a cycle.
        let mut budget = 2 * self.nodes.len() + 16;
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if budget == 0 {
                debug!(start, "backpropagation budget exhausted");
                break;
            }
            budget -= 1;
            let changed = self.refresh(id);
            if changed || id == start {
                queue.extend(self.nodes[id].parents.iter().copied());
            }
        }
    }

    /// Update one node from its children. Returns whether anything changed.
    fn refresh(&mut self, id: NodeId) -> bool {
        let Some((_, best_child, best)) = best_edge(&self.nodes, &self.nodes[id]) else {
            return false;
        };
        let node = &mut self.nodes[id];
        let changed = node.evaluation != best || node.best_child != Some(best_child);
        node.evaluation = best;
        node.best_child = Some(best_child);
        changed
    }

    /// Explore from `root` until `limits` trip or nothing is left to expand.
    pub fn explore(&mut self, root: &Board, limits: SearchLimits) -> SearchResult<SearchStats> {
        self.explore_with_history(root, &[], limits)
    }

    /// Like [`ExplorationGraph::explore`], seeding the root with the moves
    /// actually played before it so three identical moves in a row are caught
    /// across the root boundary. Ignored for a root that is already explored.
    pub fn explore_with_history(
        &mut self,
        root: &Board,
        played: &[Move],
        limits: SearchLimits,
    ) -> SearchResult<SearchStats> {
        let start = Instant::now();
        let size_before = self.nodes.len();
        let root_id = self.bind_root(root, played);
        let mut expansions = 0;
        let mut exhausted = false;
        loop {
            if limits.expansions.is_some_and(|max| expansions >= max) {
                break;
            }
            let Some(id) = self.next_unexplored() else {
                exhausted = true;
                debug!(expansions, "exploration exhausted");
                break;
            };
            self.expand(id)?;
            expansions += 1;
            if start.elapsed() >= limits.time {
                break;
            }
        }
        let elapsed = start.elapsed();
        let stats = SearchStats {
            expansions,
            nodes_added: self.nodes.len() - size_before,
            graph_size: self.nodes.len(),
            elapsed,
            exhausted,
            root_evaluation: self.nodes[root_id].evaluation,
        };
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            (expansions as f64 / secs) as u64
        } else {
            0
        };
        let best = best_edge(&self.nodes, &self.nodes[root_id]).map(|(mv, _, _)| mv);
        info!(
            root = %root.to_code(),
            best = ?best,
            expansions,
            nodes_added = stats.nodes_added,
            graph_size = stats.graph_size,
            nodes_per_sec = rate,
            evaluation = stats.root_evaluation,
            exhausted,
            "exploration finished"
        );
        Ok(stats)
    }

    /// Best move from `root` given what has been explored so far.
    pub fn best_move(&self, root: &Board) -> SearchResult<Move> {
        let id = self
            .lookup(root)
            .ok_or_else(|| SearchError::UnknownPosition(root.to_code()))?;
        let (mv, _, value) = best_edge(&self.nodes, &self.nodes[id])
            .ok_or_else(|| SearchError::NoLegalContinuation(root.to_code()))?;
        debug!(%mv, value, "selected move");
        Ok(mv)
    }

    /// Explore from `board` within `limits` and return the chosen move.
    pub fn choose_move(&mut self, board: &Board, limits: SearchLimits) -> SearchResult<Move> {
        self.explore(board, limits)?;
        self.best_move(board)
    }

    /// Expected line of play from `root` following cached best children.
    pub fn principal_variation(&self, root: &Board, max_len: usize) -> Vec<Move> {
        let mut line = Vec::new();
        let Some(mut id) = self.lookup(root) else {
            return line;
        };
        let mut seen = HashSet::from([id]);
        while line.len() < max_len {
            let node = &self.nodes[id];
            let Some(best) = node.best_child else { break };
            let Some(&(mv, _)) = node.children.iter().find(|(_, child)| *child == best) else {
                break;
            };
            line.push(mv);
            if !seen.insert(best) {
                break;
            }
            id = best;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::SimpleHeuristic;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    /// Scores every position the same.
    struct Flat;

    impl Heuristic for Flat {
        fn evaluate(&self, _: &Board) -> f64 {
            0.0
        }
        fn name(&self) -> String {
            "flat".into()
        }
    }

    /// Returns a non-finite value.
    struct Broken(f64);

    impl Heuristic for Broken {
        fn evaluate(&self, _: &Board) -> f64 {
            self.0
        }
        fn name(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn test_recent_moves() {
        let a = mv("(a4 b4)");
        let b = mv("(c6 c5)");
        let recent = RecentMoves::default().push(a);
        assert!(!recent.is_third_repeat(&a));
        let recent = recent.push(a);
        assert!(recent.is_third_repeat(&a));
        assert!(!recent.is_third_repeat(&b));
        assert!(!recent.push(b).is_third_repeat(&a));
        assert_eq!(RecentMoves::from_slice(&[b, a, a]), recent);
        assert!(ends_in_triple(&[b, a, a, a]));
        assert!(!ends_in_triple(&[a, a]));
    }

    #[test]
    fn test_node_key_folds_turn() {
        let board = Board::new();
        let mut other = board;
        other.set_side_to_move(Side::Second);
        assert_eq!(board.fingerprint(), other.fingerprint());
        assert_ne!(NodeKey::of(&board), NodeKey::of(&other));
    }

    #[test]
    fn test_first_expansion_builds_children() {
        let board = Board::new();
        let mut graph = ExplorationGraph::with_heuristic(SimpleHeuristic::default());
        let stats = graph.explore(&board, SearchLimits::expansions(1)).unwrap();
        assert_eq!(stats.expansions, 1);
        let moves = board.legal_moves(Side::First);
        assert_eq!(stats.nodes_added, moves.len() + 1);
        assert_eq!(graph.is_explored(&board), Some(true));
        for m in moves {
            assert!(graph.contains(&board.after(&m).unwrap()));
        }
    }

    #[test]
    fn test_root_value_is_max_of_children() {
        let board = Board::new();
        let mut graph = ExplorationGraph::with_heuristic(SimpleHeuristic::default());
        graph.explore(&board, SearchLimits::expansions(1)).unwrap();
        let best = board
            .legal_moves(Side::First)
            .iter()
            .filter_map(|m| graph.evaluation(&board.after(m).unwrap()))
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(graph.evaluation(&board), Some(best));
    }

    #[test]
    fn test_ties_keep_first_child() {
        let board = Board::new();
        let mut graph = ExplorationGraph::with_heuristic(Flat);
        let chosen = graph.choose_move(&board, SearchLimits::expansions(1)).unwrap();
        assert_eq!(chosen, board.legal_moves(Side::First)[0]);
    }

    #[test]
    fn test_unknown_root() {
        let graph = ExplorationGraph::with_heuristic(Flat);
        assert!(matches!(
            graph.best_move(&Board::new()),
            Err(SearchError::UnknownPosition(_))
        ));
        assert!(graph.principal_variation(&Board::new(), 5).is_empty());
    }

    #[test]
    fn test_unexplored_root_has_no_continuation() {
        let board = Board::new();
        let mut graph = ExplorationGraph::with_heuristic(Flat);
        graph.explore(&board, SearchLimits::expansions(0)).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(matches!(
            graph.best_move(&board),
            Err(SearchError::NoLegalContinuation(_))
        ));
    }

    #[test]
    fn test_non_finite_heuristic_is_clamped() {
        let board = Board::new();
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut graph = ExplorationGraph::with_heuristic(Broken(value));
            graph.explore(&board, SearchLimits::expansions(1)).unwrap();
            let eval = graph.evaluation(&board).unwrap();
            assert!(eval.is_finite());
            assert!(eval.abs() <= HEURISTIC_LIMIT);
        }
    }

    #[test]
    fn test_repetition_loss_from_seeded_history() {
        // The root already saw (a4 b4) twice; playing it again loses for First
        // even though the heuristic is flat.
        let board = Board::new();
        let repeated = mv("(a4 b4)");
        let mut graph = ExplorationGraph::with_heuristic(Flat);
        graph
            .explore_with_history(&board, &[repeated, repeated], SearchLimits::expansions(1))
            .unwrap();
        let child = board.after(&repeated).unwrap();
        assert_eq!(graph.is_terminal(&child), Some(true));
        assert_eq!(graph.evaluation(&child), Some(f64::NEG_INFINITY));
        assert_ne!(graph.best_move(&board).unwrap(), repeated);
        assert_eq!(graph.evaluation(&board), Some(0.0));
    }

    #[test]
    fn test_known_child_keeps_first_history() {
        // The child is already in the graph with an empty history, so reaching
        // it again by a third repeat does not rescore it.
        let board = Board::new();
        let repeated = mv("(a4 b4)");
        let child = board.after(&repeated).unwrap();
        let mut graph = ExplorationGraph::with_heuristic(Flat);
        graph.explore(&child, SearchLimits::expansions(0)).unwrap();
        graph
            .explore_with_history(&board, &[repeated, repeated], SearchLimits::expansions(1))
            .unwrap();
        assert_eq!(graph.is_terminal(&child), Some(false));
        assert_eq!(graph.evaluation(&child), Some(0.0));
    }

    #[test]
    fn test_clear() {
        let mut graph = ExplorationGraph::with_heuristic(Flat);
        graph.explore(&Board::new(), SearchLimits::expansions(3)).unwrap();
        assert!(!graph.is_empty());
        graph.clear();
        assert!(graph.is_empty());
        assert!(!graph.contains(&Board::new()));
    }
}
