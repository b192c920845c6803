//! Moves and their textual form `(origin destination)`.

use std::fmt;
use std::str::FromStr;

use crate::error::MoveParseError;
use crate::tile::Tile;

/// A straight jump from `from` to `to`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Tile,
    pub to: Tile,
}

impl Move {
    pub fn new(from: Tile, to: Tile) -> Self {
        Self { from, to }
    }

    /// Unit step `(d_row, d_col)` along the move's axis, or `None` for a
    /// diagonal or zero-length move.
    pub fn direction(&self) -> Option<(isize, isize)> {
        let dr = self.to.row() as isize - self.from.row() as isize;
        let dc = self.to.col() as isize - self.from.col() as isize;
        match (dr, dc) {
            (0, 0) => None,
            (0, _) | (_, 0) => Some((dr.signum(), dc.signum())),
            _ => None,
        }
    }

    /// Number of tiles the piece travels, 0 for non-straight moves.
    pub fn distance(&self) -> usize {
        if self.direction().is_some() {
            self.from.distance(self.to)
        } else {
            0
        }
    }

    /// Tiles crossed after leaving the origin, destination included.
    ///
    /// Empty for diagonal and zero-length moves, which are never legal.
    pub fn path(&self) -> Vec<Tile> {
        let Some((dr, dc)) = self.direction() else {
            return Vec::new();
        };
        let mut path = Vec::with_capacity(self.distance());
        let mut current = self.from;
        while current != self.to {
            match current.offset(dr, dc) {
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }
        path
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let inner = code
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| MoveParseError::MissingParens(code.to_string()))?;
        let parts: Vec<&str> = inner.split_whitespace().collect();
        let [from, to] = parts.as_slice() else {
            return Err(MoveParseError::WrongArity(code.to_string()));
        };
        Ok(Move::new(from.parse()?, to.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn labels(path: Vec<Tile>) -> Vec<&'static str> {
        path.into_iter().map(Tile::label).collect()
    }

    #[test]
    fn test_move_path() {
        assert!(mv("(a1 a1)").path().is_empty());
        assert_eq!(labels(mv("(a1 f1)").path()), ["b1", "c1", "d1", "e1", "f1"]);
        assert_eq!(labels(mv("(a1 a6)").path()), ["a2", "a3", "a4", "a5", "a6"]);
        assert_eq!(labels(mv("(d4 d2)").path()), ["d3", "d2"]);
        assert!(mv("(a1 f6)").path().is_empty());
        assert!(mv("(b2 c3)").path().is_empty());
    }

    #[test]
    fn test_distance_matches_path() {
        for code in ["(a1 f1)", "(c3 c1)", "(e5 b5)", "(a1 b2)", "(c3 c3)"] {
            let m = mv(code);
            assert_eq!(m.distance(), m.path().len(), "{code}");
        }
    }

    #[test]
    fn test_text_form() {
        let m = Move::new("a1".parse().unwrap(), "b2".parse().unwrap());
        assert_eq!(m.to_string(), "(a1 b2)");
        assert_eq!(mv("  (a1   b2) "), m);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("a1 b2".parse::<Move>(), Err(MoveParseError::MissingParens(_))));
        assert!(matches!("(a1)".parse::<Move>(), Err(MoveParseError::WrongArity(_))));
        assert!(matches!("(a1 b2 c3)".parse::<Move>(), Err(MoveParseError::WrongArity(_))));
        assert!(matches!("(a1 z9)".parse::<Move>(), Err(MoveParseError::Tile(_))));
    }
}
