//! Moves and the errors that reject them.

use super::{Mark, Position};
use serde::{Deserialize, Serialize};

/// A mark placed at a position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new,
)]
pub struct Move {
    /// The mark being placed.
    pub mark: Mark,
    /// Where it goes.
    pub position: Position,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position)
    }
}

/// Error that can occur when applying a move to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    Occupied(#[error(not(source))] Position),

    /// The position lies outside the board.
    #[display("Square {} is outside the board", _0)]
    OutOfBounds(#[error(not(source))] Position),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_move_error_has_no_source() {
        let err = MoveError::Occupied(Position::new(0, 0));
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Square a1 is already occupied");

        let boxed: Box<dyn Error> = Box::new(MoveError::OutOfBounds(Position::new(2, 1)));
        assert_eq!(boxed.to_string(), "Square b3 is outside the board");
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(Mark::O, Position::new(1, 2)).to_string(), "O -> c2");
    }
}
