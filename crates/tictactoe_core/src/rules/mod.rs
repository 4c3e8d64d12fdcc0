//! Game rules for N×N tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Nothing here is cached:
//! the board mutates after every move, so callers re-evaluate each time.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{check_winner, is_winner};

use crate::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Outcome {
    /// A mark completed a line.
    #[display("{} wins", _0)]
    Won(Mark),
    /// Full board, no line.
    #[display("draw")]
    Draw,
}

/// Returns the outcome if the board is terminal.
///
/// A win takes precedence over a full board.
#[instrument(skip(board), fields(size = board.size()))]
pub fn outcome(board: &Board) -> Option<Outcome> {
    if let Some(mark) = check_winner(board) {
        Some(Outcome::Won(mark))
    } else if is_full(board) {
        Some(Outcome::Draw)
    } else {
        None
    }
}
