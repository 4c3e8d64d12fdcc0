//! Pure N×N tic-tac-toe: board model, rules, coordinates and search.
//!
//! Nothing in this crate performs I/O. The board is a plain value; the
//! search takes it by reference and works on its own copy.
//!
//! ```
//! use tictactoe_core::{best_move, Board, Mark, Position};
//!
//! let mut board = Board::new();
//! board.place(Position::parse("b2", 3).unwrap(), Mark::X).unwrap();
//! let reply = best_move(&board, Mark::O).unwrap();
//! assert!(board.is_empty(reply));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod position;
pub mod rules;
mod search;
mod types;

pub use action::{Move, MoveError};
pub use position::{CoordinateError, Position};
pub use rules::Outcome;
pub use search::{MAX_SEARCH_SIZE, best_move};
pub use types::{
    Board, BoardError, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE, Mark, ParseMarkError, Square,
};
