//! Win detection logic.

use crate::{Board, Mark, Position, Square};

/// Checks whether `mark` fills a row, a column or a full diagonal.
pub fn is_winner(board: &Board, mark: Mark) -> bool {
    let n = board.size();
    let owns =
        |row: usize, col: usize| board.get(Position::new(row, col)) == Some(Square::Occupied(mark));

    (0..n).any(|r| (0..n).all(|c| owns(r, c)))
        || (0..n).any(|c| (0..n).all(|r| owns(r, c)))
        || (0..n).all(|i| owns(i, i))
        || (0..n).all(|i| owns(i, n - 1 - i))
}

/// Returns the mark that has a complete line, if any.
///
/// X is checked first; a legal game can never give both marks a line.
pub fn check_winner(board: &Board) -> Option<Mark> {
    <Mark as strum::IntoEnumIterator>::iter().find(|mark| is_winner(board, *mark))
}
