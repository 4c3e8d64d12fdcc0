//! Core domain types for N×N tic-tac-toe.

use super::action::MoveError;
use super::position::Position;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Smallest supported board edge.
pub const MIN_SIZE: usize = 2;

/// Largest supported board edge (coordinates use a single letter and digit).
pub const MAX_SIZE: usize = 9;

/// Default board edge.
pub const DEFAULT_SIZE: usize = 3;

/// Mark placed on the board by a side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter,
)]
pub enum Mark {
    /// Mark X (always moves first).
    #[display("X")]
    X,
    /// Mark O.
    #[display("O")]
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Single-character symbol used on the wire.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// Error returned when text does not name a mark.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unknown mark: {:?}", text)]
pub struct ParseMarkError {
    /// The rejected text.
    pub text: String,
}

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            other => Err(ParseMarkError {
                text: other.to_string(),
            }),
        }
    }
}

/// A square on the board.
///
/// Serialized as `"-"`, `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

impl Square {
    /// Wire symbol for this square.
    pub fn symbol(self) -> char {
        match self {
            Square::Empty => '-',
            Square::Occupied(mark) => mark.symbol(),
        }
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.symbol().to_string()
    }
}

impl TryFrom<String> for Square {
    type Error = ParseMarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "-" {
            Ok(Square::Empty)
        } else {
            value.parse().map(Square::Occupied)
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Error building a board from untrusted rows.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Edge length outside `MIN_SIZE..=MAX_SIZE`.
    #[display("Unsupported board size {} (expected {}..={})", size, MIN_SIZE, MAX_SIZE)]
    UnsupportedSize {
        /// Requested edge length.
        size: usize,
    },
    /// A row does not have as many cells as there are rows.
    #[display("Board is not square: row {} has {} cells, expected {}", row, len, size)]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Cells in that row.
        len: usize,
        /// Number of rows.
        size: usize,
    },
}

/// N×N board in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Square>>", into = "Vec<Vec<Square>>")]
pub struct Board {
    size: usize,
    squares: Vec<Square>,
}

impl Board {
    /// Creates an empty 3×3 board.
    pub fn new() -> Self {
        Self {
            size: DEFAULT_SIZE,
            squares: vec![Square::Empty; DEFAULT_SIZE * DEFAULT_SIZE],
        }
    }

    /// Creates an empty board with the given edge length.
    #[instrument]
    pub fn with_size(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::UnsupportedSize { size });
        }
        Ok(Self {
            size,
            squares: vec![Square::Empty; size * size],
        })
    }

    /// Builds a board from rows, checking the shape.
    pub fn from_rows(rows: Vec<Vec<Square>>) -> Result<Self, BoardError> {
        let size = rows.len();
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::UnsupportedSize { size });
        }
        let mut squares = Vec::with_capacity(size * size);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    len: cells.len(),
                    size,
                });
            }
            squares.extend(cells);
        }
        Ok(Self { size, squares })
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.row() < self.size && pos.col() < self.size).then(|| pos.row() * self.size + pos.col())
    }

    /// Gets the square at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Square> {
        self.index(pos).map(|i| self.squares[i])
    }

    /// Checks if a square is empty (false when out of bounds).
    pub fn is_empty(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(Square::Empty))
    }

    /// Places `mark` at `pos` if the square exists and is empty.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<(), MoveError> {
        let index = self.index(pos).ok_or(MoveError::OutOfBounds(pos))?;
        if self.squares[index] != Square::Empty {
            return Err(MoveError::Occupied(pos));
        }
        self.squares[index] = Square::Occupied(mark);
        Ok(())
    }

    /// Unchecked write used by the search to place and undo its own moves.
    pub(crate) fn set(&mut self, pos: Position, square: Square) {
        if let Some(index) = self.index(pos) {
            self.squares[index] = square;
        }
    }

    /// All squares in row-major order.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        self.squares.chunks(self.size)
    }

    /// Empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, sq)| **sq == Square::Empty)
            .map(|(i, _)| Position::new(i / self.size, i % self.size))
            .collect()
    }

    /// Number of occupied squares.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|sq| **sq != Square::Empty).count()
    }

    /// Formats the board with column letters and row numbers.
    pub fn display(&self) -> String {
        let mut out = String::from("   ");
        for col in 0..self.size {
            out.push(' ');
            out.push((b'a' + col as u8) as char);
            out.push_str("  ");
        }
        out.push('\n');
        for (i, row) in self.rows().enumerate() {
            out.push_str(&format!("{} |", i + 1));
            for sq in row {
                out.push_str(&format!(" {} |", sq));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Vec<Square>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Square>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<Square>> {
    fn from(board: Board) -> Self {
        board.rows().map(<[Square]>::to_vec).collect()
    }
}
