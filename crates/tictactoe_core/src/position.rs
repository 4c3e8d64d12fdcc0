//! Board coordinates and their text form.
//!
//! A coordinate is written as a column letter and a row digit, in either
//! order: `c2` and `2c` both name row 1, column 2. Letters are lowercase and
//! digits start at 1, both bounded by the board size.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A 0-indexed `(row, col)` pair.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_new::new,
)]
pub struct Position {
    row: usize,
    col: usize,
}

/// Reasons a coordinate fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CoordinateError {
    /// Not two characters in letter-digit or digit-letter order.
    #[display("Invalid coordinate {:?}: expected a letter and a digit such as 'a1' or '1a'", text)]
    Syntax {
        /// The rejected input.
        text: String,
    },
    /// Letter or digit beyond the board edge.
    #[display("Coordinate {:?} is outside a {}x{} board", text, size, size)]
    OutOfRange {
        /// The rejected input.
        text: String,
        /// Board edge length.
        size: usize,
    },
}

impl Position {
    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Parses `a1`-style or `1a`-style text for a board of edge `size`.
    #[instrument]
    pub fn parse(text: &str, size: usize) -> Result<Self, CoordinateError> {
        let syntax = || CoordinateError::Syntax {
            text: text.to_string(),
        };
        let bytes = text.as_bytes();
        let (letter, digit) = match bytes {
            [l, d] if l.is_ascii_lowercase() && d.is_ascii_digit() => (*l, *d),
            [d, l] if d.is_ascii_digit() && l.is_ascii_lowercase() => (*l, *d),
            _ => return Err(syntax()),
        };

        let col = (letter - b'a') as usize;
        let row = match (digit - b'0') as usize {
            0 => usize::MAX,
            n => n - 1,
        };
        if col >= size || row >= size {
            return Err(CoordinateError::OutOfRange {
                text: text.to_string(),
                size,
            });
        }
        Ok(Self { row, col })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
    }
}
