//! Host and guest session drivers.
//!
//! The host owns the authoritative board, the move engine and the state
//! machine. The guest relays the human's answers and keeps a mirror board.

mod guest;
mod host;
mod input;

pub use guest::Guest;
pub use host::Host;
pub use input::{ConsoleInput, HumanInput, ScriptedInput};

use derive_getters::Getters;
use tictactoe_core::{Board, Move, Outcome};

/// Result of one finished game as seen by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct GameRecord {
    /// How the game ended.
    outcome: Outcome,
    /// Final board.
    board: Board,
    /// Moves in play order.
    moves: Vec<Move>,
}

/// Games played before the session terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct SessionSummary {
    /// Finished games, oldest first.
    games: Vec<GameRecord>,
}

impl SessionSummary {
    pub(crate) fn record(&mut self, outcome: Outcome, board: Board, moves: Vec<Move>) {
        self.games.push(GameRecord::new(outcome, board, moves));
    }

    /// Outcomes in play order.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.games.iter().map(|game| game.outcome).collect()
    }
}
