//! Per-game state owned by the host orchestrator.

use crate::protocol::Starter;
use tictactoe_core::rules::outcome;
use tictactoe_core::{Board, BoardError, Mark, Move, MoveError, Outcome, Position};
use tracing::{debug, info, instrument};

/// Logical player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Side {
    /// Moves relayed from the guest's human.
    #[display("human")]
    Human,
    /// Moves chosen by the move engine.
    #[display("automated")]
    Automated,
}

impl Side {
    /// The other side.
    pub fn other(self) -> Self {
        match self {
            Side::Human => Side::Automated,
            Side::Automated => Side::Human,
        }
    }
}

/// Host state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the guest to say who starts.
    AwaitingStartChoice,
    /// `side` is to move.
    PlayingTurn(Side),
    /// The last move ended the game.
    GameOver(Outcome),
    /// Waiting for the guest to say whether to play again.
    AwaitingResetDecision,
    /// Session finished.
    Terminated,
}

/// One game: board, mark binding, side to move and human move counter.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    starter: Starter,
    to_move: Side,
    human_moves: u32,
    history: Vec<Move>,
}

impl GameSession {
    /// Starts a game on an empty board. The starter plays X.
    #[instrument]
    pub fn new(board_size: usize, starter: Starter) -> Result<Self, BoardError> {
        let to_move = match starter {
            Starter::Human => Side::Human,
            Starter::Automated => Side::Automated,
        };
        info!(%to_move, human = %starter.human_mark(), "New game");
        Ok(Self {
            board: Board::with_size(board_size)?,
            starter,
            to_move,
            human_moves: 0,
            history: Vec::new(),
        })
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Mark bound to `side`.
    pub fn mark_of(&self, side: Side) -> Mark {
        match side {
            Side::Human => self.starter.human_mark(),
            Side::Automated => self.starter.automated_mark(),
        }
    }

    /// Accepted human moves so far.
    pub fn human_moves(&self) -> u32 {
        self.human_moves
    }

    /// Accepted moves in play order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Number used in the next `user_move<N>` request.
    pub fn next_human_move(&self) -> u32 {
        self.human_moves + 1
    }

    /// Applies the side-to-move's mark at `position`.
    ///
    /// On success the turn passes unless the game ended, and the outcome is
    /// returned. A rejected move leaves the session untouched.
    #[instrument(skip(self), fields(side = %self.to_move))]
    pub fn apply(&mut self, position: Position) -> Result<Option<Outcome>, MoveError> {
        let side = self.to_move;
        let mark = self.mark_of(side);
        self.board.place(position, mark)?;
        self.history.push(Move::new(mark, position));

        if side == Side::Human {
            self.human_moves += 1;
        }

        let result = outcome(&self.board);
        if result.is_none() {
            self.to_move = side.other();
        }
        debug!(%position, %mark, outcome = ?result, "Move applied");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_start_binds_x() {
        let session = GameSession::new(3, Starter::Human).unwrap();
        assert_eq!(session.to_move(), Side::Human);
        assert_eq!(session.mark_of(Side::Human), Mark::X);
        assert_eq!(session.mark_of(Side::Automated), Mark::O);
    }

    #[test]
    fn test_automated_start_binds_x() {
        let session = GameSession::new(3, Starter::Automated).unwrap();
        assert_eq!(session.to_move(), Side::Automated);
        assert_eq!(session.mark_of(Side::Automated), Mark::X);
    }

    #[test]
    fn test_apply_passes_turn_and_counts_human_moves() {
        let mut session = GameSession::new(3, Starter::Human).unwrap();
        assert_eq!(session.next_human_move(), 1);
        assert_eq!(session.apply(Position::new(0, 0)), Ok(None));
        assert_eq!(session.to_move(), Side::Automated);
        assert_eq!(session.next_human_move(), 2);
        assert_eq!(session.apply(Position::new(1, 1)), Ok(None));
        assert_eq!(session.human_moves(), 1);
        assert_eq!(
            session.history(),
            &[
                Move::new(Mark::X, Position::new(0, 0)),
                Move::new(Mark::O, Position::new(1, 1))
            ]
        );
    }

    #[test]
    fn test_occupied_move_is_rejected_without_change() {
        let mut session = GameSession::new(3, Starter::Human).unwrap();
        session.apply(Position::new(0, 0)).unwrap();
        let before = session.board().clone();

        let err = session.apply(Position::new(0, 0)).unwrap_err();
        assert_eq!(err, MoveError::Occupied(Position::new(0, 0)));
        assert_eq!(session.board(), &before);
        assert_eq!(session.to_move(), Side::Automated);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_winning_move_keeps_turn() {
        let mut session = GameSession::new(3, Starter::Human).unwrap();
        for pos in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            session.apply(Position::new(pos.0, pos.1)).unwrap();
        }
        let result = session.apply(Position::new(0, 2)).unwrap();
        assert_eq!(result, Some(Outcome::Won(Mark::X)));
        assert_eq!(session.to_move(), Side::Human);
    }
}
