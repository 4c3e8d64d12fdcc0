//! Guest side: relays the human's answers and mirrors the host's board.

use super::{HumanInput, SessionSummary};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::protocol::Message;
use crate::transport::{Channel, Transport};
use tictactoe_core::{Board, Mark, Move, Outcome, Position, Square};
use tracing::{debug, info, instrument, warn};

/// Drives a session from the responding peer.
pub struct Guest<C> {
    transport: Transport<C>,
    input: Box<dyn HumanInput>,
    board_size: usize,
    board: Board,
    moves: Vec<Move>,
    human_mark: Mark,
}

impl<C: Channel> Guest<C> {
    /// Creates a guest over `transport`, answering through `input`.
    pub fn new(
        transport: Transport<C>,
        input: Box<dyn HumanInput>,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let board_size = *config.board_size();
        Ok(Self {
            transport,
            input,
            board_size,
            board: Board::with_size(board_size)?,
            moves: Vec::new(),
            human_mark: Mark::X,
        })
    }

    /// Answers host requests until the human declines a reset.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        info!("Guest session starting");
        let mut summary = SessionSummary::default();

        loop {
            let line = self.transport.receive().await?;
            match Message::parse(&line) {
                Message::UserChoice => {
                    let starter = self.input.choose_starter().await?;
                    self.board = Board::with_size(self.board_size)?;
                    self.moves.clear();
                    self.human_mark = starter.human_mark();
                    info!(human = %self.human_mark, "Start choice made");
                    self.send(&Message::StartChoice(starter)).await?;
                }
                Message::UserMove(number) => {
                    let text = self.input.choose_move(&self.board, number).await?;
                    self.send(&Message::Text(text)).await?;
                }
                Message::AiMove(position) => {
                    self.input.notify(&format!("Computer played {}", position));
                    self.mirror(position, self.human_mark.opponent());
                }
                Message::BoardUpdate { position, mark } => self.mirror(position, mark),
                Message::MoveInvalid => self.input.notify("Invalid square, try again."),
                Message::MoveOccupied => self.input.notify("That square is taken, try again."),
                Message::Won(mark) => self.finish(&mut summary, Outcome::Won(mark)),
                Message::Draw => self.finish(&mut summary, Outcome::Draw),
                Message::ResetChoice => {
                    let again = self.input.play_again().await?;
                    self.send(&Message::ResetAnswer(again)).await?;
                    if !again {
                        break;
                    }
                }
                other => debug!(?other, "Ignoring unexpected message"),
            }
        }

        info!(games = summary.games().len(), "Guest session finished");
        Ok(summary)
    }

    async fn send(&mut self, message: &Message) -> Result<(), SessionError> {
        self.transport.send(&message.to_string()).await?;
        Ok(())
    }

    fn mirror(&mut self, position: Position, mark: Mark) {
        if self.board.get(position) == Some(Square::Occupied(mark)) {
            return;
        }
        match self.board.place(position, mark) {
            Ok(()) => self.moves.push(Move::new(mark, position)),
            Err(e) => warn!(error = %e, "Mirror board out of sync with host"),
        }
    }

    fn finish(&mut self, summary: &mut SessionSummary, outcome: Outcome) {
        self.input.notify(&format!("{}\n{}", self.board.display(), outcome));
        summary.record(outcome, self.board.clone(), self.moves.clone());
    }
}
