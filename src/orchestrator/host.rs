//! Host side: authoritative board, move engine and turn sequencing.

use super::SessionSummary;
use crate::config::SessionConfig;
use crate::engine::{EngineError, MoveEngine};
use crate::error::SessionError;
use crate::protocol::{Message, Starter, UnexpectedReply};
use crate::session::{GameSession, Phase, Side};
use crate::transport::{Channel, Delivery, Transport};
use tictactoe_core::{Board, CoordinateError, Mark, MoveError, Outcome, Position};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Drives a session from the initiating peer.
pub struct Host<C> {
    transport: Transport<C>,
    engine: Box<dyn MoveEngine>,
    config: SessionConfig,
}

impl<C: Channel> Host<C> {
    /// Creates a host over `transport`, asking `engine` for automated moves.
    pub fn new(
        transport: Transport<C>,
        engine: Box<dyn MoveEngine>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            engine,
            config,
        }
    }

    /// Plays games until the guest declines a reset.
    ///
    /// Only rejected coordinates are handled in place; every other error
    /// ends the session.
    #[instrument(skip(self), fields(engine = self.engine.name()))]
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        info!("Host session starting");
        let mut summary = SessionSummary::default();
        let mut game = self.negotiate_start().await?;
        let mut phase = Phase::PlayingTurn(game.to_move());

        loop {
            debug!(?phase, "Host phase");
            phase = match phase {
                Phase::AwaitingStartChoice => {
                    game = self.negotiate_start().await?;
                    Phase::PlayingTurn(game.to_move())
                }
                Phase::PlayingTurn(side) => {
                    let finished = match side {
                        Side::Human => self.human_turn(&mut game).await?,
                        Side::Automated => self.automated_turn(&mut game).await?,
                    };
                    match finished {
                        Some(outcome) => Phase::GameOver(outcome),
                        None => Phase::PlayingTurn(game.to_move()),
                    }
                }
                Phase::GameOver(outcome) => {
                    self.announce(outcome).await?;
                    summary.record(outcome, game.board().clone(), game.history().to_vec());
                    Phase::AwaitingResetDecision
                }
                Phase::AwaitingResetDecision => {
                    if self.ask_reset().await? {
                        Phase::AwaitingStartChoice
                    } else {
                        Phase::Terminated
                    }
                }
                Phase::Terminated => break,
            };
        }

        info!(games = summary.games().len(), "Host session finished");
        Ok(summary)
    }

    async fn send(&mut self, message: &Message) -> Result<Delivery, SessionError> {
        Ok(self.transport.send(&message.to_string()).await?)
    }

    #[instrument(skip(self))]
    async fn negotiate_start(&mut self) -> Result<GameSession, SessionError> {
        self.send(&Message::UserChoice).await?;
        let reply = self.transport.receive().await?;
        let starter: Starter = reply.parse().map_err(|e: UnexpectedReply| {
            error!(reply = %reply, "Start choice must be 1 or 2");
            SessionError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        Ok(GameSession::new(*self.config.board_size(), starter)?)
    }

    #[instrument(skip(self, game), fields(number = game.next_human_move()))]
    async fn human_turn(
        &mut self,
        game: &mut GameSession,
    ) -> Result<Option<Outcome>, SessionError> {
        self.send(&Message::UserMove(game.next_human_move())).await?;
        let reply = self.transport.receive().await?;

        match apply_coordinate(game, &reply) {
            Ok((position, outcome)) => {
                let mark = game.mark_of(Side::Human);
                self.send(&Message::BoardUpdate { position, mark }).await?;
                Ok(outcome)
            }
            Err(err) if err.is_recoverable() => {
                warn!(reply = %reply, error = %err, "Human move rejected");
                let notice = match err {
                    SessionError::OccupiedCell { .. } => Message::MoveOccupied,
                    _ => Message::MoveInvalid,
                };
                self.send(&notice).await?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, game))]
    async fn automated_turn(
        &mut self,
        game: &mut GameSession,
    ) -> Result<Option<Outcome>, SessionError> {
        let ai = game.mark_of(Side::Automated);
        let human = game.mark_of(Side::Human);
        let position = self.choose_with_retry(game.board(), human, ai).await?;

        self.send(&Message::AiMove(position)).await?;
        let outcome = game.apply(position).map_err(|e| {
            SessionError::ServiceUnavailable(EngineError::new(format!(
                "Engine chose an unplayable square: {}",
                e
            )))
        })?;
        self.send(&Message::BoardUpdate { position, mark: ai }).await?;
        Ok(outcome)
    }

    async fn choose_with_retry(
        &self,
        board: &Board,
        human: Mark,
        ai: Mark,
    ) -> Result<Position, SessionError> {
        let retries = *self.config.engine_retries();
        let mut failures = 0;
        loop {
            match self.engine.choose(board, human, ai).await {
                Ok(position) => return Ok(position),
                Err(e) if failures < retries => {
                    failures += 1;
                    warn!(error = %e, failures, retries, "Engine call failed, retrying");
                    sleep(self.config.engine_retry_delay()).await;
                }
                Err(e) => {
                    error!(error = %e, "Engine unavailable");
                    return Err(SessionError::ServiceUnavailable(e));
                }
            }
        }
    }

    async fn announce(&mut self, outcome: Outcome) -> Result<(), SessionError> {
        info!(%outcome, "Game over");
        let message = match outcome {
            Outcome::Won(mark) => Message::Won(mark),
            Outcome::Draw => Message::Draw,
        };
        self.send(&message).await?;
        Ok(())
    }

    async fn ask_reset(&mut self) -> Result<bool, SessionError> {
        self.send(&Message::ResetChoice).await?;
        let reply = self.transport.receive().await?;
        let again = Message::parse(&reply) == Message::ResetAnswer(true);
        info!(reply = %reply, again, "Reset decision");
        Ok(again)
    }
}

/// Parses and plays the human's coordinate.
fn apply_coordinate(
    game: &mut GameSession,
    text: &str,
) -> Result<(Position, Option<Outcome>), SessionError> {
    let size = game.board().size();
    let position = Position::parse(text, size).map_err(SessionError::MalformedCoordinate)?;
    let outcome = game.apply(position).map_err(|e| match e {
        MoveError::Occupied(position) => SessionError::OccupiedCell { position },
        MoveError::OutOfBounds(_) => SessionError::MalformedCoordinate(CoordinateError::OutOfRange {
            text: text.to_string(),
            size,
        }),
    })?;
    Ok((position, outcome))
}
