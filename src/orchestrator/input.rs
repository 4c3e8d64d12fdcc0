//! Sources of the human's answers on the guest side.

use crate::error::SessionError;
use crate::protocol::Starter;
use std::collections::VecDeque;
use tictactoe_core::Board;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, instrument};

/// Trait for anything that can answer the host's questions for the human.
#[async_trait::async_trait]
pub trait HumanInput: Send {
    /// Who moves first.
    async fn choose_starter(&mut self) -> Result<Starter, SessionError>;

    /// Non-empty coordinate text for the `number`th human move.
    async fn choose_move(&mut self, board: &Board, number: u32) -> Result<String, SessionError>;

    /// Whether to play another game.
    async fn play_again(&mut self) -> Result<bool, SessionError>;

    /// Shows a status line to the human.
    fn notify(&mut self, _notice: &str) {}
}

/// Reads answers from standard input.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl std::fmt::Debug for ConsoleInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleInput").finish_non_exhaustive()
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInput {
    /// Creates a reader over stdin.
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn prompt(&mut self, question: &str) -> Result<String, SessionError> {
        loop {
            println!("{}", question);
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| SessionError::Input {
                    message: e.to_string(),
                })?
                .ok_or_else(|| SessionError::Input {
                    message: "standard input closed".to_string(),
                })?;

            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }
}

#[async_trait::async_trait]
impl HumanInput for ConsoleInput {
    async fn choose_starter(&mut self) -> Result<Starter, SessionError> {
        loop {
            let answer = self.prompt("Who starts? 1 = you, 2 = the computer").await?;
            match answer.parse() {
                Ok(starter) => return Ok(starter),
                Err(_) => println!("Please answer 1 or 2."),
            }
        }
    }

    async fn choose_move(&mut self, board: &Board, number: u32) -> Result<String, SessionError> {
        println!("\n{}", board.display());
        self.prompt(&format!("Move {}: enter a square such as a1", number))
            .await
    }

    async fn play_again(&mut self) -> Result<bool, SessionError> {
        let answer = self.prompt("Play again? (oui/non)").await?;
        Ok(answer.eq_ignore_ascii_case("oui"))
    }

    fn notify(&mut self, notice: &str) {
        println!("{}", notice);
    }
}

/// Replays prepared answers, failing once a queue runs dry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    starters: VecDeque<Starter>,
    moves: VecDeque<String>,
    answers: VecDeque<bool>,
}

impl ScriptedInput {
    /// Creates a script from start choices, coordinate texts and reset answers.
    pub fn new(
        starters: impl IntoIterator<Item = Starter>,
        moves: impl IntoIterator<Item = impl Into<String>>,
        answers: impl IntoIterator<Item = bool>,
    ) -> Self {
        Self {
            starters: starters.into_iter().collect(),
            moves: moves.into_iter().map(Into::into).collect(),
            answers: answers.into_iter().collect(),
        }
    }

    fn exhausted(what: &str) -> SessionError {
        SessionError::Input {
            message: format!("script has no {} left", what),
        }
    }
}

#[async_trait::async_trait]
impl HumanInput for ScriptedInput {
    async fn choose_starter(&mut self) -> Result<Starter, SessionError> {
        self.starters
            .pop_front()
            .ok_or_else(|| Self::exhausted("start choice"))
    }

    #[instrument(skip(self, _board))]
    async fn choose_move(&mut self, _board: &Board, number: u32) -> Result<String, SessionError> {
        let text = self.moves.pop_front().ok_or_else(|| Self::exhausted("move"))?;
        debug!(text = %text, "Scripted move");
        Ok(text)
    }

    async fn play_again(&mut self) -> Result<bool, SessionError> {
        self.answers
            .pop_front()
            .ok_or_else(|| Self::exhausted("reset answer"))
    }

    fn notify(&mut self, notice: &str) {
        debug!(notice, "Scripted input notified");
    }
}
