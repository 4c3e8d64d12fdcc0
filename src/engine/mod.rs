//! Sources of automated moves.
//!
//! - [`LocalEngine`]: in-process search
//! - [`ServiceEngine`]: the search service over HTTP

mod local;
mod service;

pub use local::LocalEngine;
pub use service::ServiceEngine;

use derive_more::{Display, Error};
use tictactoe_core::{Board, Mark, Position};
use tracing::instrument;

/// Trait for anything that can pick the automated side's move.
#[async_trait::async_trait]
pub trait MoveEngine: Send + Sync {
    /// Returns an empty square for `ai` to play on `board`.
    async fn choose(&self, board: &Board, human: Mark, ai: Mark) -> Result<Position, EngineError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Engine failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Engine error: {} at {}:{}", message, file, line)]
pub struct EngineError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl EngineError {
    /// Creates a new engine error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}
