//! In-process search engine.

use super::{EngineError, MoveEngine};
use tictactoe_core::{Board, Mark, Position, best_move};
use tracing::{debug, instrument};

/// Runs the minimax search on a blocking worker thread.
#[derive(Debug, Clone, Default)]
pub struct LocalEngine;

impl LocalEngine {
    /// Creates a local engine.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MoveEngine for LocalEngine {
    #[instrument(skip(self, board), fields(occupied = board.occupied()))]
    async fn choose(&self, board: &Board, _human: Mark, ai: Mark) -> Result<Position, EngineError> {
        let snapshot = board.clone();
        let choice = tokio::task::spawn_blocking(move || best_move(&snapshot, ai))
            .await
            .map_err(|e| EngineError::new(format!("Search task failed: {}", e)))?;

        let position = choice.ok_or_else(|| EngineError::new("No empty square left"))?;
        debug!(%position, "Local search chose move");
        Ok(position)
    }

    fn name(&self) -> &str {
        "local"
    }
}
