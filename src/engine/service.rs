//! Client for the search service.

use super::{EngineError, MoveEngine};
use crate::server::{ErrorResponse, SearchRequest, SearchResponse};
use tictactoe_core::{Board, Mark, Position, Square};
use tracing::{debug, error, info, instrument};

/// Asks the HTTP search service for each automated move.
#[derive(Debug, Clone)]
pub struct ServiceEngine {
    url: String,
    client: reqwest::Client,
}

impl ServiceEngine {
    /// Creates a client for the service endpoint at `url`.
    #[instrument]
    pub fn new(url: String) -> Self {
        info!("Creating search service client");
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

/// Finds the single square that went from empty to `ai`.
fn added_move(before: &Board, after: &Board, ai: Mark) -> Result<Position, EngineError> {
    if before.size() != after.size() {
        return Err(EngineError::new(format!(
            "Service returned a {}x{} board for a {}x{} request",
            after.size(),
            after.size(),
            before.size(),
            before.size()
        )));
    }

    let size = before.size();
    let changed: Vec<(usize, Square, Square)> = before
        .squares()
        .iter()
        .zip(after.squares())
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(i, (old, new))| (i, *old, *new))
        .collect();

    match changed.as_slice() {
        [(i, Square::Empty, Square::Occupied(mark))] if *mark == ai => {
            Ok(Position::new(i / size, i % size))
        }
        [] => Err(EngineError::new("Service returned the board unchanged")),
        _ => Err(EngineError::new(format!(
            "Service changed {} squares, expected one {} move",
            changed.len(),
            ai
        ))),
    }
}

#[async_trait::async_trait]
impl MoveEngine for ServiceEngine {
    #[instrument(skip(self, board), fields(url = %self.url))]
    async fn choose(&self, board: &Board, human: Mark, ai: Mark) -> Result<Position, EngineError> {
        let request = SearchRequest {
            board: board.clone(),
            player: human,
            ai,
        };

        debug!("Posting board to search service");
        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            error!(%status, reason = %reason, "Search service returned an error");
            return Err(EngineError::new(format!("Service replied {}: {}", status, reason)));
        }

        let reply: SearchResponse = response.json().await?;
        let position = added_move(board, &reply.board, ai)?;
        debug!(%position, "Service chose move");
        Ok(position)
    }

    fn name(&self) -> &str {
        "service"
    }
}
