//! HTTP search service.
//!
//! `POST /api/tictactoe` takes `{board, player, ai}` and answers `{board}`
//! with one automated move applied. `GET /health` answers `ok`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tictactoe_core::rules::is_full;
use tictactoe_core::{Board, MAX_SEARCH_SIZE, Mark, best_move};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Path of the search endpoint.
pub const SEARCH_PATH: &str = "/api/tictactoe";

/// Request for the automated move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Current board.
    pub board: Board,
    /// Mark of the human side.
    pub player: Mark,
    /// Mark of the automated side.
    pub ai: Mark,
}

/// Board after the automated move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Updated board.
    pub board: Board,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong.
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Builds the service router.
pub fn router() -> Router {
    Router::new()
        .route(SEARCH_PATH, post(search))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(payload))]
async fn search(
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected malformed request");
        api_error(StatusCode::BAD_REQUEST, "Invalid request format")
    })?;

    info!(
        board = ?request.board,
        player = %request.player,
        ai = %request.ai,
        "Search requested"
    );

    if request.player == request.ai {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "player and ai must use different marks",
        ));
    }

    if request.board.size() > MAX_SEARCH_SIZE {
        warn!(size = request.board.size(), "Board too large to search");
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("boards larger than {MAX_SEARCH_SIZE}x{MAX_SEARCH_SIZE} are not supported"),
        ));
    }

    let mut board = request.board;
    if is_full(&board) {
        info!("Board is full, returning it unchanged");
        return Ok(Json(SearchResponse { board }));
    }

    let snapshot = board.clone();
    let ai = request.ai;
    let choice = tokio::task::spawn_blocking(move || best_move(&snapshot, ai))
        .await
        .map_err(|e| {
            error!(error = %e, "Search task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    if let Some(position) = choice {
        board.place(position, ai).map_err(|e| {
            error!(error = %e, "Search returned an unplayable square");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
        info!(%position, "Automated move applied");
    }

    Ok(Json(SearchResponse { board }))
}

/// Serves the router on an already bound listener until the task is dropped.
#[instrument(skip(listener))]
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr().ok(), "Search service listening");
    axum::serve(listener, router()).await
}

/// Binds `addr` and runs the service as a background task.
///
/// Returns the bound address (useful with port 0) and the task handle.
#[instrument]
pub async fn spawn(addr: SocketAddr) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener).await {
            error!(error = %e, "Search service stopped");
        }
    });
    Ok((local, handle))
}
