//! REST server for Twenty Questions sessions.

use crate::games::twenty_questions::{GameError, MoveOutcome, PlayerAction, PlayerKind};
use crate::session::{GameView, SessionStore};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Body of `POST /api/games`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Kind of Player 1. Defaults to `llm`.
    #[serde(default = "default_first")]
    pub player1_type: PlayerKind,
    /// Kind of Player 2. Defaults to `human`.
    #[serde(default = "default_second")]
    pub player2_type: PlayerKind,
}

impl Default for CreateGameRequest {
    fn default() -> Self {
        Self {
            player1_type: default_first(),
            player2_type: default_second(),
        }
    }
}

fn default_first() -> PlayerKind {
    PlayerKind::Automated
}

fn default_second() -> PlayerKind {
    PlayerKind::Passive
}

/// Body of `POST /api/games/{id}/object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetObjectRequest {
    /// The secret object.
    pub object: String,
}

/// Response to a move: what happened and the game afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResponse {
    /// What the move did.
    pub outcome: MoveOutcome,
    /// Snapshot after the move.
    pub game: GameView,
}

/// Shared state for the REST handlers.
#[derive(Debug, Clone)]
pub struct GameServer {
    store: SessionStore,
}

impl GameServer {
    /// Creates a server around an existing store.
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// The sessions this server manages.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Builds the router.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(health))
            .route("/api/games", post(create_game))
            .route("/api/games/{id}", get(get_game))
            .route("/api/games/{id}/object", post(set_object))
            .route("/api/games/{id}/next", get(next_turn))
            .route("/api/games/{id}/action", post(submit_action))
            .with_state(self)
    }

    /// Binds `address` and serves until the process exits.
    #[instrument(skip(self))]
    pub async fn serve(self, address: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(address).await?;
        info!(address, "Server ready");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

#[instrument]
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "twenty_questions",
    }))
}

#[instrument(skip(server, body))]
async fn create_game(
    State(server): State<GameServer>,
    body: Bytes,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };
    let view = server
        .store
        .create(request.player1_type, request.player2_type)
        .await?;
    info!(session_id = %view.id, "Game created");
    Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(skip(server))]
async fn get_game(
    State(server): State<GameServer>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let session = server.store.get(&id)?;
    let session = session.lock().await;
    Ok(Json(session.view()))
}

#[instrument(skip(server, request))]
async fn set_object(
    State(server): State<GameServer>,
    Path(id): Path<String>,
    Json(request): Json<SetObjectRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let session = server.store.get(&id)?;
    let mut session = session.lock().await;
    let outcome = session.set_object(&request.object)?;
    Ok(Json(MoveResponse {
        outcome,
        game: session.view(),
    }))
}

#[instrument(skip(server))]
async fn next_turn(
    State(server): State<GameServer>,
    Path(id): Path<String>,
) -> Result<Json<MoveResponse>, ApiError> {
    let session = server.store.get(&id)?;
    let mut session = session.lock().await;
    let outcome = session.advance().await?;
    debug!(?outcome, "Automated turn finished");
    Ok(Json(MoveResponse {
        outcome,
        game: session.view(),
    }))
}

#[instrument(skip(server, action), fields(action_type = %action.action_type))]
async fn submit_action(
    State(server): State<GameServer>,
    Path(id): Path<String>,
    Json(action): Json<PlayerAction>,
) -> Result<Json<MoveResponse>, ApiError> {
    let session = server.store.get(&id)?;
    let mut session = session.lock().await;
    let outcome = session.apply(&action).await?;
    Ok(Json(MoveResponse {
        outcome,
        game: session.view(),
    }))
}

/// Error returned by a handler.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}: {}", status, message)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match &err {
            GameError::IllegalMove(_) | GameError::InvalidInput(_) | GameError::InvalidAnswer(_) => {
                StatusCode::BAD_REQUEST
            }
            GameError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GameError::ReasoningService(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "Request failed");
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
