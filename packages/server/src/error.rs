use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use game_rules::{GameError, PhaseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Room {0} not found")]
    RoomNotFound(String),
    #[error("Player {0} not found")]
    PlayerNotFound(String),
    #[error("A valid player token is required")]
    Unauthorized,
    #[error("Not allowed to act as player {0}")]
    Forbidden(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::RoomNotFound(_) | ServiceError::PlayerNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Game(GameError::UnknownPlayer(_)) => StatusCode::NOT_FOUND,
            ServiceError::Game(GameError::HostCannotAct | GameError::WrongRole { .. }) => {
                StatusCode::FORBIDDEN
            }
            ServiceError::Game(
                GameError::WrongPhase { .. }
                | GameError::AlreadyStarted
                | GameError::NotStarted
                | GameError::Phase(PhaseError::GameOver),
            ) => StatusCode::CONFLICT,
            ServiceError::Game(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
