use axum::http::{header, HeaderMap};

use crate::{error::ServiceError, state::AppState};

/// Opaque per-seat secret. Only the player who joined ever sees it.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Checks that the request carries the token issued to `player_id` in this
/// room.
pub async fn authorize(
    state: &AppState,
    room_id: &str,
    headers: &HeaderMap,
    player_id: &str,
) -> Result<(), ServiceError> {
    // ヘッダーからトークンを取得
    let token = bearer_token(headers).ok_or(ServiceError::Unauthorized)?;

    let rooms = state.rooms.lock().await;
    let room = rooms
        .get(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    match room.player_for_token(token) {
        Some(owner) if owner.as_str() == player_id => Ok(()),
        Some(owner) => {
            tracing::warn!("Player {} tried to act as {}", owner, player_id);
            Err(ServiceError::Forbidden(player_id.to_string()))
        }
        None => Err(ServiceError::Unauthorized),
    }
}
