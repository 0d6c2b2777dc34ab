use std::collections::HashMap;

use game_rules::{PlayerId, Settings, SettingsPatch};

use crate::{
    error::ServiceError,
    models::room::{Room, RoomSummary},
    state::AppState,
};

/// Opens a new room with the server defaults overlaid by the host's patch.
pub async fn create_room(state: AppState, name: Option<String>, patch: &SettingsPatch) -> String {
    let settings = Settings::default()
        .merge(&state.config.default_settings)
        .merge(patch);
    let room_id = uuid::Uuid::new_v4().simple().to_string();
    let new_room = Room::new(room_id.clone(), name, settings);

    state.rooms.lock().await.insert(room_id.clone(), new_room);
    tracing::info!("Room {} created", room_id);
    room_id
}

/// Seats a player and returns the token only they should hold.
pub async fn join_room(
    state: AppState,
    room_id: &str,
    player_id: &str,
    name: &str,
    is_host: bool,
) -> Result<String, ServiceError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

    let id = PlayerId::from(player_id);
    let name = if name.trim().is_empty() {
        (if is_host { "HOST" } else { "Player" }).to_string()
    } else {
        name.to_string()
    };
    if is_host {
        room.session.join_host(id.clone(), name)?;
    } else {
        room.session.join(id.clone(), name)?;
    }
    Ok(room.issue_token(&id))
}

pub async fn leave_room(
    state: AppState,
    room_id: &str,
    player_id: &str,
) -> Result<(), ServiceError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    let id = PlayerId::from(player_id);
    room.session.leave(&id)?;
    room.revoke_tokens(&id);
    Ok(())
}

pub async fn update_settings(
    state: AppState,
    room_id: &str,
    patch: &SettingsPatch,
) -> Result<Settings, ServiceError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    Ok(room.session.update_settings(patch)?.clone())
}

pub async fn get_rooms(state: &AppState) -> HashMap<String, RoomSummary> {
    state
        .rooms
        .lock()
        .await
        .iter()
        .map(|(id, room)| (id.clone(), room.summary()))
        .collect()
}

pub async fn get_room_info(state: &AppState, room_id: &str) -> Result<RoomSummary, ServiceError> {
    let rooms = state.rooms.lock().await;
    rooms
        .get(room_id)
        .map(Room::summary)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

pub async fn delete_room(state: AppState, room_id: &str) -> bool {
    let removed = state.rooms.lock().await.remove(room_id).is_some();
    if removed {
        state.drop_room_channel(room_id).await;
    }
    removed
}
