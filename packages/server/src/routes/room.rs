use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use game_rules::{Settings, SettingsPatch};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::{
    error::ServiceError,
    models::room::{CreateRoomRequest, JoinRoomRequest, JoinRoomResponse, RoomSummary},
    services::room_service,
    state::AppState,
    utils::{auth, websocket},
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // ルーム作成（ボディは省略可）
        // curl -X POST http://localhost:8080/api/room/create -d '{"settings":{"killer_count":2}}'
        .route("/create", post(create_room))
        // ルーム一覧取得
        // curl http://localhost:8080/api/room/rooms
        .route("/rooms", get(get_rooms))
        // 特定のルーム情報取得
        // curl http://localhost:8080/api/room/{roomid}
        .route("/:roomid", get(get_room_info))
        // ルーム参加
        // curl -X POST http://localhost:8080/api/room/{roomid}/join
        //   -d '{"player_id":"1","name":"Ayşe"}'
        .route("/:roomid/join", post(join_room))
        // ルーム脱退（参加時のトークンが必要）
        // curl -X POST .../{roomid}/leave/{playerid} -H 'Authorization: Bearer {token}'
        .route("/:roomid/leave/:playerid", post(leave_room))
        // ゲーム開始前のルール変更
        // curl -X POST .../{roomid}/settings -d '{"include_doctor":false}'
        .route("/:roomid/settings", post(update_settings))
        // ルーム削除
        // curl -X DELETE http://localhost:8080/api/room/{roomid}/delete
        .route("/:roomid/delete", delete(delete_room))
        // WebSocket接続（フェーズ変更の通知のみ）
        // websocat ws://localhost:8080/api/room/ws/{roomid}
        .route("/ws/:roomid", get(websocket::handler))
        .with_state(state)
}

pub async fn create_room(
    State(state): State<AppState>,
    body: Option<Json<CreateRoomRequest>>,
) -> (StatusCode, Json<Value>) {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let room_id = room_service::create_room(state, request.name, &request.settings).await;
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "room_id": room_id,
            "message": format!("Room created with ID: {}", room_id),
        })),
    )
}

async fn get_rooms(
    State(state): State<AppState>,
) -> (StatusCode, Json<HashMap<String, RoomSummary>>) {
    let rooms = room_service::get_rooms(&state).await;
    (StatusCode::OK, Json(rooms))
}

async fn get_room_info(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummary>, ServiceError> {
    let room = room_service::get_room_info(&state, &room_id).await?;
    Ok(Json(room))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, ServiceError> {
    let token = room_service::join_room(
        state,
        &room_id,
        &request.player_id,
        &request.name,
        request.is_host,
    )
    .await?;
    Ok(Json(JoinRoomResponse {
        success: true,
        message: "Successfully joined room".to_string(),
        token,
    }))
}

pub async fn leave_room(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    auth::authorize(&state, &room_id, &headers, &player_id).await?;
    room_service::leave_room(state, &room_id, &player_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Successfully left room",
    })))
}

async fn update_settings(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ServiceError> {
    let settings = room_service::update_settings(state, &room_id, &patch).await?;
    Ok(Json(settings))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    if room_service::delete_room(state, &room_id).await {
        Ok(Json(json!({
            "success": true,
            "message": format!("Room {} deleted successfully", room_id),
        })))
    } else {
        Err(ServiceError::RoomNotFound(room_id))
    }
}
