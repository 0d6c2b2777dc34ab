use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use game_rules::Faction;
use serde_json::{json, Value};

use crate::{
    error::ServiceError,
    models::game::{
        ActionOutcome, EarlyAdvanceRequest, EarlyAdvanceResponse, GameView, NightActionRequest,
        NightActionResponse, RoleView, VoteAction,
    },
    services::game_service,
    state::AppState,
    utils::auth,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:roomid",
            Router::new()
                // ゲームの基本操作
                // curl -X POST http://localhost:8080/api/game/{roomid}/start
                .route("/start", post(start_game))
                // curl -X POST http://localhost:8080/api/game/{roomid}/end
                .route("/end", post(end_game_handler))
                // curl http://localhost:8080/api/game/{roomid}/state
                .route("/state", get(get_game_state))
                // 自分の役職だけを返す（参加時のトークンが必要）
                // curl .../role/{playerid} -H 'Authorization: Bearer {token}'
                .route("/role/:playerid", get(get_role_handler))
                // ゲームアクション（本人のトークンが必要）
                .nest(
                    "/actions",
                    Router::new()
                        // curl -X POST .../vote -d '{"voter_id":"1","target_id":"SKIP"}'
                        .route("/vote", post(cast_vote_handler))
                        // curl -X POST .../night-action
                        //   -d '{"player_id":"2","action":{"type":"kill","target_id":"3"}}'
                        .route("/night-action", post(night_action_handler))
                        // curl -X POST .../actions/early-advance -d '{"player_id":"1"}'
                        .route("/early-advance", post(early_advance_handler)),
                )
                // ゲーム進行の管理（ホストのタイマー切れ）
                .route("/phase/next", post(advance_phase_handler))
                .route("/check-winner", get(check_winner_handler)),
        )
        .with_state(state)
}

pub async fn start_game(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<GameView>, ServiceError> {
    Ok(Json(game_service::start_game(state, &room_id).await?))
}

pub async fn get_game_state(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GameView>, ServiceError> {
    Ok(Json(game_service::get_game_state(state, room_id).await?))
}

async fn get_role_handler(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<RoleView>, ServiceError> {
    auth::authorize(&state, &room_id, &headers, &player_id).await?;
    Ok(Json(
        game_service::get_player_role(state, &room_id, &player_id).await?,
    ))
}

async fn end_game_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<GameView>, ServiceError> {
    Ok(Json(game_service::end_game(state, room_id).await?))
}

async fn night_action_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(action_req): Json<NightActionRequest>,
) -> Result<Json<NightActionResponse>, ServiceError> {
    auth::authorize(&state, &room_id, &headers, &action_req.player_id).await?;
    Ok(Json(
        game_service::process_night_action(state, &room_id, action_req).await?,
    ))
}

async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(vote_action): Json<VoteAction>,
) -> Result<Json<ActionOutcome>, ServiceError> {
    auth::authorize(&state, &room_id, &headers, &vote_action.voter_id).await?;
    let outcome = game_service::handle_vote(
        state,
        &room_id,
        &vote_action.voter_id,
        &vote_action.target_id,
    )
    .await?;
    Ok(Json(outcome))
}

async fn early_advance_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<EarlyAdvanceRequest>,
) -> Result<Json<EarlyAdvanceResponse>, ServiceError> {
    auth::authorize(&state, &room_id, &headers, &request.player_id).await?;
    Ok(Json(
        game_service::request_early_advance(state, &room_id, &request.player_id).await?,
    ))
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ActionOutcome>, ServiceError> {
    Ok(Json(game_service::advance_game_phase(state, &room_id).await?))
}

async fn check_winner_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    let result = game_service::check_winner(state, &room_id).await?;
    let message = match result.winner {
        None => "Game in progress",
        Some(Faction::Town) => "Town wins",
        Some(Faction::Killers) => "Killers win",
    };
    Ok(Json(json!({
        "ended": result.ended,
        "winner": result.winner,
        "message": message,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::room_service;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use game_rules::SettingsPatch;
    use std::collections::HashMap;
    use tower::ServiceExt;

    /// Room with players "1".."count" and the token each one got at join.
    async fn room_with_players(
        state: &AppState,
        count: usize,
    ) -> (String, HashMap<String, String>) {
        let room_id =
            room_service::create_room(state.clone(), None, &SettingsPatch::default()).await;
        let mut tokens = HashMap::new();
        for i in 1..=count {
            let id = i.to_string();
            let token = room_service::join_room(state.clone(), &room_id, &id, &id, false)
                .await
                .unwrap();
            tokens.insert(id, token);
        }
        (room_id, tokens)
    }

    fn post_json(uri: String, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_token(uri: String, token: Option<&str>) -> Request<Body> {
        let builder = Request::builder().uri(uri);
        let builder = match token {
            Some(token) => builder.header("authorization", format!("Bearer {}", token)),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_start_and_read_state() {
        let state = AppState::default();
        let (room_id, _) = room_with_players(&state, 5).await;
        let app = routes(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/start", room_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_with_token(format!("/{}/state", room_id), None))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let view: GameView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.players.len(), 5);
        assert!(view.roles.is_none());
        assert!(view.doctor.is_none());
    }

    #[tokio::test]
    async fn test_start_with_too_few_players() {
        let state = AppState::default();
        let (room_id, _) = room_with_players(&state, 2).await;
        let app = routes(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/start", room_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_role_is_only_shown_to_its_owner() {
        let state = AppState::default();
        let (room_id, tokens) = room_with_players(&state, 4).await;
        game_service::start_game(state.clone(), &room_id).await.unwrap();
        let app = routes(state);

        let own = app
            .clone()
            .oneshot(get_with_token(
                format!("/{}/role/1", room_id),
                Some(tokens["1"].as_str()),
            ))
            .await
            .unwrap();
        assert_eq!(own.status(), StatusCode::OK);
        let body = to_bytes(own.into_body(), usize::MAX).await.unwrap();
        let view: RoleView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.player_id.as_str(), "1");

        let someone_else = app
            .clone()
            .oneshot(get_with_token(
                format!("/{}/role/2", room_id),
                Some(tokens["1"].as_str()),
            ))
            .await
            .unwrap();
        assert_eq!(someone_else.status(), StatusCode::FORBIDDEN);

        let anonymous = app
            .oneshot(get_with_token(format!("/{}/role/2", room_id), None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cannot_vote_for_another_player() {
        let state = AppState::default();
        let (room_id, tokens) = room_with_players(&state, 4).await;
        game_service::start_game(state.clone(), &room_id).await.unwrap();
        game_service::advance_game_phase(state.clone(), &room_id)
            .await
            .unwrap();
        let app = routes(state.clone());

        let response = app
            .oneshot(post_json(
                format!("/{}/actions/vote", room_id),
                &tokens["1"],
                json!({ "voter_id": "2", "target_id": "3" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let rooms = state.rooms.lock().await;
        assert!(rooms[&room_id].session.ballot().is_empty());
    }

    #[tokio::test]
    async fn test_vote_outside_voting_conflicts() {
        let state = AppState::default();
        let (room_id, tokens) = room_with_players(&state, 4).await;
        game_service::start_game(state.clone(), &room_id).await.unwrap();
        let app = routes(state);

        let response = app
            .oneshot(post_json(
                format!("/{}/actions/vote", room_id),
                &tokens["1"],
                json!({ "voter_id": "1", "target_id": "2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_check_winner_while_running() {
        let state = AppState::default();
        let (room_id, _) = room_with_players(&state, 4).await;
        game_service::start_game(state.clone(), &room_id).await.unwrap();
        let app = routes(state);

        let response = app
            .oneshot(get_with_token(format!("/{}/check-winner", room_id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["ended"], json!(false));
        assert_eq!(value["message"], json!("Game in progress"));
    }
}
