use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::info;

use crate::state::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id))
}

/// Streams the room's phase notifications to one client. Anything the client
/// sends is ignored apart from closing the socket.
pub async fn handle_socket(ws: WebSocket, state: AppState, room_id: String) {
    info!("New WebSocket connection established for room: {}", room_id);
    let tx = state.get_or_create_room_channel(&room_id).await;

    let (mut sender, mut receiver) = ws.split();
    let mut rx = tx.subscribe();

    let room_id_for_send = room_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = sender.send(msg).await {
                        tracing::debug!("Client in room {} went away: {}", room_id_for_send, e);
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "WebSocket client in room {} lagged, {} notifications dropped",
                        room_id_for_send,
                        skipped
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    // どちらかが終了したらもう一方も止める
    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
    info!("WebSocket connection closed for room: {}", room_id);
}
