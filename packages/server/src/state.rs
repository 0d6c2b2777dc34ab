use axum::extract::ws::Message;
use game_rules::PhaseReport;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, Mutex};

use crate::models::config::ServerConfig;
use crate::models::game::PublicPhaseReport;
use crate::models::room::Room;
use crate::utils::narration;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<Mutex<HashMap<String, Room>>>,
    pub channel: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
    pub config: Arc<ServerConfig>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            channel: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub async fn get_or_create_room_channel(&self, room_id: &str) -> broadcast::Sender<Message> {
        let mut channels = self.channel.lock().await;
        if let Some(channel) = channels.get(room_id) {
            channel.clone()
        } else {
            let (tx, _) = broadcast::channel(1000);
            channels.insert(room_id.to_string(), tx.clone());
            tx
        }
    }

    pub async fn drop_room_channel(&self, room_id: &str) {
        self.channel.lock().await.remove(room_id);
    }

    /// Tells every client in the room that a phase closed. Fire-and-forget:
    /// a room nobody listens to is not an error. Only the public part of the
    /// report goes out.
    pub async fn broadcast_phase_change(&self, room_id: &str, report: &PhaseReport) {
        let tx = self.get_or_create_room_channel(room_id).await;
        let report = PublicPhaseReport::from(report);

        let phase_notification = serde_json::json!({
            "message_type": "phase_change",
            "from_phase": report.from,
            "to_phase": report.to,
            "room_id": room_id,
            "announcement": narration::announce(&report),
            "day_result": report.day,
            "night_result": report.night,
            "win": report.win,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Ok(message_text) = serde_json::to_string(&phase_notification) {
            if tx.send(Message::Text(message_text)).is_err() {
                tracing::debug!("No listeners in room {} for phase change", room_id);
            }
        }
    }
}
