use chrono::{DateTime, Utc};
use game_rules::{Phase, PlayerId, Session, Settings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::auth;

/// A table hosted by this server. The session inside is the authoritative
/// game state; everything clients see is derived from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub session: Session,
    /// Player token → player. Never serialised.
    #[serde(skip)]
    tokens: HashMap<String, PlayerId>,
}

impl Room {
    pub fn new(room_id: String, name: Option<String>, settings: Settings) -> Self {
        Room {
            room_id,
            name,
            created_at: Utc::now(),
            session: Session::new(settings),
            tokens: HashMap::new(),
        }
    }

    /// Hands out the secret a player proves their seat with.
    pub fn issue_token(&mut self, player_id: &PlayerId) -> String {
        let token = auth::new_token();
        self.tokens.insert(token.clone(), player_id.clone());
        token
    }

    pub fn player_for_token(&self, token: &str) -> Option<&PlayerId> {
        self.tokens.get(token)
    }

    pub fn revoke_tokens(&mut self, player_id: &PlayerId) {
        self.tokens.retain(|_, id| id != player_id);
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id.clone(),
            name: self.name.clone(),
            player_count: self.session.players().iter().filter(|p| !p.is_host).count(),
            phase: self.session.phase(),
            settings: self.session.settings().clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub name: Option<String>,
    pub player_count: usize,
    pub phase: Phase,
    pub settings: Settings,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub settings: game_rules::SettingsPatch,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub message: String,
    /// Send back as `Authorization: Bearer <token>` on role and action requests.
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub is_host: bool,
}
