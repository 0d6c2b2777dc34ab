use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable participant identity issued outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    alive: bool,
    pub is_host: bool,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            alive: true,
            is_host: false,
            joined_at: Utc::now(),
        }
    }

    /// Hosts drive the table but never hold a role, so they join dead.
    pub fn host(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            alive: false,
            is_host: true,
            joined_at: Utc::now(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Alive, non-host: the only players that vote, act and count for a win.
    pub fn is_active(&self) -> bool {
        self.alive && !self.is_host
    }

    /// One-way transition; there is no way back to alive.
    pub fn kill(&mut self) {
        self.alive = false;
    }
}
