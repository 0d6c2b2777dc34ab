use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Citizen,
    Killer,
    Doctor,
    Detective,
}

/// The two winning sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Faction {
    Town,
    Killers,
}

impl Role {
    pub fn faction(&self) -> Faction {
        match self {
            Role::Killer => Faction::Killers,
            Role::Citizen | Role::Doctor | Role::Detective => Faction::Town,
        }
    }

    /// Label shown to players of the Turkish-language table.
    pub fn label_tr(&self) -> &'static str {
        match self {
            Role::Citizen => "Vatandaş",
            Role::Killer => "Katil",
            Role::Doctor => "Doktor",
            Role::Detective => "Dedektif",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Citizen => write!(f, "Citizen"),
            Role::Killer => write!(f, "Killer"),
            Role::Doctor => write!(f, "Doctor"),
            Role::Detective => write!(f, "Detective"),
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Town => write!(f, "Town"),
            Faction::Killers => write!(f, "Killers"),
        }
    }
}
