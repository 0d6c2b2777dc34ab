use serde::{Deserialize, Serialize};

use crate::models::{Faction, Player, Role, RoleAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub ended: bool,
    pub winner: Option<Faction>,
}

impl WinResult {
    pub const ONGOING: WinResult = WinResult {
        ended: false,
        winner: None,
    };

    fn won_by(faction: Faction) -> Self {
        Self {
            ended: true,
            winner: Some(faction),
        }
    }
}

/// Alive killers against everyone else alive. Hosts and unassigned players
/// are not counted.
pub fn evaluate_win<'a, I>(players: I, assignment: &RoleAssignment) -> WinResult
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut killers = 0usize;
    let mut others = 0usize;
    for player in players.into_iter().filter(|p| p.is_active()) {
        match assignment.get(&player.id) {
            Some(Role::Killer) => killers += 1,
            Some(_) => others += 1,
            None => {}
        }
    }

    if killers == 0 {
        WinResult::won_by(Faction::Town)
    } else if killers >= others {
        WinResult::won_by(Faction::Killers)
    } else {
        WinResult::ONGOING
    }
}
