use game_rules::{
    DayResult, DoctorState, Faction, Investigation, NightReason, NightResult, Phase,
    PhaseReport, Player, PlayerId, Role, RoleAssignment, Session, WinResult,
};
use serde::{Deserialize, Serialize};

/// What every participant may see of a table. Roles stay hidden until the
/// game is over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub room_id: String,
    pub phase: Phase,
    pub round: u32,
    pub phase_serial: u64,
    pub players: Vec<PlayerView>,
    pub votes_cast: usize,
    pub advance_requests: usize,
    /// Self-save usage, revealed with the roles.
    pub doctor: Option<DoctorState>,
    pub winner: Option<Faction>,
    pub roles: Option<RoleAssignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub is_host: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        PlayerView {
            id: player.id.clone(),
            name: player.name.clone(),
            alive: player.is_alive(),
            is_host: player.is_host,
        }
    }
}

impl GameView {
    pub fn of(room_id: &str, session: &Session) -> Self {
        let revealed = session.phase() == Phase::Ended;
        GameView {
            room_id: room_id.to_string(),
            phase: session.phase(),
            round: session.round(),
            phase_serial: session.phase_serial(),
            players: session.players().iter().map(PlayerView::from).collect(),
            votes_cast: session.ballot().len(),
            advance_requests: session.advance_requests().len(),
            doctor: revealed.then(|| session.doctor_state()),
            winner: session.winner(),
            roles: revealed.then(|| session.assignment().clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleView {
    pub player_id: PlayerId,
    pub role: Role,
    pub label_tr: String,
    /// Fellow killers, only filled in for killers.
    pub teammates: Vec<PlayerId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteAction {
    pub voter_id: String,
    /// Another player's id or `"SKIP"`.
    pub target_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NightAction {
    Kill { target_id: String },
    NoKill,
    Protect { target_id: String },
    Investigate { target_id: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionRequest {
    pub player_id: String,
    pub action: NightAction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionResponse {
    pub accepted: bool,
    pub investigation: Option<Investigation>,
    pub phase: Phase,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EarlyAdvanceRequest {
    pub player_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EarlyAdvanceResponse {
    pub requests: usize,
    pub alive: usize,
    pub advanced: bool,
    pub phase: Phase,
}

/// What the whole table may learn about a night. The protector is left out
/// and a doctor's save on themself reads like any other save, so neither
/// outcome points at the doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicNightResult {
    pub died: Option<PlayerId>,
    pub saved: bool,
    pub reason: NightReason,
}

impl From<&NightResult> for PublicNightResult {
    fn from(night: &NightResult) -> Self {
        let reason = match night.reason {
            NightReason::DoctorSelfSave => NightReason::DoctorSave,
            NightReason::SelfSaveExhausted => NightReason::Killed,
            other => other,
        };
        PublicNightResult {
            died: night.died.clone(),
            saved: night.saved,
            reason,
        }
    }
}

/// A closed phase as broadcast and returned over HTTP. Skipped night steps
/// are dropped since they tell who is no longer alive to act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPhaseReport {
    pub from: Phase,
    pub to: Phase,
    pub day: Option<DayResult>,
    pub night: Option<PublicNightResult>,
    pub win: Option<WinResult>,
}

impl From<&PhaseReport> for PublicPhaseReport {
    fn from(report: &PhaseReport) -> Self {
        PublicPhaseReport {
            from: report.from,
            to: report.to,
            day: report.day.clone(),
            night: report.night.as_ref().map(PublicNightResult::from),
            win: report.win,
        }
    }
}

/// Result of an action that may have closed one or more phases.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub phase: Phase,
    pub reports: Vec<PublicPhaseReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_rules::NightStep;

    fn night_report(night: NightResult) -> PhaseReport {
        PhaseReport {
            from: Phase::Night(NightStep::Investigate),
            to: Phase::Morning,
            day: None,
            night: Some(night),
            win: Some(WinResult::ONGOING),
            skipped: vec![NightStep::Investigate],
        }
    }

    #[test]
    fn self_save_looks_like_any_save() {
        let report = night_report(NightResult {
            died: None,
            saved: true,
            reason: NightReason::DoctorSelfSave,
            protector: Some(PlayerId::from("doc")),
        });

        let public = PublicPhaseReport::from(&report);
        let night = public.night.clone().unwrap();
        assert_eq!(night.reason, NightReason::DoctorSave);
        assert!(night.saved);

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("doc\""));
        assert!(!json.contains("protector"));
        assert!(!json.contains("skipped"));
    }

    #[test]
    fn exhausted_self_save_reads_as_a_kill() {
        let report = night_report(NightResult {
            died: Some(PlayerId::from("doc")),
            saved: false,
            reason: NightReason::SelfSaveExhausted,
            protector: Some(PlayerId::from("doc")),
        });

        let night = PublicPhaseReport::from(&report).night.unwrap();
        assert_eq!(night.reason, NightReason::Killed);
        assert_eq!(night.died, Some(PlayerId::from("doc")));
    }
}
