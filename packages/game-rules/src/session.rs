use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::GameError;
use crate::models::{
    Ballot, DoctorState, Faction, KillChoice, NightSubmissions, Player, PlayerId, Role,
    RoleAssignment, Settings, SettingsPatch, VoteChoice,
};
use crate::phase::{advance, NightStep, Phase, PhaseEvent, PhaseError};
use crate::rules::{
    assign_roles, evaluate_win, investigate, resolve_day, resolve_night, DayResult,
    Investigation, NightResult, WinResult,
};

/// Everything that happened when one phase was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub from: Phase,
    pub to: Phase,
    pub day: Option<DayResult>,
    pub night: Option<NightResult>,
    pub win: Option<WinResult>,
    /// Night steps closed on the spot because nobody alive holds their role.
    pub skipped: Vec<NightStep>,
}

impl PhaseReport {
    fn new(from: Phase) -> Self {
        Self {
            from,
            to: from,
            day: None,
            night: None,
            win: None,
            skipped: Vec::new(),
        }
    }
}

/// One table, from the lobby to the final verdict.
///
/// The session owns every piece of mutable game state and is the only place
/// that applies deaths, charges the doctor's self-save allowance and moves
/// the phase. Closing a phase reads the round's inputs exactly once;
/// anything submitted afterwards is refused because the phase has moved on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    settings: Settings,
    players: Vec<Player>,
    assignment: RoleAssignment,
    ballot: Ballot,
    night: NightSubmissions,
    doctor: DoctorState,
    phase: Phase,
    round: u32,
    phase_serial: u64,
    advance_requests: BTreeSet<PlayerId>,
    win: WinResult,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: settings.normalized(),
            players: Vec::new(),
            assignment: RoleAssignment::new(),
            ballot: Ballot::new(),
            night: NightSubmissions::default(),
            doctor: DoctorState::default(),
            phase: Phase::Waiting,
            round: 0,
            phase_serial: 0,
            advance_requests: BTreeSet::new(),
            win: WinResult::ONGOING,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Day number, starting at 1 once the game is running.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Bumped on every transition so stale timers can tell they are stale.
    pub fn phase_serial(&self) -> u64 {
        self.phase_serial
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn night_submissions(&self) -> &NightSubmissions {
        &self.night
    }

    pub fn doctor_state(&self) -> DoctorState {
        self.doctor
    }

    /// Full role table. Only the host should ever see this.
    pub fn assignment(&self) -> &RoleAssignment {
        &self.assignment
    }

    pub fn role_of(&self, id: &PlayerId) -> Option<Role> {
        self.assignment.get(id).copied()
    }

    pub fn win(&self) -> WinResult {
        self.win
    }

    pub fn winner(&self) -> Option<Faction> {
        self.win.winner
    }

    pub fn advance_requests(&self) -> &BTreeSet<PlayerId> {
        &self.advance_requests
    }

    /// Ids of players who vote, act and count for a win.
    pub fn alive_ids(&self) -> BTreeSet<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id.clone())
            .collect()
    }

    /// Applies a host's changes while the table is still in the lobby.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<&Settings, GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        self.settings = self.settings.merge(patch);
        Ok(&self.settings)
    }

    pub fn join(&mut self, id: PlayerId, name: String) -> Result<(), GameError> {
        self.add_player(Player::new(id, name))
    }

    pub fn join_host(&mut self, id: PlayerId, name: String) -> Result<(), GameError> {
        self.add_player(Player::host(id, name))
    }

    fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.player(&player.id).is_some() {
            return Err(GameError::DuplicatePlayer(player.id));
        }
        debug!("Player {} joined as {:?}", player.id, player.name);
        self.players.push(player);
        Ok(())
    }

    /// Players may only leave before roles are dealt.
    pub fn leave(&mut self, id: &PlayerId) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        let index = self
            .players
            .iter()
            .position(|p| p.id == *id)
            .ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        self.players.remove(index);
        Ok(())
    }

    /// Deals roles to every non-host player in join order and opens the
    /// first discussion.
    pub fn start<R>(&mut self, rng: &mut R) -> Result<PhaseReport, GameError>
    where
        R: Rng + ?Sized,
    {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        let ids: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| !p.is_host)
            .map(|p| p.id.clone())
            .collect();
        // Killers must start strictly outnumbered or the deal alone decides the game.
        let needed = 2 * self.settings.killer_count as usize + 1;
        if ids.len() < needed {
            return Err(GameError::NotEnoughPlayers {
                needed,
                joined: ids.len(),
            });
        }

        self.assignment = assign_roles(&ids, &self.settings, rng);
        info!("Dealt roles to {} players", self.assignment.len());

        let mut report = PhaseReport::new(self.phase);
        self.transition(PhaseEvent::GameStarted)?;
        self.begin_round();
        report.to = self.phase;
        Ok(report)
    }

    pub fn submit_vote(&mut self, voter: &PlayerId, choice: VoteChoice) -> Result<(), GameError> {
        self.require_phase(|phase| phase == Phase::Voting)?;
        self.require_actor(voter, None)?;
        if let VoteChoice::Player(target) = &choice {
            self.require_alive_target(target)?;
        }
        self.ballot.cast(voter.clone(), choice);
        Ok(())
    }

    pub fn submit_kill(&mut self, killer: &PlayerId, choice: KillChoice) -> Result<(), GameError> {
        self.require_phase(|phase| phase == Phase::Night(NightStep::Kill))?;
        self.require_actor(killer, Some(Role::Killer))?;
        match &choice {
            KillChoice::NoKill if !self.settings.allow_no_kill => {
                return Err(GameError::NoKillDisabled)
            }
            KillChoice::NoKill => {}
            KillChoice::Target(target) => self.require_alive_target(target)?,
        }
        self.night.submit_kill(killer.clone(), choice);
        Ok(())
    }

    /// Returns `false` when this doctor already protected someone tonight;
    /// the first protection stands.
    pub fn submit_protect(
        &mut self,
        doctor: &PlayerId,
        target: &PlayerId,
    ) -> Result<bool, GameError> {
        self.require_phase(|phase| phase == Phase::Night(NightStep::Protect))?;
        self.require_actor(doctor, Some(Role::Doctor))?;
        self.require_alive_target(target)?;
        Ok(self.night.submit_protect(doctor.clone(), target.clone()))
    }

    pub fn submit_investigate(
        &mut self,
        detective: &PlayerId,
        target: &PlayerId,
    ) -> Result<Investigation, GameError> {
        self.require_phase(|phase| phase == Phase::Night(NightStep::Investigate))?;
        self.require_actor(detective, Some(Role::Detective))?;
        if detective == target {
            return Err(GameError::InvalidTarget(target.clone()));
        }
        self.require_alive_target(target)?;
        let result = investigate(target, &self.assignment)
            .ok_or_else(|| GameError::InvalidTarget(target.clone()))?;
        self.night.submit_investigate(detective.clone(), target.clone());
        Ok(result)
    }

    /// Every player expected to submit in the current phase has done so.
    /// Always false outside voting and night steps.
    pub fn inputs_complete(&self) -> bool {
        let alive = self.alive_ids();
        match self.phase {
            Phase::Voting => alive.iter().all(|id| self.ballot.get(id).is_some()),
            Phase::Night(step) => {
                let mut actors = alive
                    .iter()
                    .filter(|id| self.role_of(id) == Some(step.actor()));
                match step {
                    NightStep::Kill => actors.all(|id| self.night.kill.contains_key(id)),
                    NightStep::Protect => {
                        actors.all(|id| self.night.protect.iter().any(|(by, _)| by == id))
                    }
                    NightStep::Investigate => {
                        actors.all(|id| self.night.investigate.contains_key(id))
                    }
                }
            }
            _ => false,
        }
    }

    /// Records that `id` wants to move on early and returns how many alive
    /// players have asked so far this phase. How many are needed is up to
    /// the caller.
    pub fn request_early_advance(&mut self, id: &PlayerId) -> Result<usize, GameError> {
        self.require_phase(|phase| {
            matches!(phase, Phase::Discussion | Phase::Night(_) | Phase::Morning)
        })?;
        self.require_actor(id, None)?;
        self.advance_requests.insert(id.clone());
        Ok(self.advance_requests.len())
    }

    /// Closes the current phase and resolves whatever it collected.
    ///
    /// `trigger` is either `TimerExpired` or `EarlyAdvance`.
    pub fn close_phase(&mut self, trigger: PhaseEvent) -> Result<PhaseReport, GameError> {
        if !matches!(trigger, PhaseEvent::TimerExpired | PhaseEvent::EarlyAdvance) {
            return Err(PhaseError::InvalidTransition {
                phase: self.phase,
                event: trigger,
            }
            .into());
        }

        let mut report = PhaseReport::new(self.phase);
        match self.phase {
            Phase::Waiting => return Err(GameError::NotStarted),
            Phase::Ended => return Err(PhaseError::GameOver.into()),
            Phase::Discussion => {
                self.transition(trigger)?;
                self.ballot.clear();
            }
            Phase::Voting => {
                let day = resolve_day(&self.ballot, &self.alive_ids(), &self.settings);
                info!("Day {} closed: {:?}", self.round, day.reason);
                if let Some(id) = &day.eliminated {
                    self.apply_death(id);
                }
                let win = self.evaluate();
                report.day = Some(day);
                report.win = Some(win);
                self.transition(PhaseEvent::RoundResolved(win))?;
                if self.phase.is_night() {
                    self.night.clear();
                    self.skip_idle_steps(&mut report)?;
                }
            }
            Phase::Night(step) if step.next().is_some() => {
                self.transition(trigger)?;
                self.skip_idle_steps(&mut report)?;
            }
            Phase::Night(_) => self.resolve_night_round(&mut report)?,
            Phase::Morning => {
                self.transition(trigger)?;
                self.begin_round();
            }
        }
        report.to = self.phase;
        Ok(report)
    }

    /// Host stops the game without a verdict.
    pub fn abort(&mut self) -> Result<PhaseReport, GameError> {
        let mut report = PhaseReport::new(self.phase);
        self.transition(PhaseEvent::Aborted)?;
        report.to = self.phase;
        Ok(report)
    }

    fn begin_round(&mut self) {
        self.round += 1;
        self.ballot.clear();
        self.night.clear();
        self.advance_requests.clear();
    }

    /// Closes night steps whose role has nobody alive to act, resolving the
    /// night if that runs past the last step.
    fn skip_idle_steps(&mut self, report: &mut PhaseReport) -> Result<(), GameError> {
        while let Phase::Night(step) = self.phase {
            let actor = step.actor();
            let has_actor = self
                .players
                .iter()
                .any(|p| p.is_active() && self.role_of(&p.id) == Some(actor));
            if has_actor {
                break;
            }
            debug!("No alive {} for {:?}, skipping", actor, step);
            report.skipped.push(step);
            if step.next().is_some() {
                self.transition(PhaseEvent::TimerExpired)?;
            } else {
                self.resolve_night_round(report)?;
            }
        }
        Ok(())
    }

    fn resolve_night_round(&mut self, report: &mut PhaseReport) -> Result<(), GameError> {
        let night = resolve_night(&self.night, &self.alive_ids(), &self.settings, &self.doctor);
        info!("Night {} closed: {:?}", self.round, night.reason);

        if night.is_self_save() && self.doctor.self_save_used < self.settings.doctor_self_save_max {
            self.doctor.self_save_used += 1;
        }
        if let Some(id) = &night.died {
            self.apply_death(id);
        }
        let win = self.evaluate();
        report.night = Some(night);
        report.win = Some(win);
        self.transition(PhaseEvent::RoundResolved(win))
    }

    fn apply_death(&mut self, id: &PlayerId) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == *id) {
            player.kill();
            info!("Player {} died", id);
        }
    }

    fn evaluate(&mut self) -> WinResult {
        self.win = evaluate_win(&self.players, &self.assignment);
        if let Some(winner) = self.win.winner {
            info!("{} win", winner);
        }
        self.win
    }

    fn transition(&mut self, event: PhaseEvent) -> Result<(), GameError> {
        let next = advance(self.phase, event)?;
        info!("Phase {} -> {} ({:?})", self.phase, next, event);
        self.phase = next;
        self.phase_serial += 1;
        self.advance_requests.clear();
        Ok(())
    }

    fn require_phase(&self, accepts: impl Fn(Phase) -> bool) -> Result<(), GameError> {
        match self.phase {
            Phase::Waiting => Err(GameError::NotStarted),
            phase if accepts(phase) => Ok(()),
            actual => Err(GameError::WrongPhase { actual }),
        }
    }

    fn require_actor(&self, id: &PlayerId, role: Option<Role>) -> Result<(), GameError> {
        let player = self
            .player(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        if player.is_host {
            return Err(GameError::HostCannotAct);
        }
        if !player.is_alive() {
            return Err(GameError::PlayerDead(id.clone()));
        }
        match role {
            Some(expected) if self.role_of(id) != Some(expected) => Err(GameError::WrongRole {
                player: id.clone(),
                expected,
            }),
            _ => Ok(()),
        }
    }

    fn require_alive_target(&self, target: &PlayerId) -> Result<(), GameError> {
        match self.player(target) {
            Some(p) if p.is_active() => Ok(()),
            _ => Err(GameError::InvalidTarget(target.clone())),
        }
    }
}
