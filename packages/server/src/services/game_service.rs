use game_rules::{
    KillChoice, Phase, PhaseEvent, PhaseReport, PlayerId, Role, Session, VoteChoice, WinResult,
};

use crate::{
    error::ServiceError,
    models::game::{
        ActionOutcome, EarlyAdvanceResponse, GameView, NightAction, NightActionRequest,
        NightActionResponse, PublicPhaseReport, RoleView,
    },
    models::room::Room,
    services::timer,
    state::AppState,
};

/// Snapshot taken under the room lock after something moved the table.
struct Progress {
    reports: Vec<PhaseReport>,
    phase: Phase,
    serial: u64,
    timer_secs: Option<u64>,
}

impl Progress {
    fn outcome(&self) -> ActionOutcome {
        ActionOutcome {
            phase: self.phase,
            reports: self.reports.iter().map(PublicPhaseReport::from).collect(),
        }
    }

    fn of(session: &Session, reports: Vec<PhaseReport>) -> Self {
        Progress {
            reports,
            phase: session.phase(),
            serial: session.phase_serial(),
            timer_secs: session.phase().duration_secs(session.settings()),
        }
    }
}

fn room_mut<'a>(
    rooms: &'a mut std::collections::HashMap<String, Room>,
    room_id: &str,
) -> Result<&'a mut Room, ServiceError> {
    rooms
        .get_mut(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

/// Broadcasts the closed phases and arms the timer for the new one.
async fn publish(state: &AppState, room_id: &str, progress: &Progress) {
    for report in &progress.reports {
        state.broadcast_phase_change(room_id, report).await;
    }
    if progress.reports.is_empty() || !state.config.auto_advance_phases {
        return;
    }
    if let Some(secs) = progress.timer_secs {
        timer::schedule_phase_timer(state.clone(), room_id.to_string(), progress.serial, secs);
    }
}

/// Closes the phase right away once everyone expected has submitted.
fn close_if_complete(
    state: &AppState,
    session: &mut Session,
) -> Result<Vec<PhaseReport>, ServiceError> {
    if state.config.close_when_complete && session.inputs_complete() {
        Ok(vec![session.close_phase(PhaseEvent::EarlyAdvance)?])
    } else {
        Ok(Vec::new())
    }
}

pub async fn start_game(state: AppState, room_id: &str) -> Result<GameView, ServiceError> {
    let (view, progress) = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        let report = room.session.start(&mut rand::thread_rng())?;
        (
            GameView::of(room_id, &room.session),
            Progress::of(&room.session, vec![report]),
        )
    };
    tracing::info!("Game started in room {}", room_id);
    publish(&state, room_id, &progress).await;
    Ok(view)
}

pub async fn get_game_state(state: AppState, room_id: String) -> Result<GameView, ServiceError> {
    let rooms = state.rooms.lock().await;
    rooms
        .get(&room_id)
        .map(|room| GameView::of(&room_id, &room.session))
        .ok_or(ServiceError::RoomNotFound(room_id))
}

/// A player's own role. Killers also learn who the other killers are.
pub async fn get_player_role(
    state: AppState,
    room_id: &str,
    player_id: &str,
) -> Result<RoleView, ServiceError> {
    let rooms = state.rooms.lock().await;
    let room = rooms
        .get(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    let id = PlayerId::from(player_id);
    let role = room
        .session
        .role_of(&id)
        .ok_or_else(|| ServiceError::PlayerNotFound(player_id.to_string()))?;

    let teammates = if role == Role::Killer {
        room.session
            .assignment()
            .iter()
            .filter(|(other, r)| **r == Role::Killer && **other != id)
            .map(|(other, _)| other.clone())
            .collect()
    } else {
        Vec::new()
    };

    Ok(RoleView {
        player_id: id,
        role,
        label_tr: role.label_tr().to_string(),
        teammates,
    })
}

pub async fn handle_vote(
    state: AppState,
    room_id: &str,
    voter_id: &str,
    target_id: &str,
) -> Result<ActionOutcome, ServiceError> {
    let progress = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        let choice = VoteChoice::from(target_id.to_string());
        room.session.submit_vote(&PlayerId::from(voter_id), choice)?;
        let reports = close_if_complete(&state, &mut room.session)?;
        Progress::of(&room.session, reports)
    };
    publish(&state, room_id, &progress).await;
    Ok(progress.outcome())
}

pub async fn process_night_action(
    state: AppState,
    room_id: &str,
    request: NightActionRequest,
) -> Result<NightActionResponse, ServiceError> {
    let (response, progress) = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        let actor = PlayerId::from(request.player_id.as_str());

        let mut accepted = true;
        let mut investigation = None;
        match request.action {
            NightAction::Kill { target_id } => room
                .session
                .submit_kill(&actor, KillChoice::Target(PlayerId::from(target_id)))?,
            NightAction::NoKill => room.session.submit_kill(&actor, KillChoice::NoKill)?,
            NightAction::Protect { target_id } => {
                accepted = room
                    .session
                    .submit_protect(&actor, &PlayerId::from(target_id))?;
            }
            NightAction::Investigate { target_id } => {
                investigation = Some(
                    room.session
                        .submit_investigate(&actor, &PlayerId::from(target_id))?,
                );
            }
        }

        let reports = close_if_complete(&state, &mut room.session)?;
        let progress = Progress::of(&room.session, reports);
        let response = NightActionResponse {
            accepted,
            investigation,
            phase: progress.phase,
        };
        (response, progress)
    };
    publish(&state, room_id, &progress).await;
    Ok(response)
}

/// Counts a player's request to move on and closes the phase once the
/// configured policy is met.
pub async fn request_early_advance(
    state: AppState,
    room_id: &str,
    player_id: &str,
) -> Result<EarlyAdvanceResponse, ServiceError> {
    let (response, progress) = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        let requests = room
            .session
            .request_early_advance(&PlayerId::from(player_id))?;
        let alive = room.session.alive_ids().len();

        let mut reports = Vec::new();
        if state.config.early_advance_policy.is_met(requests, alive) {
            reports.push(room.session.close_phase(PhaseEvent::EarlyAdvance)?);
        }
        let progress = Progress::of(&room.session, reports);
        let response = EarlyAdvanceResponse {
            requests,
            alive,
            advanced: !progress.reports.is_empty(),
            phase: progress.phase,
        };
        (response, progress)
    };
    publish(&state, room_id, &progress).await;
    Ok(response)
}

/// The host's timer for the current phase ran out.
pub async fn advance_game_phase(
    state: AppState,
    room_id: &str,
) -> Result<ActionOutcome, ServiceError> {
    let progress = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        let report = room.session.close_phase(PhaseEvent::TimerExpired)?;
        Progress::of(&room.session, vec![report])
    };
    publish(&state, room_id, &progress).await;
    Ok(progress.outcome())
}

/// Timer callback: closes the phase only if nothing moved it since the
/// timer was armed.
pub async fn advance_if_current(
    state: AppState,
    room_id: &str,
    serial: u64,
) -> Result<Option<Phase>, ServiceError> {
    let progress = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, room_id)?;
        if room.session.phase_serial() != serial {
            return Ok(None);
        }
        let report = room.session.close_phase(PhaseEvent::TimerExpired)?;
        Progress::of(&room.session, vec![report])
    };
    publish(&state, room_id, &progress).await;
    Ok(Some(progress.phase))
}

pub async fn check_winner(state: AppState, room_id: &str) -> Result<WinResult, ServiceError> {
    let rooms = state.rooms.lock().await;
    rooms
        .get(room_id)
        .map(|room| room.session.win())
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

/// Host stops the game early. The room stays around so the final state can
/// still be read.
pub async fn end_game(state: AppState, room_id: String) -> Result<GameView, ServiceError> {
    let (view, progress) = {
        let mut rooms = state.rooms.lock().await;
        let room = room_mut(&mut rooms, &room_id)?;
        let report = room.session.abort()?;
        (
            GameView::of(&room_id, &room.session),
            Progress::of(&room.session, vec![report]),
        )
    };
    publish(&state, &room_id, &progress).await;
    Ok(view)
}
