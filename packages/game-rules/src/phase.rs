use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Role, Settings};
use crate::rules::WinResult;

/// Night sub-phases, in the order they run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NightStep {
    Kill,
    Protect,
    Investigate,
}

impl NightStep {
    pub const FIRST: NightStep = NightStep::Kill;

    /// Step that follows this one, `None` after the last.
    pub fn next(self) -> Option<NightStep> {
        match self {
            NightStep::Kill => Some(NightStep::Protect),
            NightStep::Protect => Some(NightStep::Investigate),
            NightStep::Investigate => None,
        }
    }

    /// Role whose players act during this step.
    pub fn actor(self) -> Role {
        match self {
            NightStep::Kill => Role::Killer,
            NightStep::Protect => Role::Doctor,
            NightStep::Investigate => Role::Detective,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "phase", content = "step")]
pub enum Phase {
    Waiting,
    Discussion,
    Voting,
    Night(NightStep),
    Morning,
    Ended,
}

impl Phase {
    pub fn is_night(&self) -> bool {
        matches!(self, Phase::Night(_))
    }

    /// Timer length for this phase, `None` for phases no timer closes.
    pub fn duration_secs(&self, settings: &Settings) -> Option<u64> {
        match self {
            Phase::Discussion => Some(settings.durations.discussion),
            Phase::Voting => Some(settings.durations.voting),
            Phase::Night(_) => Some(settings.durations.night_step),
            Phase::Morning => Some(settings.durations.morning),
            Phase::Waiting | Phase::Ended => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Waiting => write!(f, "Waiting"),
            Phase::Discussion => write!(f, "Discussion"),
            Phase::Voting => write!(f, "Voting"),
            Phase::Night(step) => write!(f, "Night({:?})", step),
            Phase::Morning => write!(f, "Morning"),
            Phase::Ended => write!(f, "Ended"),
        }
    }
}

/// What moved the table forward.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhaseEvent {
    GameStarted,
    TimerExpired,
    /// Enough players asked to move on before the timer ran out.
    EarlyAdvance,
    /// A voting round or a whole night was resolved and the win check ran.
    RoundResolved(WinResult),
    /// The host stopped the game.
    Aborted,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("{event:?} does not apply during {phase}")]
    InvalidTransition { phase: Phase, event: PhaseEvent },
    #[error("the game has already ended")]
    GameOver,
}

/// The table's transition function.
pub fn advance(phase: Phase, event: PhaseEvent) -> Result<Phase, PhaseError> {
    use PhaseEvent::*;

    let next = match (phase, event) {
        (Phase::Ended, _) => return Err(PhaseError::GameOver),
        (_, Aborted) => Phase::Ended,
        (Phase::Waiting, GameStarted) => Phase::Discussion,
        (Phase::Discussion, TimerExpired | EarlyAdvance) => Phase::Voting,
        (Phase::Voting, RoundResolved(win)) if win.ended => Phase::Ended,
        (Phase::Voting, RoundResolved(_)) => Phase::Night(NightStep::FIRST),
        (Phase::Night(step), TimerExpired | EarlyAdvance) => match step.next() {
            Some(next) => Phase::Night(next),
            None => return Err(PhaseError::InvalidTransition { phase, event }),
        },
        (Phase::Night(step), RoundResolved(win)) if step.next().is_none() => {
            if win.ended {
                Phase::Ended
            } else {
                Phase::Morning
            }
        }
        (Phase::Morning, TimerExpired | EarlyAdvance) => Phase::Discussion,
        _ => return Err(PhaseError::InvalidTransition { phase, event }),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;

    const TOWN: WinResult = WinResult {
        ended: true,
        winner: Some(Faction::Town),
    };

    #[test]
    fn full_round_loops_back_to_discussion() {
        let mut phase = advance(Phase::Waiting, PhaseEvent::GameStarted).unwrap();
        assert_eq!(phase, Phase::Discussion);

        phase = advance(phase, PhaseEvent::EarlyAdvance).unwrap();
        assert_eq!(phase, Phase::Voting);
        phase = advance(phase, PhaseEvent::RoundResolved(WinResult::ONGOING)).unwrap();
        assert_eq!(phase, Phase::Night(NightStep::Kill));
        phase = advance(phase, PhaseEvent::TimerExpired).unwrap();
        assert_eq!(phase, Phase::Night(NightStep::Protect));
        phase = advance(phase, PhaseEvent::TimerExpired).unwrap();
        assert_eq!(phase, Phase::Night(NightStep::Investigate));
        phase = advance(phase, PhaseEvent::RoundResolved(WinResult::ONGOING)).unwrap();
        assert_eq!(phase, Phase::Morning);
        phase = advance(phase, PhaseEvent::TimerExpired).unwrap();
        assert_eq!(phase, Phase::Discussion);
    }

    #[test]
    fn terminal_verdict_ends_the_game() {
        assert_eq!(
            advance(Phase::Voting, PhaseEvent::RoundResolved(TOWN)),
            Ok(Phase::Ended)
        );
        assert_eq!(
            advance(Phase::Night(NightStep::Investigate), PhaseEvent::RoundResolved(TOWN)),
            Ok(Phase::Ended)
        );
    }

    #[test]
    fn ended_is_terminal() {
        for event in [
            PhaseEvent::GameStarted,
            PhaseEvent::TimerExpired,
            PhaseEvent::Aborted,
            PhaseEvent::RoundResolved(WinResult::ONGOING),
        ] {
            assert_eq!(advance(Phase::Ended, event), Err(PhaseError::GameOver));
        }
    }

    #[test]
    fn rejects_out_of_order_events() {
        assert!(advance(Phase::Waiting, PhaseEvent::TimerExpired).is_err());
        assert!(advance(Phase::Discussion, PhaseEvent::GameStarted).is_err());
        // Voting only closes through resolution.
        assert!(advance(Phase::Voting, PhaseEvent::TimerExpired).is_err());
        // The last night step only closes through resolution.
        assert!(advance(Phase::Night(NightStep::Investigate), PhaseEvent::TimerExpired).is_err());
        assert!(advance(
            Phase::Night(NightStep::Kill),
            PhaseEvent::RoundResolved(WinResult::ONGOING)
        )
        .is_err());
    }

    #[test]
    fn abort_ends_from_any_live_phase() {
        for phase in [
            Phase::Waiting,
            Phase::Discussion,
            Phase::Voting,
            Phase::Night(NightStep::Protect),
            Phase::Morning,
        ] {
            assert_eq!(advance(phase, PhaseEvent::Aborted), Ok(Phase::Ended));
        }
    }
}
