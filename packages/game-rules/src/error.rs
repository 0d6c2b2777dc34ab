use crate::models::{PlayerId, Role};
use crate::phase::{Phase, PhaseError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game has not started yet")]
    NotStarted,
    #[error("player {0} has already joined")]
    DuplicatePlayer(PlayerId),
    #[error("player {0} is not part of this session")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is not alive")]
    PlayerDead(PlayerId),
    #[error("the host cannot take part in the round")]
    HostCannotAct,
    #[error("player {player} does not hold the {expected} role")]
    WrongRole { player: PlayerId, expected: Role },
    #[error("action not accepted during {actual:?}")]
    WrongPhase { actual: Phase },
    #[error("at least {needed} players are required, {joined} joined")]
    NotEnoughPlayers { needed: usize, joined: usize },
    #[error("passing the night without a kill is disabled")]
    NoKillDisabled,
    #[error("target {0} is not a valid choice")]
    InvalidTarget(PlayerId),
    #[error(transparent)]
    Phase(#[from] PhaseError),
}
