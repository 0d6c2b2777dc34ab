use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

use crate::models::{PlayerId, Role, RoleAssignment, Settings};

/// Builds the shuffled role deck for `player_ids`, one role per id in the
/// same order.
///
/// The unshuffled deck holds the killers first, then the doctor, then the
/// detective, and is topped up with citizens. When there are fewer players
/// than killers plus special roles, the deck is cut to the player count in
/// that priority order before shuffling, so the detective is dropped before
/// the doctor and killers are never dropped for a special role.
pub fn build_role_deck<R>(player_ids: &[PlayerId], settings: &Settings, rng: &mut R) -> Vec<Role>
where
    R: Rng + ?Sized,
{
    let n = player_ids.len();
    let requested = settings.killer_count as usize + settings.special_role_count();
    let mut deck = Vec::with_capacity(n.max(requested));

    deck.extend(std::iter::repeat(Role::Killer).take(settings.killer_count as usize));
    if settings.include_doctor {
        deck.push(Role::Doctor);
    }
    if settings.include_detective {
        deck.push(Role::Detective);
    }

    if deck.len() > n {
        let dropped: Vec<Role> = deck.drain(n..).collect();
        warn!("Role deck cut to {} players, dropped {:?}", n, dropped);
    }
    while deck.len() < n {
        deck.push(Role::Citizen);
    }

    deck.shuffle(rng);
    debug!("Built role deck for {} players", n);
    deck
}

/// Pairs each id with its deck position.
pub fn assign_roles<R>(player_ids: &[PlayerId], settings: &Settings, rng: &mut R) -> RoleAssignment
where
    R: Rng + ?Sized,
{
    let deck = build_role_deck(player_ids, settings, rng);
    player_ids.iter().cloned().zip(deck).collect()
}
