use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{player::PlayerId, role::Role};

pub const SKIP: &str = "SKIP";
pub const NO_KILL: &str = "NO_KILL";

/// Secret mapping from every non-host player to their role.
pub type RoleAssignment = BTreeMap<PlayerId, Role>;

/// A day vote: another player, or an explicit abstention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoteChoice {
    Player(PlayerId),
    Skip,
}

impl VoteChoice {
    pub fn is_empty(&self) -> bool {
        matches!(self, VoteChoice::Player(id) if id.as_str().trim().is_empty())
    }
}

impl From<String> for VoteChoice {
    fn from(value: String) -> Self {
        if value == SKIP {
            VoteChoice::Skip
        } else {
            VoteChoice::Player(PlayerId(value))
        }
    }
}

impl From<VoteChoice> for String {
    fn from(value: VoteChoice) -> Self {
        match value {
            VoteChoice::Player(id) => id.0,
            VoteChoice::Skip => SKIP.to_string(),
        }
    }
}

/// A killer's night submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KillChoice {
    Target(PlayerId),
    NoKill,
}

impl From<String> for KillChoice {
    fn from(value: String) -> Self {
        if value == NO_KILL {
            KillChoice::NoKill
        } else {
            KillChoice::Target(PlayerId(value))
        }
    }
}

impl From<KillChoice> for String {
    fn from(value: KillChoice) -> Self {
        match value {
            KillChoice::Target(id) => id.0,
            KillChoice::NoKill => NO_KILL.to_string(),
        }
    }
}

/// Votes of the current day round, keyed by voter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    votes: BTreeMap<PlayerId, VoteChoice>,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote; a second vote from the same voter replaces the first.
    pub fn cast(&mut self, voter: PlayerId, choice: VoteChoice) {
        self.votes.insert(voter, choice);
    }

    pub fn get(&self, voter: &PlayerId) -> Option<&VoteChoice> {
        self.votes.get(voter)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &VoteChoice)> {
        self.votes.iter()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

impl<V: Into<PlayerId>> FromIterator<(V, VoteChoice)> for Ballot {
    fn from_iter<I: IntoIterator<Item = (V, VoteChoice)>>(iter: I) -> Self {
        Self {
            votes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Everything submitted during one night, per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightSubmissions {
    pub kill: BTreeMap<PlayerId, KillChoice>,
    /// Protector and target in arrival order; the first valid entry wins.
    pub protect: Vec<(PlayerId, PlayerId)>,
    pub investigate: BTreeMap<PlayerId, PlayerId>,
}

impl NightSubmissions {
    pub fn submit_kill(&mut self, killer: PlayerId, choice: KillChoice) {
        self.kill.insert(killer, choice);
    }

    /// Ignored when this protector already submitted tonight.
    pub fn submit_protect(&mut self, doctor: PlayerId, target: PlayerId) -> bool {
        if self.protect.iter().any(|(by, _)| *by == doctor) {
            return false;
        }
        self.protect.push((doctor, target));
        true
    }

    pub fn submit_investigate(&mut self, detective: PlayerId, target: PlayerId) {
        self.investigate.insert(detective, target);
    }

    pub fn clear(&mut self) {
        self.kill.clear();
        self.protect.clear();
        self.investigate.clear();
    }
}

/// Session-long doctor bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorState {
    pub self_save_used: u32,
}
