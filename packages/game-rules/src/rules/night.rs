use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{DoctorState, KillChoice, NightSubmissions, PlayerId, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NightReason {
    NoKill,
    InvalidTarget,
    Killed,
    DoctorSave,
    DoctorSelfSave,
    SelfSaveExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightResult {
    pub died: Option<PlayerId>,
    pub saved: bool,
    pub reason: NightReason,
    /// Doctor whose protection decided the night, if any.
    pub protector: Option<PlayerId>,
}

impl NightResult {
    fn quiet(reason: NightReason) -> Self {
        Self {
            died: None,
            saved: false,
            reason,
            protector: None,
        }
    }

    /// The outcome the session must charge against the doctor's self-save
    /// allowance.
    pub fn is_self_save(&self) -> bool {
        self.reason == NightReason::DoctorSelfSave
    }
}

/// Resolves one closed night.
///
/// Pure: `doctor` is only read. Charging an accepted self-save is the
/// caller's job.
pub fn resolve_night(
    submissions: &NightSubmissions,
    alive: &BTreeSet<PlayerId>,
    settings: &Settings,
    doctor: &DoctorState,
) -> NightResult {
    let mut tally: BTreeMap<&PlayerId, usize> = BTreeMap::new();
    let mut no_kill_submitted = false;

    for (killer, choice) in &submissions.kill {
        if !alive.contains(killer) {
            continue;
        }
        match choice {
            KillChoice::NoKill => no_kill_submitted = true,
            KillChoice::Target(target) if alive.contains(target) => {
                *tally.entry(target).or_insert(0) += 1;
            }
            KillChoice::Target(_) => {}
        }
    }

    let mut kill_target: Option<&PlayerId> = None;
    let mut best = 0;
    let mut tie = false;
    for (target, count) in tally {
        if count > best {
            kill_target = Some(target);
            best = count;
            tie = false;
        } else if count == best {
            tie = true;
        }
    }
    if tie {
        kill_target = None;
    }

    let Some(target) = kill_target else {
        let reason = if settings.allow_no_kill && no_kill_submitted {
            NightReason::NoKill
        } else {
            NightReason::InvalidTarget
        };
        return NightResult::quiet(reason);
    };

    let protection = submissions
        .protect
        .iter()
        .find(|(doctor_id, protected)| alive.contains(doctor_id) && alive.contains(protected));

    match protection {
        Some((doctor_id, protected)) if protected == target => {
            if doctor_id == target && doctor.self_save_used >= settings.doctor_self_save_max {
                NightResult {
                    died: Some(target.clone()),
                    saved: false,
                    reason: NightReason::SelfSaveExhausted,
                    protector: Some(doctor_id.clone()),
                }
            } else {
                let reason = if doctor_id == target {
                    NightReason::DoctorSelfSave
                } else {
                    NightReason::DoctorSave
                };
                NightResult {
                    died: None,
                    saved: true,
                    reason,
                    protector: Some(doctor_id.clone()),
                }
            }
        }
        _ => NightResult {
            died: Some(target.clone()),
            saved: false,
            reason: NightReason::Killed,
            protector: None,
        },
    }
}
