use serde::{Deserialize, Serialize};

pub const KILLER_COUNT_MIN: u32 = 1;
pub const KILLER_COUNT_MAX: u32 = 3;
pub const SELF_SAVE_MAX_LIMIT: u32 = 3;

/// Phase lengths in seconds. The engine never reads a clock; these are only
/// handed to whoever fires the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub discussion: u64,
    pub voting: u64,
    pub night_step: u64,
    pub morning: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            discussion: 120,
            voting: 45,
            night_step: 30,
            morning: 10,
        }
    }
}

/// Rules of a session. Frozen once the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of killers dealt into the deck, always within
    /// `KILLER_COUNT_MIN..=KILLER_COUNT_MAX` after normalization.
    pub killer_count: u32,
    pub include_doctor: bool,
    pub include_detective: bool,
    /// Lets killers pass a night without killing anyone.
    pub allow_no_kill: bool,
    /// How many times per session the doctor may protect themself.
    pub doctor_self_save_max: u32,
    /// When set, a day elimination also needs a strict majority of the
    /// alive players, not just a plurality.
    pub require_majority: bool,
    pub durations: PhaseDurations,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            killer_count: 1,
            include_doctor: true,
            include_detective: true,
            allow_no_kill: true,
            doctor_self_save_max: 1,
            require_majority: false,
            durations: PhaseDurations::default(),
        }
    }
}

/// Partial settings as submitted by a host or read from the environment.
/// Absent fields keep whatever the base settings hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub killer_count: Option<i64>,
    pub include_doctor: Option<bool>,
    pub include_detective: Option<bool>,
    pub allow_no_kill: Option<bool>,
    pub doctor_self_save_max: Option<i64>,
    pub require_majority: Option<bool>,
    pub discussion_secs: Option<u64>,
    pub voting_secs: Option<u64>,
    pub night_step_secs: Option<u64>,
    pub morning_secs: Option<u64>,
}

impl Settings {
    /// Applies `patch` on top of `self`, clamping every ranged field.
    pub fn merge(&self, patch: &SettingsPatch) -> Settings {
        let killer_count = patch
            .killer_count
            .map(|n| clamp(n, KILLER_COUNT_MIN, KILLER_COUNT_MAX))
            .unwrap_or(self.killer_count);
        let doctor_self_save_max = patch
            .doctor_self_save_max
            .map(|n| clamp(n, 0, SELF_SAVE_MAX_LIMIT))
            .unwrap_or(self.doctor_self_save_max);

        Settings {
            killer_count,
            include_doctor: patch.include_doctor.unwrap_or(self.include_doctor),
            include_detective: patch.include_detective.unwrap_or(self.include_detective),
            allow_no_kill: patch.allow_no_kill.unwrap_or(self.allow_no_kill),
            doctor_self_save_max,
            require_majority: patch.require_majority.unwrap_or(self.require_majority),
            durations: PhaseDurations {
                discussion: patch.discussion_secs.unwrap_or(self.durations.discussion),
                voting: patch.voting_secs.unwrap_or(self.durations.voting),
                night_step: patch.night_step_secs.unwrap_or(self.durations.night_step),
                morning: patch.morning_secs.unwrap_or(self.durations.morning),
            },
        }
        .normalized()
    }

    /// Clamps ranged fields. Settings that reach the deck builder or the
    /// resolvers have always passed through here.
    pub fn normalized(mut self) -> Settings {
        self.killer_count = self.killer_count.clamp(KILLER_COUNT_MIN, KILLER_COUNT_MAX);
        self.doctor_self_save_max = self.doctor_self_save_max.min(SELF_SAVE_MAX_LIMIT);
        self
    }

    /// Number of special (non-killer, non-citizen) roles requested.
    pub fn special_role_count(&self) -> usize {
        usize::from(self.include_doctor) + usize::from(self.include_detective)
    }
}

fn clamp(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}
