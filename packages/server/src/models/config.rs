use game_rules::{strict_majority, SettingsPatch};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// How many early-advance requests move a phase on before its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyAdvancePolicy {
    /// Every alive player asked.
    Unanimous,
    /// A strict majority of alive players asked.
    Majority,
}

impl EarlyAdvancePolicy {
    pub fn is_met(&self, requests: usize, alive: usize) -> bool {
        match self {
            EarlyAdvancePolicy::Unanimous => alive > 0 && requests >= alive,
            EarlyAdvancePolicy::Majority => requests >= strict_majority(alive),
        }
    }
}

impl FromStr for EarlyAdvancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unanimous" => Ok(EarlyAdvancePolicy::Unanimous),
            "majority" => Ok(EarlyAdvancePolicy::Majority),
            other => Err(format!("unknown early advance policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub verbose_logging: bool,
    // フェーズをタイマーで自動的に進めるかどうか
    pub auto_advance_phases: bool,
    // 全員が投票/行動を終えた時点でフェーズを閉じるかどうか
    pub close_when_complete: bool,
    pub early_advance_policy: EarlyAdvancePolicy,
    /// Rules every new room starts from, before the host's own changes.
    pub default_settings: SettingsPatch,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            allowed_origin: "http://localhost:3000".to_string(),
            verbose_logging: cfg!(debug_assertions),
            auto_advance_phases: false,
            close_when_complete: true,
            early_advance_policy: EarlyAdvancePolicy::Unanimous,
            default_settings: SettingsPatch::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or(defaults.bind_addr);
        let allowed_origin = env::var("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);
        let verbose_logging = env::var("VERBOSE_LOGGING")
            .map(|v| v == "true")
            .unwrap_or(defaults.verbose_logging);
        let auto_advance_phases = env::var("AUTO_ADVANCE_PHASES")
            .map(|v| v == "true")
            .unwrap_or(defaults.auto_advance_phases);
        let close_when_complete = env::var("CLOSE_WHEN_COMPLETE")
            .map(|v| v == "true")
            .unwrap_or(defaults.close_when_complete);
        let early_advance_policy = env::var("EARLY_ADVANCE_POLICY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.early_advance_policy);

        // 数値が読めない場合は未指定として扱い、ルーム側の既定値に任せる
        let default_settings = SettingsPatch {
            killer_count: env_parse("DEFAULT_KILLER_COUNT"),
            include_doctor: env_flag("DEFAULT_INCLUDE_DOCTOR"),
            include_detective: env_flag("DEFAULT_INCLUDE_DETECTIVE"),
            allow_no_kill: env_flag("DEFAULT_ALLOW_NO_KILL"),
            doctor_self_save_max: env_parse("DEFAULT_DOCTOR_SELF_SAVE_MAX"),
            require_majority: env_flag("DEFAULT_REQUIRE_MAJORITY"),
            discussion_secs: env_parse("DEFAULT_DISCUSSION_SECS"),
            voting_secs: env_parse("DEFAULT_VOTING_SECS"),
            night_step_secs: env_parse("DEFAULT_NIGHT_STEP_SECS"),
            morning_secs: env_parse("DEFAULT_MORNING_SECS"),
        };

        Self {
            bind_addr,
            allowed_origin,
            verbose_logging,
            auto_advance_phases,
            close_when_complete,
            early_advance_policy,
            default_settings,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanimous_needs_everyone() {
        let policy = EarlyAdvancePolicy::Unanimous;
        assert!(!policy.is_met(3, 4));
        assert!(policy.is_met(4, 4));
        assert!(!policy.is_met(0, 0));
    }

    #[test]
    fn majority_needs_strictly_more_than_half() {
        let policy = EarlyAdvancePolicy::Majority;
        assert!(!policy.is_met(2, 4));
        assert!(policy.is_met(3, 4));
        assert!(policy.is_met(3, 5));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Majority".parse::<EarlyAdvancePolicy>(), Ok(EarlyAdvancePolicy::Majority));
        assert!("sometimes".parse::<EarlyAdvancePolicy>().is_err());
    }
}
