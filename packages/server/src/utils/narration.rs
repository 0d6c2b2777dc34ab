use game_rules::{DayReason, Faction, NightReason, NightStep, Phase};

use crate::models::game::PublicPhaseReport;

/// Text read out to the table when a phase closes. Speaking it is the
/// client's business.
pub fn announce(report: &PublicPhaseReport) -> String {
    let mut lines = Vec::new();

    if let Some(day) = &report.day {
        lines.push(match (&day.reason, &day.eliminated) {
            (DayReason::Eliminated, Some(id)) => format!("The town has voted out {}.", id),
            (DayReason::Tie, _) => "The vote is tied. Nobody leaves today.".to_string(),
            (DayReason::Skipped, _) => "The town chose to skip the vote.".to_string(),
            (DayReason::BelowMajority, _) => "No one reached a majority.".to_string(),
            _ => "Nobody voted.".to_string(),
        });
    }

    if let Some(night) = &report.night {
        lines.push(match (&night.reason, &night.died) {
            (NightReason::Killed, Some(id)) => format!("{} did not survive the night.", id),
            (NightReason::DoctorSave, _) => "The doctor saved a life tonight.".to_string(),
            _ => "It was a quiet night.".to_string(),
        });
    }

    if let Some(winner) = report.win.and_then(|w| w.winner) {
        lines.push(match winner {
            Faction::Town => "The town has won.".to_string(),
            Faction::Killers => "The killers have won.".to_string(),
        });
    } else {
        lines.push(
            match report.to {
                Phase::Waiting => "Waiting for players.",
                Phase::Discussion => "Morning has come. Discuss.",
                Phase::Voting => "Time to vote.",
                Phase::Night(NightStep::Kill) => "Night falls. Killers, choose your target.",
                Phase::Night(NightStep::Protect) => "Doctor, choose someone to protect.",
                Phase::Night(NightStep::Investigate) => "Detective, choose someone to investigate.",
                Phase::Morning => "The sun rises.",
                Phase::Ended => "The game is over.",
            }
            .to_string(),
        );
    }

    lines.join(" ")
}
