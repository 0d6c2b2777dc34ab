use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Ballot, PlayerId, Settings, VoteChoice};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub best: Option<VoteChoice>,
    pub best_count: usize,
    /// Two or more distinct choices share `best_count`. A tied round never
    /// eliminates anyone, whatever `best` holds.
    pub tie: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayReason {
    Eliminated,
    Tie,
    Skipped,
    NoVotes,
    BelowMajority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    pub tally: VoteTally,
    pub eliminated: Option<PlayerId>,
    pub reason: DayReason,
}

/// `floor(alive / 2) + 1`.
pub fn strict_majority(alive: usize) -> usize {
    alive / 2 + 1
}

/// Plurality count over every non-empty choice. `Skip` is tallied like any
/// other choice.
pub fn tally_votes(ballot: &Ballot) -> VoteTally {
    let mut counts: BTreeMap<&VoteChoice, usize> = BTreeMap::new();
    for (_, choice) in ballot.iter() {
        if choice.is_empty() {
            continue;
        }
        *counts.entry(choice).or_insert(0) += 1;
    }

    let mut best = None;
    let mut best_count = 0;
    let mut tie = false;
    for (choice, count) in counts {
        if count > best_count {
            best = Some(choice.clone());
            best_count = count;
            tie = false;
        } else if count == best_count {
            tie = true;
        }
    }

    VoteTally {
        best,
        best_count,
        tie,
    }
}

/// Resolves a closed day round against the alive set.
///
/// Votes cast by anyone outside `alive`, and votes naming someone outside
/// `alive`, are dropped before tallying.
pub fn resolve_day(ballot: &Ballot, alive: &BTreeSet<PlayerId>, settings: &Settings) -> DayResult {
    let valid: Ballot = ballot
        .iter()
        .filter(|(voter, _)| alive.contains(*voter))
        .filter(|(_, choice)| match choice {
            VoteChoice::Player(target) => alive.contains(target),
            VoteChoice::Skip => true,
        })
        .map(|(voter, choice)| (voter.clone(), choice.clone()))
        .collect();

    let tally = tally_votes(&valid);

    let (eliminated, reason) = match &tally.best {
        None => (None, DayReason::NoVotes),
        Some(_) if tally.tie => (None, DayReason::Tie),
        Some(VoteChoice::Skip) => (None, DayReason::Skipped),
        Some(VoteChoice::Player(_))
            if settings.require_majority && tally.best_count < strict_majority(alive.len()) =>
        {
            (None, DayReason::BelowMajority)
        }
        Some(VoteChoice::Player(target)) => (Some(target.clone()), DayReason::Eliminated),
    };

    DayResult {
        tally,
        eliminated,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(target: &str) -> VoteChoice {
        VoteChoice::Player(PlayerId::from(target))
    }

    fn alive(ids: &[&str]) -> BTreeSet<PlayerId> {
        ids.iter().map(|id| PlayerId::from(*id)).collect()
    }

    #[test]
    fn plurality_winner() {
        let ballot: Ballot = [("A", vote("X")), ("B", vote("X")), ("C", vote("Y"))]
            .into_iter()
            .collect();
        let tally = tally_votes(&ballot);

        assert_eq!(tally.best, Some(vote("X")));
        assert_eq!(tally.best_count, 2);
        assert!(!tally.tie);
    }

    #[test]
    fn two_way_split_is_a_tie() {
        let ballot: Ballot = [("A", vote("X")), ("B", vote("Y"))].into_iter().collect();
        assert!(tally_votes(&ballot).tie);
    }

    #[test]
    fn lower_counts_do_not_tie() {
        // X leads; Y and Z share a lower count.
        let ballot: Ballot = [
            ("A", vote("X")),
            ("B", vote("X")),
            ("C", vote("X")),
            ("D", vote("Y")),
            ("E", vote("Z")),
        ]
        .into_iter()
        .collect();
        let tally = tally_votes(&ballot);
        assert_eq!(tally.best, Some(vote("X")));
        assert!(!tally.tie);
    }

    #[test]
    fn later_leader_clears_earlier_tie() {
        let ballot: Ballot = [
            ("A", vote("a")),
            ("B", vote("b")),
            ("C", vote("c")),
            ("D", vote("c")),
        ]
        .into_iter()
        .collect();
        let tally = tally_votes(&ballot);
        assert_eq!(tally.best, Some(vote("c")));
        assert!(!tally.tie);
    }

    #[test]
    fn skip_is_counted_as_a_choice() {
        let ballot: Ballot = [
            ("A", VoteChoice::Skip),
            ("B", VoteChoice::Skip),
            ("C", vote("X")),
        ]
        .into_iter()
        .collect();
        let tally = tally_votes(&ballot);
        assert_eq!(tally.best, Some(VoteChoice::Skip));
        assert_eq!(tally.best_count, 2);
    }

    #[test]
    fn empty_choices_are_ignored() {
        let ballot: Ballot = [("A", vote("")), ("B", vote("X"))].into_iter().collect();
        let tally = tally_votes(&ballot);
        assert_eq!(tally.best, Some(vote("X")));
        assert_eq!(tally.best_count, 1);
        assert!(!tally.tie);

        let empty = tally_votes(&Ballot::new());
        assert_eq!(empty.best, None);
        assert_eq!(empty.best_count, 0);
        assert!(!empty.tie);
    }

    #[test]
    fn tie_iff_shared_maximum() {
        let cases: Vec<(Vec<(&str, VoteChoice)>, bool)> = vec![
            (vec![("A", vote("X"))], false),
            (vec![("A", vote("X")), ("B", vote("X"))], false),
            (vec![("A", vote("X")), ("B", VoteChoice::Skip)], true),
            (
                vec![("A", vote("X")), ("B", vote("Y")), ("C", vote("Y")), ("D", vote("X"))],
                true,
            ),
            (
                vec![("A", vote("X")), ("B", vote("Y")), ("C", vote("Y")), ("D", vote("Z"))],
                false,
            ),
        ];
        for (votes, expected) in cases {
            let ballot: Ballot = votes.into_iter().collect();
            assert_eq!(tally_votes(&ballot).tie, expected, "{:?}", ballot);
        }
    }

    #[test]
    fn strict_majority_values() {
        assert_eq!(strict_majority(1), 1);
        assert_eq!(strict_majority(4), 3);
        assert_eq!(strict_majority(5), 3);
        assert_eq!(strict_majority(6), 4);
    }

    #[test]
    fn day_eliminates_plurality_target() {
        let alive = alive(&["A", "B", "C", "X"]);
        let ballot: Ballot = [("A", vote("X")), ("B", vote("X")), ("C", vote("A"))]
            .into_iter()
            .collect();
        let result = resolve_day(&ballot, &alive, &Settings::default());
        assert_eq!(result.eliminated, Some(PlayerId::from("X")));
        assert_eq!(result.reason, DayReason::Eliminated);
    }

    #[test]
    fn day_drops_dead_voters_and_dead_targets() {
        let alive = alive(&["A", "B", "C"]);
        let ballot: Ballot = [
            ("A", vote("B")),
            ("ghost", vote("C")),
            ("B", vote("ghost")),
            ("C", vote("dead")),
        ]
        .into_iter()
        .collect();
        let result = resolve_day(&ballot, &alive, &Settings::default());
        assert_eq!(result.tally.best_count, 1);
        assert_eq!(result.eliminated, Some(PlayerId::from("B")));
    }

    #[test]
    fn day_tie_and_skip_spare_everyone() {
        let alive = alive(&["A", "B", "C"]);

        let tied: Ballot = [("A", vote("B")), ("B", vote("A"))].into_iter().collect();
        let result = resolve_day(&tied, &alive, &Settings::default());
        assert_eq!(result.eliminated, None);
        assert_eq!(result.reason, DayReason::Tie);

        let skipped: Ballot = [("A", VoteChoice::Skip), ("B", VoteChoice::Skip), ("C", vote("A"))]
            .into_iter()
            .collect();
        let result = resolve_day(&skipped, &alive, &Settings::default());
        assert_eq!(result.eliminated, None);
        assert_eq!(result.reason, DayReason::Skipped);

        let result = resolve_day(&Ballot::new(), &alive, &Settings::default());
        assert_eq!(result.reason, DayReason::NoVotes);
    }

    #[test]
    fn majority_gate_only_when_enabled() {
        let alive = alive(&["A", "B", "C", "D", "E"]);
        let ballot: Ballot = [("A", vote("E")), ("B", vote("E")), ("C", vote("D"))]
            .into_iter()
            .collect();

        let plurality = resolve_day(&ballot, &alive, &Settings::default());
        assert_eq!(plurality.eliminated, Some(PlayerId::from("E")));

        let gated = Settings {
            require_majority: true,
            ..Settings::default()
        };
        let result = resolve_day(&ballot, &alive, &gated);
        assert_eq!(result.eliminated, None);
        assert_eq!(result.reason, DayReason::BelowMajority);
    }
}
