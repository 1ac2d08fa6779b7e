//! Pairing of muscle files with angle files by filename tag.
//!
//! Each muscle file is tried against the rule table in order: exact tag,
//! substring containment in either direction, then date-only (text before the
//! first underscore). Within a rule the first angle file in discovery order
//! wins. Angle files are never consumed and may pair with many muscle files.
//!
//! The date-only rule will pair recordings made on the same day at unrelated
//! times of day.

use crate::core::trial::{MatchOutcome, MatchRule, TrialFile, TrialPair};
use tracing::{debug, info, warn};

type RulePredicate = fn(&str, &str) -> bool;

/// Automatic rules in evaluation order.
pub const MATCH_RULES: [(MatchRule, RulePredicate); 3] = [
    (MatchRule::Exact, exact),
    (MatchRule::Substring, substring),
    (MatchRule::DateOnly, same_date),
];

fn exact(muscle: &str, angle: &str) -> bool {
    muscle == angle
}

fn substring(muscle: &str, angle: &str) -> bool {
    muscle.contains(angle) || angle.contains(muscle)
}

fn same_date(muscle: &str, angle: &str) -> bool {
    date_part(muscle) == date_part(angle)
}

/// Portion of a tag before the first underscore, or the whole tag.
pub fn date_part(tag: &str) -> &str {
    tag.split('_').next().unwrap_or(tag)
}

/// Find the angle file for one muscle tag, returning its index and the rule used.
pub fn match_one(muscle_tag: &str, angles: &[TrialFile]) -> Option<(usize, MatchRule)> {
    MATCH_RULES.iter().find_map(|(rule, predicate)| {
        angles
            .iter()
            .position(|angle| predicate(muscle_tag, &angle.tag))
            .map(|idx| (idx, *rule))
    })
}

/// Pair every muscle file with an angle file where possible.
pub fn find_matching_files(muscles: &[TrialFile], angles: &[TrialFile]) -> MatchOutcome {
    for file in muscles {
        debug!(file = %file.file_name(), tag = %file.tag, "muscle tag");
    }
    for file in angles {
        debug!(file = %file.file_name(), tag = %file.tag, "angle tag");
    }

    let mut outcome = MatchOutcome::default();

    for muscle in muscles {
        match match_one(&muscle.tag, angles) {
            Some((idx, rule)) => {
                let angle = &angles[idx];
                info!(
                    "Matched {} -> {} ({rule})",
                    muscle.file_name(),
                    angle.file_name()
                );
                outcome.pairs.push(TrialPair {
                    muscle: muscle.clone(),
                    angle: angle.clone(),
                    rule,
                });
            }
            None => {
                warn!("No angle file matches {} (tag {})", muscle.file_name(), muscle.tag);
                outcome.unmatched.push(muscle.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<TrialFile> {
        names.iter().map(|n| TrialFile::new(*n)).collect()
    }

    #[test]
    fn test_exact_match() {
        let muscles = files(&["m_20250304_163722.csv"]);
        let angles = files(&["a_20250304_160000.csv", "a_20250304_163722.csv"]);

        let outcome = find_matching_files(&muscles, &angles);
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].rule, MatchRule::Exact);
        assert_eq!(outcome.pairs[0].angle.tag, "20250304_163722");
    }

    #[test]
    fn test_substring_match() {
        let muscles = files(&["trial7.csv"]);
        let angles = files(&["trial7_left.csv"]);

        let (idx, rule) = match_one(&muscles[0].tag, &angles).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(rule, MatchRule::Substring);

        // Containment works in the other direction too.
        let (_, rule) = match_one("trial7_left", &files(&["trial7.csv"])).unwrap();
        assert_eq!(rule, MatchRule::Substring);
    }

    #[test]
    fn test_falls_through_to_date_only() {
        let muscles = files(&["m_20250304_163722.csv"]);
        let angles = files(&["a_20250304_163725.csv"]);

        let outcome = find_matching_files(&muscles, &angles);
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].rule, MatchRule::DateOnly);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_earlier_rule_beats_earlier_file() {
        // The first angle file only matches by date; the second matches exactly.
        let angles = files(&["a_20250304_090000.csv", "a_20250304_163722.csv"]);
        let (idx, rule) = match_one("20250304_163722", &angles).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(rule, MatchRule::Exact);
    }

    #[test]
    fn test_date_part_without_underscore() {
        assert_eq!(date_part("20250304_163722"), "20250304");
        assert_eq!(date_part("session"), "session");
        assert!(!same_date("session", "other"));
    }

    #[test]
    fn test_unmatched_and_angle_reuse() {
        let muscles = files(&[
            "m_20250304_100000.csv",
            "m_20250304_110000.csv",
            "m_20250305_100000.csv",
        ]);
        let angles = files(&["a_20250304_120000.csv"]);

        let outcome = find_matching_files(&muscles, &angles);
        assert_eq!(outcome.pairs.len(), 2);
        assert!(outcome
            .pairs
            .iter()
            .all(|p| p.angle.tag == "20250304_120000"));
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].tag, "20250305_100000");
    }

    #[test]
    fn test_no_angles() {
        let outcome = find_matching_files(&files(&["m_20250304_100000.csv"]), &[]);
        assert!(outcome.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
    }
}
