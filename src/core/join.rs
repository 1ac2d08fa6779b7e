//! Nearest-time join of two key columns sorted ascending.
//!
//! Every left (muscle) key is matched to exactly one right (angle) key. The
//! candidates are the last right key at or before the left key and the first
//! right key at or after it; the later candidate is taken only when strictly
//! closer, so equidistant ties go to the earlier row. When several right rows
//! share the chosen key, the backward candidate is the last of them.

use crate::core::clock::seconds_between;
use chrono::NaiveDateTime;

/// One matched right row and its distance from the left key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    /// Index into the right key column
    pub right: usize,
    /// Absolute time distance in seconds
    pub distance_secs: f64,
}

/// Index of the nearest right key for a single left key.
///
/// `right` must be sorted ascending and non-empty.
pub fn nearest_index(right: &[NaiveDateTime], key: NaiveDateTime) -> Option<NearestMatch> {
    if right.is_empty() {
        return None;
    }

    let after_end = right.partition_point(|&r| r <= key);
    let backward = after_end.checked_sub(1);
    let forward_idx = right.partition_point(|&r| r < key);
    let forward = (forward_idx < right.len()).then_some(forward_idx);

    let pick = |idx: usize| NearestMatch {
        right: idx,
        distance_secs: seconds_between(key, right[idx]).abs(),
    };

    match (backward, forward) {
        (Some(b), Some(f)) => {
            let back = pick(b);
            let fwd = pick(f);
            if fwd.distance_secs < back.distance_secs {
                Some(fwd)
            } else {
                Some(back)
            }
        }
        (Some(b), None) => Some(pick(b)),
        (None, Some(f)) => Some(pick(f)),
        (None, None) => None,
    }
}

/// Match every left key to its nearest right key.
///
/// Both slices must be sorted ascending. Returns an empty vector when `right`
/// is empty and `left` is not, so callers can check the length invariant.
pub fn nearest_join(left: &[NaiveDateTime], right: &[NaiveDateTime]) -> Vec<NearestMatch> {
    left.iter()
        .filter_map(|&key| nearest_index(right, key))
        .collect()
}

/// Summary of how far matched rows were from each other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoinDistance {
    pub mean_ms: f64,
    pub max_ms: f64,
}

impl JoinDistance {
    pub fn from_matches(matches: &[NearestMatch]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }
        let total: f64 = matches.iter().map(|m| m.distance_secs).sum();
        let max = matches
            .iter()
            .map(|m| m.distance_secs)
            .fold(0.0_f64, f64::max);
        Self {
            mean_ms: total / matches.len() as f64 * 1000.0,
            max_ms: max * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::parse_timestamp;

    fn ts(values: &[&str]) -> Vec<NaiveDateTime> {
        values.iter().map(|v| parse_timestamp(v).unwrap()).collect()
    }

    fn indices(matches: &[NearestMatch]) -> Vec<usize> {
        matches.iter().map(|m| m.right).collect()
    }

    #[test]
    fn test_nearest_selection() {
        let right = ts(&["10:00:00", "10:00:01", "10:00:02"]);
        let left = ts(&["09:59:58", "10:00:00.400", "10:00:00.600", "10:00:05"]);

        let matches = nearest_join(&left, &right);
        assert_eq!(indices(&matches), vec![0, 0, 1, 2]);
        assert!((matches[1].distance_secs - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_earlier_row() {
        let right = ts(&["10:00:00", "10:00:01"]);
        let left = ts(&["10:00:00.500"]);
        assert_eq!(indices(&nearest_join(&left, &right)), vec![0]);
    }

    #[test]
    fn test_exact_match_with_duplicate_keys_takes_last() {
        let right = ts(&["10:00:00", "10:00:01", "10:00:01", "10:00:02"]);
        let left = ts(&["10:00:01"]);
        assert_eq!(indices(&nearest_join(&left, &right)), vec![2]);
    }

    #[test]
    fn test_every_left_row_matched() {
        let right = ts(&["10:00:00"]);
        let left = ts(&["09:00:00", "10:00:00", "11:00:00", "11:00:00"]);
        let matches = nearest_join(&left, &right);
        assert_eq!(matches.len(), left.len());
        assert!(matches.iter().all(|m| m.right == 0));
    }

    #[test]
    fn test_empty_right() {
        let left = ts(&["10:00:00"]);
        assert!(nearest_join(&left, &[]).is_empty());
        assert!(nearest_index(&[], left[0]).is_none());
    }

    #[test]
    fn test_join_distance() {
        let matches = [
            NearestMatch { right: 0, distance_secs: 0.010 },
            NearestMatch { right: 1, distance_secs: 0.030 },
        ];
        let distance = JoinDistance::from_matches(&matches);
        assert!((distance.mean_ms - 20.0).abs() < 1e-9);
        assert!((distance.max_ms - 30.0).abs() < 1e-9);
        assert_eq!(JoinDistance::from_matches(&[]), JoinDistance::default());
    }
}
