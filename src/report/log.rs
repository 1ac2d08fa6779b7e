//! Run log for a batch merge.
//!
//! Tracks what a run discovered, which pairs it formed and how each pair
//! ended, so failures can be reviewed after the batch finishes.

use crate::core::align::Shift;
use crate::core::trial::{MatchRule, TrialFile, TrialPair};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filename of the persisted report inside the output directory.
pub const REPORT_FILE_NAME: &str = "merge_report.json";

/// How one pair ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    Merged {
        output: PathBuf,
        rows: usize,
        angle_rows: usize,
        offset_secs: f64,
        shift: Shift,
        mean_distance_ms: f64,
        max_distance_ms: f64,
    },
    Failed {
        error: String,
    },
}

/// Outcome record for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairOutcome {
    pub muscle: PathBuf,
    pub angle: PathBuf,
    pub rule: MatchRule,
    #[serde(flatten)]
    pub status: PairStatus,
}

impl PairOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self.status, PairStatus::Merged { .. })
    }
}

/// Counters and outcomes for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub muscle_files: usize,
    pub angle_files: usize,
    pub unmatched: Vec<PathBuf>,
    pub pairs: Vec<PairOutcome>,
}

impl RunLog {
    /// Create an empty log for a new run.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            muscle_files: 0,
            angle_files: 0,
            unmatched: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Record how many files each stream contributed.
    pub fn record_discovery(&mut self, muscle_files: usize, angle_files: usize) {
        self.muscle_files = muscle_files;
        self.angle_files = angle_files;
    }

    /// Record muscle files no rule could pair.
    pub fn record_unmatched(&mut self, files: &[TrialFile]) {
        self.unmatched
            .extend(files.iter().map(|f| f.path.clone()));
    }

    /// Record a pair's outcome.
    pub fn record_pair(&mut self, pair: &TrialPair, status: PairStatus) {
        self.pairs.push(PairOutcome {
            muscle: pair.muscle.path.clone(),
            angle: pair.angle.path.clone(),
            rule: pair.rule,
            status,
        });
    }

    /// Number of pairs attempted.
    pub fn pairs_found(&self) -> usize {
        self.pairs.len()
    }

    /// Number of pairs written successfully.
    pub fn pairs_merged(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_merged()).count()
    }

    /// Number of pairs skipped after an error.
    pub fn pairs_failed(&self) -> usize {
        self.pairs_found() - self.pairs_merged()
    }

    /// Total rows across all merged outputs.
    pub fn rows_written(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| match p.status {
                PairStatus::Merged { rows, .. } => rows,
                PairStatus::Failed { .. } => 0,
            })
            .sum()
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Run Summary:\n\
             - Muscle files: {}\n\
             - Angle files: {}\n\
             - Pairs found: {}\n\
             - Pairs merged: {}\n\
             - Pairs failed: {}\n\
             - Rows written: {}\n\
             - Unmatched muscle files: {}",
            self.muscle_files,
            self.angle_files,
            self.pairs_found(),
            self.pairs_merged(),
            self.pairs_failed(),
            self.rows_written(),
            self.unmatched.len()
        );

        for outcome in self.pairs.iter().filter(|p| !p.is_merged()) {
            if let PairStatus::Failed { error } = &outcome.status {
                out.push_str(&format!("\n  failed: {} ({error})", outcome.muscle.display()));
            }
        }
        for path in &self.unmatched {
            out.push_str(&format!("\n  unmatched: {}", path.display()));
        }

        out
    }

    /// Save the log as JSON into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(m: &str, a: &str) -> TrialPair {
        TrialPair {
            muscle: TrialFile::new(m),
            angle: TrialFile::new(a),
            rule: MatchRule::Exact,
        }
    }

    fn merged(rows: usize) -> PairStatus {
        PairStatus::Merged {
            output: PathBuf::from("out.csv"),
            rows,
            angle_rows: 10,
            offset_secs: 0.0,
            shift: Shift::None,
            mean_distance_ms: 1.0,
            max_distance_ms: 2.0,
        }
    }

    #[test]
    fn test_counting() {
        let mut log = RunLog::new();
        log.record_discovery(3, 2);
        log.record_pair(&pair("m1.csv", "a1.csv"), merged(40));
        log.record_pair(&pair("m2.csv", "a1.csv"), merged(2));
        log.record_pair(
            &pair("m3.csv", "a2.csv"),
            PairStatus::Failed {
                error: "boom".to_string(),
            },
        );

        assert_eq!(log.pairs_found(), 3);
        assert_eq!(log.pairs_merged(), 2);
        assert_eq!(log.pairs_failed(), 1);
        assert_eq!(log.rows_written(), 42);
    }

    #[test]
    fn test_summary_format() {
        let mut log = RunLog::new();
        log.record_unmatched(&[TrialFile::new("lonely.csv")]);
        log.record_pair(
            &pair("m3.csv", "a2.csv"),
            PairStatus::Failed {
                error: "no time column".to_string(),
            },
        );

        let summary = log.summary();
        assert!(summary.contains("Pairs found: 1"));
        assert!(summary.contains("failed: m3.csv (no time column)"));
        assert!(summary.contains("unmatched: lonely.csv"));
    }

    #[test]
    fn test_save_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new();
        log.record_pair(&pair("m1.csv", "a1.csv"), merged(5));

        let path = log.save(dir.path()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["pairs"][0]["status"], "merged");
        assert_eq!(value["pairs"][0]["rows"], 5);
        assert_eq!(value["pairs"][0]["rule"], "exact");
    }
}
