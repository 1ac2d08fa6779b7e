//! Trial file and pairing types.
//!
//! A trial is one recording session that produced a muscle-displacement file
//! and a joint-angle file. Files are identified by the capture timestamp tag
//! embedded in their filename.

use crate::core::tag::extract_tag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which sensor produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    /// Muscle displacement, whole-second timestamps
    Muscle,
    /// Joint angle, independently clocked
    Angle,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Muscle => write!(f, "muscle"),
            Stream::Angle => write!(f, "angle"),
        }
    }
}

/// A discovered CSV file plus the timestamp tag taken from its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialFile {
    /// Path to the CSV file
    pub path: PathBuf,
    /// Capture timestamp tag, or the bare file stem if no pattern matched
    pub tag: String,
}

impl TrialFile {
    /// Create a trial file, extracting its tag from the filename.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tag = extract_tag(&path);
        Self { path, tag }
    }

    /// Filename including extension, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Filename without its extension.
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The rule that produced a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Tags are identical
    Exact,
    /// One tag contains the other
    Substring,
    /// The portions before the first underscore are identical
    DateOnly,
    /// Supplied by a pairing override
    Manual,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Exact => write!(f, "exact"),
            MatchRule::Substring => write!(f, "substring"),
            MatchRule::DateOnly => write!(f, "date-only"),
            MatchRule::Manual => write!(f, "manual"),
        }
    }
}

/// A muscle file paired with an angle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPair {
    pub muscle: TrialFile,
    pub angle: TrialFile,
    pub rule: MatchRule,
}

impl TrialPair {
    /// Output filename: `{muscle_stem}_merged_with_{angle_stem}.csv`.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_merged_with_{}.csv",
            self.muscle.stem(),
            self.angle.stem()
        )
    }
}

/// Result of matching muscle files against angle files.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// At most one pair per muscle file, in muscle-file order
    pub pairs: Vec<TrialPair>,
    /// Muscle files no rule could pair
    pub unmatched: Vec<TrialFile>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
