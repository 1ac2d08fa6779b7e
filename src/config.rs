//! Configuration for the merger.
//!
//! Input and output locations are chosen by probing ordered candidate lists
//! and taking the first path that exists. If no data folder exists its first
//! candidate is used anyway and the run fails later, at read time, with a
//! diagnostic. The base directory instead falls back to its last candidate.

use crate::core::merge::MergeSettings;
use crate::core::{align::DEFAULT_OFFSET_THRESHOLD_SECS, reconstruct::DEFAULT_SAMPLE_RATE_HZ};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directories to probe, in order
    pub base_dir_candidates: Vec<PathBuf>,

    /// Muscle data folders relative to the base, in order
    pub muscle_subdirs: Vec<PathBuf>,

    /// Angle data folders relative to the base, in order
    pub angle_subdirs: Vec<PathBuf>,

    /// Output folder relative to the base
    pub output_subdir: PathBuf,

    /// Nominal muscle sample rate (Hz)
    pub sample_rate_hz: f64,

    /// Offsets at or below this many seconds are not corrected
    pub offset_threshold_secs: f64,

    /// Muscle time column used when no header mentions time or stamp
    pub muscle_time_fallback: String,

    /// Angle time column used when no header mentions time or stamp
    pub angle_time_fallback: String,

    /// Whether to write `merge_report.json` next to the merged files
    pub write_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home_base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("darts");

        Self {
            base_dir_candidates: vec![home_base, PathBuf::from("./darts"), PathBuf::from(".")],
            muscle_subdirs: vec![PathBuf::from("muscle"), PathBuf::new()],
            angle_subdirs: vec![PathBuf::from("angle"), PathBuf::new()],
            output_subdir: PathBuf::from("merged_data"),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            offset_threshold_secs: DEFAULT_OFFSET_THRESHOLD_SECS,
            muscle_time_fallback: "Timestamp".to_string(),
            angle_time_fallback: "timestamp".to_string(),
            write_report: true,
        }
    }
}

/// Directories chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaths {
    pub base: PathBuf,
    pub muscle: PathBuf,
    pub angle: PathBuf,
    pub output: PathBuf,
}

/// First candidate that exists on disk.
pub fn first_existing(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|p| p.exists())
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("myo-angle-merge")
            .join("config.json")
    }

    /// Pick the base, input and output directories.
    ///
    /// When no base candidate exists the base is the *last* candidate
    /// (normally the working directory), not the first. The data folders
    /// fall back to their first candidate.
    pub fn resolve(&self) -> ResolvedPaths {
        let base = first_existing(&self.base_dir_candidates)
            .or(self.base_dir_candidates.last())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));

        self.resolve_under(&base)
    }

    /// Resolve the data folders under a given base directory.
    pub fn resolve_under(&self, base: &Path) -> ResolvedPaths {
        let pick = |subdirs: &[PathBuf]| {
            let candidates: Vec<PathBuf> = subdirs.iter().map(|s| base.join(s)).collect();
            first_existing(&candidates)
                .or(candidates.first())
                .cloned()
                .unwrap_or_else(|| base.to_path_buf())
        };

        ResolvedPaths {
            base: base.to_path_buf(),
            muscle: pick(&self.muscle_subdirs),
            angle: pick(&self.angle_subdirs),
            output: base.join(&self.output_subdir),
        }
    }

    /// Merge tunables carried by this configuration.
    pub fn merge_settings(&self) -> MergeSettings {
        MergeSettings {
            sample_rate_hz: self.sample_rate_hz,
            offset_threshold_secs: self.offset_threshold_secs,
            muscle_time_fallback: self.muscle_time_fallback.clone(),
            angle_time_fallback: self.angle_time_fallback.clone(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate_hz, 22.0);
        assert_eq!(config.offset_threshold_secs, 1.0);
        assert_eq!(config.output_subdir, PathBuf::from("merged_data"));
        assert_eq!(config.base_dir_candidates.last(), Some(&PathBuf::from(".")));
        assert!(config.write_report);
    }

    #[test]
    fn test_resolve_prefers_existing_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("angle")).unwrap();

        let config = Config {
            base_dir_candidates: vec![dir.path().join("missing"), dir.path().to_path_buf()],
            ..Config::default()
        };
        let paths = config.resolve();

        assert_eq!(paths.base, dir.path());
        assert_eq!(paths.angle, dir.path().join("angle"));
        // No "muscle" folder: the base itself (second candidate) exists.
        assert_eq!(paths.muscle, dir.path().join(""));
        assert_eq!(paths.output, dir.path().join("merged_data"));
    }

    #[test]
    fn test_resolve_falls_back_without_validation() {
        let config = Config {
            base_dir_candidates: vec![PathBuf::from("/no/such/base")],
            muscle_subdirs: vec![PathBuf::from("m1"), PathBuf::from("m2")],
            ..Config::default()
        };
        let paths = config.resolve();
        assert_eq!(paths.base, PathBuf::from("/no/such/base"));
        assert_eq!(paths.muscle, PathBuf::from("/no/such/base/m1"));
    }

    #[test]
    fn test_base_falls_back_to_last_candidate() {
        let config = Config {
            base_dir_candidates: vec![PathBuf::from("/no/first"), PathBuf::from("/no/last")],
            ..Config::default()
        };
        assert_eq!(config.resolve().base, PathBuf::from("/no/last"));
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "sample_rate_hz": 20.0 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sample_rate_hz, 20.0);
        assert_eq!(config.angle_time_fallback, "timestamp");
    }

    #[test]
    fn test_save_to_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            sample_rate_hz: 25.0,
            write_report: false,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sample_rate_hz, 25.0);
        assert!(!loaded.write_report);
        assert_eq!(loaded.muscle_subdirs, config.muscle_subdirs);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
