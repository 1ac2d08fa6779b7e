//! Batch driver: discover, match, merge each pair, report.
//!
//! Pairs are processed one at a time. A pair that fails is logged, recorded
//! in the run log and skipped; it never stops the remaining pairs. The batch
//! itself halts only when there is nothing to process.

use crate::config::{Config, ResolvedPaths};
use crate::core::matcher::find_matching_files;
use crate::core::merge::{merge_files, MergeError, MergeSettings, MergedTable};
use crate::core::trial::{MatchOutcome, MatchRule, TrialFile, TrialPair};
use crate::io::discover::find_csv_files;
use crate::pipeline::manual::PairingOverride;
use crate::report::log::{PairStatus, RunLog};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Conditions that stop a batch before any pair is merged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no muscle CSV files found in {}", .0.display())]
    NoMuscleFiles(PathBuf),

    #[error("no angle CSV files found in {}", .0.display())]
    NoAngleFiles(PathBuf),

    #[error("no matching file pairs among {muscle} muscle and {angle} angle files")]
    NoPairs { muscle: usize, angle: usize },
}

/// Files found for both streams.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub muscles: Vec<TrialFile>,
    pub angles: Vec<TrialFile>,
}

/// Output location for a pair inside `output_dir`.
pub fn output_path(output_dir: &Path, pair: &TrialPair) -> PathBuf {
    output_dir.join(pair.output_file_name())
}

/// Turn override indices into pairs, dropping any that are out of range.
pub fn manual_pairs(
    indices: &[(usize, usize)],
    muscles: &[TrialFile],
    angles: &[TrialFile],
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for &(m, a) in indices {
        match (muscles.get(m), angles.get(a)) {
            (Some(muscle), Some(angle)) => outcome.pairs.push(TrialPair {
                muscle: muscle.clone(),
                angle: angle.clone(),
                rule: MatchRule::Manual,
            }),
            _ => warn!(
                "Ignoring manual pair {m}:{a} ({} muscle, {} angle files)",
                muscles.len(),
                angles.len()
            ),
        }
    }

    outcome.unmatched = muscles
        .iter()
        .filter(|f| !outcome.pairs.iter().any(|p| p.muscle.path == f.path))
        .cloned()
        .collect();
    outcome
}

/// The batch merge driver.
pub struct Pipeline {
    paths: ResolvedPaths,
    settings: MergeSettings,
    write_report: bool,
    pairing_override: Option<Box<dyn PairingOverride>>,
}

impl Pipeline {
    /// Create a driver over already-resolved paths.
    pub fn new(paths: ResolvedPaths, settings: MergeSettings) -> Self {
        Self {
            paths,
            settings,
            write_report: false,
            pairing_override: None,
        }
    }

    /// Create a driver from configuration, resolving paths by probing.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolve(), config.merge_settings()).with_report(config.write_report)
    }

    /// Enable or disable writing `merge_report.json`.
    pub fn with_report(mut self, write_report: bool) -> Self {
        self.write_report = write_report;
        self
    }

    /// Consult `hook` when automatic matching finds no pairs.
    pub fn with_override(mut self, hook: impl PairingOverride + 'static) -> Self {
        self.pairing_override = Some(Box::new(hook));
        self
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// Find the CSV files of both streams.
    pub fn discover(&self) -> Result<Discovered, PipelineError> {
        info!("Muscle data folder: {}", self.paths.muscle.display());
        let muscles: Vec<TrialFile> = find_csv_files(&self.paths.muscle)
            .into_iter()
            .map(TrialFile::new)
            .collect();
        if muscles.is_empty() {
            return Err(PipelineError::NoMuscleFiles(self.paths.muscle.clone()));
        }

        info!("Angle data folder: {}", self.paths.angle.display());
        let angles: Vec<TrialFile> = find_csv_files(&self.paths.angle)
            .into_iter()
            .map(TrialFile::new)
            .collect();
        if angles.is_empty() {
            return Err(PipelineError::NoAngleFiles(self.paths.angle.clone()));
        }

        info!(
            "Found {} muscle and {} angle file(s)",
            muscles.len(),
            angles.len()
        );
        Ok(Discovered { muscles, angles })
    }

    /// Match discovered files, falling back to the override when nothing pairs.
    pub fn plan(&mut self, found: &Discovered) -> Result<MatchOutcome, PipelineError> {
        let mut outcome = find_matching_files(&found.muscles, &found.angles);

        if outcome.is_empty() {
            if let Some(hook) = self.pairing_override.as_mut() {
                info!("No automatic pairs; asking for manual pairing");
                let indices = hook.select(&found.muscles, &found.angles);
                outcome = manual_pairs(&indices, &found.muscles, &found.angles);
            }
        }

        if outcome.is_empty() {
            return Err(PipelineError::NoPairs {
                muscle: found.muscles.len(),
                angle: found.angles.len(),
            });
        }

        info!(
            "{} pair(s) matched, {} muscle file(s) unmatched",
            outcome.pairs.len(),
            outcome.unmatched.len()
        );
        Ok(outcome)
    }

    /// Merge one pair into the output directory.
    pub fn process_pair(&self, pair: &TrialPair) -> Result<(PathBuf, MergedTable), MergeError> {
        let output = output_path(&self.paths.output, pair);
        info!(
            "Processing {} with {}",
            pair.muscle.file_name(),
            pair.angle.file_name()
        );
        let merged = merge_files(&pair.muscle.path, &pair.angle.path, Some(&output), &self.settings)?;
        Ok((output, merged))
    }

    /// Run the whole batch.
    pub fn run(&mut self) -> Result<RunLog, PipelineError> {
        let mut log = RunLog::new();

        let found = self.discover()?;
        log.record_discovery(found.muscles.len(), found.angles.len());

        let outcome = self.plan(&found)?;
        log.record_unmatched(&outcome.unmatched);

        for pair in &outcome.pairs {
            let status = match self.process_pair(pair) {
                Ok((output, merged)) => PairStatus::Merged {
                    output,
                    rows: merged.table.len(),
                    angle_rows: merged.angle_rows,
                    offset_secs: merged.alignment.offset_secs,
                    shift: merged.alignment.shift,
                    mean_distance_ms: merged.distance.mean_ms,
                    max_distance_ms: merged.distance.max_ms,
                },
                Err(e) => {
                    error!("Skipping {}: {e}", pair.muscle.file_name());
                    PairStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            log.record_pair(pair, status);
        }

        for file in &outcome.unmatched {
            warn!("Unmatched muscle file: {}", file.path.display());
        }

        if self.write_report {
            match log.save(&self.paths.output) {
                Ok(path) => info!("Saved run report to {}", path.display()),
                Err(e) => warn!("Could not save run report: {e}"),
            }
        }

        Ok(log)
    }
}
