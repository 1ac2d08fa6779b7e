//! Merging one muscle file with one angle file.
//!
//! Steps per pair: read both tables, locate and parse their time columns,
//! rebuild sub-second muscle times, sort both streams, estimate the offset,
//! nearest-join on the merge keys, and emit one output row per muscle row.
//! The synthetic time columns never reach the output; every input column
//! from both files does.

use crate::core::align::{Alignment, DEFAULT_OFFSET_THRESHOLD_SECS};
use crate::core::clock::parse_timestamp;
use crate::core::join::{nearest_join, JoinDistance};
use crate::core::reconstruct::{reconstruct_subsecond, DEFAULT_SAMPLE_RATE_HZ};
use crate::core::trial::Stream;
use crate::io::table::{read_table, write_table, Table};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failures that abandon a single pair.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to read {stream} file {}: {source}", .path.display())]
    Read {
        stream: Stream,
        path: PathBuf,
        source: csv::Error,
    },

    #[error("no time column in {stream} file {} (columns: {})", .path.display(), .columns.join(", "))]
    MissingTimeColumn {
        stream: Stream,
        path: PathBuf,
        columns: Vec<String>,
    },

    #[error("unparseable timestamp {value:?} in {stream} file {} at row {row}", .path.display())]
    UnparseableTimestamp {
        stream: Stream,
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{stream} file {} has no data rows", .path.display())]
    EmptyStream { stream: Stream, path: PathBuf },

    #[error("cannot join {} with {}: {reason}", .muscle.display(), .angle.display())]
    Join {
        muscle: PathBuf,
        angle: PathBuf,
        reason: String,
    },

    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: csv::Error },
}

/// Tunables for a merge.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub sample_rate_hz: f64,
    pub offset_threshold_secs: f64,
    /// Time column name tried when no header looks like a time column
    pub muscle_time_fallback: String,
    pub angle_time_fallback: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            offset_threshold_secs: DEFAULT_OFFSET_THRESHOLD_SECS,
            muscle_time_fallback: "Timestamp".to_string(),
            angle_time_fallback: "timestamp".to_string(),
        }
    }
}

impl MergeSettings {
    fn fallback_for(&self, stream: Stream) -> &str {
        match stream {
            Stream::Muscle => &self.muscle_time_fallback,
            Stream::Angle => &self.angle_time_fallback,
        }
    }
}

/// A table with its parsed time column.
#[derive(Debug, Clone)]
pub struct TimedStream {
    pub stream: Stream,
    pub path: PathBuf,
    pub table: Table,
    pub time_column: usize,
    pub times: Vec<NaiveDateTime>,
}

impl TimedStream {
    /// Read a CSV file and parse its time column.
    pub fn load(stream: Stream, path: &Path, settings: &MergeSettings) -> Result<Self, MergeError> {
        let table = read_table(path).map_err(|source| MergeError::Read {
            stream,
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} rows from {stream} file {}", table.len(), path.display());
        Self::from_table(stream, path, table, settings.fallback_for(stream))
    }

    /// Parse the time column of an already-loaded table.
    pub fn from_table(
        stream: Stream,
        path: &Path,
        table: Table,
        fallback: &str,
    ) -> Result<Self, MergeError> {
        let time_column =
            table
                .find_time_column(fallback)
                .ok_or_else(|| MergeError::MissingTimeColumn {
                    stream,
                    path: path.to_path_buf(),
                    columns: table.headers.clone(),
                })?;

        if table.is_empty() {
            return Err(MergeError::EmptyStream {
                stream,
                path: path.to_path_buf(),
            });
        }

        let times = table
            .column(time_column)
            .enumerate()
            .map(|(row, value)| {
                parse_timestamp(value).ok_or_else(|| MergeError::UnparseableTimestamp {
                    stream,
                    path: path.to_path_buf(),
                    row,
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stream,
            path: path.to_path_buf(),
            table,
            time_column,
            times,
        })
    }

    pub fn time_column_name(&self) -> &str {
        &self.table.headers[self.time_column]
    }
}

/// Output of a merge, before it is written.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub table: Table,
    pub alignment: Alignment,
    pub distance: JoinDistance,
    pub angle_rows: usize,
}

/// Row order that sorts `times` ascending, keeping file order among equals.
fn stable_order(times: &[NaiveDateTime]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by_key(|&i| times[i]);
    order
}

/// Headers for the joined table. Names present in both inputs get `_x` / `_y`.
fn merged_headers(muscle: &[String], angle: &[String]) -> Vec<String> {
    let muscle_set: HashSet<&String> = muscle.iter().collect();
    let angle_set: HashSet<&String> = angle.iter().collect();

    let left = muscle.iter().map(|h| {
        if angle_set.contains(h) {
            format!("{h}_x")
        } else {
            h.clone()
        }
    });
    let right = angle.iter().map(|h| {
        if muscle_set.contains(h) {
            format!("{h}_y")
        } else {
            h.clone()
        }
    });
    left.chain(right).collect()
}

fn padded(row: &[String], width: usize) -> impl Iterator<Item = String> + '_ {
    (0..width).map(move |i| row.get(i).cloned().unwrap_or_default())
}

/// Join two parsed streams. The muscle stream is the anchor side.
pub fn merge_streams(
    muscle: &TimedStream,
    angle: &TimedStream,
    settings: &MergeSettings,
) -> Result<MergedTable, MergeError> {
    let join_error = |reason: String| MergeError::Join {
        muscle: muscle.path.clone(),
        angle: angle.path.clone(),
        reason,
    };

    // Reconstruction runs over file order; sorting comes after.
    let muscle_times = reconstruct_subsecond(&muscle.times, settings.sample_rate_hz);

    let muscle_order = stable_order(&muscle_times);
    let angle_order = stable_order(&angle.times);
    let sorted_muscle: Vec<NaiveDateTime> = muscle_order.iter().map(|&i| muscle_times[i]).collect();
    let sorted_angle: Vec<NaiveDateTime> = angle_order.iter().map(|&i| angle.times[i]).collect();

    let alignment = Alignment::estimate(
        &sorted_muscle,
        &sorted_angle,
        settings.offset_threshold_secs,
    )
    .ok_or_else(|| join_error("a stream has no rows".to_string()))?;
    info!(
        "Initial offset {:.3}s between {} and {} ({:?})",
        alignment.offset_secs,
        muscle.path.display(),
        angle.path.display(),
        alignment.shift
    );

    let muscle_keys = alignment.muscle_keys(&sorted_muscle);
    let angle_keys = alignment.angle_keys(&sorted_angle);

    let matches = nearest_join(&muscle_keys, &angle_keys);
    if matches.len() != muscle_keys.len() {
        return Err(join_error(format!(
            "matched {} of {} muscle rows",
            matches.len(),
            muscle_keys.len()
        )));
    }

    let muscle_width = muscle.table.headers.len();
    let angle_width = angle.table.headers.len();
    let mut table = Table::new(merged_headers(&muscle.table.headers, &angle.table.headers));

    for (&m_idx, nearest) in muscle_order.iter().zip(&matches) {
        let a_idx = angle_order[nearest.right];
        let row = padded(&muscle.table.rows[m_idx], muscle_width)
            .chain(padded(&angle.table.rows[a_idx], angle_width))
            .collect();
        table.rows.push(row);
    }

    Ok(MergedTable {
        table,
        alignment,
        distance: JoinDistance::from_matches(&matches),
        angle_rows: angle.table.len(),
    })
}

/// Write a merged table, creating the parent directory if needed.
pub fn write_merged(path: &Path, table: &Table) -> Result<(), MergeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| MergeError::CreateOutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
            info!("Created output directory {}", parent.display());
        }
    }

    write_table(path, table).map_err(|source| MergeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, merge and optionally write one pair of files.
pub fn merge_files(
    muscle_path: &Path,
    angle_path: &Path,
    output: Option<&Path>,
    settings: &MergeSettings,
) -> Result<MergedTable, MergeError> {
    let muscle = TimedStream::load(Stream::Muscle, muscle_path, settings)?;
    let angle = TimedStream::load(Stream::Angle, angle_path, settings)?;
    debug!(
        "Time columns: muscle '{}', angle '{}'",
        muscle.time_column_name(),
        angle.time_column_name()
    );

    let merged = merge_streams(&muscle, &angle, settings)?;

    if let Some(path) = output {
        write_merged(path, &merged.table)?;
        info!("Wrote {} rows to {}", merged.table.len(), path.display());
    }

    Ok(merged)
}
