//! Myo-Angle Merge - time alignment of muscle and joint-angle recordings.
//!
//! Each motion trial produces two CSV files from two unsynchronized sensors:
//! a muscle-displacement stream that only records whole seconds, and a
//! joint-angle stream with its own clock. This library pairs the files of a
//! trial by the timestamp in their names, rebuilds sub-second muscle times,
//! corrects the coarse clock offset and joins every muscle row to the nearest
//! angle row in time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Myo-Angle Merge                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────────┐     │
//! │  │  Discover   │──▶│ Tag + Match │──▶│ per pair:       │     │
//! │  │  (CSV dirs) │   │ (filenames) │   │  reconstruct    │     │
//! │  └─────────────┘   └─────────────┘   │  align          │     │
//! │                           │          │  nearest join   │     │
//! │                           ▼          └─────────────────┘     │
//! │                    ┌─────────────┐            │              │
//! │                    │   Manual    │            ▼              │
//! │                    │  override   │     ┌─────────────┐       │
//! │                    └─────────────┘     │ CSV + report│       │
//! │                                        └─────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use myo_angle_merge::{Config, Pipeline};
//!
//! let config = Config::load().unwrap_or_default();
//! let mut pipeline = Pipeline::from_config(&config);
//!
//! match pipeline.run() {
//!     Ok(log) => println!("{}", log.summary()),
//!     Err(e) => eprintln!("Nothing merged: {e}"),
//! }
//! ```

pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, ResolvedPaths};
pub use crate::core::{
    extract_tag, find_matching_files, merge_files, Alignment, MatchOutcome, MatchRule, MergeError,
    MergeSettings, Shift, Stream, TrialFile, TrialPair,
};
pub use pipeline::{ConsolePairing, IndexPairs, PairingOverride, Pipeline, PipelineError};
pub use report::{PairStatus, RunLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
