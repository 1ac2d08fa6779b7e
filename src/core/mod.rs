//! Core pairing and alignment logic.
//!
//! This module contains:
//! - Filename timestamp extraction and trial matching
//! - Timestamp parsing and sub-second reconstruction for the muscle stream
//! - Offset estimation and the nearest-time join
//! - The per-pair merge that chains them together

pub mod align;
pub mod clock;
pub mod join;
pub mod matcher;
pub mod merge;
pub mod reconstruct;
pub mod tag;
pub mod trial;

// Re-export commonly used types
pub use align::{Alignment, Shift};
pub use join::{nearest_join, JoinDistance, NearestMatch};
pub use matcher::find_matching_files;
pub use merge::{merge_files, merge_streams, MergeError, MergeSettings, MergedTable, TimedStream};
pub use reconstruct::{reconstruct_subsecond, SubSecondClock};
pub use tag::{extract_tag, TagFormat};
pub use trial::{MatchOutcome, MatchRule, Stream, TrialFile, TrialPair};
