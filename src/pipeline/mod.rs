//! Batch processing of matched trial pairs.
//!
//! This module contains:
//! - The driver that discovers files, matches them and merges each pair
//! - Manual pairing overrides for when automatic matching finds nothing

pub mod driver;
pub mod manual;

// Re-export commonly used types
pub use driver::{manual_pairs, output_path, Discovered, Pipeline, PipelineError};
pub use manual::{parse_index_pair, ConsolePairing, IndexPairs, PairingOverride};
