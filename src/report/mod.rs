//! Reporting for batch runs.

pub mod log;

// Re-export commonly used types
pub use log::{PairOutcome, PairStatus, RunLog, REPORT_FILE_NAME};
