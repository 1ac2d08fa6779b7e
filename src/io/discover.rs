//! CSV discovery.
//!
//! A directory is scanned flat first; only when that finds nothing are its
//! subdirectories searched recursively. Results are sorted by path so runs
//! are reproducible.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn is_csv(path: &Path) -> bool {
    path.is_file() && path.extension().map(|e| e == "csv").unwrap_or(false)
}

fn scan_flat(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| is_csv(p))
                .collect()
        })
        .unwrap_or_default()
}

fn scan_recursive(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };

    // Directory symlinks are not followed; a link back to an ancestor
    // would otherwise be walked once per nesting level.
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => scan_recursive(&path, found),
            Ok(_) if is_csv(&path) => found.push(path),
            Ok(_) => {}
            Err(e) => debug!("Skipping {}: {e}", path.display()),
        }
    }
}

/// Find every `.csv` file under `dir`.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files = scan_flat(dir);
    if files.is_empty() {
        scan_recursive(dir, &mut files);
    }
    files.sort();

    debug!("Found {} CSV file(s) in {}", files.len(), dir.display());
    files
}
