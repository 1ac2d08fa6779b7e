//! Capture-timestamp extraction from filenames.
//!
//! Patterns are tried in a fixed priority order against the filename only.
//! The first match is returned verbatim; tags in different forms are never
//! normalized to each other, so `20250304_163722` and `2025.3.4_163722` are
//! different tags.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// The filename forms a capture timestamp can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFormat {
    /// `20250304_163722`
    Compact,
    /// `2025.3.4_163722`
    Dotted,
    /// `3-4-2025_163722`
    Dashed,
}

/// Patterns in priority order.
static TAG_PATTERNS: LazyLock<Vec<(TagFormat, Regex)>> = LazyLock::new(|| {
    [
        (TagFormat::Compact, r"(\d{8}_\d{6})"),
        (TagFormat::Dotted, r"(\d{4}\.\d{1,2}\.\d{1,2}_\d{6})"),
        (TagFormat::Dashed, r"(\d{1,2}-\d{1,2}-\d{4}_\d{6})"),
    ]
    .into_iter()
    .map(|(format, pattern)| (format, Regex::new(pattern).expect("valid tag regex")))
    .collect()
});

/// Find the highest-priority timestamp in a bare filename.
pub fn match_tag(file_name: &str) -> Option<(TagFormat, &str)> {
    TAG_PATTERNS.iter().find_map(|(format, re)| {
        re.captures(file_name)
            .and_then(|caps| caps.get(1))
            .map(|m| (*format, m.as_str()))
    })
}

/// Extract the timestamp tag from a path, falling back to the file stem.
pub fn extract_tag(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match match_tag(&file_name) {
        Some((_, tag)) => tag.to_string(),
        None => crate::core::trial::file_stem(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_pattern() {
        assert_eq!(
            extract_tag(Path::new("EMG_20250304_163722.csv")),
            "20250304_163722"
        );
    }

    #[test]
    fn test_dotted_and_dashed_patterns() {
        assert_eq!(
            match_tag("angle_2025.3.4_163722.csv"),
            Some((TagFormat::Dotted, "2025.3.4_163722"))
        );
        assert_eq!(
            match_tag("angle_3-4-2025_163722.csv"),
            Some((TagFormat::Dashed, "3-4-2025_163722"))
        );
    }

    #[test]
    fn test_compact_wins_over_later_patterns() {
        // Both the compact and the dotted form appear; priority picks compact.
        let name = "2025.3.4_101010_then_20250304_163722.csv";
        assert_eq!(
            match_tag(name),
            Some((TagFormat::Compact, "20250304_163722"))
        );
    }

    #[test]
    fn test_only_filename_is_searched() {
        let path = Path::new("/data/20250304_163722/trial.csv");
        assert_eq!(extract_tag(path), "trial");
    }

    #[test]
    fn test_fallback_to_stem() {
        assert_eq!(extract_tag(Path::new("dir/session one.csv")), "session one");
        assert_eq!(extract_tag(Path::new("archive.tar.csv")), "archive.tar");
    }

    #[test]
    fn test_forms_are_not_normalized() {
        let compact = extract_tag(Path::new("m_20250304_163722.csv"));
        let dotted = extract_tag(Path::new("a_2025.3.4_163722.csv"));
        assert_ne!(compact, dotted);
    }
}
