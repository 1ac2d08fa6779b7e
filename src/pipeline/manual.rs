//! Manual pairing, used when automatic matching finds nothing.
//!
//! An override receives the discovered muscle and angle files and returns
//! `(muscle_index, angle_index)` pairs. The driver validates the indices, so
//! implementations need not.

use crate::core::trial::TrialFile;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Supplies explicit pairs by index.
pub trait PairingOverride {
    fn select(&mut self, muscles: &[TrialFile], angles: &[TrialFile]) -> Vec<(usize, usize)>;
}

impl<F> PairingOverride for F
where
    F: FnMut(&[TrialFile], &[TrialFile]) -> Vec<(usize, usize)>,
{
    fn select(&mut self, muscles: &[TrialFile], angles: &[TrialFile]) -> Vec<(usize, usize)> {
        self(muscles, angles)
    }
}

/// A fixed list of index pairs, e.g. from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPairs(pub Vec<(usize, usize)>);

impl PairingOverride for IndexPairs {
    fn select(&mut self, _muscles: &[TrialFile], _angles: &[TrialFile]) -> Vec<(usize, usize)> {
        self.0.clone()
    }
}

/// Parse `"M:A"` or `"M A"` into an index pair.
pub fn parse_index_pair(s: &str) -> Result<(usize, usize), String> {
    let mut parts = s
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let (Some(m), Some(a), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected '<muscle> <angle>' indices, got '{s}'"));
    };

    let parse = |p: &str| usize::from_str(p).map_err(|_| format!("'{p}' is not an index"));
    Ok((parse(m)?, parse(a)?))
}

/// Interactive selection over a reader and writer (normally stdin/stdout).
///
/// Lists both file sets with indices, then reads one `<muscle> <angle>` pair
/// per line until `q` or end of input.
pub struct ConsolePairing<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePairing<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, muscles: &[TrialFile], angles: &[TrialFile]) -> std::io::Result<()> {
        writeln!(self.output, "Muscle files:")?;
        for (i, f) in muscles.iter().enumerate() {
            writeln!(self.output, "  [{i}] {}", f.file_name())?;
        }
        writeln!(self.output, "Angle files:")?;
        for (i, f) in angles.iter().enumerate() {
            writeln!(self.output, "  [{i}] {}", f.file_name())?;
        }
        writeln!(
            self.output,
            "Enter '<muscle> <angle>' to pair files (e.g. '0 1'), 'q' to finish."
        )?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> PairingOverride for ConsolePairing<R, W> {
    fn select(&mut self, muscles: &[TrialFile], angles: &[TrialFile]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        if self.prompt(muscles, angles).is_err() {
            return pairs;
        }

        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }

            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            if entry.eq_ignore_ascii_case("q") {
                break;
            }

            match parse_index_pair(entry) {
                Ok(pair) => pairs.push(pair),
                Err(e) => {
                    let _ = writeln!(self.output, "{e}");
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn files(names: &[&str]) -> Vec<TrialFile> {
        names.iter().map(|n| TrialFile::new(*n)).collect()
    }

    #[test]
    fn test_parse_index_pair() {
        assert_eq!(parse_index_pair("0:1"), Ok((0, 1)));
        assert_eq!(parse_index_pair(" 2  3 "), Ok((2, 3)));
        assert!(parse_index_pair("1").is_err());
        assert!(parse_index_pair("1 2 3").is_err());
        assert!(parse_index_pair("a:b").is_err());
    }

    #[test]
    fn test_console_pairing() {
        let input = Cursor::new("0 1\nbogus\n\n1:0\nq\n2 2\n");
        let mut output = Vec::new();
        let muscles = files(&["m0.csv", "m1.csv"]);
        let angles = files(&["a0.csv", "a1.csv"]);

        let pairs = ConsolePairing::new(input, &mut output).select(&muscles, &angles);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("[1] m1.csv"));
        assert!(shown.contains("[0] a0.csv"));
        assert!(shown.contains("'bogus'"));
    }

    #[test]
    fn test_closure_override() {
        let mut pick_first = |m: &[TrialFile], a: &[TrialFile]| {
            if m.is_empty() || a.is_empty() {
                Vec::new()
            } else {
                vec![(0, 0)]
            }
        };
        let pairs = pick_first.select(&files(&["m.csv"]), &files(&["a.csv"]));
        assert_eq!(pairs, vec![(0, 0)]);
    }
}
