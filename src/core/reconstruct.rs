//! Sub-second reconstruction for the muscle stream.
//!
//! The muscle sensor samples at roughly 22 Hz but only writes whole seconds.
//! Rows sharing a second are spread evenly across it by their position within
//! the run: the k-th row of a second gets `floor((k * 1000 / rate) mod 1000)`
//! milliseconds. Runs longer than the nominal rate wrap back toward zero.

use chrono::{NaiveDateTime, Timelike};

/// Nominal muscle sample rate.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 22.0;

/// Millisecond offset for the `index`-th row within one second.
pub fn synthesized_millis(index: u32, sample_rate_hz: f64) -> u32 {
    ((index as f64 * (1000.0 / sample_rate_hz)) % 1000.0) as u32
}

/// Running state of the scan: the last seen second and how many rows it had.
#[derive(Debug, Clone)]
pub struct SubSecondClock {
    sample_rate_hz: f64,
    current_second: Option<(u32, u32, u32)>,
    index_in_second: u32,
}

impl SubSecondClock {
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            current_second: None,
            index_in_second: 0,
        }
    }

    /// Assign the next row its reconstructed time.
    ///
    /// Only hour, minute and second are compared, so a date change on the
    /// same wall-clock second continues the run.
    pub fn advance(&mut self, time: NaiveDateTime) -> NaiveDateTime {
        let second = (time.hour(), time.minute(), time.second());

        if self.current_second == Some(second) {
            self.index_in_second += 1;
        } else {
            self.current_second = Some(second);
            self.index_in_second = 0;
        }

        let millis = synthesized_millis(self.index_in_second, self.sample_rate_hz);
        time.with_nanosecond(millis * 1_000_000).unwrap_or(time)
    }

    /// Number of earlier rows in the current second.
    pub fn index_in_second(&self) -> u32 {
        self.index_in_second
    }
}

/// Rebuild sub-second times for rows in file order.
pub fn reconstruct_subsecond(times: &[NaiveDateTime], sample_rate_hz: f64) -> Vec<NaiveDateTime> {
    let mut clock = SubSecondClock::new(sample_rate_hz);
    times.iter().map(|&t| clock.advance(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::parse_timestamp;

    fn times(values: &[&str]) -> Vec<NaiveDateTime> {
        values.iter().map(|v| parse_timestamp(v).unwrap()).collect()
    }

    fn millis(times: &[NaiveDateTime]) -> Vec<u32> {
        times.iter().map(|t| t.nanosecond() / 1_000_000).collect()
    }

    #[test]
    fn test_three_rows_in_one_second() {
        let input = times(&["10:00:00", "10:00:00", "10:00:00"]);
        let out = reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(millis(&out), vec![0, 45, 90]);
    }

    #[test]
    fn test_counter_resets_on_new_second() {
        let input = times(&["10:00:00", "10:00:00", "10:00:01", "10:00:01", "10:00:00"]);
        let out = reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(millis(&out), vec![0, 45, 0, 45, 0]);
    }

    #[test]
    fn test_existing_fraction_replaced() {
        let input = times(&["2025-03-04 10:00:00.900", "2025-03-04 10:00:00.100"]);
        let out = reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(millis(&out), vec![0, 45]);
    }

    #[test]
    fn test_offsets_bounded_and_wrap() {
        let input = vec![parse_timestamp("10:00:00").unwrap(); 30];
        let out = millis(&reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ));

        assert!(out.iter().all(|&ms| ms < 1000));
        // Non-decreasing up to the nominal rate.
        assert!(out[..22].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(out[21], 954);
        // Past 22 rows the offset wraps instead of clamping.
        assert!(out[23] < out[21]);
        assert!(out[23] < 100);
    }

    #[test]
    fn test_clock_is_reentrant() {
        let input = times(&["10:00:00", "10:00:00"]);
        let first = reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ);
        let second = reconstruct_subsecond(&input, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_in_second() {
        let mut clock = SubSecondClock::new(DEFAULT_SAMPLE_RATE_HZ);
        let t = parse_timestamp("10:00:00").unwrap();
        clock.advance(t);
        clock.advance(t);
        assert_eq!(clock.index_in_second(), 1);
    }
}
