//! Clock-offset estimation between the two streams.
//!
//! The offset is the difference between the first (earliest) muscle time and
//! the first angle time. Offsets within the noise threshold leave both streams
//! alone; larger ones shift the later-starting stream back by the offset
//! rounded to whole seconds. At most one stream is shifted.

use crate::core::clock::seconds_between;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Offsets at or below this magnitude are treated as noise.
pub const DEFAULT_OFFSET_THRESHOLD_SECS: f64 = 1.0;

/// Which stream's merge keys are moved back, and by how many seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stream", content = "seconds", rename_all = "snake_case")]
pub enum Shift {
    None,
    Muscle(i64),
    Angle(i64),
}

/// Offset estimate and the shift derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// `first_muscle_time - first_angle_time`, in seconds
    pub offset_secs: f64,
    pub shift: Shift,
}

impl Alignment {
    /// Plan the alignment from the first time of each stream.
    pub fn from_first_times(
        first_muscle: NaiveDateTime,
        first_angle: NaiveDateTime,
        threshold_secs: f64,
    ) -> Self {
        let offset_secs = seconds_between(first_muscle, first_angle);

        let shift = if offset_secs.abs() <= threshold_secs {
            Shift::None
        } else {
            // Half-second ties round to even.
            let secs = offset_secs.abs().round_ties_even() as i64;
            if offset_secs > 0.0 {
                Shift::Muscle(secs)
            } else {
                Shift::Angle(secs)
            }
        };

        Self { offset_secs, shift }
    }

    /// Plan the alignment from two sorted time columns. `None` if either is empty.
    pub fn estimate(muscle: &[NaiveDateTime], angle: &[NaiveDateTime], threshold_secs: f64) -> Option<Self> {
        let first_muscle = *muscle.first()?;
        let first_angle = *angle.first()?;
        Some(Self::from_first_times(first_muscle, first_angle, threshold_secs))
    }

    /// Merge keys for the muscle stream.
    pub fn muscle_keys(&self, times: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
        match self.shift {
            Shift::Muscle(secs) => shift_back(times, secs),
            _ => times.to_vec(),
        }
    }

    /// Merge keys for the angle stream.
    pub fn angle_keys(&self, times: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
        match self.shift {
            Shift::Angle(secs) => shift_back(times, secs),
            _ => times.to_vec(),
        }
    }
}

fn shift_back(times: &[NaiveDateTime], secs: i64) -> Vec<NaiveDateTime> {
    let delta = Duration::seconds(secs);
    times.iter().map(|&t| t - delta).collect()
}
