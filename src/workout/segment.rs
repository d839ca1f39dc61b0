//! Atomic timed units of a flattened workout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One atomic, timed unit of a workout.
///
/// A negative `power_start` without a `power_end` marks a free ride segment
/// (see [`WorkoutSegment::is_free_ride`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkoutSegment {
    /// Duration in seconds.
    pub duration: u32,
    /// Position of the segment in the whole workout, starting at 0.
    pub index: usize,
    /// Repetition number, shared by the on/off pair of one interval.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub interval_index: Option<u32>,
    /// Power at the start of the segment, as a fraction of threshold power.
    pub power_start: f64,
    /// Power at the end of the segment, present only for ramps.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub power_end: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub cadence: Option<String>,
}

impl WorkoutSegment {
    pub fn is_free_ride(&self) -> bool {
        self.power_start < 0.0 && self.power_end.is_none()
    }

    /// Target power `second`s into the segment, as a fraction of threshold
    /// power, or `None` for a free ride.
    ///
    /// Ramps interpolate linearly between `power_start` and `power_end`.
    pub fn intensity_at(&self, second: u32) -> Option<f64> {
        if self.is_free_ride() {
            return None;
        }

        Some(match self.power_end {
            Some(power_end) if self.duration != 0 => {
                let progress = f64::from(second) / f64::from(self.duration);
                self.power_start + progress * (power_end - self.power_start)
            }
            _ => self.power_start,
        })
    }

    /// Target power `second`s into the segment in watts, truncated, for an
    /// athlete with the given threshold power.
    pub fn power_at(&self, second: u32, ftp: u16) -> Option<u32> {
        self.intensity_at(second)
            .map(|intensity| (intensity * f64::from(ftp)).max(0.0) as u32)
    }
}
