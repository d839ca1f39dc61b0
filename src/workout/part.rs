//! Authored training units and their expansion into segments.

use std::iter;

use super::WorkoutSegment;

/// Power recorded on free ride segments, which carry no power target.
pub const FREE_RIDE_POWER: f64 = -1.0;

/// Largest repeat count the decoders accept for an intervals part.
///
/// Expansion allocates two segments per repetition, so counts read from
/// documents are checked against this before a part is built.
pub const MAX_REPEAT: u32 = 10_000;

/// One authored training unit, before expansion.
///
/// Durations are in seconds and powers are fractions of the athlete's
/// functional threshold power (`1.0` is 100%).
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutPart {
    /// Constant power for the whole duration.
    Steady {
        duration: u32,
        power: f64,
        cadence: Option<String>,
    },
    /// `repeat` alternations of an "on" and an "off" effort.
    Intervals {
        repeat: u32,
        on_duration: u32,
        on_power: f64,
        off_duration: u32,
        off_power: f64,
        cadence: Option<String>,
    },
    /// Power changing linearly from `power_low` to `power_high`.
    Ramp {
        duration: u32,
        power_low: f64,
        power_high: f64,
        cadence: Option<String>,
    },
    /// No power target.
    FreeRide {
        duration: u32,
        cadence: Option<String>,
    },
}

impl WorkoutPart {
    /// Nominal duration of the part, in seconds.
    pub fn duration(&self) -> u32 {
        match self {
            Self::Steady { duration, .. }
            | Self::Ramp { duration, .. }
            | Self::FreeRide { duration, .. } => *duration,
            Self::Intervals {
                repeat,
                on_duration,
                off_duration,
                ..
            } => on_duration.saturating_add(*off_duration).saturating_mul(*repeat),
        }
    }

    /// Number of segments this part expands to.
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Intervals { repeat, .. } => 2 * *repeat as usize,
            _ => 1,
        }
    }

    /// Expand into segments, numbering them from `start_index`.
    ///
    /// Intervals produce an "on" then an "off" segment per repetition, both
    /// carrying the repetition number as their interval index. Every other
    /// part produces exactly one segment.
    pub fn segments(&self, start_index: usize) -> Vec<WorkoutSegment> {
        match self {
            Self::Steady {
                duration,
                power,
                cadence,
            } => vec![WorkoutSegment {
                duration: *duration,
                index: start_index,
                interval_index: None,
                power_start: *power,
                power_end: None,
                cadence: cadence.clone(),
            }],
            Self::Intervals {
                repeat,
                on_duration,
                on_power,
                off_duration,
                off_power,
                cadence,
            } => (0..*repeat)
                .flat_map(|i| {
                    let on = WorkoutSegment {
                        duration: *on_duration,
                        index: start_index + 2 * i as usize,
                        interval_index: Some(i),
                        power_start: *on_power,
                        power_end: None,
                        cadence: cadence.clone(),
                    };
                    let off = WorkoutSegment {
                        duration: *off_duration,
                        index: on.index + 1,
                        power_start: *off_power,
                        ..on.clone()
                    };
                    iter::once(on).chain(iter::once(off))
                })
                .collect(),
            Self::Ramp {
                duration,
                power_low,
                power_high,
                cadence,
            } => vec![WorkoutSegment {
                duration: *duration,
                index: start_index,
                interval_index: None,
                power_start: *power_low,
                power_end: Some(*power_high),
                cadence: cadence.clone(),
            }],
            Self::FreeRide { duration, cadence } => vec![WorkoutSegment {
                duration: *duration,
                index: start_index,
                interval_index: None,
                power_start: FREE_RIDE_POWER,
                power_end: None,
                cadence: cadence.clone(),
            }],
        }
    }
}
