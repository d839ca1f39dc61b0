//! The canonical, format-agnostic workout model.
//!
//! Decoders translate their source documents into an ordered list of
//! [`WorkoutPart`]s. A [`Workout`] is then built from these parts in a single
//! pass, expanding each into [`WorkoutSegment`]s with indices contiguous
//! across the whole workout.

pub mod part;
pub mod segment;

pub use part::{MAX_REPEAT, WorkoutPart};
pub use segment::WorkoutSegment;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name given to workouts whose source document does not declare one.
pub const UNNAMED: &str = "no_name";

/// An annotation shown at a point in the workout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkoutMessage {
    /// Seconds from the start of the whole workout.
    pub time_offset: u32,
    pub message: String,
}

impl WorkoutMessage {
    pub fn new(time_offset: u32, message: impl Into<String>) -> Self {
        Self {
            time_offset,
            message: message.into(),
        }
    }
}

/// A complete, flattened workout timeline.
///
/// Built once from a name, its parts and its (already normalized) messages,
/// and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Workout {
    name: String,
    segments: Vec<WorkoutSegment>,
    duration: u32,
    messages: Vec<WorkoutMessage>,
}

impl Workout {
    /// Expand `parts` left to right into a single segment sequence.
    ///
    /// Each part's segments are numbered from the index following the last
    /// segment of the previous part. `messages` are attached verbatim, so
    /// their offsets must already be measured from the start of the workout.
    pub fn new(
        name: impl Into<String>,
        parts: &[WorkoutPart],
        messages: Vec<WorkoutMessage>,
    ) -> Self {
        let mut segments = Vec::new();

        for part in parts {
            let next_index = segments.len();
            segments.extend(part.segments(next_index));
        }

        let duration = segments.iter().map(|s| s.duration).fold(0, u32::saturating_add);

        Self {
            name: name.into(),
            segments,
            duration,
            messages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All segments, in playback order. A segment's `index` is its position
    /// in this slice.
    pub fn segments(&self) -> &[WorkoutSegment] {
        &self.segments
    }

    /// Total duration in seconds, the sum of all segment durations,
    /// saturating at `u32::MAX`.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn messages(&self) -> &[WorkoutMessage] {
        &self.messages
    }
}
