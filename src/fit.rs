//! Decoder for Garmin FIT workout files.
//!
//! A FIT workout is a `workout` message naming the workout, followed by a
//! flat list of `workout_step` messages. Repeated intervals are not nested:
//! a "repeat until steps complete" step refers back to the step where the
//! repeated block starts and carries the repeat count. This decoder rebuilds
//! [`WorkoutPart`]s from those markers.
//!
//! Only steps covered by a repeat marker produce parts. A marker covering a
//! single step produces a steady part with that step's duration (the repeat
//! count is not applied); a marker covering two steps produces intervals.

pub mod check;
pub mod profile;
pub mod reader;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    config::DecoderConfig,
    workout::{MAX_REPEAT, UNNAMED, Workout, WorkoutPart},
};

use profile::mesg_num;
use reader::{FieldValue, FitFile, Message};

/// Format identifier handled by [`FitDecoder`].
pub const FORMAT: &str = "fit";

/// `duration_type` of a step repeating earlier steps.
const REPEAT_UNTIL_STEPS_COMPLETE: &str = "repeat_until_steps_cmplt";

/// Errors occurring while decoding a FIT workout.
#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be read.
    #[error(transparent)]
    Reader(#[from] reader::Error),
    /// A workout file must hold exactly one `workout` message.
    #[error("Expected exactly one workout message, found {0}.")]
    NotExactlyOneWorkoutMessage(usize),
    /// A repeat marker covered a block other than one or two steps.
    #[error("Unsupported repeat of steps {start} to {marker} (exclusive).")]
    UnsupportedRepeatRange { start: usize, marker: usize },
    /// A repeat marker lacked its start step or repeat count, or its count
    /// exceeded [`MAX_REPEAT`].
    #[error("Repeat step {step} has no start step or no valid repeat count.")]
    InvalidRepeatMarker { step: usize },
    /// A step had no positive duration in whole seconds.
    #[error("Step {step} has no positive duration.")]
    InvalidStepDuration { step: usize },
    /// A step had no positive power target.
    #[error("Step {step} has no positive power target.")]
    InvalidStepPower { step: usize },
}

/// A block of steps repeated by the marker step following it.
#[derive(Debug)]
struct RepeatGroup {
    start: usize,
    marker: usize,
    count: u32,
}

/// Decoder for FIT workout files.
#[derive(Debug, Clone)]
pub struct FitDecoder {
    ftp: u16,
}

impl FitDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { ftp: config.ftp }
    }

    /// Decode a workout from the bytes of a FIT document.
    pub fn decode(&self, r: &[u8]) -> Result<Workout, Error> {
        let file = FitFile::parse(r)?;
        self.decode_file(&file)
    }

    /// Decode a workout from an already parsed FIT document.
    pub fn decode_file(&self, file: &FitFile) -> Result<Workout, Error> {
        if let Some(file_id) = file.messages_of_kind(mesg_num::FILE_ID).first() {
            match file_id.field("type") {
                Some(FieldValue::Name("workout")) | None => {}
                Some(other) => warn!(file_type = ?other, "decoding a non-workout FIT file"),
            }
        }

        let workouts = file.messages_of_kind(mesg_num::WORKOUT);
        let [workout] = workouts.as_slice() else {
            return Err(Error::NotExactlyOneWorkoutMessage(workouts.len()));
        };

        let name = match workout.field("wkt_name").and_then(|v| v.name().map(str::to_owned)) {
            Some(name) => name,
            None => {
                warn!("FIT workout has no name");
                UNNAMED.to_owned()
            }
        };

        let steps = file.messages_of_kind(mesg_num::WORKOUT_STEP);
        let parts = repeat_groups(&steps)?
            .iter()
            .map(|group| self.part(group, &steps))
            .collect::<Result<Vec<_>, _>>()?;

        let workout = Workout::new(name, &parts, Vec::new());
        debug!(
            format = FORMAT,
            name = workout.name(),
            steps = steps.len(),
            segments = workout.segments().len(),
            duration = workout.duration(),
            "decoded workout"
        );

        Ok(workout)
    }

    /// Build the part for the steps covered by a repeat marker.
    fn part(&self, group: &RepeatGroup, steps: &[&Message]) -> Result<WorkoutPart, Error> {
        let RepeatGroup {
            start,
            marker,
            count,
        } = *group;

        match marker.checked_sub(start).and_then(|n| n.checked_sub(1)) {
            Some(0) => Ok(WorkoutPart::Steady {
                duration: step_duration(steps[start], start)?,
                power: step_power(steps[start], start, self.ftp)?,
                cadence: None,
            }),
            Some(1) => {
                let (on, off) = (start, start + 1);
                Ok(WorkoutPart::Intervals {
                    repeat: count,
                    on_duration: step_duration(steps[on], on)?,
                    on_power: step_power(steps[on], on, self.ftp)?,
                    off_duration: step_duration(steps[off], off)?,
                    off_power: step_power(steps[off], off, self.ftp)?,
                    cadence: None,
                })
            }
            _ => Err(Error::UnsupportedRepeatRange { start, marker }),
        }
    }
}

/// Find the repeat markers among `steps`, in order.
fn repeat_groups(steps: &[&Message]) -> Result<Vec<RepeatGroup>, Error> {
    let mut groups = Vec::new();

    for (marker, step) in steps.iter().enumerate() {
        let duration_type = step.field("duration_type");
        trace!(step = marker, ?duration_type, "workout step");

        if duration_type != Some(FieldValue::Name(REPEAT_UNTIL_STEPS_COMPLETE)) {
            continue;
        }

        let start = number(step, "duration_value");
        let count = number(step, "target_value");

        let (Some(start), Some(count)) = (start, count) else {
            return Err(Error::InvalidRepeatMarker { step: marker });
        };
        if count > f64::from(MAX_REPEAT) {
            return Err(Error::InvalidRepeatMarker { step: marker });
        }

        groups.push(RepeatGroup {
            start: start as usize,
            marker,
            count: count as u32,
        });
    }

    Ok(groups)
}

fn number(step: &Message, name: &str) -> Option<f64> {
    step.field(name)
        .and_then(|v| v.as_f64())
        .filter(|x| *x >= 0.0)
}

/// Duration of a step in whole seconds. Stored in milliseconds.
fn step_duration(step: &Message, index: usize) -> Result<u32, Error> {
    let seconds = number(step, "duration_value").map_or(0, |ms| (ms / 1000.0) as u32);

    if seconds == 0 {
        return Err(Error::InvalidStepDuration { step: index });
    }

    Ok(seconds)
}

/// Power target of a step as a fraction of threshold power.
fn step_power(step: &Message, index: usize, ftp: u16) -> Result<f64, Error> {
    let power = step
        .field("custom_target_value_high")
        .and_then(|v| v.as_f64())
        .map(|value| fit_power_to_relative(value, ftp));

    match power {
        Some(power) if power.is_finite() && power > 0.0 => Ok(power),
        _ => Err(Error::InvalidStepPower { step: index }),
    }
}

/// Convert a FIT power target to a fraction of threshold power.
///
/// Values below 1000 are a percentage of threshold power. Values from 1000
/// are absolute wattage offset by 1000.
pub fn fit_power_to_relative(value: f64, ftp: u16) -> f64 {
    if value < 1000.0 {
        value / 100.0
    } else {
        (value - 1000.0) / f64::from(ftp)
    }
}
