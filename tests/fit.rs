#![cfg(feature = "fit")]

mod support;

use support::{FitBuilder, repeat, timed, workout_file};
use workout_decoders::{
    DecoderConfig, WorkoutPart, WorkoutSegment,
    fit::{
        self, FitDecoder, fit_power_to_relative,
        profile::mesg_num,
        reader::{self, FieldValue, FitFile, Value},
    },
    workout::{MAX_REPEAT, UNNAMED},
};

fn decoder() -> FitDecoder {
    FitDecoder::new(DecoderConfig { ftp: 250 })
}

fn segment(
    duration: u32,
    index: usize,
    interval_index: Option<u32>,
    power_start: f64,
) -> WorkoutSegment {
    WorkoutSegment {
        duration,
        index,
        interval_index,
        power_start,
        power_end: None,
        cadence: None,
    }
}

#[test]
fn decode_repeat_groups() {
    let data = workout_file(
        "Sweet spot",
        &[
            timed(300, 1200),
            repeat(0, 2),
            timed(60, 120),
            timed(30, 50),
            repeat(2, 3),
        ],
    );

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.name(), "Sweet spot");
    assert_eq!(
        workout.segments(),
        [
            segment(300, 0, None, 0.8),
            segment(60, 1, Some(0), 1.2),
            segment(30, 2, Some(0), 0.5),
            segment(60, 3, Some(1), 1.2),
            segment(30, 4, Some(1), 0.5),
            segment(60, 5, Some(2), 1.2),
            segment(30, 6, Some(2), 0.5),
        ]
    );
    assert_eq!(workout.duration(), 300 + 3 * 90);
    assert!(workout.messages().is_empty());
}

#[test]
fn single_step_repeat_is_not_expanded() {
    let data = workout_file("Tempo", &[timed(600, 85), repeat(0, 4)]);

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.segments(), [segment(600, 0, None, 0.85)]);
    assert_eq!(workout.duration(), 600);
}

#[test]
fn steps_without_repeat_marker_are_skipped() {
    let data = workout_file("Loose", &[timed(60, 100), timed(60, 50)]);

    let workout = decoder().decode(&data).unwrap();

    assert!(workout.segments().is_empty());
    assert_eq!(workout.duration(), 0);
}

#[test]
fn repeat_of_three_steps_is_unsupported() {
    let data = workout_file(
        "Triplets",
        &[timed(60, 100), timed(60, 80), timed(60, 50), repeat(0, 2)],
    );

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(
        err,
        fit::Error::UnsupportedRepeatRange {
            start: 0,
            marker: 3
        }
    ));
}

#[test]
fn repeat_starting_after_marker_is_unsupported() {
    let data = workout_file("Backwards", &[timed(60, 100), repeat(4, 2)]);

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(
        err,
        fit::Error::UnsupportedRepeatRange {
            start: 4,
            marker: 1
        }
    ));
}

#[test]
fn repeat_at_first_step_is_unsupported() {
    let data = workout_file("Empty", &[repeat(0, 2)]);

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::UnsupportedRepeatRange { .. }));
}

#[test]
fn requires_exactly_one_workout_message() {
    let none = FitBuilder::new()
        .file_id(5)
        .steps(&[timed(60, 100), repeat(0, 1)])
        .finish();
    let err = decoder().decode(&none).unwrap_err();
    assert!(matches!(err, fit::Error::NotExactlyOneWorkoutMessage(0)));

    let two = FitBuilder::new()
        .workout(Some("First"))
        .workout(Some("Second"))
        .steps(&[timed(60, 100), repeat(0, 1)])
        .finish();
    let err = decoder().decode(&two).unwrap_err();
    assert!(matches!(err, fit::Error::NotExactlyOneWorkoutMessage(2)));
}

#[test]
fn unnamed_workout() {
    let data = FitBuilder::new()
        .workout(None)
        .steps(&[timed(60, 100), repeat(0, 1)])
        .finish();

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.name(), UNNAMED);
}

#[test]
fn durations_truncate_to_whole_seconds() {
    let mut step = timed(0, 100);
    step.duration_value = 90_999;
    let data = workout_file("Odd", &[step, repeat(0, 1)]);

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.segments()[0].duration, 90);
}

#[test]
fn sub_second_duration_is_rejected() {
    let mut step = timed(0, 100);
    step.duration_value = 999;
    let data = workout_file("Blink", &[step, repeat(0, 1)]);

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::InvalidStepDuration { step: 0 }));
}

#[test]
fn missing_power_is_rejected() {
    let data = workout_file(
        "Unpowered",
        &[timed(60, 100), timed(60, u32::MAX), repeat(0, 2)],
    );

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::InvalidStepPower { step: 1 }));
}

#[test]
fn zero_power_is_rejected() {
    let data = workout_file("Coasting", &[timed(60, 0), repeat(0, 2)]);

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::InvalidStepPower { step: 0 }));
}

#[test]
fn repeat_marker_without_count_is_rejected() {
    let mut marker = repeat(0, 0);
    marker.target_value = u32::MAX;
    let data = workout_file("Uncounted", &[timed(60, 100), marker]);

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::InvalidRepeatMarker { step: 1 }));
}

#[test]
fn excessive_repeat_count_is_rejected() {
    let data = workout_file(
        "Huge",
        &[timed(1, 100), timed(1, 50), repeat(0, 4_000_000_000)],
    );

    let err = decoder().decode(&data).unwrap_err();

    assert!(matches!(err, fit::Error::InvalidRepeatMarker { step: 2 }));
}

#[test]
fn largest_repeat_count_is_expanded() {
    let data = workout_file("Long", &[timed(1, 100), timed(1, 50), repeat(0, MAX_REPEAT)]);

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.segments().len(), 2 * MAX_REPEAT as usize);
    assert_eq!(workout.duration(), 2 * MAX_REPEAT);
}

#[test]
fn total_duration_saturates() {
    let mut on = timed(0, 100);
    on.duration_value = 4_294_000_000;
    let data = workout_file("Ultra", &[on, on, repeat(0, 600)]);

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.segments().len(), 1200);
    assert_eq!(workout.duration(), u32::MAX);
}

#[test]
fn power_conversion() {
    assert_eq!(fit_power_to_relative(550.0, 200), 5.5);
    assert_eq!(fit_power_to_relative(75.0, 200), 0.75);
    assert_eq!(fit_power_to_relative(1200.0, 250), 0.8);
    assert_eq!(fit_power_to_relative(1000.0, 250), 0.0);
}

#[test]
fn absolute_power_uses_configured_ftp() {
    let data = workout_file("Watts", &[timed(60, 1300), repeat(0, 1)]);

    let workout = FitDecoder::new(DecoderConfig { ftp: 300 })
        .decode(&data)
        .unwrap();

    assert_eq!(workout.segments()[0].power_start, 1.0);
}

#[test]
fn big_endian_definitions() {
    let data = FitBuilder::big_endian()
        .workout(Some("Motorola"))
        .steps(&[timed(45, 1200), timed(15, 1050), repeat(0, 5)])
        .finish();

    let workout = decoder().decode(&data).unwrap();

    assert_eq!(workout.segments().len(), 10);
    assert_eq!(workout.segments()[0].power_start, 0.8);
    assert_eq!(workout.segments()[1].power_start, 0.2);
    assert_eq!(workout.duration(), 5 * 60);
}

#[test]
fn decode_from_parsed_file() {
    let data = workout_file("Parsed", &[timed(60, 100), timed(30, 40), repeat(0, 2)]);
    let file = FitFile::parse(&data).unwrap();

    let workout = decoder().decode_file(&file).unwrap();

    assert_eq!(
        WorkoutPart::Intervals {
            repeat: 2,
            on_duration: 60,
            on_power: 1.0,
            off_duration: 30,
            off_power: 0.4,
            cadence: None,
        }
        .segments(0),
        workout.segments()
    );
}

#[test]
fn reader_interprets_profile_fields() {
    let data = workout_file("Fields", &[timed(60, 100), repeat(0, 2)]);
    let file = FitFile::parse(&data).unwrap();

    let workouts = file.messages_of_kind(mesg_num::WORKOUT);
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].field("wkt_name"), Some(FieldValue::Text("Fields")));
    assert_eq!(workouts[0].field("sport"), Some(FieldValue::Name("cycling")));
    assert_eq!(workouts[0].field("num_valid_steps"), None);

    let steps = file.messages_of_kind(mesg_num::WORKOUT_STEP);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].field("duration_type"), Some(FieldValue::Name("time")));
    assert_eq!(steps[0].field("duration_value"), Some(FieldValue::Number(60_000.0)));
    assert_eq!(
        steps[1].field("duration_type"),
        Some(FieldValue::Name("repeat_until_steps_cmplt"))
    );
    assert_eq!(steps[1].field("custom_target_value_high"), None);
    assert_eq!(steps[1].raw(254), Some(&Value::Unsigned(1)));
    assert_eq!(steps[1].field("no_such_field"), None);
}

#[test]
fn reader_skips_developer_fields() {
    let mut builder = FitBuilder::new();
    builder
        .workout(Some("Developer"))
        // Definition with one two-byte developer field.
        .raw(&[0x60 | 3, 0, 0, 27, 0, 2, 2, 4, 0x86, 6, 4, 0x86, 1, 0, 2, 0])
        .raw(&[3])
        .raw(&60_000u32.to_le_bytes())
        .raw(&100u32.to_le_bytes())
        .raw(&[0xAB, 0xCD])
        .steps(&[repeat(0, 1)]);
    let data = builder.finish();

    let file = FitFile::parse(&data).unwrap();
    let steps = file.messages_of_kind(mesg_num::WORKOUT_STEP);

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].field("duration_value"), Some(FieldValue::Number(60_000.0)));
    assert_eq!(steps[0].field("custom_target_value_high"), Some(FieldValue::Number(100.0)));
}

#[test]
fn reader_records_compressed_time_offsets() {
    let mut builder = FitBuilder::new();
    builder.workout(Some("Compressed"));
    // Compressed timestamp header for local message 0, offset 17.
    builder.raw(&[0x80 | 17]).raw(b"Second\0\0\0\0\0\0\0\0\0\0").raw(&[2]);
    let data = builder.finish();

    let file = FitFile::parse(&data).unwrap();
    let workouts = file.messages_of_kind(mesg_num::WORKOUT);

    assert_eq!(workouts.len(), 2);
    assert_eq!(workouts[0].time_offset(), None);
    assert_eq!(workouts[1].time_offset(), Some(17));
    assert_eq!(workouts[1].field("wkt_name"), Some(FieldValue::Text("Second")));
}

#[test]
fn reader_rejects_corrupted_documents() {
    let mut data = workout_file("Corrupt", &[timed(60, 100), repeat(0, 2)]);
    let last = data.len() - 3;
    data[last] ^= 0xFF;

    let err = FitFile::parse(&data).unwrap_err();
    assert!(matches!(err, reader::Error::CyclicRedundancyCheck { .. }));

    let err = decoder().decode(&data[..20]).unwrap_err();
    assert!(matches!(err, fit::Error::Reader(reader::Error::EndOfSlice)));

    let mut data = workout_file("Renamed", &[]);
    data[8..12].copy_from_slice(b".ZWO");
    let err = FitFile::parse(&data).unwrap_err();
    assert!(matches!(err, reader::Error::NotFitData));
}

#[test]
fn reader_rejects_undefined_local_messages() {
    let data = FitBuilder::new().data(7, &[1, 2, 3]).finish();

    let err = FitFile::parse(&data).unwrap_err();

    assert!(matches!(err, reader::Error::UndefinedLocalMessage(7)));
}
