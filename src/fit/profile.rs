//! The subset of the FIT global profile needed to read workout files.
//!
//! Messages and fields are identified by number on the wire. The tables here
//! give them their profile names, and give enumerated field values theirs.

/// Global message numbers.
pub mod mesg_num {
    pub const FILE_ID: u16 = 0;
    pub const WORKOUT: u16 = 26;
    pub const WORKOUT_STEP: u16 = 27;
}

/// A named field of a profile message.
#[derive(Debug)]
pub struct FieldProfile {
    pub number: u8,
    pub name: &'static str,
    /// Names of the field's enumerated values, if it is an enumeration.
    pub values: Option<&'static [(u64, &'static str)]>,
}

impl FieldProfile {
    /// Look up the name of an enumerated value.
    pub fn value_name(&self, value: u64) -> Option<&'static str> {
        self.values?
            .iter()
            .find_map(|&(v, name)| (v == value).then_some(name))
    }
}

const fn field(number: u8, name: &'static str) -> FieldProfile {
    FieldProfile {
        number,
        name,
        values: None,
    }
}

const fn enumeration(
    number: u8,
    name: &'static str,
    values: &'static [(u64, &'static str)],
) -> FieldProfile {
    FieldProfile {
        number,
        name,
        values: Some(values),
    }
}

const FILE: &[(u64, &str)] = &[
    (1, "device"),
    (2, "settings"),
    (3, "sport"),
    (4, "activity"),
    (5, "workout"),
    (6, "course"),
    (7, "schedules"),
];

const SPORT: &[(u64, &str)] = &[
    (0, "generic"),
    (1, "running"),
    (2, "cycling"),
    (3, "transition"),
    (4, "fitness_equipment"),
    (5, "swimming"),
];

const WKT_STEP_DURATION: &[(u64, &str)] = &[
    (0, "time"),
    (1, "distance"),
    (2, "hr_less_than"),
    (3, "hr_greater_than"),
    (4, "calories"),
    (5, "open"),
    (6, "repeat_until_steps_cmplt"),
    (7, "repeat_until_time"),
    (8, "repeat_until_distance"),
    (9, "repeat_until_calories"),
    (10, "repeat_until_hr_less_than"),
    (11, "repeat_until_hr_greater_than"),
    (12, "repeat_until_power_less_than"),
    (13, "repeat_until_power_greater_than"),
    (14, "power_less_than"),
    (15, "power_greater_than"),
    (16, "training_peaks_tss"),
    (17, "repeat_until_power_last_lap_less_than"),
    (18, "repeat_until_max_power_last_lap_less_than"),
    (19, "power_3s_less_than"),
    (20, "power_10s_less_than"),
    (21, "power_30s_less_than"),
    (22, "power_3s_greater_than"),
    (23, "power_10s_greater_than"),
    (24, "power_30s_greater_than"),
    (25, "power_lap_less_than"),
    (26, "power_lap_greater_than"),
    (27, "repeat_until_training_peaks_tss"),
    (28, "repetition_time"),
    (29, "reps"),
];

const WKT_STEP_TARGET: &[(u64, &str)] = &[
    (0, "speed"),
    (1, "heart_rate"),
    (2, "open"),
    (3, "cadence"),
    (4, "power"),
    (5, "grade"),
    (6, "resistance"),
    (7, "power_3s"),
    (8, "power_10s"),
    (9, "power_30s"),
    (10, "power_lap"),
    (11, "swim_stroke"),
    (12, "speed_lap"),
    (13, "heart_rate_lap"),
];

const INTENSITY: &[(u64, &str)] = &[
    (0, "active"),
    (1, "rest"),
    (2, "warmup"),
    (3, "cooldown"),
    (4, "recovery"),
    (5, "interval"),
    (6, "other"),
];

const FILE_ID_FIELDS: &[FieldProfile] = &[
    enumeration(0, "type", FILE),
    field(1, "manufacturer"),
    field(2, "product"),
    field(3, "serial_number"),
    field(4, "time_created"),
];

const WORKOUT_FIELDS: &[FieldProfile] = &[
    enumeration(4, "sport", SPORT),
    field(5, "capabilities"),
    field(6, "num_valid_steps"),
    field(8, "wkt_name"),
    field(11, "sub_sport"),
    field(14, "pool_length"),
];

const WORKOUT_STEP_FIELDS: &[FieldProfile] = &[
    field(254, "message_index"),
    field(0, "wkt_step_name"),
    enumeration(1, "duration_type", WKT_STEP_DURATION),
    field(2, "duration_value"),
    enumeration(3, "target_type", WKT_STEP_TARGET),
    field(4, "target_value"),
    field(5, "custom_target_value_low"),
    field(6, "custom_target_value_high"),
    enumeration(7, "intensity", INTENSITY),
    field(8, "notes"),
];

/// Named fields of a global message, empty for messages outside the profile.
pub fn fields(kind: u16) -> &'static [FieldProfile] {
    match kind {
        mesg_num::FILE_ID => FILE_ID_FIELDS,
        mesg_num::WORKOUT => WORKOUT_FIELDS,
        mesg_num::WORKOUT_STEP => WORKOUT_STEP_FIELDS,
        _ => &[],
    }
}

/// Find a field of a global message by its profile name.
pub fn lookup(kind: u16, name: &str) -> Option<&'static FieldProfile> {
    fields(kind).iter().find(|f| f.name == name)
}
