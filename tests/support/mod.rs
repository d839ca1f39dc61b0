#![allow(dead_code)]

//! Builders for small FIT workout documents.

use workout_decoders::fit::check::compute_crc;

pub const WORKOUT: u16 = 26;
pub const WORKOUT_STEP: u16 = 27;
pub const FILE_ID: u16 = 0;

/// `wkt_step_duration` values.
pub const TIME: u8 = 0;
pub const REPEAT_UNTIL_STEPS_COMPLETE: u8 = 6;

const WORKOUT_LOCAL: u8 = 0;
const STEP_LOCAL: u8 = 1;
const FILE_ID_LOCAL: u8 = 2;

/// Writes definition and data records, then frames them as a document.
#[derive(Default)]
pub struct FitBuilder {
    records: Vec<u8>,
    big_endian: bool,
}

impl FitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn big_endian() -> Self {
        Self {
            records: Vec::new(),
            big_endian: true,
        }
    }

    /// Define a local message from `(field number, size, base type)` triples.
    pub fn definition(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> &mut Self {
        let global = self.u16(global);
        self.records.push(0x40 | local);
        self.records.push(0);
        self.records.push(self.big_endian as u8);
        self.records.extend_from_slice(&global);
        self.records.push(fields.len() as u8);
        for (number, size, base_type) in fields {
            self.records.extend_from_slice(&[*number, *size, *base_type]);
        }
        self
    }

    pub fn data(&mut self, local: u8, bytes: &[u8]) -> &mut Self {
        self.records.push(local);
        self.records.extend_from_slice(bytes);
        self
    }

    /// Append raw record bytes.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.records.extend_from_slice(bytes);
        self
    }

    pub fn u16(&self, x: u16) -> [u8; 2] {
        if self.big_endian {
            x.to_be_bytes()
        } else {
            x.to_le_bytes()
        }
    }

    pub fn u32(&self, x: u32) -> [u8; 4] {
        if self.big_endian {
            x.to_be_bytes()
        } else {
            x.to_le_bytes()
        }
    }

    pub fn file_id(&mut self, file_type: u8) -> &mut Self {
        self.definition(FILE_ID_LOCAL, FILE_ID, &[(0, 1, 0x00)]);
        self.data(FILE_ID_LOCAL, &[file_type])
    }

    /// Define and write one `workout` message named `name`.
    pub fn workout(&mut self, name: Option<&str>) -> &mut Self {
        self.definition(WORKOUT_LOCAL, WORKOUT, &[(8, 16, 0x07), (4, 1, 0x00)]);

        let mut bytes = [0; 17];
        if let Some(name) = name {
            bytes[..name.len()].copy_from_slice(name.as_bytes());
        }
        bytes[16] = 2; // Cycling.

        self.data(WORKOUT_LOCAL, &bytes)
    }

    /// Define and write the `workout_step` messages.
    pub fn steps(&mut self, steps: &[Step]) -> &mut Self {
        self.definition(
            STEP_LOCAL,
            WORKOUT_STEP,
            &[
                (254, 2, 0x84),
                (1, 1, 0x00),
                (2, 4, 0x86),
                (4, 4, 0x86),
                (6, 4, 0x86),
            ],
        );

        for (index, step) in steps.iter().enumerate() {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&self.u16(index as u16));
            bytes.push(step.duration_type);
            bytes.extend_from_slice(&self.u32(step.duration_value));
            bytes.extend_from_slice(&self.u32(step.target_value));
            bytes.extend_from_slice(&self.u32(step.power_high));
            self.data(STEP_LOCAL, &bytes);
        }

        self
    }

    /// Frame the records with a 14-byte header and the trailing CRC.
    pub fn finish(&self) -> Vec<u8> {
        let mut document = vec![14, 0x20];
        document.extend_from_slice(&2132u16.to_le_bytes());
        document.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        document.extend_from_slice(b".FIT");
        let header_crc = compute_crc(0, &document);
        document.extend_from_slice(&header_crc.to_le_bytes());

        document.extend_from_slice(&self.records);
        let crc = compute_crc(0, &document);
        document.extend_from_slice(&crc.to_le_bytes());

        document
    }
}

/// A `workout_step` message.
#[derive(Clone, Copy)]
pub struct Step {
    pub duration_type: u8,
    pub duration_value: u32,
    pub target_value: u32,
    pub power_high: u32,
}

/// A timed step, with its duration in seconds and its power in device units.
pub fn timed(seconds: u32, power: u32) -> Step {
    Step {
        duration_type: TIME,
        duration_value: seconds * 1000,
        target_value: 0,
        power_high: power,
    }
}

/// A step repeating the steps from `start` up to itself `count` times.
pub fn repeat(start: u32, count: u32) -> Step {
    Step {
        duration_type: REPEAT_UNTIL_STEPS_COMPLETE,
        duration_value: start,
        target_value: count,
        power_high: u32::MAX,
    }
}

/// A complete workout document.
pub fn workout_file(name: &str, steps: &[Step]) -> Vec<u8> {
    FitBuilder::new()
        .file_id(5)
        .workout(Some(name))
        .steps(steps)
        .finish()
}
