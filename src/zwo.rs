//! Decoder for Zwift workout documents.
//!
//! A document is a `workout_file` element holding a `name` and a `workout`
//! element. Each child of `workout` is one [`WorkoutPart`]:
//!
//! ```xml
//! <workout_file>
//!     <name>Over-unders</name>
//!     <workout>
//!         <Warmup Duration="600" PowerLow="0.4" PowerHigh="0.75"/>
//!         <IntervalsT Repeat="3" OnDuration="120" OnPower="1.05" OffDuration="60" OffPower="0.5">
//!             <textevent timeoffset="10" message="Hold it steady"/>
//!         </IntervalsT>
//!         <FreeRide Duration="300"/>
//!     </workout>
//! </workout_file>
//! ```
//!
//! Numeric attributes that are missing or unparsable read as zero. An
//! `IntervalsT` repeat count above [`MAX_REPEAT`] is rejected. Text
//! events are offset by the time elapsed before the element holding them, so
//! message offsets are measured from the start of the whole workout.

use std::str::{self, FromStr};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::workout::{MAX_REPEAT, UNNAMED, Workout, WorkoutMessage, WorkoutPart};

/// Format identifier handled by [`ZwoDecoder`].
pub const FORMAT: &str = "zwo";

/// Errors occurring while decoding a Zwift workout.
#[derive(Debug, Error)]
pub enum Error {
    /// The workout held an element that is not a known training unit.
    #[error("Unknown workout element `{0}`.")]
    UnknownElement(String),
    /// An `IntervalsT` element repeated more than [`MAX_REPEAT`] times.
    #[error("Interval repeat count {0} exceeds the supported maximum.")]
    ExcessiveRepeat(u32),
    /// The document is not UTF-8 text.
    #[error("Document is not UTF-8: {0}.")]
    Utf8(#[from] str::Utf8Error),
    /// The document is not well-formed XML.
    #[error("Malformed document: {0}.")]
    Xml(#[from] roxmltree::Error),
}

/// Decoder for Zwift workout documents.
#[derive(Debug, Clone, Default)]
pub struct ZwoDecoder;

impl ZwoDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a workout from the bytes of a document.
    pub fn decode(&self, r: &[u8]) -> Result<Workout, Error> {
        let document = Document::parse(str::from_utf8(r)?)?;
        self.decode_document(&document)
    }

    /// Decode a workout from an already parsed document.
    pub fn decode_document(&self, document: &Document) -> Result<Workout, Error> {
        let root = document.root_element();
        if !root.has_tag_name("workout_file") {
            warn!(root = root.tag_name().name(), "document has no workout_file root");
            return Ok(Workout::new(UNNAMED, &[], Vec::new()));
        }

        let name = match child(root, "name").and_then(|n| n.text()) {
            Some(name) => name,
            None => {
                warn!("Zwift workout has no name");
                UNNAMED
            }
        };

        let mut parts = Vec::new();
        let mut messages = Vec::new();
        let mut elapsed: u32 = 0; // Seconds before the current element.

        for element in child(root, "workout").iter().flat_map(|w| w.children()) {
            if !element.is_element() {
                continue;
            }

            let part = part(element)?;
            trace!(element = element.tag_name().name(), ?part, elapsed, "workout element");

            messages.extend(text_events(element).map(|(offset, message)| {
                WorkoutMessage::new(elapsed.saturating_add(offset), message)
            }));

            elapsed = elapsed.saturating_add(part.duration());
            parts.push(part);
        }

        let workout = Workout::new(name, &parts, messages);
        debug!(
            format = FORMAT,
            name = workout.name(),
            segments = workout.segments().len(),
            messages = workout.messages().len(),
            duration = workout.duration(),
            "decoded workout"
        );

        Ok(workout)
    }
}

/// Map a workout element to the part it describes.
fn part(element: Node) -> Result<WorkoutPart, Error> {
    let cadence = element.attribute("Cadence").map(str::to_owned);

    Ok(match element.tag_name().name() {
        "SteadyState" => WorkoutPart::Steady {
            duration: attribute(element, "Duration"),
            power: attribute(element, "Power"),
            cadence,
        },
        "IntervalsT" => WorkoutPart::Intervals {
            repeat: match attribute(element, "Repeat") {
                repeat if repeat > MAX_REPEAT => return Err(Error::ExcessiveRepeat(repeat)),
                repeat => repeat,
            },
            on_duration: attribute(element, "OnDuration"),
            on_power: attribute(element, "OnPower"),
            off_duration: attribute(element, "OffDuration"),
            off_power: attribute(element, "OffPower"),
            cadence,
        },
        "Warmup" | "Cooldown" | "Ramp" => WorkoutPart::Ramp {
            duration: attribute(element, "Duration"),
            power_low: attribute(element, "PowerLow"),
            power_high: attribute(element, "PowerHigh"),
            cadence,
        },
        "FreeRide" => WorkoutPart::FreeRide {
            duration: attribute(element, "Duration"),
            cadence,
        },
        other => return Err(Error::UnknownElement(other.to_owned())),
    })
}

/// Text events of an element, with their offsets from the element's start.
fn text_events<'a>(element: Node<'a, '_>) -> impl Iterator<Item = (u32, &'a str)> {
    element
        .children()
        .filter(|n| n.has_tag_name("textevent"))
        .map(|n| {
            let offset = attribute(n, "timeoffset");
            (offset, n.attribute("message").unwrap_or_default())
        })
}

/// Read a numeric attribute, falling back to zero.
fn attribute<T: FromStr + Default>(element: Node, name: &str) -> T {
    element
        .attribute(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

fn child<'a, 'input>(element: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    element.children().find(|n| n.has_tag_name(name))
}
