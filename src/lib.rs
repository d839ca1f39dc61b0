//! Decoders for structured endurance-training workouts.
//!
//! Workouts authored as Zwift workout documents (`.zwo`, XML) or as Garmin
//! FIT workout files (`.fit`, binary) are decoded into one canonical
//! [`Workout`]: a flat, index-addressable sequence of timed power segments
//! plus a list of annotation messages measured from the start of the whole
//! workout.
//!
//! Most users should begin with [`Decoders`], which selects a decoder by
//! format identifier. The per-format decoders in the [`fit`] and [`zwo`]
//! modules can also be used directly, and further formats can be supported by
//! implementing [`WorkoutDecoder`] and registering it.
//!
//! ```
//! let decoders = Decoders::new(DecoderConfig { ftp: 250 });
//! let workout = decoders.decode("zwo", &bytes)?;
//!
//! for segment in workout.segments() {
//!     println!("{} {:?}", segment.index, segment.power_at(0, 250));
//! }
//! ```
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `fit`: enable the FIT workout decoder (default).
//! - `zwo`: enable the Zwift workout decoder (default).
//! - `serde`: enable serialization of workouts and configuration (default).

pub mod config;
pub mod decoder;
#[cfg(feature = "fit")]
pub mod fit;
pub mod workout;
#[cfg(feature = "zwo")]
pub mod zwo;

pub use config::DecoderConfig;
pub use decoder::{Decoders, Error, WorkoutDecoder};
pub use workout::{Workout, WorkoutMessage, WorkoutPart, WorkoutSegment};
