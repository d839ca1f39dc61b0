//! Selection of a decoder by format identifier.

use std::error::Error as StdError;

use thiserror::Error;
use tracing::debug;

use crate::{config::DecoderConfig, workout::Workout};

/// Errors occurring while decoding a workout.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered decoder supports the format.
    #[error("No decoder supports the format `{0}`.")]
    UnknownFormat(String),
    /// Failed to decode a FIT workout.
    #[cfg(feature = "fit")]
    #[error(transparent)]
    Fit(#[from] crate::fit::Error),
    /// Failed to decode a Zwift workout.
    #[cfg(feature = "zwo")]
    #[error(transparent)]
    Zwo(#[from] crate::zwo::Error),
    /// Failed to decode with a decoder registered by the application.
    #[error(transparent)]
    Custom(Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Whether the document was readable but its workout structure is not
    /// one that can be decoded.
    pub fn is_structural(&self) -> bool {
        match self {
            #[cfg(feature = "fit")]
            Self::Fit(
                crate::fit::Error::NotExactlyOneWorkoutMessage(_)
                | crate::fit::Error::UnsupportedRepeatRange { .. },
            ) => true,
            #[cfg(feature = "zwo")]
            Self::Zwo(crate::zwo::Error::UnknownElement(_)) => true,
            _ => false,
        }
    }
}

/// A decoder for one or more workout formats.
///
/// Decoders hold no state between calls and may be shared across threads.
pub trait WorkoutDecoder: Send + Sync {
    /// Identifiers of the formats this decoder supports, such as `"fit"`.
    fn supported_formats(&self) -> &[&str];

    /// Decode a workout from the bytes of a document.
    fn decode(&self, r: &[u8]) -> Result<Workout, Error>;
}

#[cfg(feature = "fit")]
impl WorkoutDecoder for crate::fit::FitDecoder {
    fn supported_formats(&self) -> &[&str] {
        &[crate::fit::FORMAT]
    }

    fn decode(&self, r: &[u8]) -> Result<Workout, Error> {
        Ok(crate::fit::FitDecoder::decode(self, r)?)
    }
}

#[cfg(feature = "zwo")]
impl WorkoutDecoder for crate::zwo::ZwoDecoder {
    fn supported_formats(&self) -> &[&str] {
        &[crate::zwo::FORMAT]
    }

    fn decode(&self, r: &[u8]) -> Result<Workout, Error> {
        Ok(crate::zwo::ZwoDecoder::decode(self, r)?)
    }
}

/// An ordered set of decoders, consulted by format identifier.
///
/// The built-in decoders come first; decoders registered afterwards are
/// consulted in registration order.
pub struct Decoders {
    decoders: Vec<Box<dyn WorkoutDecoder>>,
}

impl Decoders {
    /// Create a registry holding the built-in decoders enabled by Cargo
    /// features: FIT, then Zwift workouts.
    #[cfg_attr(not(feature = "fit"), allow(unused_variables))]
    #[cfg_attr(not(any(feature = "fit", feature = "zwo")), allow(unused_mut))]
    pub fn new(config: DecoderConfig) -> Self {
        let mut decoders = Self::empty();

        #[cfg(feature = "fit")]
        decoders.register(crate::fit::FitDecoder::new(config));
        #[cfg(feature = "zwo")]
        decoders.register(crate::zwo::ZwoDecoder::new());

        decoders
    }

    /// Create a registry holding no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Append a decoder, consulted after all decoders registered before it.
    pub fn register(&mut self, decoder: impl WorkoutDecoder + 'static) -> &mut Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    /// All supported format identifiers, in consultation order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.decoders
            .iter()
            .flat_map(|d| d.supported_formats().iter().copied())
    }

    pub fn supports(&self, format: &str) -> bool {
        self.find(format).is_some()
    }

    /// Decode a workout with the first decoder supporting `format`.
    ///
    /// Formats are matched without regard to ASCII case.
    pub fn decode(&self, format: &str, r: &[u8]) -> Result<Workout, Error> {
        let decoder = self
            .find(format)
            .ok_or_else(|| Error::UnknownFormat(format.to_owned()))?;

        debug!(format, bytes = r.len(), "decoding workout");
        decoder.decode(r)
    }

    fn find(&self, format: &str) -> Option<&dyn WorkoutDecoder> {
        self.decoders
            .iter()
            .find(|d| {
                d.supported_formats()
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(format))
            })
            .map(|d| &**d)
    }
}

impl Default for Decoders {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}
