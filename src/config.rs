//! Athlete-specific settings shared by the decoders.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Functional threshold power assumed when none is configured, in watts.
pub const DEFAULT_FTP: u16 = 200;

/// Settings used when constructing decoders.
///
/// Only the binary decoder consults the threshold power: FIT targets may be
/// stored as absolute wattage and must be converted to a fraction of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Functional threshold power, in watts.
    pub ftp: u16,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { ftp: DEFAULT_FTP }
    }
}
