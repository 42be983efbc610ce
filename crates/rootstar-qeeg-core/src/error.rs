//! Error types for the qEEG data model
//!
//! These errors are raised only while *constructing* inputs and
//! configuration. Once an [`EpochSet`](crate::EpochSet) and a
//! [`FeatureConfig`](crate::FeatureConfig) exist, the feature engine never
//! fails on numeric grounds.

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Epoch Set Errors
// ============================================================================

/// Errors from validating an epoch tensor and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EpochSetError {
    /// Sampling rate is zero, negative, or not finite
    NonPositiveSampleRate {
        /// The rejected sampling rate in Hz
        sample_rate: f64,
    },
    /// The tensor has no epochs, channels, or samples
    Empty,
    /// Flat buffer length does not match `epochs × channels × samples`
    ShapeMismatch {
        /// Number of values implied by the declared shape
        expected: usize,
        /// Number of values actually supplied
        actual: usize,
    },
    /// An epoch or channel row has a different length than the first one
    RaggedRow {
        /// Epoch index of the offending row
        epoch: usize,
        /// Channel index of the offending row (`None` for the channel axis)
        channel: Option<usize>,
    },
    /// The same channel name appears twice
    DuplicateChannel {
        /// The repeated channel name
        name: String,
    },
}

impl fmt::Display for EpochSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveSampleRate { sample_rate } => {
                write!(f, "Sampling rate must be positive and finite, got {sample_rate} Hz")
            }
            Self::Empty => write!(f, "Epoch tensor has no epochs, channels, or samples"),
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "Epoch tensor shape mismatch: expected {expected} values, got {actual}")
            }
            Self::RaggedRow { epoch, channel: Some(channel) } => {
                write!(f, "Ragged sample row at epoch {epoch}, channel {channel}")
            }
            Self::RaggedRow { epoch, channel: None } => {
                write!(f, "Epoch {epoch} has a different channel count")
            }
            Self::DuplicateChannel { name } => write!(f, "Duplicate channel name: {name}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EpochSetError {}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors from validating band registries and other configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigError {
    /// A registry must hold at least one band
    EmptyRegistry,
    /// A band's interval is empty, negative, or not finite
    InvalidBand {
        /// Band name
        name: String,
        /// Lower edge in Hz
        low_hz: f64,
        /// Upper edge in Hz
        high_hz: f64,
    },
    /// Bands overlap or are not sorted by frequency
    UnorderedBands {
        /// Name of the earlier band
        previous: String,
        /// Name of the band that starts below the previous upper edge
        next: String,
    },
    /// The same band name appears twice
    DuplicateBand {
        /// The repeated band name
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegistry => write!(f, "Band registry is empty"),
            Self::InvalidBand { name, low_hz, high_hz } => {
                write!(f, "Invalid band {name}: [{low_hz}, {high_hz}) Hz")
            }
            Self::UnorderedBands { previous, next } => {
                write!(f, "Band {next} overlaps or precedes band {previous}")
            }
            Self::DuplicateBand { name } => write!(f, "Duplicate band name: {name}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
