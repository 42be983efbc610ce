//! Core data types for the qEEG feature engine
//!
//! The engine consumes one [`EpochSet`] per recording [`Condition`]. Epoch
//! tensors are produced entirely by preprocessing and are never mutated here.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::EpochSetError;

// ============================================================================
// Recording Conditions
// ============================================================================

/// Resting-state recording condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Eyes open
    #[serde(rename = "eo")]
    EyesOpen,
    /// Eyes closed
    #[serde(rename = "ec")]
    EyesClosed,
}

impl Condition {
    /// All conditions, in analysis order
    pub const ALL: [Self; 2] = [Self::EyesOpen, Self::EyesClosed];

    /// Short key used in serialized output
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::EyesOpen => "eo",
            Self::EyesClosed => "ec",
        }
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EyesOpen => "eyes-open",
            Self::EyesClosed => "eyes-closed",
        }
    }
}

// ============================================================================
// Epoch Set
// ============================================================================

/// Immutable, already-cleaned epoch tensor for one condition.
///
/// Samples are stored flat in `[epoch][channel][sample]` order and are
/// expressed in volts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NestedEpochs", into = "NestedEpochs")]
pub struct EpochSet {
    sample_rate: f64,
    channels: Vec<String>,
    condition: Condition,
    n_epochs: usize,
    n_samples: usize,
    data: Vec<f64>,
}

impl EpochSet {
    /// Create an epoch set from a flat `[epoch][channel][sample]` buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the sampling rate is not positive, the shape is
    /// empty or does not match `data.len()`, or a channel name repeats.
    pub fn new(
        sample_rate: f64,
        channels: Vec<String>,
        condition: Condition,
        n_epochs: usize,
        n_samples: usize,
        data: Vec<f64>,
    ) -> Result<Self, EpochSetError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EpochSetError::NonPositiveSampleRate { sample_rate });
        }
        if n_epochs == 0 || n_samples == 0 || channels.is_empty() {
            return Err(EpochSetError::Empty);
        }

        let expected = n_epochs * channels.len() * n_samples;
        if data.len() != expected {
            return Err(EpochSetError::ShapeMismatch { expected, actual: data.len() });
        }

        let mut seen = BTreeSet::new();
        for name in &channels {
            if !seen.insert(name.as_str()) {
                return Err(EpochSetError::DuplicateChannel { name: name.clone() });
            }
        }

        Ok(Self { sample_rate, channels, condition, n_epochs, n_samples, data })
    }

    /// Create an epoch set from a nested `[epoch][channel][sample]` array.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EpochSet::new`], plus ragged rows.
    pub fn from_nested(
        sample_rate: f64,
        channels: Vec<String>,
        condition: Condition,
        data: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, EpochSetError> {
        let n_epochs = data.len();
        let n_samples = data.first().and_then(|e| e.first()).map_or(0, Vec::len);

        let mut flat = Vec::with_capacity(n_epochs * channels.len() * n_samples);
        for (e, epoch) in data.into_iter().enumerate() {
            if epoch.len() != channels.len() {
                return Err(EpochSetError::RaggedRow { epoch: e, channel: None });
            }
            for (c, row) in epoch.into_iter().enumerate() {
                if row.len() != n_samples {
                    return Err(EpochSetError::RaggedRow { epoch: e, channel: Some(c) });
                }
                flat.extend(row);
            }
        }

        Self::new(sample_rate, channels, condition, n_epochs, n_samples, flat)
    }

    /// Sampling rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Ordered channel names
    #[inline]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Recording condition
    #[inline]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Number of epochs
    #[inline]
    pub fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    /// Number of channels
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per epoch
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Position of a channel in the channel order
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == name)
    }

    /// Samples of one channel in one epoch
    ///
    /// # Panics
    ///
    /// Panics if `epoch` or `channel` is out of range.
    #[inline]
    pub fn signal(&self, epoch: usize, channel: usize) -> &[f64] {
        assert!(epoch < self.n_epochs && channel < self.channels.len());
        let start = (epoch * self.channels.len() + channel) * self.n_samples;
        &self.data[start..start + self.n_samples]
    }

    /// All epochs of one channel joined end to end
    pub fn concatenated(&self, channel: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_epochs * self.n_samples);
        for epoch in 0..self.n_epochs {
            out.extend_from_slice(self.signal(epoch, channel));
        }
        out
    }
}

/// Serialized form of an [`EpochSet`]: a nested array plus metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct NestedEpochs {
    sample_rate: f64,
    channels: Vec<String>,
    condition: Condition,
    data: Vec<Vec<Vec<f64>>>,
}

impl TryFrom<NestedEpochs> for EpochSet {
    type Error = EpochSetError;

    fn try_from(nested: NestedEpochs) -> Result<Self, Self::Error> {
        Self::from_nested(nested.sample_rate, nested.channels, nested.condition, nested.data)
    }
}

impl From<EpochSet> for NestedEpochs {
    fn from(set: EpochSet) -> Self {
        let data = (0..set.n_epochs)
            .map(|e| (0..set.channels.len()).map(|c| set.signal(e, c).to_vec()).collect())
            .collect();

        Self {
            sample_rate: set.sample_rate,
            channels: set.channels,
            condition: set.condition,
            data,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
