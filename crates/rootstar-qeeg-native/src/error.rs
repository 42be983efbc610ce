//! Error types for feature extraction
//!
//! Only two conditions ever reach the caller: no usable input at all, or an
//! input tensor that fails validation. Every per-channel, per-band and
//! per-pair degeneracy is resolved locally to a documented zero or sentinel
//! value.

use rootstar_qeeg_core::EpochSetError;
use thiserror::Error;

/// Feature extraction errors
#[derive(Error, Debug)]
pub enum FeatureError {
    /// Neither an eyes-open nor an eyes-closed epoch set was supplied
    #[error("No usable input: neither eyes-open nor eyes-closed epochs were provided")]
    InputAbsent,

    /// An epoch set failed validation
    #[error("Invalid epoch set: {0}")]
    InvalidEpochs(#[from] EpochSetError),
}

/// Reasons the 1/f log-log regression cannot be fitted for one channel
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AperiodicFitError {
    /// Fewer than two positive PSD bins inside the fit range
    #[error("Aperiodic fit needs at least 2 points, got {got}")]
    InsufficientPoints {
        /// Number of usable bins
        got: usize,
    },

    /// All fit frequencies are identical
    #[error("Aperiodic fit abscissa has zero variance")]
    DegenerateAbscissa,

    /// Slope or intercept is NaN or infinite
    #[error("Aperiodic fit produced a non-finite slope ({slope}) or intercept ({intercept})")]
    NonFinite {
        /// Fitted slope
        slope: f64,
        /// Fitted intercept
        intercept: f64,
    },
}

/// Result type for feature extraction
pub type FeatureResultOr<T> = Result<T, FeatureError>;

/// Result type for the 1/f fit
pub type FitResult<T> = Result<T, AperiodicFitError>;
