//! Rootstar qEEG Native - Host feature extraction for resting-state EEG
//!
//! This crate turns preprocessed, epoched EEG into a fixed battery of
//! quantitative features:
//! - Welch power spectra, absolute and relative band power
//! - Individual alpha peak after 1/f background removal
//! - Weighted phase lag index (wPLI) connectivity per band
//! - Graph metrics of each connectivity matrix
//! - Lempel-Ziv complexity
//! - Band ratios, hemispheric asymmetry and heuristic risk flags
//!
//! The engine performs no I/O and holds no global state: every call builds
//! a fresh [`FeatureResult`] from the supplied [`EpochSet`]s.
//!
//! # Modules
//!
//! - [`processing`]: Numeric kernels (Welch PSD, IIR filters, Hilbert transform)
//! - [`features`]: Feature estimators and the per-condition orchestrator
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```rust,ignore
//! use rootstar_qeeg_native::{extract_features, EpochsByCondition};
//!
//! let input = EpochsByCondition { eyes_open: Some(eo), eyes_closed: Some(ec) };
//! let result = extract_features(&input)?;
//! println!("{}", result.to_json());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod features;
pub mod processing;

// Re-export key types
pub use error::{AperiodicFitError, FeatureError, FeatureResultOr};
pub use features::extractor::{extract_features, EpochsByCondition, FeatureExtractor};
pub use features::result::{ConditionFeatures, FeatureResult, PerCondition};

pub use rootstar_qeeg_core::{Condition, EpochSet, FeatureConfig};
