//! Rootstar qEEG Core - `no_std` compatible data model and registries
//!
//! This crate provides the foundational types consumed and produced by the
//! quantitative EEG feature engine. It holds no numeric kernels beyond a few
//! allocation-free statistics helpers, so it builds for `no_std` targets with
//! an allocator as well as for the host.
//!
//! # Modules
//!
//! - [`types`]: Recording conditions and the immutable [`EpochSet`] input
//! - [`bands`]: Frequency band registries (fine 8-band, coarse 4-band)
//! - [`montage`]: 10-20 channel groups and electrode pair tables
//! - [`config`]: Engine configuration passed in at construction time
//! - [`error`]: Error types for input and configuration validation
//! - [`math`]: Mean, median, trapezoidal integration and safe ratios
//!
//! # Features
//!
//! - `std`: Enable standard library support (`std::error::Error` impls)
//!
//! # Example
//!
//! ```rust
//! use rootstar_qeeg_core::{Condition, EpochSet};
//!
//! // Two channels, one epoch of four samples
//! let data = vec![vec![vec![0.0, 1.0, 0.0, -1.0], vec![1.0, 0.0, -1.0, 0.0]]];
//! let epochs = EpochSet::from_nested(
//!     250.0,
//!     vec!["F3".into(), "F4".into()],
//!     Condition::EyesClosed,
//!     data,
//! )
//! .unwrap();
//!
//! assert_eq!(epochs.n_channels(), 2);
//! assert_eq!(epochs.signal(0, 1), &[1.0, 0.0, -1.0, 0.0]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bands;
pub mod config;
pub mod error;
pub mod math;
pub mod montage;
pub mod types;

// Re-export commonly used types at crate root
pub use bands::{BandRegistry, FrequencyBand};
pub use config::{
    ConnectivityConfig, FeatureConfig, RatioDefinition, RiskThresholds, SpectralConfig,
};
pub use error::{ConfigError, EpochSetError};
pub use montage::{AsymmetryPair, ChannelGroup, ElectrodePair, Montage, NamedPair, PairKind};
pub use types::{Condition, EpochSet};
