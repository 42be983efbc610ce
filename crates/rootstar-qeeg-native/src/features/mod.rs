//! Feature estimators
//!
//! - [`spectrum`]: Welch PSD per channel
//! - [`band_power`]: Absolute and relative band power
//! - [`alpha_peak`]: Individual alpha peak after 1/f removal
//! - [`connectivity`]: wPLI matrices per coarse band
//! - [`network`]: Graph metrics of a connectivity matrix
//! - [`complexity`]: Lempel-Ziv complexity
//! - [`derived`]: Band ratios, asymmetry, risk flags
//! - [`extractor`]: Per-condition orchestration

pub mod alpha_peak;
pub mod band_power;
pub mod complexity;
pub mod connectivity;
pub mod derived;
pub mod extractor;
pub mod network;
pub mod result;
pub mod spectrum;

pub use alpha_peak::{AlphaPeak, AlphaPeakTable, AperiodicFit};
pub use band_power::{BandPower, BandPowerTable};
pub use complexity::{Complexity, ComplexityTable};
pub use connectivity::{BandConnectivity, ConnectivityMatrix, ConnectivityReport, PairwiseConnectivity};
pub use derived::{AsymmetryTable, BandRatios, DerivedMetrics, RiskPatterns};
pub use network::NetworkMetrics;
pub use spectrum::Spectrum;
