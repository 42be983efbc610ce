//! Engine configuration
//!
//! [`FeatureConfig`] groups every tunable value of the feature engine and is
//! handed to the extractor at construction time. Every field has a default
//! matching the standard resting-state qEEG battery, so most callers use
//! [`FeatureConfig::default()`] or struct-update syntax:
//!
//! ```rust
//! use rootstar_qeeg_core::{FeatureConfig, SpectralConfig};
//!
//! let cfg = FeatureConfig {
//!     spectral: SpectralConfig { band_power_window_s: 4.0, ..SpectralConfig::default() },
//!     ..FeatureConfig::default()
//! };
//! assert_eq!(cfg.spectral.psd_scale, 1e12);
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::bands::BandRegistry;
use crate::montage::Montage;

// ============================================================================
// Spectral Estimation
// ============================================================================

/// Welch PSD and alpha-peak parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Welch segment length for band power, in seconds
    pub band_power_window_s: f64,
    /// Multiplier applied to every PSD value (V²/Hz → µV²/Hz)
    pub psd_scale: f64,
    /// Target frequency resolution of the alpha-peak PSD, in Hz
    pub alpha_resolution_hz: f64,
    /// Minimum Welch segment length of the alpha-peak PSD, in seconds
    pub alpha_min_window_s: f64,
    /// Frequency range of the 1/f log-log fit, in Hz
    pub aperiodic_fit_hz: (f64, f64),
    /// Closed frequency range searched for the alpha peak, in Hz
    pub alpha_search_hz: (f64, f64),
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            band_power_window_s: 2.0,
            psd_scale: 1e12,
            alpha_resolution_hz: 0.1,
            alpha_min_window_s: 2.0,
            aperiodic_fit_hz: (3.0, 40.0),
            alpha_search_hz: (8.0, 12.0),
        }
    }
}

// ============================================================================
// Connectivity
// ============================================================================

/// Band-pass filtering, wPLI and graph parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Butterworth order of each band edge (rounded up to even)
    pub filter_order: usize,
    /// wPLI is 0 when its denominator is at most this fraction of the mean
    /// cross-spectral magnitude
    pub wpli_epsilon: f64,
    /// Added to every weight before inversion to a distance
    pub distance_epsilon: f64,
    /// Upper band edges are clamped to this fraction of Nyquist
    pub max_nyquist_fraction: f64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            filter_order: 4,
            wpli_epsilon: 1e-10,
            distance_epsilon: 1e-10,
            max_nyquist_fraction: 0.95,
        }
    }
}

// ============================================================================
// Derived Metrics
// ============================================================================

/// A regional band-power ratio.
///
/// The value reported for each region is
/// `Σ avg(numerator bands) / Σ avg(denominator bands)` where each average is
/// the mean absolute power over the region's present channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioDefinition {
    /// Ratio name (e.g. `"theta_beta_ratio"`)
    pub name: String,
    /// Bands summed in the numerator
    pub numerator: Vec<String>,
    /// Bands summed in the denominator
    pub denominator: Vec<String>,
    /// Regions the ratio is reported for
    pub regions: Vec<String>,
}

impl RatioDefinition {
    fn new(name: &str, numerator: &[&str], denominator: &[&str], regions: &[&str]) -> Self {
        let owned = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        Self {
            name: name.to_string(),
            numerator: owned(numerator),
            denominator: owned(denominator),
            regions: owned(regions),
        }
    }

    /// Default ratio set: frontal/central theta/beta, occipital/parietal alpha/theta
    pub fn defaults() -> Vec<Self> {
        alloc::vec![
            Self::new("theta_beta_ratio", &["theta"], &["beta2"], &["frontal", "central"]),
            Self::new(
                "alpha_theta_ratio",
                &["alpha1", "alpha2"],
                &["theta"],
                &["occipital", "parietal"],
            ),
        ]
    }
}

/// Thresholds of the heuristic risk-pattern flags.
///
/// These are research heuristics, not diagnostic criteria.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Frontal theta/beta ratio above which `adhd_like` is set
    pub theta_beta_ratio: f64,
    /// Frontal beta share of total power above which `anxiety_like` is set
    pub frontal_beta_fraction: f64,
    /// Frontal alpha asymmetry below which `depression_like` is set
    pub frontal_alpha_asymmetry: f64,
    /// Mean relative delta above which `sleep_dysregulation` is set
    pub relative_delta: f64,
    /// Mean relative high beta above which `hyper_arousal` is set
    pub relative_hibeta: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            theta_beta_ratio: 2.5,
            frontal_beta_fraction: 0.25,
            frontal_alpha_asymmetry: -0.15,
            relative_delta: 0.25,
            relative_hibeta: 0.15,
        }
    }
}

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Complete feature engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Bands for power, ratios and asymmetry
    pub fine_bands: BandRegistry,
    /// Bands for connectivity
    pub coarse_bands: BandRegistry,
    /// Channel groups and pair tables
    pub montage: Montage,
    /// Band ratio definitions
    pub ratios: Vec<RatioDefinition>,
    /// Spectral estimation parameters
    pub spectral: SpectralConfig,
    /// Connectivity parameters
    pub connectivity: ConnectivityConfig,
    /// Risk-pattern thresholds
    pub risk: RiskThresholds,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fine_bands: BandRegistry::fine(),
            coarse_bands: BandRegistry::coarse(),
            montage: Montage::standard_10_20(),
            ratios: RatioDefinition::defaults(),
            spectral: SpectralConfig::default(),
            connectivity: ConnectivityConfig::default(),
            risk: RiskThresholds::default(),
        }
    }
}
