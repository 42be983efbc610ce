//! Per-condition feature pipeline
//!
//! Each supplied condition runs spectral, band power, alpha peak,
//! connectivity and complexity estimation independently. Band ratios,
//! asymmetry and risk flags are then computed from the eyes-closed band
//! power when present, otherwise from eyes-open.

use rootstar_qeeg_core::{Condition, EpochSet, FeatureConfig};
use serde::{Deserialize, Serialize};

use super::band_power::BandPowerTable;
use super::derived::DerivedMetrics;
use super::result::{ConditionFeatures, FeatureResult};
use super::spectrum::Spectrum;
use super::{alpha_peak, complexity, connectivity};
use crate::error::{FeatureError, FeatureResultOr};

/// Input epochs, at most one set per condition
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochsByCondition {
    /// Eyes-open epochs
    #[serde(rename = "eo", default)]
    pub eyes_open: Option<EpochSet>,
    /// Eyes-closed epochs
    #[serde(rename = "ec", default)]
    pub eyes_closed: Option<EpochSet>,
}

impl EpochsByCondition {
    /// Epochs of one condition
    pub fn get(&self, condition: Condition) -> Option<&EpochSet> {
        match condition {
            Condition::EyesOpen => self.eyes_open.as_ref(),
            Condition::EyesClosed => self.eyes_closed.as_ref(),
        }
    }

    /// Condition the derived metrics are computed from
    pub fn primary(&self) -> Option<Condition> {
        if self.eyes_closed.is_some() {
            Some(Condition::EyesClosed)
        } else if self.eyes_open.is_some() {
            Some(Condition::EyesOpen)
        } else {
            None
        }
    }

    /// Whether no condition was supplied
    pub fn is_empty(&self) -> bool {
        self.primary().is_none()
    }
}

/// Feature extraction engine
#[derive(Clone, Debug, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    /// Create an extractor with the given configuration
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Create an extractor with the standard bands and 10-20 montage
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Active configuration
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Run every per-condition estimator on one epoch set
    pub fn analyze_condition(&self, epochs: &EpochSet) -> ConditionFeatures {
        let channels = epochs.channels();
        tracing::info!(
            "Extracting {} features: {} channels, {} epochs x {} samples at {} Hz",
            epochs.condition().name(),
            channels.len(),
            epochs.n_epochs(),
            epochs.n_samples(),
            epochs.sample_rate()
        );

        let spectrum = Spectrum::epoch_averaged(epochs, &self.config.spectral);
        let band_power = BandPowerTable::compute(&spectrum, channels, &self.config.fine_bands);

        let fine = Spectrum::high_resolution(epochs, &self.config.spectral);
        let alpha_peak = alpha_peak::estimate(&fine, channels, &self.config.spectral);

        let connectivity = connectivity::compute(epochs, &self.config);
        let lzc = complexity::compute(epochs);

        ConditionFeatures { band_power, connectivity, lzc, alpha_peak }
    }

    /// Extract features for every supplied condition.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InputAbsent`] when neither condition is
    /// present.
    pub fn extract(&self, input: &EpochsByCondition) -> FeatureResultOr<FeatureResult> {
        let primary = input.primary().ok_or(FeatureError::InputAbsent)?;

        for condition in Condition::ALL {
            match input.get(condition) {
                Some(epochs) if epochs.condition() != condition => tracing::warn!(
                    "Epochs labelled {} supplied as {}, analysing as {}",
                    epochs.condition().name(),
                    condition.name(),
                    condition.name()
                ),
                Some(_) => {}
                None => tracing::info!("Skipping {} features (no epochs)", condition.name()),
            }
        }

        let conditions = self.analyze_all(input);

        let primary_power = conditions
            .iter()
            .find(|(c, _)| *c == primary)
            .map(|(_, f)| &f.band_power)
            .ok_or(FeatureError::InputAbsent)?;
        tracing::info!("Computing derived metrics from {} band power", primary.name());
        let derived = DerivedMetrics::compute(primary_power, &self.config);

        Ok(FeatureResult::assemble(conditions, primary, derived))
    }

    #[cfg(not(feature = "parallel"))]
    fn analyze_all(&self, input: &EpochsByCondition) -> Vec<(Condition, ConditionFeatures)> {
        Condition::ALL
            .into_iter()
            .filter_map(|c| input.get(c).map(|epochs| (c, self.analyze_condition(epochs))))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn analyze_all(&self, input: &EpochsByCondition) -> Vec<(Condition, ConditionFeatures)> {
        let run = |c: Condition| input.get(c).map(|epochs| (c, self.analyze_condition(epochs)));
        let (eo, ec) = rayon::join(|| run(Condition::EyesOpen), || run(Condition::EyesClosed));
        eo.into_iter().chain(ec).collect()
    }
}

/// Extract features with the default configuration
///
/// # Errors
///
/// Returns [`FeatureError::InputAbsent`] when neither condition is present.
pub fn extract_features(input: &EpochsByCondition) -> FeatureResultOr<FeatureResult> {
    FeatureExtractor::with_defaults().extract(input)
}
