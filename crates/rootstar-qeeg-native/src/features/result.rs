//! Feature result tree
//!
//! Per-condition tables are keyed `"eo"` / `"ec"` with `null` for a
//! condition that was not supplied. Derived metrics come from the primary
//! condition only.

use rootstar_qeeg_core::Condition;
use serde::Serialize;

use super::alpha_peak::AlphaPeakTable;
use super::band_power::BandPowerTable;
use super::complexity::ComplexityTable;
use super::connectivity::ConnectivityReport;
use super::derived::{AsymmetryTable, BandRatios, DerivedMetrics, RiskPatterns};

/// One value per recording condition
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerCondition<T> {
    /// Eyes-open value
    pub eo: Option<T>,
    /// Eyes-closed value
    pub ec: Option<T>,
}

impl<T> Default for PerCondition<T> {
    fn default() -> Self {
        Self { eo: None, ec: None }
    }
}

impl<T> PerCondition<T> {
    /// Value of one condition
    pub fn get(&self, condition: Condition) -> Option<&T> {
        match condition {
            Condition::EyesOpen => self.eo.as_ref(),
            Condition::EyesClosed => self.ec.as_ref(),
        }
    }

    /// Set the value of one condition
    pub fn set(&mut self, condition: Condition, value: T) {
        match condition {
            Condition::EyesOpen => self.eo = Some(value),
            Condition::EyesClosed => self.ec = Some(value),
        }
    }
}

/// Everything computed for one condition
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionFeatures {
    /// Fine-band power
    pub band_power: BandPowerTable,
    /// Coarse-band connectivity and network metrics
    pub connectivity: ConnectivityReport,
    /// Lempel-Ziv complexity
    pub lzc: ComplexityTable,
    /// Individual alpha peak
    pub alpha_peak: AlphaPeakTable,
}

/// Complete output of one extraction run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureResult {
    /// Band power per condition
    pub band_power: PerCondition<BandPowerTable>,
    /// Connectivity per condition
    pub connectivity: PerCondition<ConnectivityReport>,
    /// Complexity per condition
    pub lzc: PerCondition<ComplexityTable>,
    /// Alpha peak per condition
    pub alpha_peak: PerCondition<AlphaPeakTable>,
    /// Band ratios of the primary condition
    pub band_ratios: BandRatios,
    /// Asymmetry of the primary condition
    pub asymmetry: AsymmetryTable,
    /// Risk flags of the primary condition
    pub risk_patterns: RiskPatterns,
    /// Condition the derived metrics were computed from
    pub primary_condition: Condition,
}

impl FeatureResult {
    /// Assemble the result from per-condition features and the primary
    /// condition's derived metrics
    pub fn assemble(
        conditions: Vec<(Condition, ConditionFeatures)>,
        primary_condition: Condition,
        derived: DerivedMetrics,
    ) -> Self {
        let mut band_power = PerCondition::default();
        let mut connectivity = PerCondition::default();
        let mut lzc = PerCondition::default();
        let mut alpha_peak = PerCondition::default();

        for (condition, features) in conditions {
            band_power.set(condition, features.band_power);
            connectivity.set(condition, features.connectivity);
            lzc.set(condition, features.lzc);
            alpha_peak.set(condition, features.alpha_peak);
        }

        Self {
            band_power,
            connectivity,
            lzc,
            alpha_peak,
            band_ratios: derived.band_ratios,
            asymmetry: derived.asymmetry,
            risk_patterns: derived.risk_patterns,
            primary_condition,
        }
    }

    /// Convert to a plain JSON tree
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
