//! Band ratios, hemispheric asymmetry and heuristic risk flags
//!
//! All three are computed from one condition's band power table. The risk
//! flags are research heuristics with fixed thresholds, not diagnoses.

use std::collections::BTreeMap;

use rootstar_qeeg_core::math::{mean, safe_ratio};
use rootstar_qeeg_core::{FeatureConfig, Montage, RatioDefinition, RiskThresholds};
use serde::Serialize;

use super::band_power::BandPowerTable;

/// Ratio name → `"{region}_avg"` → value
pub type BandRatios = BTreeMap<String, BTreeMap<String, f64>>;

/// Asymmetry name → `ln(right) − ln(left)`
pub type AsymmetryTable = BTreeMap<String, f64>;

/// Heuristic pattern flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RiskPatterns {
    /// Frontal theta/beta ratio above threshold
    pub adhd_like: bool,
    /// Frontal beta share of total power above threshold
    pub anxiety_like: bool,
    /// Frontal alpha asymmetry below threshold
    pub depression_like: bool,
    /// Mean relative delta above threshold
    pub sleep_dysregulation: bool,
    /// Mean relative high beta above threshold
    pub hyper_arousal: bool,
}

/// Derived metrics of one band power table
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Regional band ratios
    pub band_ratios: BandRatios,
    /// Asymmetry indices
    pub asymmetry: AsymmetryTable,
    /// Risk flags
    pub risk_patterns: RiskPatterns,
}

impl DerivedMetrics {
    /// Ratios, asymmetry and risk flags from `power`
    pub fn compute(power: &BandPowerTable, config: &FeatureConfig) -> Self {
        let band_ratios = band_ratios(power, &config.ratios, &config.montage);
        let asymmetry = asymmetry(power, &config.montage);
        let risk_patterns = detect_risk_patterns(power, &band_ratios, &asymmetry, &config.montage, &config.risk);
        Self { band_ratios, asymmetry, risk_patterns }
    }
}

/// Every ratio definition over each of its regions.
///
/// Numerator and denominator are sums of regional average absolute power;
/// a non-positive denominator gives 0.
pub fn band_ratios(power: &BandPowerTable, ratios: &[RatioDefinition], montage: &Montage) -> BandRatios {
    ratios
        .iter()
        .map(|ratio| {
            let per_region = ratio
                .regions
                .iter()
                .map(|region| {
                    let channels = montage.region(region).map_or(&[][..], |g| g.channels.as_slice());
                    let sum = |bands: &[String]| -> f64 {
                        bands.iter().map(|b| power.regional_average(channels, b)).sum()
                    };
                    let value = safe_ratio(sum(&ratio.numerator), sum(&ratio.denominator));
                    (format!("{region}_avg"), value)
                })
                .collect();
            (ratio.name.clone(), per_region)
        })
        .collect()
}

/// `ln(right) − ln(left)`, or 0 unless both powers are positive
pub fn asymmetry_index(left: f64, right: f64) -> f64 {
    if left > 0.0 && right > 0.0 {
        right.ln() - left.ln()
    } else {
        0.0
    }
}

/// Asymmetry of every montage pair; absent channels give 0
pub fn asymmetry(power: &BandPowerTable, montage: &Montage) -> AsymmetryTable {
    montage
        .asymmetry_pairs
        .iter()
        .map(|pair| {
            let left = power.absolute(&pair.left, &pair.band).unwrap_or(0.0);
            let right = power.absolute(&pair.right, &pair.band).unwrap_or(0.0);
            (pair.name.clone(), asymmetry_index(left, right))
        })
        .collect()
}

/// Threshold the ratios, asymmetry and relative power into pattern flags
pub fn detect_risk_patterns(
    power: &BandPowerTable,
    ratios: &BandRatios,
    asymmetry: &AsymmetryTable,
    montage: &Montage,
    thresholds: &RiskThresholds,
) -> RiskPatterns {
    let frontal_key = format!("{}_avg", montage.frontal_region);
    let frontal_tbr = ratios
        .get("theta_beta_ratio")
        .and_then(|r| r.get(&frontal_key))
        .copied()
        .unwrap_or(0.0);

    let frontal = montage.region(&montage.frontal_region).map_or(&[][..], |g| g.channels.as_slice());
    let frontal_beta = power.regional_average(frontal, "beta2");
    let totals: Vec<f64> = frontal.iter().filter_map(|ch| power.total_power(ch)).collect();
    let frontal_beta_fraction = safe_ratio(frontal_beta, mean(&totals));

    let frontal_alpha = asymmetry.get("frontal_alpha").copied().unwrap_or(0.0);

    RiskPatterns {
        adhd_like: frontal_tbr > thresholds.theta_beta_ratio,
        anxiety_like: frontal_beta_fraction > thresholds.frontal_beta_fraction,
        depression_like: frontal_alpha < thresholds.frontal_alpha_asymmetry,
        sleep_dysregulation: power.mean_relative("delta").is_some_and(|d| d > thresholds.relative_delta),
        hyper_arousal: power.mean_relative("hibeta").is_some_and(|h| h > thresholds.relative_hibeta),
    }
}
