//! Absolute and relative band power
//!
//! Absolute power is the trapezoidal integral of the PSD over each band's
//! `[low, high)` bins. Relative power divides by the channel's summed
//! absolute power across the whole registry, so relatives sum to 1 for any
//! channel with non-zero power and are all 0 otherwise.

use std::collections::BTreeMap;

use rootstar_qeeg_core::math::{mean, trapezoid, try_mean};
use rootstar_qeeg_core::{BandRegistry, FrequencyBand};
use serde::Serialize;

use super::spectrum::Spectrum;

/// Power in one band of one channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandPower {
    /// Integrated PSD in µV²
    pub absolute: f64,
    /// Share of the channel's total power, in [0, 1]
    pub relative: f64,
}

/// Channel → band → power
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandPowerTable {
    channels: BTreeMap<String, BTreeMap<String, BandPower>>,
}

impl BandPowerTable {
    /// Integrate every channel's PSD over every band of the registry
    pub fn compute(spectrum: &Spectrum, channels: &[String], bands: &BandRegistry) -> Self {
        let mut table = Self::default();
        for (idx, name) in channels.iter().enumerate() {
            let psd = spectrum.channel(idx);
            let absolute = bands
                .iter()
                .map(|band| (band.name.clone(), integrate_band(spectrum.frequencies(), psd, band)))
                .collect();
            table.insert_channel(name.clone(), absolute);
        }
        table
    }

    /// Add a channel from its absolute band powers, deriving relatives
    pub fn insert_channel(&mut self, channel: String, absolute: Vec<(String, f64)>) {
        let total: f64 = absolute.iter().map(|(_, p)| p).sum();
        let bands = absolute
            .into_iter()
            .map(|(band, abs)| {
                let relative = if total > 0.0 { abs / total } else { 0.0 };
                (band, BandPower { absolute: abs, relative })
            })
            .collect();
        self.channels.insert(channel, bands);
    }

    /// Power of one band of one channel
    pub fn get(&self, channel: &str, band: &str) -> Option<BandPower> {
        self.channels.get(channel)?.get(band).copied()
    }

    /// Absolute power of one band of one channel
    pub fn absolute(&self, channel: &str, band: &str) -> Option<f64> {
        self.get(channel, band).map(|p| p.absolute)
    }

    /// All bands of one channel
    pub fn channel(&self, channel: &str) -> Option<&BTreeMap<String, BandPower>> {
        self.channels.get(channel)
    }

    /// Channel names, sorted
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Summed absolute power of a channel across all bands
    pub fn total_power(&self, channel: &str) -> Option<f64> {
        self.channels.get(channel).map(|bands| bands.values().map(|p| p.absolute).sum())
    }

    /// Mean absolute power of `band` over the listed channels that are
    /// present; 0 when none is.
    pub fn regional_average<S: AsRef<str>>(&self, channels: &[S], band: &str) -> f64 {
        let values: Vec<f64> =
            channels.iter().filter_map(|ch| self.absolute(ch.as_ref(), band)).collect();
        mean(&values)
    }

    /// Mean relative power of `band` over every channel, `None` if empty
    pub fn mean_relative(&self, band: &str) -> Option<f64> {
        let values: Vec<f64> =
            self.channels.values().filter_map(|b| b.get(band)).map(|p| p.relative).collect();
        try_mean(&values)
    }

    /// Number of channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the table holds no channels
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Trapezoidal integral of `psd` over the bins inside `band`.
///
/// Bands covering fewer than two bins integrate to 0.
pub fn integrate_band(frequencies: &[f64], psd: &[f64], band: &FrequencyBand) -> f64 {
    let (freqs, power): (Vec<f64>, Vec<f64>) = frequencies
        .iter()
        .zip(psd)
        .filter(|(f, _)| band.contains(**f))
        .map(|(&f, &p)| (f, p))
        .unzip();
    trapezoid(&power, &freqs)
}
