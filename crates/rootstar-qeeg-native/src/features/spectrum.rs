//! Per-channel power spectra
//!
//! Two estimates are produced from one epoch set:
//! - [`Spectrum::epoch_averaged`]: Welch PSD of every epoch, averaged across
//!   epochs (band power)
//! - [`Spectrum::high_resolution`]: Welch PSD of the concatenated epochs with
//!   a long segment targeting ≈0.1 Hz bins (alpha peak)
//!
//! Both are scaled by [`SpectralConfig::psd_scale`] (V²/Hz → µV²/Hz).

use rootstar_qeeg_core::{EpochSet, SpectralConfig};

use crate::processing::fft::WelchEstimator;

/// One PSD curve per channel on a shared frequency axis
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    power: Vec<Vec<f64>>,
    segment_len: usize,
}

impl Spectrum {
    /// Welch PSD per epoch and channel, averaged across epochs.
    ///
    /// The segment length is `band_power_window_s` seconds, capped at the
    /// epoch length.
    pub fn epoch_averaged(epochs: &EpochSet, config: &SpectralConfig) -> Self {
        let wanted = (config.band_power_window_s * epochs.sample_rate()) as usize;
        let segment_len = wanted.clamp(1, epochs.n_samples());
        let mut welch = WelchEstimator::new(segment_len, epochs.sample_rate(), config.psd_scale);

        let n_epochs = epochs.n_epochs() as f64;
        let power = (0..epochs.n_channels())
            .map(|ch| {
                let mut mean = vec![0.0; welch.n_freqs()];
                for epoch in 0..epochs.n_epochs() {
                    for (m, p) in mean.iter_mut().zip(welch.estimate(epochs.signal(epoch, ch))) {
                        *m += p;
                    }
                }
                mean.iter_mut().for_each(|m| *m /= n_epochs);
                mean
            })
            .collect();

        Self { frequencies: welch.frequencies(), power, segment_len }
    }

    /// Welch PSD of each channel's concatenated epochs.
    ///
    /// The segment length targets `alpha_resolution_hz` bins, is never
    /// shorter than `alpha_min_window_s` seconds, and is capped at the total
    /// recording length.
    pub fn high_resolution(epochs: &EpochSet, config: &SpectralConfig) -> Self {
        let fs = epochs.sample_rate();
        let total = epochs.n_epochs() * epochs.n_samples();
        let target = (fs / config.alpha_resolution_hz).round() as usize;
        let floor = (config.alpha_min_window_s * fs) as usize;
        let segment_len = target.max(floor).clamp(1, total);

        let mut welch = WelchEstimator::new(segment_len, fs, config.psd_scale);
        let power = (0..epochs.n_channels())
            .map(|ch| welch.estimate(&epochs.concatenated(ch)))
            .collect();

        Self { frequencies: welch.frequencies(), power, segment_len }
    }

    /// Build a spectrum from precomputed curves
    ///
    /// # Panics
    ///
    /// Panics if any curve length differs from the frequency axis.
    pub fn from_curves(frequencies: Vec<f64>, power: Vec<Vec<f64>>) -> Self {
        assert!(power.iter().all(|p| p.len() == frequencies.len()));
        let segment_len = frequencies.len().saturating_sub(1) * 2;
        Self { frequencies, power, segment_len }
    }

    /// Frequency axis in Hz
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// PSD curve of one channel
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.power[index]
    }

    /// Number of channels
    pub fn n_channels(&self) -> usize {
        self.power.len()
    }

    /// Welch segment length used
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }
}
