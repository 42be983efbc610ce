//! Individual alpha peak estimation
//!
//! The aperiodic (1/f) background is modelled as a straight line in
//! log10-log10 space, fitted by ordinary least squares. The peak is the
//! largest positive residual inside the alpha search window; its power is
//! read from the original PSD, not the residual.

use std::collections::BTreeMap;

use rootstar_qeeg_core::SpectralConfig;
use serde::Serialize;

use super::spectrum::Spectrum;
use crate::error::{AperiodicFitError, FitResult};

/// Alpha peak of one channel
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AlphaPeak {
    /// Peak frequency in Hz, 0 when no peak was found
    pub peak_frequency: f64,
    /// Original PSD value at the peak (µV²/Hz)
    pub peak_power: f64,
}

impl AlphaPeak {
    /// Sentinel reported when no peak rises above the background
    pub const NOT_FOUND: Self = Self { peak_frequency: 0.0, peak_power: 0.0 };

    /// Whether this is the not-found sentinel
    pub fn is_found(&self) -> bool {
        self.peak_frequency > 0.0
    }
}

/// Channel → alpha peak
pub type AlphaPeakTable = BTreeMap<String, AlphaPeak>;

/// `log10(psd) = slope · log10(f) + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AperiodicFit {
    /// Spectral exponent (negative for 1/f-like spectra)
    pub slope: f64,
    /// Offset in log10 power
    pub intercept: f64,
}

impl AperiodicFit {
    /// Background PSD predicted at `freq_hz` (> 0)
    pub fn predict(&self, freq_hz: f64) -> f64 {
        10f64.powf(self.slope * freq_hz.log10() + self.intercept)
    }
}

/// Fit the aperiodic background over `range` (inclusive, Hz).
///
/// Only bins with positive frequency and positive power take part.
pub fn fit_aperiodic(frequencies: &[f64], psd: &[f64], range: (f64, f64)) -> FitResult<AperiodicFit> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = frequencies
        .iter()
        .zip(psd)
        .filter(|(&f, &p)| f > 0.0 && f >= range.0 && f <= range.1 && p > 0.0)
        .map(|(f, p)| (f.log10(), p.log10()))
        .unzip();

    if xs.len() < 2 {
        return Err(AperiodicFitError::InsufficientPoints { got: xs.len() });
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }

    if sxx <= f64::EPSILON {
        return Err(AperiodicFitError::DegenerateAbscissa);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(AperiodicFitError::NonFinite { slope, intercept });
    }

    Ok(AperiodicFit { slope, intercept })
}

/// Largest positive residual above `fit` inside `window` (inclusive)
pub fn locate_peak(
    frequencies: &[f64],
    psd: &[f64],
    fit: &AperiodicFit,
    window: (f64, f64),
) -> Option<AlphaPeak> {
    frequencies
        .iter()
        .zip(psd)
        .filter(|(&f, _)| f > 0.0 && f >= window.0 && f <= window.1)
        .map(|(&f, &p)| (f, p, p - fit.predict(f)))
        .filter(|(_, _, residual)| residual.is_finite() && *residual > 0.0)
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(f, p, _)| AlphaPeak { peak_frequency: f, peak_power: p })
}

/// Alpha peak of every channel of a high-resolution spectrum.
///
/// Channels whose fit fails or that show no residual peak get
/// [`AlphaPeak::NOT_FOUND`].
pub fn estimate(spectrum: &Spectrum, channels: &[String], config: &SpectralConfig) -> AlphaPeakTable {
    let freqs = spectrum.frequencies();
    channels
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let psd = spectrum.channel(idx);
            let peak = match fit_aperiodic(freqs, psd, config.aperiodic_fit_hz) {
                Ok(fit) => locate_peak(freqs, psd, &fit, config.alpha_search_hz).unwrap_or_else(|| {
                    tracing::debug!("{}: no alpha peak above aperiodic background", name);
                    AlphaPeak::NOT_FOUND
                }),
                Err(e) => {
                    tracing::debug!("{}: aperiodic fit failed: {}", name, e);
                    AlphaPeak::NOT_FOUND
                }
            };
            (name.clone(), peak)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Vec<f64> {
        (0..=500).map(|k| f64::from(k) * 0.1).collect()
    }

    fn pink(freqs: &[f64]) -> Vec<f64> {
        freqs.iter().map(|&f| if f > 0.0 { 100.0 / f } else { 0.0 }).collect()
    }

    #[test]
    fn test_fit_recovers_power_law() {
        let freqs = axis();
        let psd: Vec<f64> =
            freqs.iter().map(|&f| if f > 0.0 { 50.0 * f.powf(-1.5) } else { 0.0 }).collect();

        let fit = fit_aperiodic(&freqs, &psd, (3.0, 40.0)).unwrap();
        assert!((fit.slope + 1.5).abs() < 1e-9);
        assert!((fit.intercept - 50f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_peak_on_top_of_background() {
        let freqs = axis();
        let mut psd = pink(&freqs);
        for (f, p) in freqs.iter().zip(psd.iter_mut()) {
            *p += 20.0 * (-((f - 10.3) / 0.5).powi(2)).exp();
        }

        let fit = fit_aperiodic(&freqs, &psd, (3.0, 40.0)).unwrap();
        let peak = locate_peak(&freqs, &psd, &fit, (8.0, 12.0)).unwrap();

        assert!((peak.peak_frequency - 10.3).abs() < 0.15);
        let idx = freqs.iter().position(|&f| f == peak.peak_frequency).unwrap();
        assert_eq!(peak.peak_power, psd[idx]);
    }

    #[test]
    fn test_flat_background_has_no_peak() {
        let freqs = axis();
        let psd = pink(&freqs);
        let fit = fit_aperiodic(&freqs, &psd, (3.0, 40.0)).unwrap();
        // Exact power law: residuals are rounding noise at most
        let peak = locate_peak(&freqs, &psd, &fit, (8.0, 12.0));
        assert!(peak.map_or(true, |p| p.peak_power - fit.predict(p.peak_frequency) < 1e-9));
    }

    #[test]
    fn test_zero_spectrum_yields_sentinel() {
        let freqs = axis();
        let spectrum = Spectrum::from_curves(freqs.clone(), vec![vec![0.0; freqs.len()]]);

        let table = estimate(&spectrum, &["Oz".into()], &SpectralConfig::default());
        assert_eq!(table["Oz"], AlphaPeak::NOT_FOUND);
        assert!(!table["Oz"].is_found());
    }

    #[test]
    fn test_fit_errors() {
        assert_eq!(
            fit_aperiodic(&[0.0, 1.0], &[1.0, 1.0], (3.0, 40.0)),
            Err(AperiodicFitError::InsufficientPoints { got: 0 })
        );
        assert_eq!(
            fit_aperiodic(&[5.0, 5.0], &[1.0, 2.0], (3.0, 40.0)),
            Err(AperiodicFitError::DegenerateAbscissa)
        );
    }
}
