//! Phase-synchrony connectivity (weighted phase lag index)
//!
//! Each coarse band is processed independently:
//! 1. zero-phase Butterworth band-pass of every epoch of every channel
//! 2. FFT Hilbert transform to the analytic signal
//! 3. wPLI for every unordered channel pair from the imaginary part of the
//!    cross-spectrum `z₁ · conj(z₂)`
//!
//! Cost is O(channels² · epochs · samples) per band on top of the
//! O(channels · epochs · samples log samples) transforms, which is fine for
//! tens of channels.

use std::collections::BTreeMap;

use rootstar_qeeg_core::{ConnectivityConfig, EpochSet, FeatureConfig, FrequencyBand, NamedPair, PairKind};
use rustfft::num_complex::Complex;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use super::network::NetworkMetrics;
use crate::processing::filters::SosFilter;
use crate::processing::hilbert::HilbertTransform;

/// Square symmetric channel × channel matrix
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectivityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl ConnectivityMatrix {
    /// All-zero matrix of `size` × `size`
    pub fn zeros(size: usize) -> Self {
        Self { size, values: vec![0.0; size * size] }
    }

    /// Build from row-major rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let size = rows.len();
        assert!(rows.iter().all(|r| r.len() == size), "Connectivity matrix must be square");
        Self { size, values: rows.concat() }
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at row `i`, column `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Set `(i, j)` and its mirror `(j, i)`
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
        self.values[j * self.size + i] = value;
    }

    /// Row `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Largest off-diagonal entry, 0 for a matrix smaller than 2 × 2
    pub fn max_off_diagonal(&self) -> f64 {
        (0..self.size)
            .flat_map(|i| (0..self.size).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .fold(0.0, f64::max)
    }

    /// Values strictly above the diagonal, row by row
    pub fn upper_triangle(&self) -> Vec<f64> {
        (0..self.size)
            .flat_map(|i| ((i + 1)..self.size).map(move |j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .collect()
    }
}

impl Serialize for ConnectivityMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Nested rows: [[f64; n]; n]
        let mut seq = serializer.serialize_seq(Some(self.size))?;
        for i in 0..self.size {
            seq.serialize_element(self.row(i))?;
        }
        seq.end()
    }
}

/// wPLI of one named electrode pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairwiseConnectivity {
    /// First electrode
    pub ch1: String,
    /// Second electrode
    pub ch2: String,
    /// Pair category
    #[serde(rename = "type")]
    pub kind: PairKind,
    /// Region label
    pub region: String,
    /// wPLI in this band
    pub wpli: f64,
}

/// Connectivity of one coarse band
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandConnectivity {
    /// Channel order of the matrix rows and columns
    pub channels: Vec<String>,
    /// wPLI matrix
    pub matrix: ConnectivityMatrix,
    /// Graph metrics of `matrix`
    pub network_metrics: NetworkMetrics,
    /// Named electrode pairs present in the data
    pub pairwise: Vec<PairwiseConnectivity>,
}

/// Band name → connectivity
pub type ConnectivityReport = BTreeMap<String, BandConnectivity>;

/// Weighted phase lag index of two channels.
///
/// `x` and `y` hold one analytic signal per epoch. Returns
/// `|mean_e(mean_t Im)| / mean_e(mean_t |Im|)` clamped to [0, 1].
///
/// The result is 0 when the denominator is at most `epsilon` times the mean
/// cross-spectral magnitude `|z₁| · |z₂|`, so the cutoff does not depend on
/// the signal units.
pub fn weighted_phase_lag_index(x: &[Vec<Complex<f64>>], y: &[Vec<Complex<f64>>], epsilon: f64) -> f64 {
    let n_epochs = x.len().min(y.len());
    if n_epochs == 0 {
        return 0.0;
    }

    let mut num = 0.0;
    let mut den = 0.0;
    let mut magnitude = 0.0;
    for (ex, ey) in x.iter().zip(y) {
        let n = ex.len().min(ey.len());
        if n == 0 {
            continue;
        }
        let (imag, abs_imag, mag) = ex
            .iter()
            .zip(ey)
            .map(|(a, b)| ((a * b.conj()).im, a.norm() * b.norm()))
            .fold((0.0, 0.0, 0.0), |(s, sa, sm), (im, m)| (s + im, sa + im.abs(), sm + m));
        num += imag / n as f64;
        den += abs_imag / n as f64;
        magnitude += mag / n as f64;
    }

    let num = (num / n_epochs as f64).abs();
    let den = den / n_epochs as f64;
    let magnitude = magnitude / n_epochs as f64;
    if den <= epsilon * magnitude {
        return 0.0;
    }
    (num / den).clamp(0.0, 1.0)
}

/// Band-pass and Hilbert-transform every epoch of every channel.
///
/// Returns `[channel][epoch]` analytic signals, or `None` when the band
/// has no room below the Nyquist guard.
fn analytic_signals(
    epochs: &EpochSet,
    band: &FrequencyBand,
    config: &ConnectivityConfig,
) -> Option<Vec<Vec<Vec<Complex<f64>>>>> {
    let fs = epochs.sample_rate();
    let high = band.high_hz.min(config.max_nyquist_fraction * fs / 2.0);
    if band.low_hz <= 0.0 || band.low_hz >= high {
        tracing::warn!(
            "Band {} ({}-{} Hz) does not fit below Nyquist at {} Hz, connectivity set to zero",
            band.name,
            band.low_hz,
            band.high_hz,
            fs
        );
        return None;
    }

    let mut filter = SosFilter::butterworth_bandpass(fs, band.low_hz, high, config.filter_order);
    let mut hilbert = HilbertTransform::new(epochs.n_samples());

    let signals = (0..epochs.n_channels())
        .map(|ch| {
            (0..epochs.n_epochs())
                .map(|e| {
                    filter.reset();
                    let filtered = filter.filtfilt(epochs.signal(e, ch));
                    hilbert.analytic(&filtered)
                })
                .collect()
        })
        .collect();
    Some(signals)
}

/// wPLI matrix of one band
pub fn band_matrix(epochs: &EpochSet, band: &FrequencyBand, config: &ConnectivityConfig) -> ConnectivityMatrix {
    let n = epochs.n_channels();
    let mut matrix = ConnectivityMatrix::zeros(n);
    let Some(signals) = analytic_signals(epochs, band, config) else {
        return matrix;
    };

    for i in 0..n {
        for j in (i + 1)..n {
            let wpli = weighted_phase_lag_index(&signals[i], &signals[j], config.wpli_epsilon);
            matrix.set_symmetric(i, j, wpli);
        }
    }
    matrix
}

/// Look up the named pairs whose channels are both present
pub fn pairwise(matrix: &ConnectivityMatrix, channels: &[String], pairs: &[NamedPair]) -> Vec<PairwiseConnectivity> {
    let index = |name: &str| channels.iter().position(|c| c == name);
    pairs
        .iter()
        .filter_map(|pair| {
            let i = index(&pair.first)?;
            let j = index(&pair.second)?;
            Some(PairwiseConnectivity {
                ch1: pair.first.clone(),
                ch2: pair.second.clone(),
                kind: pair.kind,
                region: pair.region.clone(),
                wpli: matrix.get(i, j),
            })
        })
        .collect()
}

fn analyze_band(epochs: &EpochSet, band: &FrequencyBand, config: &FeatureConfig) -> BandConnectivity {
    let channels = epochs.channels().to_vec();
    let matrix = band_matrix(epochs, band, &config.connectivity);
    let network_metrics = NetworkMetrics::compute(&matrix, &channels, &config.montage, &config.connectivity);
    let pairwise = pairwise(&matrix, &channels, &config.montage.connectivity_pairs);

    tracing::debug!(
        "{} connectivity: efficiency {:.3}, small-worldness {:.3}",
        band.name,
        network_metrics.global_efficiency,
        network_metrics.small_worldness
    );

    BandConnectivity { channels, matrix, network_metrics, pairwise }
}

/// Connectivity and network metrics for every coarse band
pub fn compute(epochs: &EpochSet, config: &FeatureConfig) -> ConnectivityReport {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let bands: Vec<&FrequencyBand> = config.coarse_bands.iter().collect();
        bands
            .par_iter()
            .map(|band| (band.name.clone(), analyze_band(epochs, band, config)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        config
            .coarse_bands
            .iter()
            .map(|band| (band.name.clone(), analyze_band(epochs, band, config)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootstar_qeeg_core::Condition;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn phasor(freq: f64, phase: f64, n: usize) -> Vec<Complex<f64>> {
        scaled_phasor(1.0, freq, phase, n)
    }

    fn scaled_phasor(amplitude: f64, freq: f64, phase: f64, n: usize) -> Vec<Complex<f64>> {
        (0..n)
            .map(|i| Complex::from_polar(amplitude, 2.0 * PI * freq * i as f64 / 100.0 + phase))
            .collect()
    }

    /// Two channels at 10 Hz, the second lagging by 90°, in volts
    fn lagged_pair(amplitude: f64) -> EpochSet {
        let (fs, n_epochs, n_samples) = (250.0, 4, 500);
        let mut data = Vec::with_capacity(n_epochs * 2 * n_samples);
        for e in 0..n_epochs {
            for lag in [0.0, FRAC_PI_2] {
                for i in 0..n_samples {
                    let t = (e * n_samples + i) as f64 / fs;
                    data.push(amplitude * (2.0 * PI * 10.0 * t - lag).sin());
                }
            }
        }
        EpochSet::new(fs, vec!["O1".into(), "O2".into()], Condition::EyesClosed, n_epochs, n_samples, data)
            .unwrap()
    }

    #[test]
    fn test_wpli_constant_lag_is_one() {
        let x = vec![phasor(10.0, FRAC_PI_2, 200); 3];
        let y = vec![phasor(10.0, 0.0, 200); 3];
        assert!((weighted_phase_lag_index(&x, &y, 1e-10) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wpli_ignores_signal_units() {
        for amplitude in [1.0, 1e-3, 10e-6, 5e-6, 1e-9] {
            let x = vec![scaled_phasor(amplitude, 10.0, FRAC_PI_2, 200); 3];
            let y = vec![scaled_phasor(amplitude, 10.0, 0.0, 200); 3];
            let wpli = weighted_phase_lag_index(&x, &y, 1e-10);
            assert!((wpli - 1.0).abs() < 1e-9, "amplitude {amplitude}: wPLI {wpli}");
        }
    }

    #[test]
    fn test_microvolt_lagged_pair_is_synchronised() {
        let band = FrequencyBand::new("alpha", 8.0, 13.0);
        let config = ConnectivityConfig::default();

        let volts = band_matrix(&lagged_pair(1.0), &band, &config).get(0, 1);
        for amplitude in [20e-6, 10e-6, 5e-6] {
            let wpli = band_matrix(&lagged_pair(amplitude), &band, &config).get(0, 1);
            assert!(wpli > 0.95, "amplitude {amplitude}: wPLI {wpli}");
            assert!((wpli - volts).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wpli_zero_lag_is_zero() {
        let x = vec![phasor(10.0, 0.3, 200); 3];
        assert_eq!(weighted_phase_lag_index(&x, &x, 1e-10), 0.0);
    }

    #[test]
    fn test_wpli_is_symmetric() {
        let x = vec![phasor(10.0, 1.0, 200), phasor(10.0, -0.2, 200)];
        let y = vec![phasor(10.0, 0.0, 200), phasor(10.0, 0.5, 200)];
        let xy = weighted_phase_lag_index(&x, &y, 1e-10);
        let yx = weighted_phase_lag_index(&y, &x, 1e-10);
        assert!((xy - yx).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_serializes_as_rows() {
        let mut m = ConnectivityMatrix::zeros(2);
        m.set_symmetric(0, 1, 0.5);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[0.0,0.5],[0.5,0.0]]");
        assert_eq!(m.upper_triangle(), vec![0.5]);
    }

    #[test]
    fn test_max_skips_diagonal() {
        let m = ConnectivityMatrix::from_rows(&[vec![1.0, 0.4], vec![0.4, 1.0]]);
        assert_eq!(m.max_off_diagonal(), 0.4);
        assert_eq!(ConnectivityMatrix::zeros(1).max_off_diagonal(), 0.0);
    }

    #[test]
    fn test_band_above_nyquist_gives_zero_matrix() {
        let fs = 50.0;
        let data: Vec<f64> = (0..400).map(|i| ((i * 7) % 13) as f64 - 6.0).collect();
        let epochs =
            EpochSet::new(fs, vec!["A".into(), "B".into()], Condition::EyesOpen, 2, 100, data).unwrap();

        let band = FrequencyBand::new("beta", 30.0, 40.0);
        let m = band_matrix(&epochs, &band, &ConnectivityConfig::default());
        assert_eq!(m, ConnectivityMatrix::zeros(2));
    }

    #[test]
    fn test_pairwise_omits_missing_channels() {
        let mut m = ConnectivityMatrix::zeros(3);
        m.set_symmetric(0, 1, 0.8);
        let channels: Vec<String> = vec!["F3".into(), "F4".into(), "P3".into()];
        let montage = rootstar_qeeg_core::Montage::standard_10_20();

        let pairs = pairwise(&m, &channels, &montage.connectivity_pairs);
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].ch1.as_str(), pairs[0].ch2.as_str()), ("F3", "F4"));
        assert!((pairs[0].wpli - 0.8).abs() < 1e-12);
        assert_eq!(pairs[1].kind, PairKind::LongRange);
    }
}
