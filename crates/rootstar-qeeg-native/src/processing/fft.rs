//! FFT-based spectral analysis
//!
//! Provides a Welch power spectral density estimator: 50 %-overlapping
//! periodic-Hann segments, per-segment mean removal, one-sided density
//! scaling.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Welch PSD estimator for a fixed segment length
pub struct WelchEstimator {
    segment_len: usize,
    sample_rate: f64,
    scale: f64,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    /// Density normalisation `1 / (fs · Σw²)`, times `scale`
    norm: f64,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl WelchEstimator {
    /// Create a new Welch estimator
    ///
    /// # Arguments
    ///
    /// * `segment_len` - Samples per segment (also the FFT size), at least 1
    /// * `sample_rate` - Sample rate in Hz
    /// * `scale` - Multiplier applied to every PSD value
    #[must_use]
    pub fn new(segment_len: usize, sample_rate: f64, scale: f64) -> Self {
        let segment_len = segment_len.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(segment_len);

        let window = hann_window(segment_len);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let norm = scale / (sample_rate * window_power);

        Self {
            segment_len,
            sample_rate,
            scale,
            scratch: vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()],
            fft,
            window,
            norm,
            buffer: vec![Complex::new(0.0, 0.0); segment_len],
        }
    }

    /// Segment length in samples
    #[must_use]
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// PSD multiplier this estimator was built with
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Frequency resolution (Hz per bin)
    #[must_use]
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.segment_len as f64
    }

    /// Bin centre frequencies of the one-sided spectrum
    #[must_use]
    pub fn frequencies(&self) -> Vec<f64> {
        let res = self.frequency_resolution();
        (0..self.n_freqs()).map(|k| k as f64 * res).collect()
    }

    /// Number of one-sided frequency bins
    #[must_use]
    pub fn n_freqs(&self) -> usize {
        self.segment_len / 2 + 1
    }

    /// Estimate the PSD of `samples`, averaged over all full segments.
    ///
    /// Returns an all-zero spectrum when `samples` is shorter than one
    /// segment.
    pub fn estimate(&mut self, samples: &[f64]) -> Vec<f64> {
        let n_freqs = self.n_freqs();
        let mut psd = vec![0.0; n_freqs];

        if samples.len() < self.segment_len {
            return psd;
        }

        let step = self.segment_len - self.segment_len / 2;
        let n_segments = (samples.len() - self.segment_len) / step + 1;

        for seg in 0..n_segments {
            let segment = &samples[seg * step..seg * step + self.segment_len];
            let mean = segment.iter().sum::<f64>() / self.segment_len as f64;

            // Detrend, window, copy to buffer
            for ((b, &s), &w) in self.buffer.iter_mut().zip(segment).zip(&self.window) {
                *b = Complex::new((s - mean) * w, 0.0);
            }

            self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

            for (p, c) in psd.iter_mut().zip(&self.buffer[..n_freqs]) {
                *p += c.norm_sqr();
            }
        }

        // One-sided: double every bin except DC and (even-length) Nyquist
        let last_doubled = if self.segment_len % 2 == 0 { n_freqs - 1 } else { n_freqs };
        let norm = self.norm / n_segments as f64;
        for (k, p) in psd.iter_mut().enumerate() {
            *p *= norm;
            if k > 0 && k < last_doubled {
                *p *= 2.0;
            }
        }

        psd
    }
}

/// Generate periodic Hann window coefficients
fn hann_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}
