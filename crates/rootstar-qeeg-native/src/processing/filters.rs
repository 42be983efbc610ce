//! Digital filters for EEG processing
//!
//! Provides floating-point Butterworth IIR filters built from second-order
//! sections, and zero-phase forward-backward application.

use std::f64::consts::PI;

/// Biquad coefficients, normalised so that `a0 = 1`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficients [b0, b1, b2]
    pub b: [f64; 3],
    /// Denominator coefficients [a0=1, a1, a2]
    pub a: [f64; 3],
}

impl BiquadCoeffs {
    /// Gain at DC (`z = 1`), or `None` for a pole on the unit circle
    fn dc_gain(&self) -> Option<f64> {
        let den = self.a[0] + self.a[1] + self.a[2];
        (den.abs() > f64::EPSILON).then(|| (self.b[0] + self.b[1] + self.b[2]) / den)
    }
}

/// Second-order section in transposed direct form II
#[derive(Clone, Debug)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    /// State: [s1, s2]
    state: [f64; 2],
}

impl Biquad {
    /// Create a new biquad section with given coefficients
    #[must_use]
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, state: [0.0, 0.0] }
    }

    /// Second-order lowpass with quality factor `q` (bilinear, prewarped)
    #[must_use]
    pub fn lowpass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);

        Self::new(BiquadCoeffs {
            b: [k2 * norm, 2.0 * k2 * norm, k2 * norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        })
    }

    /// Second-order highpass with quality factor `q` (bilinear, prewarped)
    #[must_use]
    pub fn highpass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);

        Self::new(BiquadCoeffs {
            b: [norm, -2.0 * norm, norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        })
    }

    /// Coefficients of this section
    #[must_use]
    pub fn coeffs(&self) -> BiquadCoeffs {
        self.coeffs
    }

    /// Process a single sample
    pub fn filter(&mut self, input: f64) -> f64 {
        let BiquadCoeffs { b, a } = self.coeffs;
        let output = b[0] * input + self.state[0];
        self.state[0] = b[1] * input - a[1] * output + self.state[1];
        self.state[1] = b[2] * input - a[2] * output;
        output
    }

    /// Load the steady state reached after a constant `input`.
    ///
    /// Returns the matching constant output, which is the steady input
    /// level of the next section in a cascade.
    pub fn settle(&mut self, input: f64) -> f64 {
        let Some(gain) = self.coeffs.dc_gain() else {
            self.reset();
            return 0.0;
        };
        let BiquadCoeffs { b, a } = self.coeffs;
        let output = gain * input;
        self.state[1] = b[2] * input - a[2] * output;
        self.state[0] = b[1] * input - a[1] * output + self.state[1];
        output
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state = [0.0, 0.0];
    }
}

/// Cascade of second-order sections
#[derive(Clone, Debug)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Butterworth bandpass: highpass at `low_hz` cascaded with lowpass at
    /// `high_hz`, each edge of order `order` (rounded up to even).
    ///
    /// This is an edge cascade, not a lowpass-to-bandpass transform: both
    /// edges sit at their −3 dB points, so a narrow band is attenuated even
    /// at its centre. After [`filtfilt`](Self::filtfilt) the 8–13 Hz band at
    /// 250 Hz passes 10 Hz at about 0.77 of its amplitude. Phase stays
    /// intact, so phase measures are unaffected but amplitude-based
    /// thresholds must allow for the loss.
    #[must_use]
    pub fn butterworth_bandpass(sample_rate: f64, low_hz: f64, high_hz: f64, order: usize) -> Self {
        let qs = butterworth_qs(order);
        let sections = qs
            .iter()
            .map(|&q| Biquad::highpass(sample_rate, low_hz, q))
            .chain(qs.iter().map(|&q| Biquad::lowpass(sample_rate, high_hz, q)))
            .collect();

        Self { sections }
    }

    /// Number of second-order sections
    #[must_use]
    pub fn n_sections(&self) -> usize {
        self.sections.len()
    }

    /// Process a single sample through every section
    pub fn filter(&mut self, input: f64) -> f64 {
        self.sections.iter_mut().fold(input, |x, s| s.filter(x))
    }

    /// Reset all section states
    pub fn reset(&mut self) {
        for s in &mut self.sections {
            s.reset();
        }
    }

    fn settle(&mut self, input: f64) {
        self.sections.iter_mut().fold(input, |x, s| s.settle(x));
    }

    /// Zero-phase forward-backward filtering.
    ///
    /// The signal is extended at both ends by odd reflection and each pass
    /// starts from the steady state of its first sample, which suppresses
    /// edge transients.
    pub fn filtfilt(&mut self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 2 {
            return signal.to_vec();
        }

        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);
        let first = signal[0];
        let last = signal[n - 1];

        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        ext.extend_from_slice(signal);
        ext.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        self.run_pass(&mut ext);
        ext.reverse();
        self.run_pass(&mut ext);
        ext.reverse();

        ext[pad..pad + n].to_vec()
    }

    fn run_pass(&mut self, data: &mut [f64]) {
        self.settle(data[0]);
        for x in data.iter_mut() {
            *x = self.filter(*x);
        }
    }
}

/// Quality factors of the second-order sections of a Butterworth filter
fn butterworth_qs(order: usize) -> Vec<f64> {
    let pairs = order.max(2).div_ceil(2);
    let n = (2 * pairs) as f64;
    (0..pairs)
        .map(|k| 1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2.0 * n)).cos()))
        .collect()
}
