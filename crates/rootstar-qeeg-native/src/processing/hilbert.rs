//! Analytic signal via the FFT Hilbert transform
//!
//! The analytic signal `x + i·H(x)` is obtained by zeroing the negative
//! frequencies of the spectrum, doubling the positive ones, and inverting.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Hilbert transformer for a fixed signal length
pub struct HilbertTransform {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    gains: Vec<f64>,
    scratch: Vec<Complex<f64>>,
}

impl HilbertTransform {
    /// Create a transformer for signals of `len` samples
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            len,
            forward,
            inverse,
            gains: spectral_gains(len),
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Signal length this transformer was planned for
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the planned length is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Compute the analytic signal of `signal`.
    ///
    /// # Panics
    ///
    /// Panics if `signal.len()` differs from the planned length.
    pub fn analytic(&mut self, signal: &[f64]) -> Vec<Complex<f64>> {
        assert_eq!(signal.len(), self.len, "Signal length does not match Hilbert plan");
        if self.len == 0 {
            return Vec::new();
        }

        let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.forward.process_with_scratch(&mut buffer, &mut self.scratch);

        let norm = 1.0 / self.len as f64;
        for (c, &g) in buffer.iter_mut().zip(&self.gains) {
            *c *= g * norm;
        }

        self.inverse.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }
}

/// Per-bin gains: 1 at DC (and Nyquist for even lengths), 2 for positive
/// frequencies, 0 for negative frequencies
fn spectral_gains(len: usize) -> Vec<f64> {
    let mut gains = vec![0.0; len];
    if len == 0 {
        return gains;
    }
    gains[0] = 1.0;
    if len % 2 == 0 {
        gains[len / 2] = 1.0;
        gains[1..len / 2].fill(2.0);
    } else {
        gains[1..len.div_ceil(2)].fill(2.0);
    }
    gains
}
