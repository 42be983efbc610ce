//! Signal processing kernels
//!
//! This module provides the numeric building blocks of the feature engine:
//! - [`fft`]: Welch power spectral density
//! - [`filters`]: Butterworth IIR filters and zero-phase filtering
//! - [`hilbert`]: Analytic signal via the FFT Hilbert transform

pub mod fft;
pub mod filters;
pub mod hilbert;

pub use fft::WelchEstimator;
pub use filters::{Biquad, BiquadCoeffs, SosFilter};
pub use hilbert::HilbertTransform;
