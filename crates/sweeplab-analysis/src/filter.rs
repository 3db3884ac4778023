//! Second-order IIR designs evaluated in the frequency domain.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas. With
//! `Q = 1/sqrt(2)` these are the bilinear-transform Butterworth sections,
//! which is what the sweep band limiting needs. Nothing here runs a filter
//! over samples; the transfer function is sampled on the unit circle.

use rustfft::num_complex::Complex;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Biquad transfer function coefficients.
///
/// ```text
///          b0 + b1 z^-1 + b2 z^-2
/// H(z) = --------------------------
///          a0 + a1 z^-1 + a2 z^-2
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficients
    pub b0: f64,
    /// Feedforward coefficient for z^-1
    pub b1: f64,
    /// Feedforward coefficient for z^-2
    pub b2: f64,
    /// Feedback coefficients (a0 is not normalized away)
    pub a0: f64,
    /// Feedback coefficient for z^-1
    pub a1: f64,
    /// Feedback coefficient for z^-2
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Low-pass coefficients using the RBJ cookbook formula.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz
    /// * `q` - Q factor (0.707 for Butterworth response)
    /// * `sample_rate` - Sample rate in Hz
    pub fn lowpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        Self {
            b0: (1.0 - cos_omega) / 2.0,
            b1: 1.0 - cos_omega,
            b2: (1.0 - cos_omega) / 2.0,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_omega,
            a2: 1.0 - alpha,
        }
    }

    /// High-pass coefficients using the RBJ cookbook formula.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz
    /// * `q` - Q factor (0.707 for Butterworth response)
    /// * `sample_rate` - Sample rate in Hz
    pub fn highpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        Self {
            b0: (1.0 + cos_omega) / 2.0,
            b1: -(1.0 + cos_omega),
            b2: (1.0 + cos_omega) / 2.0,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_omega,
            a2: 1.0 - alpha,
        }
    }

    /// Complex response at normalized angular frequency `omega` (rad/sample).
    pub fn response(&self, omega: f64) -> Complex<f64> {
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = z1 * self.b1 + z2 * self.b2 + self.b0;
        let den = z1 * self.a1 + z2 * self.a2 + self.a0;
        num / den
    }

    /// Magnitude response at normalized angular frequency `omega`.
    pub fn magnitude(&self, omega: f64) -> f64 {
        self.response(omega).norm()
    }
}

/// Band limiting used for the sweep spectrum and its inverse
///
/// A 2nd-order Butterworth high-pass at the start frequency cascaded with a
/// 2nd-order Butterworth low-pass at the end frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLimit {
    highpass: BiquadCoefficients,
    lowpass: BiquadCoefficients,
}

impl BandLimit {
    /// Create the band limit for `[start_freq, end_freq]` at `sample_rate`.
    pub fn new(start_freq: f64, end_freq: f64, sample_rate: f64) -> Self {
        Self {
            highpass: BiquadCoefficients::highpass(start_freq, FRAC_1_SQRT_2, sample_rate),
            lowpass: BiquadCoefficients::lowpass(end_freq, FRAC_1_SQRT_2, sample_rate),
        }
    }

    /// Cascaded magnitude `|H_hp| * |H_lp|` at `omega` (rad/sample).
    pub fn magnitude(&self, omega: f64) -> f64 {
        self.highpass.magnitude(omega) * self.lowpass.magnitude(omega)
    }
}
