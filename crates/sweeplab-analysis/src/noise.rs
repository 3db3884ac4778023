//! Transfer function estimation from a white-noise excitation
//!
//! Straight spectral division `Y / X` with no band limiting and no
//! regularization. Random excitations have spectral dips, and any bin where
//! the excitation spectrum vanishes is reported instead of being divided.

use crate::error::{AnalysisError, Result};
use crate::fft::Fft;

/// Excitation bins at or below this fraction of the largest bin are
/// treated as zero denominators.
pub const NOISE_BIN_FLOOR: f64 = 1e-12;

/// Impulse response between an excitation and a measured response
///
/// Computes `real(ifft(fft(response, n) / fft(excitation, n)))` with
/// `n = fft_size`. Choose `fft_size >= excitation.len() + ir_len - 1` to
/// avoid circular wraparound.
///
/// # Arguments
/// * `excitation` - Signal played into the system, at most `fft_size` samples
/// * `response` - Signal recorded at the output, at most `fft_size` samples
/// * `fft_size` - Transform length
///
/// # Errors
/// `NumericalInstability` if either input holds a NaN or infinite sample, or
/// if any excitation bin is (near) zero.
pub fn deconvolve_noise(excitation: &[f64], response: &[f64], fft_size: usize) -> Result<Vec<f64>> {
    if fft_size == 0 {
        return Err(AnalysisError::invalid("fft_size", "must be non-zero"));
    }
    if excitation.len() > fft_size || response.len() > fft_size {
        return Err(AnalysisError::mismatch(format!(
            "excitation ({}) and response ({}) must fit in fft_size {fft_size}",
            excitation.len(),
            response.len()
        )));
    }

    for (name, signal) in [("excitation", excitation), ("response", response)] {
        if let Some(index) = signal.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::unstable(format!(
                "{name} sample {index} is not finite"
            )));
        }
    }

    let fft = Fft::new(fft_size);
    let x = fft.forward(excitation);
    let y = fft.forward(response);

    let largest = x.iter().fold(0.0f64, |m, c| m.max(c.norm()));
    let floor = largest * NOISE_BIN_FLOOR;
    let zero_bin = x.iter().position(|c| {
        let mag = c.norm();
        mag.is_nan() || mag <= floor
    });
    if let Some(bin) = zero_bin {
        #[cfg(feature = "tracing")]
        tracing::debug!(bin, fft_size, "excitation spectrum has a zero bin");
        return Err(AnalysisError::unstable(format!(
            "excitation spectrum bin {bin} of {fft_size} is below {:.1e} of the peak",
            NOISE_BIN_FLOOR
        )));
    }

    let h: Vec<_> = y.iter().zip(x.iter()).map(|(&out, &inp)| out / inp).collect();
    Ok(fft.inverse_real(&h))
}

/// Seeded xorshift32 stream of uniform samples in `[-1, 1]`
///
/// The same seed always yields the same sequence. A zero seed is replaced
/// by a fixed non-zero one.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    /// Start a stream from `seed`
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x1234_5678 } else { seed },
        }
    }

    /// Next `length` samples scaled to `[-amplitude, amplitude]`
    pub fn take_scaled(&mut self, length: usize, amplitude: f64) -> Vec<f64> {
        self.by_ref().take(length).map(|x| amplitude * x).collect()
    }
}

impl Iterator for WhiteNoise {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        Some((f64::from(self.state as i32) / f64::from(i32::MAX)).max(-1.0))
    }
}

/// Deterministic uniform white noise in `[-amplitude, amplitude]`
///
/// The first `length` samples of [`WhiteNoise::new(seed)`](WhiteNoise).
pub fn white_noise(length: usize, amplitude: f64, seed: u32) -> Vec<f64> {
    WhiteNoise::new(seed).take_scaled(length, amplitude)
}
