//! Sweep deconvolution into linear and non-linear impulse responses
//!
//! A recorded sweep response is multiplied in the frequency domain by the
//! inverse spectrum of the sweep that excited it. The circular result is
//! rotated by half its length so lag zero lands in the middle:
//!
//! ```text
//! | non-linear (negative time)      | linear (lag 0 →)               |
//! 0                                len/2                            len
//! ```
//!
//! Harmonic distortion products of an exponential sweep arrive before the
//! linear response, so they fall into the first half. The orders are not
//! separated from each other; the first half is returned as one block.

use crate::error::{AnalysisError, Result};
use crate::fft::Fft;
use crate::sweep::InverseSpectrum;

/// Linear and non-linear parts of a deconvolved sweep response
#[derive(Debug, Clone, PartialEq)]
pub struct Deconvolution {
    /// Causal linear impulse response, lag 0 first
    pub linear: Vec<f64>,
    /// Earlier-arriving block holding the harmonic responses
    pub nonlinear: Vec<f64>,
}

impl Deconvolution {
    /// Index and value of the largest-magnitude linear sample
    pub fn linear_peak(&self) -> Option<(usize, f64)> {
        self.linear
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
    }
}

/// Deconvolve a recorded response with a matched inverse spectrum
///
/// The transform size is the inverse spectrum length. The response is
/// zero-padded up to it; a response longer than the transform would wrap
/// around and is rejected instead of being truncated.
///
/// # Arguments
/// * `response` - Recorded mono signal, at most `inverse.len()` samples
/// * `inverse` - Inverse spectrum of the sweep used as excitation
///
/// # Example
/// ```
/// use sweeplab_analysis::{deconvolve_sweep, SweepParams};
///
/// let sweep = SweepParams::new(0.25, 8000.0, 50.0, 3500.0).synthesize().unwrap();
/// let result = deconvolve_sweep(&sweep.samples, &sweep.inverse).unwrap();
/// let (index, _) = result.linear_peak().unwrap();
/// assert_eq!(index, 0);
/// ```
pub fn deconvolve_sweep(response: &[f64], inverse: &InverseSpectrum) -> Result<Deconvolution> {
    let size = inverse.len();
    if response.is_empty() {
        return Err(AnalysisError::mismatch("response is empty"));
    }
    if response.len() > size {
        return Err(AnalysisError::mismatch(format!(
            "response has {} samples but the inverse spectrum holds {size}",
            response.len()
        )));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(response_len = response.len(), fft_size = size, "deconvolve sweep");

    let fft = Fft::new(size);
    let mut spectrum = fft.forward(response);
    for (r, i) in spectrum.iter_mut().zip(inverse.as_slice()) {
        *r *= *i;
    }

    let mut ir = fft.inverse_real(&spectrum);
    let half = size / 2;
    ir.rotate_right(half);
    let linear = ir.split_off(half);

    Ok(Deconvolution {
        linear,
        nonlinear: ir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex;

    fn unit_inverse(size: usize) -> InverseSpectrum {
        InverseSpectrum::from_bins(vec![Complex::new(1.0, 0.0); size]).unwrap()
    }

    #[test]
    fn test_identity_inverse_splits_at_lag_zero() {
        // A flat inverse passes the response through unchanged
        let response = [1.0, 2.0, 3.0];
        let result = deconvolve_sweep(&response, &unit_inverse(8)).unwrap();

        assert_eq!(result.linear.len(), 4);
        assert_eq!(result.nonlinear.len(), 4);
        for (a, b) in result.linear.iter().zip([1.0, 2.0, 3.0, 0.0]) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(result.nonlinear.iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn test_negative_lags_land_in_nonlinear_block() {
        // Samples at the end of the circular buffer are negative lags
        let mut response = vec![0.0; 8];
        response[7] = 0.5;
        let result = deconvolve_sweep(&response, &unit_inverse(8)).unwrap();

        assert!((result.nonlinear[3] - 0.5).abs() < 1e-12);
        assert!(result.linear.iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn test_rejects_long_response() {
        let err = deconvolve_sweep(&[0.0; 9], &unit_inverse(8)).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_rejects_empty_response() {
        let err = deconvolve_sweep(&[], &unit_inverse(8)).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_linear_peak() {
        let result = Deconvolution {
            linear: vec![0.1, -0.9, 0.5],
            nonlinear: vec![],
        };
        assert_eq!(result.linear_peak(), Some((1, -0.9)));

        let empty = Deconvolution {
            linear: vec![],
            nonlinear: vec![],
        };
        assert_eq!(empty.linear_peak(), None);
    }
}
