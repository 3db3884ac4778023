//! FFT wrapper, window functions and convolution

use rustfft::{FftPlanner, num_complex::Complex};
use std::f64::consts::PI;
use std::sync::Arc;

/// Window function type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (good general purpose)
    Hann,
    /// Hamming window
    #[default]
    Hamming,
}

impl Window {
    /// Periodic window coefficients
    ///
    /// The period equals `size`, so overlapping frames at half the size add
    /// up to a constant (Hann) or near-constant (Hamming) gain.
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        let n = size as f64;
        (0..size)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / n;
                match self {
                    Window::Rectangular => 1.0,
                    Window::Hann => 0.5 * (1.0 - phase.cos()),
                    Window::Hamming => 0.54 - 0.46 * phase.cos(),
                }
            })
            .collect()
    }
}

/// FFT processor with caching
///
/// Holds a forward and an inverse plan for one transform size. All
/// transforms are full complex transforms: real input is promoted to
/// complex and the full (two-sided) spectrum is returned.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT on real input
    ///
    /// Input is zero-padded (or truncated) to the FFT size. Returns all
    /// `size` bins, DC first.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);
        buffer
    }

    /// Perform inverse FFT on complex buffer (in-place)
    pub fn inverse_complex(&self, buffer: &mut [Complex<f64>]) {
        self.ifft.process(buffer);

        // Normalize
        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// Inverse FFT of a full spectrum, keeping only the real part
    pub fn inverse_real(&self, spectrum: &[Complex<f64>]) -> Vec<f64> {
        let mut buffer = spectrum.to_vec();
        buffer.resize(self.size, Complex::new(0.0, 0.0));
        self.inverse_complex(&mut buffer);
        buffer.iter().map(|c| c.re).collect()
    }
}

/// Full linear convolution of two real signals via FFT
///
/// Output length is `a.len() + b.len() - 1`, or empty if either input is empty.
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let out_len = a.len() + b.len() - 1;
    let fft = Fft::new(out_len.next_power_of_two());

    let mut spec_a = fft.forward(a);
    let spec_b = fft.forward(b);
    for (x, y) in spec_a.iter_mut().zip(spec_b.iter()) {
        *x *= *y;
    }

    let mut out = fft.inverse_real(&spec_a);
    out.truncate(out_len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_roundtrip() {
        let fft = Fft::new(256);

        let input: Vec<f64> = (0..256)
            .map(|i| (2.0 * PI * 10.0 * i as f64 / 256.0).sin())
            .collect();

        let spectrum = fft.forward(&input);
        assert_eq!(spectrum.len(), 256);
        let reconstructed = fft.inverse_real(&spectrum);

        for (a, b) in input.iter().zip(reconstructed.iter()) {
            assert!((a - b).abs() < 1e-12, "Mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);

        let dc_mag = spectrum[0].norm();
        let other_mag: f64 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!((dc_mag - 256.0).abs() < 1e-9);
        assert!(other_mag < 1e-9);
    }

    #[test]
    fn test_forward_pads_and_truncates() {
        let fft = Fft::new(4);
        let padded = fft.forward(&[1.0]);
        assert!(padded.iter().all(|c| (c.re - 1.0).abs() < 1e-12 && c.im.abs() < 1e-12));

        let truncated = fft.forward(&[1.0, 0.0, 0.0, 0.0, 5.0, 5.0]);
        assert!((truncated[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_coefficients() {
        let hamming = Window::Hamming.coefficients(8);
        assert!((hamming[0] - 0.08).abs() < 1e-12);
        assert!((hamming[4] - 1.0).abs() < 1e-12);
        // Periodic: symmetric about the centre, last sample not repeated
        assert!((hamming[1] - hamming[7]).abs() < 1e-12);

        let hann = Window::Hann.coefficients(8);
        assert_eq!(hann[0], 0.0);
        assert!((hann[2] - 0.5).abs() < 1e-12);

        assert!(Window::Rectangular.coefficients(5).iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_hann_overlap_adds_to_constant() {
        let w = Window::Hann.coefficients(16);
        for i in 0..8 {
            assert!((w[i] + w[i + 8] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_convolve_matches_direct() {
        let a = [1.0, 2.0, 3.0];
        let b = [0.5, -1.0];
        let out = convolve(&a, &b);
        let expected = [0.5, 0.0, -0.5, -3.0];
        assert_eq!(out.len(), expected.len());
        for (x, y) in out.iter().zip(expected.iter()) {
            assert!((x - y).abs() < 1e-12, "{x} vs {y}");
        }
    }

    #[test]
    fn test_convolve_empty() {
        assert!(convolve(&[], &[1.0]).is_empty());
        assert!(convolve(&[1.0], &[]).is_empty());
    }
}
