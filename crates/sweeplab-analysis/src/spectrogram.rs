//! STFT-based spectrogram generation
//!
//! Frames are centered: the signal is zero-padded by half a frame on each
//! side, so frame `i` is centered on sample `i * hop_size`.

use crate::fft::{Fft, Window};

/// Spectrogram data structure
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// 2D magnitude data `[time_frame][frequency_bin]`
    pub data: Vec<Vec<f64>>,
    /// FFT size used
    pub fft_size: usize,
    /// Hop size between frames
    pub hop_size: usize,
    /// Sample rate
    pub sample_rate: f64,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins (fft_size / 2 + 1)
    pub num_bins: usize,
}

impl Spectrogram {
    /// Get frequency in Hz for a given bin index
    pub fn bin_to_freq(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.fft_size as f64
    }

    /// Get magnitude values across time for a specific frequency bin
    pub fn get_bin_over_time(&self, bin: usize) -> Vec<f64> {
        self.data
            .iter()
            .filter_map(|frame| frame.get(bin).copied())
            .collect()
    }
}

/// STFT (Short-Time Fourier Transform) analyzer
pub struct StftAnalyzer {
    fft_size: usize,
    hop_size: usize,
    sample_rate: f64,
    fft: Fft,
    window_coeffs: Vec<f64>,
}

impl StftAnalyzer {
    /// Create a new STFT analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `fft_size` - FFT size, non-zero
    /// * `hop_size` - Hop size between frames, non-zero
    /// * `window` - Window function to use
    pub fn new(sample_rate: f64, fft_size: usize, hop_size: usize, window: Window) -> Self {
        let fft = Fft::new(fft_size);
        let window_coeffs = window.coefficients(fft_size);

        Self {
            fft_size,
            hop_size,
            sample_rate,
            fft,
            window_coeffs,
        }
    }

    /// Compute spectrogram from audio signal
    pub fn analyze(&self, signal: &[f64]) -> Spectrogram {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0; signal.len() + 2 * pad];
        padded[pad..pad + signal.len()].copy_from_slice(signal);

        let num_frames = if padded.len() >= self.fft_size {
            (padded.len() - self.fft_size) / self.hop_size + 1
        } else {
            0
        };
        let num_bins = self.fft_size / 2 + 1;

        let data = (0..num_frames)
            .map(|frame| {
                let start = frame * self.hop_size;
                let windowed: Vec<f64> = padded[start..start + self.fft_size]
                    .iter()
                    .zip(&self.window_coeffs)
                    .map(|(x, w)| x * w)
                    .collect();

                let spectrum = self.fft.forward(&windowed);
                spectrum[..num_bins].iter().map(|c| c.norm()).collect()
            })
            .collect();

        Spectrogram {
            data,
            fft_size: self.fft_size,
            hop_size: self.hop_size,
            sample_rate: self.sample_rate,
            num_frames,
            num_bins,
        }
    }
}
