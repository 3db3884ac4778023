//! Sweeplab Analysis - Swept-sine system identification
//!
//! This crate measures impulse responses of audio systems:
//!
//! - [`sweep`] - Exponential sine sweep synthesis with a matched inverse filter
//! - [`deconvolve`] - Split a recorded sweep response into linear and non-linear IRs
//! - [`noise`] - Transfer function estimation from a white-noise excitation
//! - [`channel`] - Per-window channel response of a recording
//! - [`spectrogram`] - Centered STFT analysis
//! - [`group_delay`] - Group delay to phase integration
//! - [`filter`] - Biquad band-limit magnitude responses
//! - [`fft`] - FFT wrapper, window functions and convolution
//! - [`compare`] - A/B comparison tools (MSE, NMSE, alignment and drift)
//!
//! ## Example Workflow
//!
//! ```rust
//! use sweeplab_analysis::{deconvolve_sweep, fft::convolve, SweepParams};
//!
//! // 1. Generate the excitation
//! let sweep = SweepParams::new(0.5, 16000.0, 20.0, 7500.0).synthesize().unwrap();
//!
//! // 2. Play it through the device under test (here: a two-tap echo)
//! let recording = convolve(&sweep.samples, &[1.0, 0.0, 0.0, 0.5]);
//!
//! // 3. Deconvolve
//! let ir = deconvolve_sweep(&recording[..sweep.samples.len()], &sweep.inverse).unwrap();
//! let (index, _) = ir.linear_peak().unwrap();
//! assert_eq!(index, 0);
//! println!("sweep rate: {:.2} octaves/s", sweep.sweep_rate);
//! ```
//!
//! ## Noise Excitation
//!
//! ```rust
//! use sweeplab_analysis::{deconvolve_noise, white_noise, fft::convolve};
//!
//! let excitation = white_noise(1024, 1.0, 1);
//! let response = convolve(&excitation, &[0.5, 0.25]);
//! let ir = deconvolve_noise(&excitation, &response, response.len()).unwrap();
//! assert!((ir[0] - 0.5).abs() < 1e-9);
//! ```

pub mod channel;
pub mod compare;
pub mod deconvolve;
pub mod error;
pub mod fft;
pub mod filter;
pub mod group_delay;
pub mod noise;
pub mod spectrogram;
pub mod sweep;

// Re-export main types
pub use channel::{ChannelParams, ChannelResponse, ChannelWindow, channel_response, preemphasis};
pub use compare::{
    ShiftMatch, WindowedAlignment, best_shift, mse, nmse, nmse_db, normalize_rms,
    windowed_alignment,
};
pub use deconvolve::{Deconvolution, deconvolve_sweep};
pub use error::{AnalysisError, Result};
pub use fft::{Fft, Window, convolve};
pub use group_delay::integrate_group_delay;
pub use noise::{WhiteNoise, deconvolve_noise, white_noise};
pub use spectrogram::{Spectrogram, StftAnalyzer};
pub use sweep::{
    GuardBounds, InverseSpectrum, SweepLayout, SweepParams, SweepSpectrum, SynthesizedSweep,
    synthesize,
};
