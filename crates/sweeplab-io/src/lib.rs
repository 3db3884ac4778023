//! Recording adapters for sweeplab measurements.
//!
//! This crate provides:
//!
//! - **WAV file reading**: [`read_wav`] and [`read_wav_info`] decode recordings
//!   into a mono `f64` buffer plus its sample rate
//! - **Measurement**: [`deconvolve_recording`] ties a recorded sweep response
//!   to the sweep that excited it, and [`recording_channel_response`]
//!   estimates the channel coloration of any recording
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sweeplab_analysis::SweepParams;
//! use sweeplab_io::deconvolve_recording;
//!
//! let sweep = SweepParams::new(5.0, 44100.0, 20.0, 20000.0).synthesize()?;
//!
//! // Play `sweep.samples` through the device and record "response.wav"
//!
//! let ir = deconvolve_recording("response.wav", &sweep)?;
//! println!("linear IR: {} samples", ir.linear.len());
//! ```

mod measure;
mod wav;

pub use measure::{deconvolve_recording, recording_channel_response};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info};

use sweeplab_analysis::AnalysisError;

/// Error types for recording I/O and measurement.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The recording was made at a different rate than expected.
    #[error("Sample rate mismatch: expected {expected} Hz, recording is {actual} Hz")]
    SampleRateMismatch {
        /// Sample rate of the sweep or analysis settings.
        expected: u32,
        /// Sample rate found in the recording.
        actual: u32,
    },

    /// Analysis of the decoded recording failed.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Convenience result type for recording I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
