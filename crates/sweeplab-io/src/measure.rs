//! Analysis of recordings read from disk.

use crate::{Error, Result, WavSpec, read_wav};
use std::path::Path;
use sweeplab_analysis::{
    ChannelParams, ChannelResponse, Deconvolution, SynthesizedSweep, channel_response,
    deconvolve_sweep,
};

/// Read a mono mixdown of `path`, rejecting any other sample rate.
fn read_at_rate(path: &Path, sample_rate: f64) -> Result<(Vec<f64>, WavSpec)> {
    let (samples, spec) = read_wav(path)?;

    let expected = sample_rate.round() as u32;
    if spec.sample_rate != expected {
        tracing::warn!(
            path = %path.display(),
            expected,
            actual = spec.sample_rate,
            "recording sample rate does not match"
        );
        return Err(Error::SampleRateMismatch {
            expected,
            actual: spec.sample_rate,
        });
    }

    Ok((samples, spec))
}

/// Read a recorded sweep response and split it into linear and non-linear IRs
///
/// The recording is mixed to mono and must share the sweep's sample rate.
/// It may be longer than the sweep (reverberant tail) but not longer than
/// the sweep's inverse spectrum.
pub fn deconvolve_recording<P: AsRef<Path>>(
    path: P,
    sweep: &SynthesizedSweep,
) -> Result<Deconvolution> {
    let path = path.as_ref();
    let (samples, spec) = read_at_rate(path, sweep.layout.sample_rate)?;

    tracing::info!(
        path = %path.display(),
        samples = samples.len(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        "deconvolving recording"
    );

    deconvolve_sweep(&samples, &sweep.inverse).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "recording rejected");
        Error::from(e)
    })
}

/// Read a recording and estimate its channel response window by window
///
/// The recording is mixed to mono and must be at `params.sample_rate`.
pub fn recording_channel_response<P: AsRef<Path>>(
    path: P,
    params: &ChannelParams,
) -> Result<ChannelResponse> {
    let path = path.as_ref();
    let (samples, _) = read_at_rate(path, params.sample_rate)?;

    let response = channel_response(&samples, params).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "channel analysis failed");
        Error::from(e)
    })?;

    tracing::info!(
        path = %path.display(),
        samples = samples.len(),
        windows = response.windows.len(),
        "channel response estimated"
    );
    Ok(response)
}
