//! Channel response estimation from a recording
//!
//! The recording is level-normalized, pre-emphasized and cut into
//! overlapping analysis windows. For each window the log-magnitude STFT is
//! averaged over frames, bin by bin. Frame values above a threshold are
//! left out of the average, so loud passages do not mask the channel's
//! own coloration. A bin with no frame under the threshold has no level.

use crate::compare::normalize_rms;
use crate::error::{AnalysisError, Result};
use crate::fft::Window;
use crate::spectrogram::StftAnalyzer;

/// Default pre-emphasis coefficient
pub const PREEMPHASIS: f64 = 0.97;

/// Offset added to magnitudes before taking the logarithm
pub const LOG_OFFSET: f64 = 1e-9;

/// Channel response analysis settings
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelParams {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Analysis window length in seconds
    pub window_secs: f64,
    /// Overlap between consecutive windows in seconds
    pub overlap_secs: f64,
    /// Frame levels above this value (dB) are excluded from the mean
    pub threshold_db: f64,
    /// RMS level the recording is normalized to, `10 * log10(rms)`
    pub rms_db: f64,
    /// Pre-emphasis coefficient, 0 disables it
    pub preemphasis: f64,
    /// STFT frame length
    pub fft_size: usize,
    /// STFT hop
    pub hop_size: usize,
    /// STFT window function
    pub window: Window,
}

impl ChannelParams {
    /// Default settings at the given sample rate
    ///
    /// 4 s windows overlapping by 0.2 s, a 0 dB threshold, 0 dB RMS,
    /// and 512-point Hamming frames with a hop of 256.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            window_secs: 4.0,
            overlap_secs: 0.2,
            threshold_db: 0.0,
            rms_db: 0.0,
            preemphasis: PREEMPHASIS,
            fft_size: 512,
            hop_size: 256,
            window: Window::Hamming,
        }
    }

    /// Set the analysis window and overlap lengths
    pub fn with_segments(mut self, window_secs: f64, overlap_secs: f64) -> Self {
        self.window_secs = window_secs;
        self.overlap_secs = overlap_secs;
        self
    }

    /// Set the exclusion threshold
    pub fn with_threshold(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    /// Set the STFT frame length, hop and window
    pub fn with_stft(mut self, fft_size: usize, hop_size: usize, window: Window) -> Self {
        self.fft_size = fft_size;
        self.hop_size = hop_size;
        self.window = window;
        self
    }

    /// Check the settings and return `(window, overlap)` in samples
    pub fn segment_samples(&self) -> Result<(usize, usize)> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(AnalysisError::invalid("sample_rate", "must be positive"));
        }
        if !self.rms_db.is_finite() {
            return Err(AnalysisError::invalid("rms_db", "must be finite"));
        }
        if !self.preemphasis.is_finite() {
            return Err(AnalysisError::invalid("preemphasis", "must be finite"));
        }
        if self.threshold_db.is_nan() {
            return Err(AnalysisError::invalid("threshold_db", "must not be NaN"));
        }
        if self.fft_size == 0 {
            return Err(AnalysisError::invalid("fft_size", "must be non-zero"));
        }
        if self.hop_size == 0 {
            return Err(AnalysisError::invalid("hop_size", "must be non-zero"));
        }

        let window = (self.window_secs * self.sample_rate).floor();
        if !(window.is_finite() && window >= 1.0) {
            return Err(AnalysisError::invalid(
                "window_secs",
                "must span at least one sample",
            ));
        }
        let overlap = (self.overlap_secs * self.sample_rate).floor();
        if !(overlap.is_finite() && overlap >= 0.0 && overlap < window) {
            return Err(AnalysisError::invalid(
                "overlap_secs",
                "must be non-negative and shorter than the window",
            ));
        }

        Ok((window as usize, overlap as usize))
    }
}

/// Mean log-magnitude spectrum of one analysis window
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelWindow {
    /// First sample of the window in the recording
    pub start: usize,
    /// Mean level per bin in dB, `None` where every frame was excluded
    pub levels_db: Vec<Option<f64>>,
}

impl ChannelWindow {
    /// Levels with missing bins filled by linear interpolation
    ///
    /// Bins before the first or after the last known level take that
    /// level. Returns `None` if no bin has a level.
    pub fn interpolated(&self) -> Option<Vec<f64>> {
        let known: Vec<(usize, f64)> = self
            .levels_db
            .iter()
            .enumerate()
            .filter_map(|(bin, level)| level.map(|db| (bin, db)))
            .collect();
        let (&(first_bin, first_db), &(last_bin, last_db)) = (known.first()?, known.last()?);

        let mut next = 0;
        let filled = (0..self.levels_db.len())
            .map(|bin| {
                if bin <= first_bin {
                    return first_db;
                }
                if bin >= last_bin {
                    return last_db;
                }
                while known[next + 1].0 < bin {
                    next += 1;
                }
                let (b0, v0) = known[next];
                let (b1, v1) = known[next + 1];
                v0 + (v1 - v0) * (bin - b0) as f64 / (b1 - b0) as f64
            })
            .collect();
        Some(filled)
    }
}

/// Per-window channel response of a recording
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResponse {
    /// Center frequency of each bin in Hz
    pub frequencies: Vec<f64>,
    /// One entry per analysis window, in recording order
    pub windows: Vec<ChannelWindow>,
}

/// First-order pre-emphasis `y[n] = x[n] - coef * x[n - 1]`
///
/// The sample before the start is extrapolated linearly from the first
/// two, so a slowly varying signal has no onset transient.
pub fn preemphasis(signal: &[f64], coef: f64) -> Vec<f64> {
    let Some(&first) = signal.first() else {
        return Vec::new();
    };
    let before = signal.get(1).map_or(first, |&second| 2.0 * first - second);

    std::iter::once(before)
        .chain(signal.iter().copied())
        .zip(signal)
        .map(|(prev, &x)| x - coef * prev)
        .collect()
}

/// Estimate the channel response of a recording, one spectrum per window
///
/// Windows start every `window - overlap` samples; a trailing partial
/// window is dropped, so a recording shorter than one window yields no
/// windows.
///
/// # Errors
/// `InvalidParameter` for unusable settings, `NumericalInstability` if the
/// recording holds a NaN or infinite sample.
pub fn channel_response(signal: &[f64], params: &ChannelParams) -> Result<ChannelResponse> {
    let (window_len, overlap) = params.segment_samples()?;
    if let Some(index) = signal.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::unstable(format!(
            "recording sample {index} is not finite"
        )));
    }

    let step = window_len - overlap;
    let num_windows = signal.len().saturating_sub(overlap) / step;

    let emphasized = preemphasis(&normalize_rms(signal, params.rms_db), params.preemphasis);
    let stft = StftAnalyzer::new(
        params.sample_rate,
        params.fft_size,
        params.hop_size,
        params.window,
    );

    let mut frequencies = Vec::new();
    let windows = (0..num_windows)
        .map(|w| {
            let start = w * step;
            let spec = stft.analyze(&emphasized[start..start + window_len]);
            if frequencies.is_empty() {
                frequencies = (0..spec.num_bins).map(|bin| spec.bin_to_freq(bin)).collect();
            }

            let levels_db = (0..spec.num_bins)
                .map(|bin| {
                    let kept: Vec<f64> = spec
                        .get_bin_over_time(bin)
                        .into_iter()
                        .map(|mag| 20.0 * (LOG_OFFSET + mag).log10())
                        .filter(|&db| db <= params.threshold_db)
                        .collect();
                    (!kept.is_empty()).then(|| kept.iter().sum::<f64>() / kept.len() as f64)
                })
                .collect();

            ChannelWindow { start, levels_db }
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        samples = signal.len(),
        num_windows,
        window_len,
        overlap,
        "channel response estimated"
    );

    Ok(ChannelResponse {
        frequencies,
        windows,
    })
}
