//! A/B comparison tools for validating extracted impulse responses
//!
//! The typical check: convolve a clean source with the extracted linear IR,
//! then compare the result against the same source recorded through the
//! device. [`best_shift`] absorbs the small alignment offset between the two,
//! and [`windowed_alignment`] tracks how that offset drifts over a long take.

/// Compute Mean Squared Error between two signals
pub fn mse(signal_a: &[f64], signal_b: &[f64]) -> f64 {
    let len = signal_a.len().min(signal_b.len());
    if len == 0 {
        return 0.0;
    }

    let sum: f64 = signal_a[..len]
        .iter()
        .zip(signal_b[..len].iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();

    sum / len as f64
}

/// Normalized mean squared error
///
/// Mean squared difference divided by the variance of `reference`.
/// Returns `None` for mismatched lengths, empty input, or a constant
/// reference.
pub fn nmse(signal: &[f64], reference: &[f64]) -> Option<f64> {
    if signal.len() != reference.len() || reference.is_empty() {
        return None;
    }

    let n = reference.len() as f64;
    let mean = reference.iter().sum::<f64>() / n;
    let variance = reference.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 {
        return None;
    }

    Some(mse(signal, reference) / variance)
}

/// [`nmse`] in dB
pub fn nmse_db(signal: &[f64], reference: &[f64]) -> Option<f64> {
    nmse(signal, reference).map(|e| 10.0 * e.log10())
}

/// Scale a signal to a target RMS level
///
/// `rms_db` is a power-style level: the target RMS is `10^(rms_db / 10)`,
/// so -20 gives an RMS of 0.01. Silent input is returned unchanged.
pub fn normalize_rms(signal: &[f64], rms_db: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let rms = (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt();
    if rms == 0.0 {
        return signal.to_vec();
    }

    let gain = 10.0f64.powf(rms_db / 10.0) / rms;
    signal.iter().map(|x| x * gain).collect()
}

/// Best alignment found by [`best_shift`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftMatch {
    /// Offset of `reconstructed` relative to `measured`, in samples
    pub shift: isize,
    /// NMSE at that offset, in dB
    pub nmse_db: f64,
}

/// Find the offset that best aligns a reconstruction with a measurement
///
/// The central region `[max_shift, len - max_shift)` of `measured` is
/// compared against `reconstructed` shifted by every offset in
/// `-max_shift..max_shift`; the offset with the lowest NMSE wins.
///
/// Returns `None` if the signals are shorter than `2 * max_shift + 1` or no
/// offset gives a defined NMSE.
pub fn best_shift(reconstructed: &[f64], measured: &[f64], max_shift: usize) -> Option<ShiftMatch> {
    let len = reconstructed.len().min(measured.len());
    if len <= 2 * max_shift {
        return None;
    }

    let target = &measured[max_shift..len - max_shift];
    let max = max_shift as isize;

    (-max..max)
        .filter_map(|shift| {
            let start = (max + shift) as usize;
            let window = &reconstructed[start..start + target.len()];
            nmse_db(window, target).map(|nmse_db| ShiftMatch { shift, nmse_db })
        })
        .min_by(|a, b| a.nmse_db.total_cmp(&b.nmse_db))
}

/// Per-window alignment of a long reconstruction, see [`windowed_alignment`]
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedAlignment {
    /// Best match for each window, `None` where no offset gave a defined NMSE
    pub matches: Vec<Option<ShiftMatch>>,
    /// Change of the offset per window, from the first to the last matched window
    pub slope: f64,
}

impl WindowedAlignment {
    /// Mean NMSE in dB over the matched windows
    pub fn mean_nmse_db(&self) -> Option<f64> {
        let matched: Vec<f64> = self.matches.iter().flatten().map(|m| m.nmse_db).collect();
        (!matched.is_empty()).then(|| matched.iter().sum::<f64>() / matched.len() as f64)
    }
}

/// Run [`best_shift`] on consecutive windows of `window_len` samples
///
/// The number of windows is `measured.len() / window_len`; each window is
/// cut from both signals at the same position. A steady clock offset
/// between playback and capture shows up as a non-zero `slope`.
///
/// Returns `None` if `window_len` is not longer than `2 * max_shift`, or if
/// the reconstruction does not cover every window.
pub fn windowed_alignment(
    reconstructed: &[f64],
    measured: &[f64],
    window_len: usize,
    max_shift: usize,
) -> Option<WindowedAlignment> {
    if window_len <= 2 * max_shift {
        return None;
    }
    let num_windows = measured.len() / window_len;
    if num_windows == 0 || reconstructed.len() < num_windows * window_len {
        return None;
    }

    let matches: Vec<Option<ShiftMatch>> = (0..num_windows)
        .map(|w| {
            let range = w * window_len..(w + 1) * window_len;
            best_shift(&reconstructed[range.clone()], &measured[range], max_shift)
        })
        .collect();

    let mut matched = matches.iter().flatten();
    let slope = match (matched.next(), matched.last()) {
        (Some(first), Some(last)) => (last.shift - first.shift) as f64 / num_windows as f64,
        _ => 0.0,
    };

    Some(WindowedAlignment { matches, slope })
}
