//! Exponential sine sweep synthesis with a matched inverse filter
//!
//! The sweep is designed in the frequency domain: a band-limited target
//! magnitude is chosen first, and the group delay is derived from it so that
//! the energy of every frequency bin is spread uniformly over the sweep
//! duration (Müller's constant-envelope method). With the default pink
//! magnitude this yields an exponential sweep; any other magnitude still
//! yields a constant time envelope.
//!
//! The spectrum is built on a `2N`-point grid, inverse transformed, faded in
//! and out, and truncated to the first `N` samples. The inverse spectrum is
//! the exact reciprocal of the resulting sweep's `2N`-point transform,
//! re-band-limited so gain stays bounded outside the excited band.

use crate::error::{AnalysisError, Result};
use crate::fft::Fft;
use crate::filter::BandLimit;
use crate::group_delay::integrate_group_delay;
use rustfft::num_complex::Complex;
use std::f64::consts::{PI, TAU};

/// Upper bound of a guard region, as a fraction of the total sweep length.
pub const GUARD_MAX_FRACTION: f64 = 1.0 / 10.0;

/// Lower bound of a guard region, as a fraction of the total sweep length.
pub const GUARD_MIN_FRACTION: f64 = 1.0 / 200.0;

/// Largest imaginary residual of the synthesis inverse transform, relative
/// to the real peak, before the spectrum is considered non-Hermitian.
pub const IMAG_RESIDUAL_TOLERANCE: f64 = 1e-9;

const RAMP_START: f64 = 0.1;
const RAMP_END: f64 = 1.0;

/// Bounds for the fade-in (start group delay) and fade-out regions
///
/// Each region is nominally one period of its band edge (`1/f1` at the
/// start, `1/f2` at the end), clamped to `[min_fraction, max_fraction]` of
/// the total length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardBounds {
    /// Minimum region length as a fraction of the sweep length
    pub min_fraction: f64,
    /// Maximum region length as a fraction of the sweep length
    pub max_fraction: f64,
}

impl Default for GuardBounds {
    fn default() -> Self {
        Self {
            min_fraction: GUARD_MIN_FRACTION,
            max_fraction: GUARD_MAX_FRACTION,
        }
    }
}

impl GuardBounds {
    /// Create guard bounds from explicit fractions.
    pub fn new(min_fraction: f64, max_fraction: f64) -> Self {
        Self {
            min_fraction,
            max_fraction,
        }
    }

    /// Guard length in samples for one period of `freq`.
    pub fn guard_samples(&self, num_samples: usize, sample_rate: f64, freq: f64) -> usize {
        let n = num_samples as f64;
        (sample_rate / freq)
            .max(n * self.min_fraction)
            .min(n * self.max_fraction)
            .ceil() as usize
    }

    fn validate(&self) -> Result<()> {
        if !(self.min_fraction.is_finite() && self.min_fraction > 0.0) {
            return Err(AnalysisError::invalid(
                "guard.min_fraction",
                format!("must be positive, got {}", self.min_fraction),
            ));
        }
        if !(self.max_fraction.is_finite()
            && self.max_fraction >= self.min_fraction
            && self.max_fraction < 0.5)
        {
            return Err(AnalysisError::invalid(
                "guard.max_fraction",
                format!(
                    "must lie in [{}, 0.5), got {}",
                    self.min_fraction, self.max_fraction
                ),
            ));
        }
        Ok(())
    }
}

/// Target magnitude shape of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepSpectrum {
    /// `sqrt(f1/f)` pink slope: an exponential sweep
    #[default]
    Pink,
    /// Linear ramp from 0.1 at `f1` to 1.0 at `f2`, held flat outside the band
    LinearRamp,
}

/// Parameters for sweep synthesis
///
/// # Example
/// ```
/// use sweeplab_analysis::sweep::{SweepParams, SweepSpectrum};
///
/// let params = SweepParams::new(0.5, 16000.0, 50.0, 7000.0)
///     .with_tail(800)
///     .with_spectrum(SweepSpectrum::Pink);
/// let sweep = params.synthesize().unwrap();
/// assert_eq!(sweep.samples.len(), 8000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParams {
    /// Total duration in seconds (including guard regions and tail)
    pub duration_secs: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Start frequency in Hz
    pub start_freq: f64,
    /// End frequency in Hz
    pub end_freq: f64,
    /// Trailing silence in samples, left for the system response to decay
    pub tail_samples: usize,
    /// Target magnitude shape
    pub spectrum: SweepSpectrum,
    /// Fade region bounds
    pub guard: GuardBounds,
}

impl SweepParams {
    /// Create sweep parameters with no tail, pink spectrum and default guards
    ///
    /// # Arguments
    /// * `duration_secs` - Total duration in seconds
    /// * `sample_rate` - Sample rate in Hz
    /// * `start_freq` - Start frequency in Hz
    /// * `end_freq` - End frequency in Hz (below Nyquist)
    pub fn new(duration_secs: f64, sample_rate: f64, start_freq: f64, end_freq: f64) -> Self {
        Self {
            duration_secs,
            sample_rate,
            start_freq,
            end_freq,
            tail_samples: 0,
            spectrum: SweepSpectrum::Pink,
            guard: GuardBounds::default(),
        }
    }

    /// Set the trailing silence in samples.
    pub fn with_tail(mut self, tail_samples: usize) -> Self {
        self.tail_samples = tail_samples;
        self
    }

    /// Set the target magnitude shape.
    pub fn with_spectrum(mut self, spectrum: SweepSpectrum) -> Self {
        self.spectrum = spectrum;
        self
    }

    /// Set the fade region bounds.
    pub fn with_guard(mut self, guard: GuardBounds) -> Self {
        self.guard = guard;
        self
    }

    /// Check parameter ranges without allocating anything.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(AnalysisError::invalid(
                "sample_rate",
                format!("must be positive, got {}", self.sample_rate),
            ));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(AnalysisError::invalid(
                "duration_secs",
                format!("must be positive, got {}", self.duration_secs),
            ));
        }
        if !(self.start_freq.is_finite() && self.start_freq > 0.0) {
            return Err(AnalysisError::invalid(
                "start_freq",
                format!("must be positive, got {}", self.start_freq),
            ));
        }
        if !(self.end_freq.is_finite() && self.end_freq > self.start_freq) {
            return Err(AnalysisError::invalid(
                "end_freq",
                format!(
                    "must exceed start_freq {}, got {}",
                    self.start_freq, self.end_freq
                ),
            ));
        }
        if self.end_freq >= self.sample_rate / 2.0 {
            return Err(AnalysisError::invalid(
                "end_freq",
                format!(
                    "must be below Nyquist {}, got {}",
                    self.sample_rate / 2.0,
                    self.end_freq
                ),
            ));
        }
        self.guard.validate()
    }

    /// Compute the sample layout of the sweep.
    pub fn layout(&self) -> Result<SweepLayout> {
        self.validate()?;

        let num_samples = (self.duration_secs * self.sample_rate).round() as usize;
        if num_samples < 2 {
            return Err(AnalysisError::invalid(
                "duration_secs",
                format!("{} s is shorter than two samples", self.duration_secs),
            ));
        }

        // Lowest usable bin of the 2N-point grid
        let start_freq = self
            .start_freq
            .max(self.sample_rate / (2.0 * num_samples as f64));
        if start_freq >= self.end_freq {
            return Err(AnalysisError::invalid(
                "start_freq",
                format!(
                    "raised to the first bin {start_freq} Hz, which is not below end_freq {}",
                    self.end_freq
                ),
            ));
        }

        let start_delay = self
            .guard
            .guard_samples(num_samples, self.sample_rate, start_freq);
        let fade_out = self
            .guard
            .guard_samples(num_samples, self.sample_rate, self.end_freq);

        let reserved = self.tail_samples + start_delay + fade_out;
        if reserved >= num_samples {
            let name = if self.tail_samples > 0 {
                "tail_samples"
            } else {
                "duration_secs"
            };
            return Err(AnalysisError::invalid(
                name,
                format!(
                    "tail {} + fade-in {start_delay} + fade-out {fade_out} leave no room in {num_samples} samples",
                    self.tail_samples
                ),
            ));
        }

        let sweep_samples = num_samples - reserved;
        let sweep_rate =
            (self.end_freq / start_freq).log2() / (sweep_samples as f64 / self.sample_rate);

        Ok(SweepLayout {
            num_samples,
            sample_rate: self.sample_rate,
            start_freq,
            end_freq: self.end_freq,
            start_delay,
            fade_out,
            sweep_samples,
            sweep_rate,
        })
    }

    /// Synthesize the sweep and its inverse spectrum.
    pub fn synthesize(&self) -> Result<SynthesizedSweep> {
        synthesize(self)
    }
}

/// Sample layout of a sweep
///
/// ```text
/// | fade-in (start_delay) | sweep (sweep_samples) | fade-out | tail |
/// 0                                                                 N
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepLayout {
    /// Total length `N` in samples
    pub num_samples: usize,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Effective start frequency (raised to the first usable bin if needed)
    pub start_freq: f64,
    /// End frequency in Hz
    pub end_freq: f64,
    /// Start group delay in samples; also the fade-in length
    pub start_delay: usize,
    /// Fade-out length in samples
    pub fade_out: usize,
    /// Length of the swept region in samples
    pub sweep_samples: usize,
    /// Octaves per second over the swept region
    pub sweep_rate: f64,
}

impl SweepLayout {
    /// Duration of the swept region in seconds.
    pub fn sweep_duration_secs(&self) -> f64 {
        self.sweep_samples as f64 / self.sample_rate
    }

    /// Transform length used for synthesis and deconvolution (`2N`).
    pub fn fft_size(&self) -> usize {
        2 * self.num_samples
    }

    /// Index of the first fade-out sample.
    pub fn sweep_end(&self) -> usize {
        self.start_delay + self.sweep_samples
    }
}

/// Inverse spectrum matched to one synthesized sweep
///
/// Only meaningful together with the sweep that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseSpectrum {
    bins: Vec<Complex<f64>>,
}

impl InverseSpectrum {
    /// Wrap externally computed inverse bins.
    ///
    /// The length must be non-zero and even, since deconvolution splits the
    /// result into two equal halves.
    pub fn from_bins(bins: Vec<Complex<f64>>) -> Result<Self> {
        if bins.is_empty() || !bins.len().is_multiple_of(2) {
            return Err(AnalysisError::mismatch(format!(
                "inverse spectrum needs a non-zero even length, got {}",
                bins.len()
            )));
        }
        Ok(Self { bins })
    }

    /// Number of bins (the deconvolution transform size).
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Borrow the bins.
    pub fn as_slice(&self) -> &[Complex<f64>] {
        &self.bins
    }

    /// Take ownership of the bins.
    pub fn into_inner(self) -> Vec<Complex<f64>> {
        self.bins
    }
}

/// Output of [`synthesize`]
#[derive(Debug, Clone)]
pub struct SynthesizedSweep {
    /// Sweep samples, peak-normalized to 1.0
    pub samples: Vec<f64>,
    /// Matched inverse spectrum (`2N` bins)
    pub inverse: InverseSpectrum,
    /// Octaves per second over the swept region
    pub sweep_rate: f64,
    /// Layout the sweep was built with
    pub layout: SweepLayout,
}

/// Synthesize a sweep, its inverse spectrum and its sweep rate
///
/// # Example
/// ```
/// use sweeplab_analysis::sweep::{synthesize, SweepParams};
///
/// let sweep = synthesize(&SweepParams::new(0.25, 8000.0, 50.0, 3500.0)).unwrap();
/// let peak = sweep.samples.iter().fold(0.0f64, |m, x| m.max(x.abs()));
/// assert!((peak - 1.0).abs() < 1e-12);
/// ```
pub fn synthesize(params: &SweepParams) -> Result<SynthesizedSweep> {
    let layout = params.layout()?;
    let n = layout.num_samples;
    let fft_size = layout.fft_size();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        num_samples = n,
        start_delay = layout.start_delay,
        fade_out = layout.fade_out,
        sweep_samples = layout.sweep_samples,
        sweep_rate = layout.sweep_rate,
        "sweep layout"
    );

    let band = BandLimit::new(layout.start_freq, layout.end_freq, layout.sample_rate);
    let magnitude = target_magnitude(&layout, params.spectrum, &band);
    let group_delay = constant_envelope_group_delay(&layout, &magnitude);

    let mut phase = integrate_group_delay(&group_delay);
    // Nyquist phase onto a multiple of 2π so the spectrum mirrors cleanly
    let residual = phase[n].rem_euclid(TAU);
    for (k, p) in phase.iter_mut().enumerate() {
        *p -= residual * k as f64 / n as f64;
    }

    let mut spectrum: Vec<Complex<f64>> = Vec::with_capacity(fft_size);
    spectrum.extend(
        magnitude
            .iter()
            .zip(phase.iter())
            .map(|(&m, &p)| Complex::from_polar(m, p)),
    );
    for k in n + 1..fft_size {
        let mirrored = spectrum[fft_size - k].conj();
        spectrum.push(mirrored);
    }

    let fft = Fft::new(fft_size);
    fft.inverse_complex(&mut spectrum);
    check_real(&spectrum)?;

    let mut samples: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
    apply_fades(&mut samples, &layout);
    samples.truncate(n);

    let peak = samples.iter().fold(0.0f64, |m, &x| m.max(x.abs()));
    if !(peak.is_finite() && peak > 0.0) {
        return Err(AnalysisError::unstable(format!(
            "sweep peak is {peak} after windowing"
        )));
    }
    for s in &mut samples {
        *s /= peak;
    }

    let inverse = inverse_spectrum(&fft, &samples, &band);

    Ok(SynthesizedSweep {
        samples,
        inverse,
        sweep_rate: layout.sweep_rate,
        layout,
    })
}

/// Target magnitude over the `N + 1` one-sided bins of the `2N` grid
fn target_magnitude(layout: &SweepLayout, shape: SweepSpectrum, band: &BandLimit) -> Vec<f64> {
    let n = layout.num_samples;
    let bin_hz = layout.sample_rate / layout.fft_size() as f64;

    (0..=n)
        .map(|k| {
            let freq = k as f64 * bin_hz;
            let base = match shape {
                // DC borrows the first bin's value; the high-pass zeroes it anyway
                SweepSpectrum::Pink => (layout.start_freq / freq.max(bin_hz)).sqrt(),
                SweepSpectrum::LinearRamp => {
                    linear_ramp(freq, layout.start_freq, layout.end_freq)
                }
            };
            base * band.magnitude(PI * k as f64 / n as f64)
        })
        .collect()
}

fn linear_ramp(freq: f64, start_freq: f64, end_freq: f64) -> f64 {
    let t = ((freq - start_freq) / (end_freq - start_freq)).clamp(0.0, 1.0);
    RAMP_START + t * (RAMP_END - RAMP_START)
}

/// Group delay that places each bin's share of energy uniformly in time
///
/// Returned in the bin-scaled sample units expected by
/// [`integrate_group_delay`] on an `N + 1` bin grid of a `2N` transform.
fn constant_envelope_group_delay(layout: &SweepLayout, magnitude: &[f64]) -> Vec<f64> {
    let total_energy: f64 = magnitude.iter().map(|m| m * m).sum();
    let secs_per_energy = layout.sweep_duration_secs() / total_energy;
    let start_secs = layout.start_delay as f64 / layout.sample_rate;
    let to_samples = layout.sample_rate * magnitude.len() as f64 / layout.fft_size() as f64;

    let mut cumulative = 0.0;
    magnitude
        .iter()
        .map(|&m| {
            cumulative += m * m;
            (secs_per_energy * cumulative + start_secs) * to_samples
        })
        .collect()
}

fn check_real(signal: &[Complex<f64>]) -> Result<()> {
    let mut max_re = 0.0f64;
    let mut max_im = 0.0f64;
    for c in signal {
        if !(c.re.is_finite() && c.im.is_finite()) {
            return Err(AnalysisError::unstable(
                "non-finite sample in the inverse transform of the sweep spectrum",
            ));
        }
        max_re = max_re.max(c.re.abs());
        max_im = max_im.max(c.im.abs());
    }

    if max_re == 0.0 {
        return Err(AnalysisError::unstable(
            "inverse transform of the sweep spectrum is silent",
        ));
    }
    let residual = max_im / max_re;
    if residual > IMAG_RESIDUAL_TOLERANCE {
        return Err(AnalysisError::unstable(format!(
            "imaginary residual {residual:.3e} exceeds {IMAG_RESIDUAL_TOLERANCE:.0e}; spectrum is not conjugate-symmetric"
        )));
    }
    Ok(())
}

/// Half-Hann fade-in over the start delay, half-Hann fade-out after the
/// swept region, silence afterwards.
fn apply_fades(samples: &mut [f64], layout: &SweepLayout) {
    let fade_in = layout.start_delay;
    for (i, s) in samples[..fade_in].iter_mut().enumerate() {
        *s *= 0.5 * (1.0 - (PI * i as f64 / fade_in as f64).cos());
    }

    let start = layout.sweep_end();
    let fade_out = layout.fade_out;
    for (i, s) in samples[start..start + fade_out].iter_mut().enumerate() {
        *s *= 0.5 * (1.0 + (PI * i as f64 / fade_out as f64).cos());
    }

    samples[start + fade_out..].fill(0.0);
}

/// Reciprocal of the sweep's `2N`-point spectrum, re-band-limited
fn inverse_spectrum(fft: &Fft, samples: &[f64], band: &BandLimit) -> InverseSpectrum {
    let size = fft.size() as f64;
    let bins = fft
        .forward(samples)
        .into_iter()
        .enumerate()
        .map(|(k, x)| {
            let gain = band.magnitude(TAU * k as f64 / size);
            if gain == 0.0 || x.norm_sqr() < f64::MIN_POSITIVE {
                Complex::new(0.0, 0.0)
            } else {
                x.inv().scale(gain)
            }
        })
        .collect();

    InverseSpectrum { bins }
}
