//! Measurement file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;
use sweeplab_analysis::sweep::{GUARD_MAX_FRACTION, GUARD_MIN_FRACTION};
use sweeplab_analysis::{ChannelParams, GuardBounds, SweepParams, SweepSpectrum};

use crate::error::ConfigError;

/// Measurement settings for one device under test.
///
/// # TOML Format
///
/// ```toml
/// name = "Hall, seat 12"
/// description = "Omni mic at ear height"
///
/// [sweep]
/// duration_secs = 5.0
/// sample_rate = 44100
/// start_freq = 20.0
/// end_freq = 20000.0
/// tail_samples = 44100
/// spectrum = "pink"
///
/// [noise]
/// fft_size = 262144
///
/// [channel]
/// window_secs = 4.0
/// overlap_secs = 0.2
/// threshold_db = 0.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementConfig {
    /// Name of the measurement.
    pub name: String,

    /// Optional description of the setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sweep excitation settings.
    pub sweep: SweepConfig,

    /// Optional white-noise comparison run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseConfig>,

    /// Optional channel response analysis of recordings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelConfig>,
}

/// Sweep excitation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Total duration in seconds, fades and tail included.
    pub duration_secs: f64,

    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Start frequency in Hz.
    pub start_freq: f64,

    /// End frequency in Hz, below Nyquist.
    pub end_freq: f64,

    /// Trailing silence in samples.
    #[serde(default)]
    pub tail_samples: usize,

    /// Target magnitude shape.
    #[serde(default)]
    pub spectrum: SpectrumShape,

    /// Shortest fade region as a fraction of the total length.
    #[serde(default = "default_guard_min")]
    pub guard_min_fraction: f64,

    /// Longest fade region as a fraction of the total length.
    #[serde(default = "default_guard_max")]
    pub guard_max_fraction: f64,
}

fn default_guard_min() -> f64 {
    GUARD_MIN_FRACTION
}

fn default_guard_max() -> f64 {
    GUARD_MAX_FRACTION
}

/// Sweep magnitude shape as written in TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpectrumShape {
    /// Exponential sweep.
    #[default]
    Pink,
    /// Linear magnitude ramp across the band.
    LinearRamp,
}

impl From<SpectrumShape> for SweepSpectrum {
    fn from(shape: SpectrumShape) -> Self {
        match shape {
            SpectrumShape::Pink => SweepSpectrum::Pink,
            SpectrumShape::LinearRamp => SweepSpectrum::LinearRamp,
        }
    }
}

/// White-noise comparison settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoiseConfig {
    /// Transform length used for spectral division.
    pub fft_size: usize,
}

/// Channel response analysis settings.
///
/// Runs at the sweep's sample rate. Missing keys take the analysis defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    /// Analysis window length in seconds.
    pub window_secs: f64,
    /// Overlap between windows in seconds.
    pub overlap_secs: f64,
    /// Frame levels above this (dB) are left out of the mean.
    pub threshold_db: f64,
    /// Normalization level, `10 * log10(rms)`.
    pub rms_db: f64,
    /// STFT frame length.
    pub fft_size: usize,
    /// STFT hop.
    pub hop_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        let params = ChannelParams::new(1.0);
        Self {
            window_secs: params.window_secs,
            overlap_secs: params.overlap_secs,
            threshold_db: params.threshold_db,
            rms_db: params.rms_db,
            fft_size: params.fft_size,
            hop_size: params.hop_size,
        }
    }
}

impl ChannelConfig {
    /// Convert to analysis parameters at `sample_rate` without validating them.
    pub fn to_params(&self, sample_rate: u32) -> ChannelParams {
        let mut params = ChannelParams::new(f64::from(sample_rate))
            .with_segments(self.window_secs, self.overlap_secs)
            .with_threshold(self.threshold_db);
        params.rms_db = self.rms_db;
        params.fft_size = self.fft_size;
        params.hop_size = self.hop_size;
        params
    }
}

impl SweepConfig {
    /// Create sweep settings with default tail, spectrum and guards.
    pub fn new(duration_secs: f64, sample_rate: u32, start_freq: f64, end_freq: f64) -> Self {
        Self {
            duration_secs,
            sample_rate,
            start_freq,
            end_freq,
            tail_samples: 0,
            spectrum: SpectrumShape::Pink,
            guard_min_fraction: GUARD_MIN_FRACTION,
            guard_max_fraction: GUARD_MAX_FRACTION,
        }
    }

    /// Convert to synthesis parameters without validating them.
    pub fn to_params(&self) -> SweepParams {
        SweepParams::new(
            self.duration_secs,
            f64::from(self.sample_rate),
            self.start_freq,
            self.end_freq,
        )
        .with_tail(self.tail_samples)
        .with_spectrum(self.spectrum.into())
        .with_guard(GuardBounds::new(
            self.guard_min_fraction,
            self.guard_max_fraction,
        ))
    }
}

impl MeasurementConfig {
    /// Create a measurement with the given sweep and no noise run.
    pub fn new(name: impl Into<String>, sweep: SweepConfig) -> Self {
        Self {
            name: name.into(),
            description: None,
            sweep,
            noise: None,
            channel: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a white-noise comparison run.
    pub fn with_noise(mut self, fft_size: usize) -> Self {
        self.noise = Some(NoiseConfig { fft_size });
        self
    }

    /// Add channel response analysis.
    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Load and validate a measurement from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load and validate a measurement from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: MeasurementConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert the measurement to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every setting, including the sample layout of the sweep.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sweep_params()?;
        if let Some(noise) = &self.noise
            && noise.fft_size == 0
        {
            return Err(ConfigError::invalid_noise("fft_size must be non-zero"));
        }
        self.channel_params()?;
        Ok(())
    }

    /// Synthesis parameters for the sweep, checked by the analysis core.
    pub fn sweep_params(&self) -> Result<SweepParams, ConfigError> {
        let params = self.sweep.to_params();
        params.layout()?;
        Ok(params)
    }

    /// Channel analysis parameters at the sweep's sample rate, if configured.
    pub fn channel_params(&self) -> Result<Option<ChannelParams>, ConfigError> {
        let Some(channel) = &self.channel else {
            return Ok(None);
        };
        let params = channel.to_params(self.sweep.sample_rate);
        params.segment_samples()?;
        Ok(Some(params))
    }
}
