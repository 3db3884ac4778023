//! Measurement configuration for sweeplab.
//!
//! A measurement is described in a TOML file: the sweep excitation, an
//! optional white-noise comparison run and optional channel response
//! settings. Loading validates every value
//! against the analysis core, so a bad setting fails before anything is
//! played or recorded.
//!
//! # Example
//!
//! ```rust
//! use sweeplab_config::{MeasurementConfig, SweepConfig};
//!
//! let config = MeasurementConfig::new("Hall", SweepConfig::new(5.0, 44100, 20.0, 20000.0))
//!     .with_noise(1 << 18);
//! let params = config.sweep_params().unwrap();
//! assert_eq!(params.sample_rate, 44100.0);
//!
//! let parsed = MeasurementConfig::from_toml(&config.to_toml().unwrap()).unwrap();
//! assert_eq!(parsed, config);
//! ```

mod error;
mod measurement;

pub use error::ConfigError;
pub use measurement::{ChannelConfig, MeasurementConfig, NoiseConfig, SpectrumShape, SweepConfig};
