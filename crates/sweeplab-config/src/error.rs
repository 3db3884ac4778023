//! Error types for configuration operations.

use std::path::PathBuf;
use sweeplab_analysis::AnalysisError;
use thiserror::Error;

/// Errors that can occur while loading a measurement configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Sweep settings rejected by the analysis core
    #[error("invalid sweep: {0}")]
    Invalid(#[from] AnalysisError),

    /// Noise settings out of range
    #[error("invalid noise settings: {reason}")]
    InvalidNoise {
        /// Description of why the settings are invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid noise settings error.
    pub fn invalid_noise(reason: impl Into<String>) -> Self {
        ConfigError::InvalidNoise {
            reason: reason.into(),
        }
    }
}
