//! Error types for sweep synthesis and deconvolution.

use thiserror::Error;

/// Errors reported by the synthesis and deconvolution routines.
///
/// All variants are deterministic precondition or postcondition failures;
/// retrying the same call with the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A parameter is outside its valid range
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A computation would produce (or produced) non-finite or meaningless values
    #[error("numerical instability: {reason}")]
    NumericalInstability {
        /// What was detected.
        reason: String,
    },

    /// Buffer lengths are incompatible with the transform size
    #[error("dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Which lengths disagreed.
        reason: String,
    },
}

impl AnalysisError {
    /// Create an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create a numerical instability error.
    pub fn unstable(reason: impl Into<String>) -> Self {
        AnalysisError::NumericalInstability {
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error.
    pub fn mismatch(reason: impl Into<String>) -> Self {
        AnalysisError::DimensionMismatch {
            reason: reason.into(),
        }
    }
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
