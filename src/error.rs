//! Error types for the inference layer
//!
//! None of these are fatal to [`crate::analyze_features`]: the pipeline logs
//! them and substitutes the documented empty or default value.

use thiserror::Error;

/// Errors that can occur while inferring musical structure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Input features are malformed (wrong dimensions, mismatched lengths, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough data for the requested inference
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An upstream feature extractor produced unusable output
    #[error("Upstream feature failure: {0}")]
    UpstreamFeature(String),

    /// A configuration parameter is out of range
    #[error("Configuration error: {0}")]
    Configuration(String),
}
