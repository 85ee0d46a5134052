//! Error types for audio analysis

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during metering and reference analysis
///
/// Note that degenerate-but-valid inputs (silence, short signals) are
/// NOT errors: metering reports `-inf` quantities and sub-analyses
/// report `detected: false` instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(usize),

    /// Loudness measurement failed inside the EBU R128 backend
    #[error("Loudness measurement failed: {0}")]
    Measurement(String),

    /// The operation was cancelled via its token
    #[error("Analysis cancelled")]
    Cancelled,
}

impl From<ebur128::Error> for AnalysisError {
    fn from(err: ebur128::Error) -> Self {
        Self::Measurement(format!("{err:?}"))
    }
}

impl From<AnalysisError> for echo_core::EchoError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Cancelled => echo_core::EchoError::Cancelled,
            other => echo_core::EchoError::analysis(other.to_string()),
        }
    }
}
