//! Error types for signal processing

use thiserror::Error;

/// Result type for DSP operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors that can occur while building or applying a processing chain
#[derive(Error, Debug)]
pub enum DspError {
    /// A settings value is outside its legal range and cannot be clamped
    /// into something meaningful
    #[error("Invalid stage settings: {0}")]
    InvalidSettings(String),

    /// A stage received a buffer layout it cannot process
    #[error("Unsupported buffer layout for {stage}: {reason}")]
    UnsupportedLayout {
        stage: &'static str,
        reason: String,
    },
}

impl From<DspError> for echo_core::EchoError {
    fn from(err: DspError) -> Self {
        echo_core::EchoError::config(err.to_string())
    }
}
