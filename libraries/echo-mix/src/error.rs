//! Error types for the mix engine

use echo_core::StemId;
use thiserror::Error;

/// Result type for mix operations
pub type Result<T> = std::result::Result<T, MixError>;

/// Errors that can occur while managing stems or rendering
#[derive(Error, Debug)]
pub enum MixError {
    /// Unknown stem id
    #[error("No stem with id {0}")]
    StemNotFound(StemId),

    /// Stems must be mono or stereo; anything else is rejected at
    /// insertion so the summation loop never has to truncate or extend
    /// channels silently
    #[error("Unsupported stem channel count: {0} (must be 1 or 2)")]
    UnsupportedChannelCount(usize),

    /// All stems in a session share one sample rate
    #[error("Sample rate mismatch: session runs at {expected} Hz, stem is {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    /// Encoding failed or produced an empty payload
    #[error(transparent)]
    Export(#[from] echo_core::EchoError),
}

impl From<MixError> for echo_core::EchoError {
    fn from(err: MixError) -> Self {
        match err {
            MixError::Export(inner) => inner,
            MixError::UnsupportedChannelCount(n) => {
                echo_core::EchoError::UnsupportedChannelCount(n)
            }
            other => echo_core::EchoError::analysis(other.to_string()),
        }
    }
}
