//! Central error type for the Echo mastering core

use thiserror::Error;

/// Result type alias using `EchoError`
pub type Result<T> = std::result::Result<T, EchoError>;

/// Errors shared across the mastering core
///
/// Crate-specific error types (`AnalysisError`, `DspError`, `MixError`)
/// convert into this type at the session boundary.
#[derive(Error, Debug)]
pub enum EchoError {
    /// Input audio could not be decoded. Fatal for the operation,
    /// never for the session.
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Channel layout mismatch where equal layouts are required
    #[error("Channel mismatch: expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Channels of unequal length passed to a buffer constructor
    #[error("Channel length mismatch: channel {channel} has {actual} frames, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Unsupported channel count (the core mixes mono and stereo stems)
    #[error("Unsupported channel count: {0} (must be 1 or 2)")]
    UnsupportedChannelCount(usize),

    /// Encoder collaborator returned an empty payload. Fatal for this
    /// export attempt, retryable with a different format.
    #[error("Export produced no data for format {0:?}")]
    ExportEmpty(String),

    /// Encoding failed inside a collaborator
    #[error("Encode failure: {0}")]
    EncodeFailure(String),

    /// Operation was cancelled via its `CancelToken`
    #[error("Operation cancelled")]
    Cancelled,

    /// Analysis failed in a way that cannot be reported as low confidence
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EchoError {
    /// Create a decode failure error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    /// Create an analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    /// Create an invalid-configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
