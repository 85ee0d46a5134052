//! Collaborator seams
//!
//! The core never parses container formats or talks to the network:
//! decoding and encoding are supplied by external collaborators behind
//! these traits. The core hands buffers across the seam and validates
//! what comes back.

use crate::buffer::SampleBuffer;
use crate::error::{EchoError, Result};
use std::path::Path;

/// Audio decoder collaborator
///
/// Implementers turn container files into decoded PCM. The core only
/// ever sees the resulting `SampleBuffer`.
pub trait AudioDecoder: Send {
    /// Decode an audio file into a buffer
    ///
    /// # Errors
    /// Returns `DecodeFailure` for malformed or unsupported input;
    /// fatal for this operation, never for the session.
    fn decode(&mut self, path: &Path) -> Result<SampleBuffer>;

    /// Check whether the decoder recognizes the given file
    fn supports_format(&self, path: &Path) -> bool;
}

/// Encoded output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Uncompressed PCM in a lossless container
    LosslessPcm,
    /// Lossy encode at a fixed constant bitrate (~320 kbps)
    Lossy320,
}

/// A finished encode: raw container bytes plus the format they are in
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    /// Container bytes ready to hand to storage/download collaborators
    pub bytes: Vec<u8>,
    /// Format of the payload
    pub format: ExportFormat,
}

impl EncodedAudio {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the payload is empty (always invalid - see
    /// [`MixEncoder::encode_validated`])
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Mixdown encoder collaborator
///
/// The core supplies a rendered buffer and receives a byte blob; a
/// zero-byte result is rejected as `ExportEmpty` (fatal for the attempt,
/// retryable with a different format).
pub trait MixEncoder: Send {
    /// Format this encoder produces
    fn format(&self) -> ExportFormat;

    /// Encode a rendered buffer
    fn encode(&mut self, buffer: &SampleBuffer) -> Result<EncodedAudio>;

    /// Encode and validate the result, rejecting empty payloads
    fn encode_validated(&mut self, buffer: &SampleBuffer) -> Result<EncodedAudio> {
        let encoded = self.encode(buffer)?;
        if encoded.is_empty() {
            return Err(EchoError::ExportEmpty(format!("{:?}", self.format())));
        }
        Ok(encoded)
    }
}
