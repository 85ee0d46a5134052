//! Export path: rendered buffer -> encoded bytes
//!
//! The lossless path ships with the core (uncompressed PCM in a WAV
//! container via hound). The lossy path (~320 kbps constant bitrate) is
//! an external encoder collaborator behind the same `MixEncoder` trait;
//! the core only validates what comes back and rejects empty payloads.

use echo_core::{EchoError, EncodedAudio, ExportFormat, MixEncoder, Result, SampleBuffer};
use std::io::Cursor;

/// Nominal bitrate of the lossy export path in kbps
pub const LOSSY_BITRATE_KBPS: u32 = 320;

/// Bit depth of the lossless PCM export
const PCM_BITS: u16 = 24;

/// Lossless WAV encoder (24-bit PCM)
pub struct WavEncoder {
    _private: (),
}

impl WavEncoder {
    /// Create a WAV encoder
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for WavEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MixEncoder for WavEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::LosslessPcm
    }

    fn encode(&mut self, buffer: &SampleBuffer) -> Result<EncodedAudio> {
        let spec = hound::WavSpec {
            channels: buffer.channel_count() as u16,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: PCM_BITS,
            sample_format: hound::SampleFormat::Int,
        };

        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let mut writer = hound::WavWriter::new(cursor, spec)
                .map_err(|e| EchoError::EncodeFailure(e.to_string()))?;

            let scale = f64::from(1_i32 << (PCM_BITS - 1)) - 1.0;
            for &sample in &buffer.to_interleaved() {
                let quantized = (f64::from(sample).clamp(-1.0, 1.0) * scale).round() as i32;
                writer
                    .write_sample(quantized)
                    .map_err(|e| EchoError::EncodeFailure(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| EchoError::EncodeFailure(e.to_string()))?;
        }

        tracing::debug!(bytes = bytes.len(), "wav export encoded");
        Ok(EncodedAudio {
            bytes,
            format: ExportFormat::LosslessPcm,
        })
    }
}

/// Encode a rendered buffer through any encoder, validating the result
///
/// # Errors
/// `ExportEmpty` for a zero-byte payload (fatal for this attempt,
/// retryable with a different format), or the encoder's own failure.
pub fn export_mixdown(
    encoder: &mut dyn MixEncoder,
    buffer: &SampleBuffer,
) -> Result<EncodedAudio> {
    encoder.encode_validated(buffer)
}
