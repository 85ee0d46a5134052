//! Immutable multichannel PCM container
//!
//! `SampleBuffer` is the common substrate of the mastering core: planar
//! f32 samples plus a sample rate. All channels have equal length, and a
//! buffer is read-only once constructed - processing stages produce new
//! buffers instead of mutating in place.

use crate::error::{EchoError, Result};
use crate::math::linear_to_db;
use serde::{Deserialize, Serialize};

/// Immutable multichannel PCM audio buffer
///
/// Samples are stored planar (one `Vec<f32>` per channel) in the range
/// [-1.0, 1.0]. Use [`SampleBuffer::from_interleaved`] /
/// [`SampleBuffer::to_interleaved`] at seams that speak interleaved
/// frames (WAV, loudness measurement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from planar channel data
    ///
    /// # Errors
    /// Returns `ChannelLengthMismatch` if the channels are not all the
    /// same length, and `UnsupportedChannelCount` for zero channels.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(EchoError::UnsupportedChannelCount(0));
        }
        let expected = channels[0].len();
        for (i, ch) in channels.iter().enumerate().skip(1) {
            if ch.len() != expected {
                return Err(EchoError::ChannelLengthMismatch {
                    channel: i,
                    expected,
                    actual: ch.len(),
                });
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a silent buffer with the given layout
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count.max(1)],
            sample_rate,
        }
    }

    /// Create a mono buffer from a single channel
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Create a stereo buffer from left/right channels
    ///
    /// # Errors
    /// Returns `ChannelLengthMismatch` if the channels differ in length.
    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![left, right], sample_rate)
    }

    /// Build a buffer from interleaved frames (L R L R ... for stereo)
    ///
    /// # Errors
    /// Returns an error if the sample count is not divisible by the
    /// channel count.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(EchoError::UnsupportedChannelCount(0));
        }
        if samples.len() % channel_count != 0 {
            return Err(EchoError::decode(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                channel_count
            )));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Flatten to interleaved frames (L R L R ... for stereo)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for ch in &self.channels {
                out.push(ch[frame]);
            }
        }
        out
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Borrow one channel's samples
    ///
    /// # Panics
    /// Panics if `index` is out of range - a programmer error, not a
    /// recoverable condition.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Borrow all channels
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// True if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// True if every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.channels
            .iter()
            .all(|ch| ch.iter().all(|&s| s == 0.0))
    }

    /// Absolute sample peak across all channels (linear)
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// RMS level across all channels (linear)
    pub fn rms(&self) -> f64 {
        let total: usize = self.channels.iter().map(Vec::len).sum();
        if total == 0 {
            return 0.0;
        }
        let sum_sq: f64 = self
            .channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|&s| f64::from(s) * f64::from(s))
            .sum();
        (sum_sq / total as f64).sqrt()
    }

    /// Absolute sample peak in dBFS (`-inf` for silence)
    pub fn peak_db(&self) -> f64 {
        linear_to_db(f64::from(self.peak()))
    }

    /// RMS level in dBFS (`-inf` for silence)
    pub fn rms_db(&self) -> f64 {
        linear_to_db(self.rms())
    }

    /// Mix all channels down to a single mono channel (equal weights)
    pub fn mono_mix(&self) -> Vec<f32> {
        let frames = self.frames();
        let scale = 1.0 / self.channels.len() as f32;
        let mut out = vec![0.0_f32; frames];
        for ch in &self.channels {
            for (acc, &s) in out.iter_mut().zip(ch.iter()) {
                *acc += s * scale;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unequal_channels() {
        let result = SampleBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 44_100);
        assert!(matches!(
            result,
            Err(EchoError::ChannelLengthMismatch { channel: 1, .. })
        ));
    }

    #[test]
    fn rejects_zero_channels() {
        assert!(SampleBuffer::new(vec![], 44_100).is_err());
    }

    #[test]
    fn interleave_round_trip() {
        let interleaved = vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = SampleBuffer::from_interleaved(&interleaved, 2, 48_000).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1), &[-0.1, -0.2, -0.3]);
        assert_eq!(buffer.to_interleaved(), interleaved);
    }

    #[test]
    fn interleave_rejects_ragged_input() {
        assert!(SampleBuffer::from_interleaved(&[0.0; 5], 2, 44_100).is_err());
    }

    #[test]
    fn silent_buffer_reports_negative_infinity() {
        let buffer = SampleBuffer::silent(2, 1024, 44_100);
        assert!(buffer.is_silent());
        assert_eq!(buffer.peak_db(), f64::NEG_INFINITY);
        assert_eq!(buffer.rms_db(), f64::NEG_INFINITY);
    }

    #[test]
    fn duration() {
        let buffer = SampleBuffer::silent(2, 44_100, 44_100);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mono_mix_averages_channels() {
        let buffer = SampleBuffer::stereo(vec![1.0, 0.0], vec![0.0, 1.0], 44_100).unwrap();
        assert_eq!(buffer.mono_mix(), vec![0.5, 0.5]);
    }
}
