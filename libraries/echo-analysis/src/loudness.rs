//! EBU R128 / ITU-R BS.1770 loudness metering
//!
//! The meter measures:
//! - Integrated loudness (LUFS): K-weighted mean-square power over 400ms
//!   gating blocks with 100ms hop, an absolute gate at -70 LUFS and a
//!   relative gate 10 LU below the ungated mean
//! - Loudness range (LU): spread between the 10th and 95th percentile of
//!   short-term loudness
//! - True peak (dBTP): inter-sample peak via 4x oversampling - never the
//!   raw sample maximum, which under-estimates inter-sample peaks
//!
//! A completely silent buffer yields a measurement full of `-inf`
//! quantities rather than an error; callers special-case
//! [`LufsMeasurement::is_silent`] instead of handling NaN.

use crate::error::{AnalysisError, Result};
use ebur128::{EbuR128, Mode};
use echo_core::math::linear_to_db;
use echo_core::{CancelToken, LufsSummary, SampleBuffer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named streaming loudness target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamingTarget {
    /// Platform name
    pub name: &'static str,
    /// Target integrated loudness in LUFS
    pub integrated_lufs: f64,
    /// Maximum allowed true peak in dBTP
    pub max_true_peak_dbtp: f64,
}

/// Fixed table of streaming/broadcast loudness targets
pub const STREAMING_TARGETS: [StreamingTarget; 5] = [
    StreamingTarget {
        name: "Spotify",
        integrated_lufs: -14.0,
        max_true_peak_dbtp: -1.0,
    },
    StreamingTarget {
        name: "Apple Music",
        integrated_lufs: -16.0,
        max_true_peak_dbtp: -1.0,
    },
    StreamingTarget {
        name: "YouTube",
        integrated_lufs: -14.0,
        max_true_peak_dbtp: -1.0,
    },
    StreamingTarget {
        name: "Amazon Music",
        integrated_lufs: -14.0,
        max_true_peak_dbtp: -2.0,
    },
    StreamingTarget {
        name: "EBU R128 Broadcast",
        integrated_lufs: -23.0,
        max_true_peak_dbtp: -1.0,
    },
];

/// Tolerance around a target's integrated loudness, in LU
pub const COMPLIANCE_TOLERANCE_LU: f64 = 1.0;

/// Compliance verdict against one streaming target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    /// Target platform name
    pub target: String,
    /// Integrated loudness within +/-1 LU of the target AND true peak at
    /// or below the target ceiling
    pub compliant: bool,
    /// Signed distance from the target loudness in LU
    pub integrated_delta_lu: f64,
}

/// Result of one loudness measurement over one buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LufsMeasurement {
    /// Integrated loudness in LUFS (`-inf` for silence)
    pub integrated_lufs: f64,
    /// Loudness range in LU
    pub loudness_range_lu: f64,
    /// True peak in dBTP (4x oversampled, `-inf` for silence)
    pub true_peak_dbtp: f64,
    /// Sample peak in dBFS (`-inf` for silence)
    pub sample_peak_dbfs: f64,
    /// Short-term loudness trace, one value per 100ms hop once the 3s
    /// short-term window has filled
    pub short_term_lufs: Vec<f64>,
    /// Duration of the analyzed audio in seconds
    pub duration_seconds: f64,
    /// Compliance flags against [`STREAMING_TARGETS`]
    pub compliance: Vec<ComplianceFlag>,
}

impl LufsMeasurement {
    /// True if the buffer carried no measurable loudness
    pub fn is_silent(&self) -> bool {
        !self.integrated_lufs.is_finite()
    }

    /// Summary view for attaching to [`echo_core::AudioMetrics`]
    pub fn summary(&self) -> LufsSummary {
        LufsSummary {
            integrated: self.integrated_lufs,
            range: self.loudness_range_lu,
        }
    }
}

impl fmt::Display for LufsMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, Range: {:.1} LU, True Peak: {:.1} dBTP",
            self.integrated_lufs, self.loudness_range_lu, self.true_peak_dbtp
        )
    }
}

/// Chunk size used when streaming frames into the gating filter: 100ms
/// hops so the short-term trace lines up with the gating hop
const HOP_SECONDS: f64 = 0.1;

/// Short-term loudness window length mandated by EBU R128
const SHORT_TERM_WINDOW_SECONDS: f64 = 3.0;

/// EBU R128 loudness meter
///
/// One meter instance is reusable across buffers; each call to
/// [`LoudnessMeter::measure`] runs a complete, independent measurement.
///
/// # Example
///
/// ```ignore
/// let meter = LoudnessMeter::new();
/// let measurement = meter.measure(&buffer)?;
/// println!("{measurement}");
/// ```
pub struct LoudnessMeter {
    _private: (),
}

impl LoudnessMeter {
    /// Create a loudness meter
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Measure a buffer
    ///
    /// Metering over a live signal is a repeated polling operation: pass
    /// a token and cancel it when the underlying buffer is replaced, then
    /// call `measure` again with the new buffer.
    ///
    /// # Errors
    /// Returns an error for unsupported sample rates / channel counts or
    /// if the measurement backend fails. Silence is NOT an error.
    pub fn measure(&self, buffer: &SampleBuffer) -> Result<LufsMeasurement> {
        self.measure_cancellable(buffer, &CancelToken::new())
    }

    /// Measure a buffer, checking the token between hops
    ///
    /// # Errors
    /// As [`LoudnessMeter::measure`], plus `Cancelled` if the token fires
    /// mid-measurement (any partial result is discarded).
    pub fn measure_cancellable(
        &self,
        buffer: &SampleBuffer,
        cancel: &CancelToken,
    ) -> Result<LufsMeasurement> {
        let sample_rate = buffer.sample_rate();
        if !(8000..=384_000).contains(&sample_rate) {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        let channels = buffer.channel_count();
        if !(1..=8).contains(&channels) {
            return Err(AnalysisError::InvalidChannelCount(channels));
        }

        let mode = Mode::I | Mode::LRA | Mode::SAMPLE_PEAK | Mode::TRUE_PEAK | Mode::S;
        let mut state = EbuR128::new(channels as u32, sample_rate, mode)?;

        let interleaved = buffer.to_interleaved();
        let hop_frames = (f64::from(sample_rate) * HOP_SECONDS) as usize;
        let hop_samples = (hop_frames * channels).max(channels);
        let short_term_ready = (SHORT_TERM_WINDOW_SECONDS / HOP_SECONDS) as usize;

        let mut short_term_lufs = Vec::new();
        for (hop_index, chunk) in interleaved.chunks(hop_samples).enumerate() {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            state.add_frames_f32(chunk)?;
            if hop_index + 1 >= short_term_ready {
                if let Ok(st) = state.loudness_shortterm() {
                    if st.is_finite() {
                        short_term_lufs.push(st);
                    }
                }
            }
        }

        // ebur128 reports -inf for silence; normalize NaN to -inf as well
        let integrated_lufs = match state.loudness_global() {
            Ok(lufs) if !lufs.is_nan() => lufs,
            _ => f64::NEG_INFINITY,
        };
        let loudness_range_lu = state.loudness_range().unwrap_or(0.0);

        let mut true_peak_linear = 0.0_f64;
        let mut sample_peak_linear = 0.0_f64;
        for ch in 0..channels as u32 {
            true_peak_linear = true_peak_linear.max(state.true_peak(ch).unwrap_or(0.0));
            sample_peak_linear = sample_peak_linear.max(state.sample_peak(ch).unwrap_or(0.0));
        }
        let true_peak_dbtp = linear_to_db(true_peak_linear);
        let sample_peak_dbfs = linear_to_db(sample_peak_linear);

        let compliance = compliance_flags(integrated_lufs, true_peak_dbtp);

        tracing::debug!(
            integrated_lufs,
            loudness_range_lu,
            true_peak_dbtp,
            "loudness measurement complete"
        );

        Ok(LufsMeasurement {
            integrated_lufs,
            loudness_range_lu,
            true_peak_dbtp,
            sample_peak_dbfs,
            short_term_lufs,
            duration_seconds: buffer.duration_secs(),
            compliance,
        })
    }
}

impl Default for LoudnessMeter {
    fn default() -> Self {
        Self::new()
    }
}

fn compliance_flags(integrated_lufs: f64, true_peak_dbtp: f64) -> Vec<ComplianceFlag> {
    STREAMING_TARGETS
        .iter()
        .map(|target| {
            let delta = integrated_lufs - target.integrated_lufs;
            let compliant = delta.abs() <= COMPLIANCE_TOLERANCE_LU
                && true_peak_dbtp <= target.max_true_peak_dbtp;
            ComplianceFlag {
                target: target.name.to_string(),
                // -inf loudness is never compliant
                compliant: compliant && integrated_lufs.is_finite(),
                integrated_delta_lu: delta,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_buffer(amplitude: f32, seconds: f32) -> SampleBuffer {
        let samples: Vec<f32> = (0..(44_100.0 * seconds) as usize)
            .map(|i| {
                let t = i as f32 / 44_100.0;
                (2.0 * PI * 997.0 * t).sin() * amplitude
            })
            .collect();
        SampleBuffer::stereo(samples.clone(), samples, 44_100).unwrap()
    }

    #[test]
    fn rejects_invalid_rates_and_channels() {
        let meter = LoudnessMeter::new();
        let too_slow = SampleBuffer::silent(2, 100, 100);
        assert!(matches!(
            meter.measure(&too_slow),
            Err(AnalysisError::InvalidSampleRate(100))
        ));
    }

    #[test]
    fn silence_is_a_measurement_not_an_error() {
        let meter = LoudnessMeter::new();
        let measurement = meter.measure(&SampleBuffer::silent(2, 44_100 * 2, 44_100)).unwrap();
        assert!(measurement.is_silent());
        assert_eq!(measurement.integrated_lufs, f64::NEG_INFINITY);
        assert_eq!(measurement.true_peak_dbtp, f64::NEG_INFINITY);
        assert!(measurement.compliance.iter().all(|c| !c.compliant));
    }

    #[test]
    fn sine_wave_measures_near_expected_loudness() {
        let meter = LoudnessMeter::new();
        // -20 dBFS sine, 4 seconds; K-weighting puts a ~1kHz stereo sine
        // around -17 LUFS
        let measurement = meter.measure(&sine_buffer(0.1, 4.0)).unwrap();
        assert!(
            measurement.integrated_lufs > -24.0 && measurement.integrated_lufs < -13.0,
            "integrated was {}",
            measurement.integrated_lufs
        );
        assert!(
            measurement.true_peak_dbtp > -22.0 && measurement.true_peak_dbtp < -18.0,
            "true peak was {}",
            measurement.true_peak_dbtp
        );
    }

    #[test]
    fn loudness_scales_with_gain() {
        // Scaling amplitude by g moves integrated loudness by 20*log10(g)
        let meter = LoudnessMeter::new();
        let quiet = meter.measure(&sine_buffer(0.05, 4.0)).unwrap();
        let loud = meter.measure(&sine_buffer(0.1, 4.0)).unwrap();
        let delta = loud.integrated_lufs - quiet.integrated_lufs;
        assert!(
            (delta - 6.02).abs() < 0.5,
            "expected ~6 LU difference, got {delta}"
        );
    }

    #[test]
    fn short_term_trace_is_collected_for_long_buffers() {
        let meter = LoudnessMeter::new();
        let measurement = meter.measure(&sine_buffer(0.1, 5.0)).unwrap();
        assert!(!measurement.short_term_lufs.is_empty());
    }

    #[test]
    fn cancellation_discards_the_measurement() {
        let meter = LoudnessMeter::new();
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            meter.measure_cancellable(&sine_buffer(0.1, 2.0), &token),
            Err(AnalysisError::Cancelled)
        ));
    }

    #[test]
    fn compliance_against_streaming_targets() {
        let flags = compliance_flags(-14.2, -1.5);
        let spotify = flags.iter().find(|f| f.target == "Spotify").unwrap();
        assert!(spotify.compliant);
        let broadcast = flags.iter().find(|f| f.target == "EBU R128 Broadcast").unwrap();
        assert!(!broadcast.compliant, "-14.2 LUFS is far above -23");
    }
}
