//! Derived level metrics for a buffer
//!
//! `AudioMetrics` is always recomputed from the underlying buffer, never
//! cached or persisted - a new buffer means a fresh measurement.

use crate::buffer::SampleBuffer;
use serde::{Deserialize, Serialize};

/// Integrated loudness and loudness range in LUFS/LU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LufsSummary {
    /// Integrated loudness in LUFS
    pub integrated: f64,
    /// Loudness range in LU (10th to 95th percentile of short-term loudness)
    pub range: f64,
}

/// Level metrics derived from one `SampleBuffer`
///
/// A completely silent buffer yields `-inf` dB quantities; that is the
/// degenerate-but-valid case, not an error, and downstream consumers
/// treat it as "insufficient signal".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioMetrics {
    /// RMS level in dBFS
    pub rms_db: f64,
    /// Sample peak in dBFS
    pub peak_db: f64,
    /// Crest factor in dB (peak minus RMS)
    pub crest_factor_db: f64,
    /// Perceptual loudness, when a loudness measurement was run
    pub lufs: Option<LufsSummary>,
    /// True peak in dBTP (inter-sample, oversampled), when measured
    pub true_peak_dbtp: Option<f64>,
}

impl AudioMetrics {
    /// Measure RMS/peak/crest from a buffer
    ///
    /// Loudness fields start as `None`; the loudness meter fills them in
    /// via [`AudioMetrics::with_loudness`].
    pub fn measure(buffer: &SampleBuffer) -> Self {
        let rms_db = buffer.rms_db();
        let peak_db = buffer.peak_db();
        // -inf - -inf would be NaN; silence has no meaningful crest
        let crest_factor_db = if rms_db.is_finite() && peak_db.is_finite() {
            peak_db - rms_db
        } else {
            f64::NEG_INFINITY
        };
        Self {
            rms_db,
            peak_db,
            crest_factor_db,
            lufs: None,
            true_peak_dbtp: None,
        }
    }

    /// Attach loudness measurement results
    pub fn with_loudness(mut self, lufs: LufsSummary, true_peak_dbtp: f64) -> Self {
        self.lufs = Some(lufs);
        self.true_peak_dbtp = Some(true_peak_dbtp);
        self
    }

    /// True if the underlying buffer carried no measurable signal
    pub fn is_silent(&self) -> bool {
        self.peak_db == f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_at_least_rms() {
        let samples: Vec<f32> = (0..4410)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44_100.0).sin() * 0.5)
            .collect();
        let buffer = SampleBuffer::mono(samples, 44_100);
        let metrics = AudioMetrics::measure(&buffer);
        assert!(metrics.peak_db >= metrics.rms_db);
        assert!((metrics.crest_factor_db - (metrics.peak_db - metrics.rms_db)).abs() < 1e-12);
    }

    #[test]
    fn sine_crest_factor_is_about_3db() {
        // A full-cycle sine has crest factor sqrt(2), i.e. ~3.01 dB
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / 44_100.0).sin())
            .collect();
        let buffer = SampleBuffer::mono(samples, 44_100);
        let metrics = AudioMetrics::measure(&buffer);
        assert!(
            (metrics.crest_factor_db - 3.01).abs() < 0.1,
            "crest factor was {}",
            metrics.crest_factor_db
        );
    }

    #[test]
    fn silent_buffer_is_degenerate_not_error() {
        let metrics = AudioMetrics::measure(&SampleBuffer::silent(2, 44_100, 44_100));
        assert!(metrics.is_silent());
        assert_eq!(metrics.rms_db, f64::NEG_INFINITY);
        assert_eq!(metrics.peak_db, f64::NEG_INFINITY);
        assert_eq!(metrics.crest_factor_db, f64::NEG_INFINITY);
        assert!(!metrics.crest_factor_db.is_nan());
    }
}
