//! Stereo field analysis: phase correlation and mid/side decomposition
//!
//! Correlation here is the instantaneous windowed value a correlation
//! meter displays, recomputed continuously - callers own the polling
//! cadence. The vectorscope transform is a pure function exposed
//! independently of any drawing surface.

use echo_core::SampleBuffer;
use serde::{Deserialize, Serialize};

/// Default window for instantaneous correlation, in frames
///
/// ~46ms at 44.1kHz - short enough to track phase changes, long enough
/// to be stable on program material.
pub const DEFAULT_CORRELATION_WINDOW: usize = 2048;

/// Mid/side decomposition of a stereo buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MidSide {
    /// Mid (mono) component: (L + R) / 2
    pub mid: Vec<f32>,
    /// Side (stereo difference) component: (L - R) / 2
    pub side: Vec<f32>,
}

/// A single vectorscope point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopePoint {
    pub x: f32,
    pub y: f32,
}

/// Phase correlation of a window of L/R samples
///
/// `sum(L*R) / sqrt(sum(L^2) * sum(R^2))`, clamped to [-1, 1] and
/// defined as 0 when the denominator is 0 (either channel silent).
pub fn correlation(left: &[f32], right: &[f32]) -> f32 {
    let n = left.len().min(right.len());
    if n == 0 {
        return 0.0;
    }
    let mut sum_lr = 0.0_f64;
    let mut sum_ll = 0.0_f64;
    let mut sum_rr = 0.0_f64;
    for i in 0..n {
        let l = f64::from(left[i]);
        let r = f64::from(right[i]);
        sum_lr += l * r;
        sum_ll += l * l;
        sum_rr += r * r;
    }
    let denominator = (sum_ll * sum_rr).sqrt();
    if denominator <= 0.0 {
        return 0.0;
    }
    ((sum_lr / denominator) as f32).clamp(-1.0, 1.0)
}

/// Stereo field analyzer over one buffer
///
/// Construction borrows nothing; each call reads the buffer fresh so a
/// replaced buffer simply means constructing a new analyzer.
pub struct StereoFieldAnalyzer {
    window: usize,
}

impl StereoFieldAnalyzer {
    /// Create an analyzer with the default correlation window
    pub fn new() -> Self {
        Self {
            window: DEFAULT_CORRELATION_WINDOW,
        }
    }

    /// Create an analyzer with a specific window length in frames
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Instantaneous correlation of the window starting at `frame`
    ///
    /// Mono buffers report 1.0 (a single channel is perfectly correlated
    /// with itself). Returns 0.0 for an out-of-range start frame.
    pub fn correlation_at(&self, buffer: &SampleBuffer, frame: usize) -> f32 {
        if buffer.channel_count() < 2 {
            return 1.0;
        }
        let frames = buffer.frames();
        if frame >= frames {
            return 0.0;
        }
        let end = (frame + self.window).min(frames);
        correlation(
            &buffer.channel(0)[frame..end],
            &buffer.channel(1)[frame..end],
        )
    }

    /// Correlation over the whole buffer
    pub fn correlation(&self, buffer: &SampleBuffer) -> f32 {
        if buffer.channel_count() < 2 {
            return 1.0;
        }
        correlation(buffer.channel(0), buffer.channel(1))
    }

    /// Correlation trace: one value per window hop across the buffer
    pub fn correlation_trace(&self, buffer: &SampleBuffer) -> Vec<f32> {
        if buffer.channel_count() < 2 {
            return vec![1.0];
        }
        let frames = buffer.frames();
        let mut trace = Vec::with_capacity(frames / self.window + 1);
        let mut frame = 0;
        while frame < frames {
            trace.push(self.correlation_at(buffer, frame));
            frame += self.window;
        }
        trace
    }
}

impl Default for StereoFieldAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decompose a stereo buffer into mid/side components
///
/// Mono buffers decompose into mid = the channel, side = silence.
pub fn mid_side(buffer: &SampleBuffer) -> MidSide {
    if buffer.channel_count() < 2 {
        return MidSide {
            mid: buffer.channel(0).to_vec(),
            side: vec![0.0; buffer.frames()],
        };
    }
    let left = buffer.channel(0);
    let right = buffer.channel(1);
    let mid = left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| (l + r) * 0.5)
        .collect();
    let side = left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| (l - r) * 0.5)
        .collect();
    MidSide { mid, side }
}

/// Map one L/R sample pair onto vectorscope axes
///
/// Pure and stateless: `x = R * radius`, `y = -L * radius`. The caller
/// owns scaling and rasterization.
#[inline]
pub fn scope_point(left: f32, right: f32, radius: f32) -> ScopePoint {
    ScopePoint {
        x: right * radius,
        y: -left * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(frequency: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * frequency * i as f32 / 44_100.0).sin())
            .collect()
    }

    #[test]
    fn identical_channels_correlate_fully() {
        let s = sine(440.0, 4096);
        assert!((correlation(&s, &s) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn inverted_channels_anticorrelate() {
        let s = sine(440.0, 4096);
        let inverted: Vec<f32> = s.iter().map(|x| -x).collect();
        assert!((correlation(&s, &inverted) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn silence_has_zero_correlation() {
        // Zero denominator is defined as 0, not 1
        let silent = vec![0.0_f32; 1024];
        let s = sine(440.0, 1024);
        assert_eq!(correlation(&silent, &silent), 0.0);
        assert_eq!(correlation(&s, &silent), 0.0);
    }

    #[test]
    fn correlation_is_clamped() {
        let s = sine(440.0, 4096);
        let c = correlation(&s, &s);
        assert!((-1.0..=1.0).contains(&c));
    }

    #[test]
    fn analyzer_windows_across_the_buffer() {
        let left = sine(440.0, 8192);
        let right = left.clone();
        let buffer = SampleBuffer::stereo(left, right, 44_100).unwrap();
        let analyzer = StereoFieldAnalyzer::new();
        assert!((analyzer.correlation_at(&buffer, 0) - 1.0).abs() < 1e-6);
        let trace = analyzer.correlation_trace(&buffer);
        assert_eq!(trace.len(), 4);
        assert!(trace.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn mono_buffer_reports_unity() {
        let buffer = SampleBuffer::mono(sine(440.0, 1024), 44_100);
        let analyzer = StereoFieldAnalyzer::new();
        assert_eq!(analyzer.correlation(&buffer), 1.0);
    }

    #[test]
    fn mid_side_round_trip() {
        let left = vec![0.8_f32, 0.2, -0.5];
        let right = vec![0.4_f32, -0.2, -0.1];
        let buffer = SampleBuffer::stereo(left.clone(), right.clone(), 44_100).unwrap();
        let ms = mid_side(&buffer);
        for i in 0..3 {
            let l = ms.mid[i] + ms.side[i];
            let r = ms.mid[i] - ms.side[i];
            assert!((l - left[i]).abs() < 1e-6);
            assert!((r - right[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn scope_point_axes() {
        let p = scope_point(1.0, 0.5, 100.0);
        assert_eq!(p.x, 50.0);
        assert_eq!(p.y, -100.0);
    }
}
