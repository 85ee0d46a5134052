//! Envelope and onset utilities shared by the reference sub-analyses
//!
//! RMS envelopes, one-pole band isolation, spectral-flux onset strength
//! and normalized autocorrelation. These are the building blocks for
//! tempo, delay, reverb and sidechain detection.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// FFT size for spectral-flux onset analysis
const FFT_SIZE: usize = 2048;
/// Hop between onset frames in samples
const ONSET_HOP: usize = 512;

/// A sampled amplitude envelope with its hop duration
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Envelope values (linear amplitude or onset strength)
    pub values: Vec<f32>,
    /// Seconds between consecutive values
    pub hop_secs: f64,
}

impl Envelope {
    /// Number of envelope frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the envelope holds no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Time in seconds of envelope frame `index`
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 * self.hop_secs
    }

    /// Convert a lag in envelope frames to milliseconds
    pub fn lag_to_ms(&self, lag: usize) -> f64 {
        lag as f64 * self.hop_secs * 1000.0
    }

    /// Convert a duration in milliseconds to the nearest lag in frames
    pub fn ms_to_lag(&self, ms: f64) -> usize {
        (ms / 1000.0 / self.hop_secs).round() as usize
    }
}

/// Hann window of the given size
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

/// Short-window RMS envelope of a mono signal
pub fn rms_envelope(samples: &[f32], sample_rate: u32, window_secs: f64, hop_secs: f64) -> Envelope {
    let window = ((f64::from(sample_rate) * window_secs) as usize).max(1);
    let hop = ((f64::from(sample_rate) * hop_secs) as usize).max(1);
    let mut values = Vec::new();
    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + window).min(samples.len());
        let chunk = &samples[pos..end];
        let sum_sq: f32 = chunk.iter().map(|s| s * s).sum();
        values.push((sum_sq / chunk.len() as f32).sqrt());
        pos += hop;
    }
    Envelope {
        values,
        hop_secs: hop as f64 / f64::from(sample_rate),
    }
}

/// One-pole low-pass filter (6 dB/oct), zero initial state
pub fn one_pole_low_pass(samples: &[f32], sample_rate: u32, cutoff_hz: f32) -> Vec<f32> {
    let dt = 1.0 / sample_rate as f32;
    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let alpha = dt / (rc + dt);
    let mut out = Vec::with_capacity(samples.len());
    let mut state = 0.0_f32;
    for &s in samples {
        state += alpha * (s - state);
        out.push(state);
    }
    out
}

/// One-pole high-pass filter (6 dB/oct): input minus its low-passed copy
pub fn one_pole_high_pass(samples: &[f32], sample_rate: u32, cutoff_hz: f32) -> Vec<f32> {
    let low = one_pole_low_pass(samples, sample_rate, cutoff_hz);
    samples.iter().zip(low.iter()).map(|(&s, &l)| s - l).collect()
}

/// Spectral-flux onset-strength envelope
///
/// Windowed FFT magnitudes; flux is the half-wave-rectified increase per
/// bin between consecutive frames. Strong transients show up as peaks.
pub fn onset_strength(samples: &[f32], sample_rate: u32) -> Envelope {
    let hop_secs = ONSET_HOP as f64 / f64::from(sample_rate);
    if samples.len() < FFT_SIZE {
        return Envelope {
            values: Vec::new(),
            hop_secs,
        };
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let hann = hann_window(FFT_SIZE);

    let mut prev_magnitudes = vec![0.0_f32; FFT_SIZE / 2];
    let mut values = Vec::new();
    let mut pos = 0;
    while pos + FFT_SIZE <= samples.len() {
        let mut buffer: Vec<Complex<f32>> = samples[pos..pos + FFT_SIZE]
            .iter()
            .enumerate()
            .map(|(i, &s)| Complex::new(s * hann[i], 0.0))
            .collect();
        fft.process(&mut buffer);

        let magnitudes: Vec<f32> = buffer[..FFT_SIZE / 2].iter().map(|c| c.norm()).collect();
        let flux: f32 = magnitudes
            .iter()
            .zip(prev_magnitudes.iter())
            .map(|(&m, &p)| (m - p).max(0.0))
            .sum();
        values.push(flux);
        prev_magnitudes = magnitudes;
        pos += ONSET_HOP;
    }

    Envelope { values, hop_secs }
}

/// Mean-removed autocorrelation, normalized so lag 0 equals 1
///
/// Returns an empty vec when the signal has no variance (flat envelope),
/// which downstream detectors treat as "nothing periodic here".
pub fn normalized_autocorrelation(values: &[f32], max_lag: usize) -> Vec<f32> {
    let n = values.len();
    if n < 2 {
        return Vec::new();
    }
    let mean: f32 = values.iter().sum::<f32>() / n as f32;
    let centered: Vec<f32> = values.iter().map(|v| v - mean).collect();
    let energy: f32 = centered.iter().map(|v| v * v).sum();
    if energy <= f32::EPSILON {
        return Vec::new();
    }
    let max_lag = max_lag.min(n - 1);
    let mut acf = Vec::with_capacity(max_lag + 1);
    for lag in 0..=max_lag {
        let sum: f32 = centered[..n - lag]
            .iter()
            .zip(centered[lag..].iter())
            .map(|(a, b)| a * b)
            .sum();
        acf.push(sum / energy);
    }
    acf
}

/// Indices of local maxima above `threshold * max(values)`
///
/// A minimum spacing suppresses double-triggers on wide peaks.
pub fn pick_peaks(values: &[f32], threshold: f32, min_spacing: usize) -> Vec<usize> {
    let max = values.iter().copied().fold(0.0_f32, f32::max);
    if max <= 0.0 {
        return Vec::new();
    }
    let floor = max * threshold;
    let mut peaks: Vec<usize> = Vec::new();
    for i in 1..values.len().saturating_sub(1) {
        if values[i] >= floor && values[i] >= values[i - 1] && values[i] >= values[i + 1] {
            if let Some(&last) = peaks.last() {
                if i - last < min_spacing {
                    // Keep the taller of the two contenders
                    if values[i] > values[last] {
                        peaks.pop();
                        peaks.push(i);
                    }
                    continue;
                }
            }
            peaks.push(i);
        }
    }
    peaks
}
