//! True-peak limiter stage
//!
//! Detection runs on a 4x oversampled copy of the signal so that
//! inter-sample peaks count against the ceiling - the raw sample
//! maximum systematically under-reads them. The gain curve uses a
//! lookahead minimum (instant attack without clicks) and an exponential
//! release, computed in one deterministic offline pass with no latency.

use crate::chain::Stage;
use crate::config::LimiterSettings;
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;
use std::f64::consts::PI;

/// Interpolation filter half-width (taps per side at the original rate)
const SINC_HALF_WIDTH: usize = 8;
/// Oversampling factor per ITU-R BS.1770 true-peak practice
const OVERSAMPLE: usize = 4;

/// 4x oversample a channel with a windowed-sinc interpolator
///
/// Original samples are preserved exactly (the sinc kernel is 1 at the
/// center and 0 at integer offsets); the three subsamples between each
/// pair are band-limited interpolations.
pub fn oversample_4x(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    let mut out = Vec::with_capacity(n * OVERSAMPLE);
    for i in 0..n {
        for phase in 0..OVERSAMPLE {
            if phase == 0 {
                out.push(samples[i]);
                continue;
            }
            let frac = phase as f64 / OVERSAMPLE as f64;
            let mut acc = 0.0_f64;
            for k in 0..(2 * SINC_HALF_WIDTH) {
                let tap_index = i as isize + k as isize - SINC_HALF_WIDTH as isize + 1;
                if tap_index < 0 || tap_index >= n as isize {
                    continue;
                }
                let x = (k as f64 - (SINC_HALF_WIDTH as f64 - 1.0)) - frac;
                let sinc = if x.abs() < 1e-12 {
                    1.0
                } else {
                    (PI * x).sin() / (PI * x)
                };
                // Hann window over the kernel support
                let window =
                    0.5 * (1.0 + (PI * x / SINC_HALF_WIDTH as f64).cos());
                acc += f64::from(samples[tap_index as usize]) * sinc * window;
            }
            out.push(acc as f32);
        }
    }
    out
}

/// True-peak limiter
pub struct TruePeakLimiter {
    settings: LimiterSettings,
}

impl TruePeakLimiter {
    /// Create a limiter from validated settings
    pub fn new(settings: LimiterSettings) -> Self {
        Self { settings }
    }
}

impl Stage for TruePeakLimiter {
    fn name(&self) -> &'static str {
        "True Peak Limiter"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let frames = buffer.frames();
        if frames == 0 {
            return buffer.clone();
        }
        let ceiling = db_to_linear(self.settings.ceiling_db);

        // Per-frame oversampled peak across all channels
        let mut frame_peaks = vec![0.0_f64; frames];
        for channel in buffer.channels() {
            let oversampled = oversample_4x(channel);
            for (frame, peak) in frame_peaks.iter_mut().enumerate() {
                let start = frame * OVERSAMPLE;
                for &s in &oversampled[start..(start + OVERSAMPLE).min(oversampled.len())] {
                    let magnitude = f64::from(s.abs());
                    if magnitude > *peak {
                        *peak = magnitude;
                    }
                }
            }
        }

        // Gain each frame needs to stay at or under the ceiling
        let required: Vec<f64> = frame_peaks
            .iter()
            .map(|&peak| if peak > ceiling { ceiling / peak } else { 1.0 })
            .collect();

        // Lookahead: take the minimum over the upcoming window so gain
        // is already down when the peak arrives
        let lookahead =
            ((self.settings.lookahead_ms / 1000.0) * f64::from(sample_rate)).ceil() as usize;
        let lookahead = lookahead.max(1);
        let mut gain_floor = vec![1.0_f64; frames];
        for i in 0..frames {
            let end = (i + lookahead).min(frames);
            let mut minimum = 1.0_f64;
            for &r in &required[i..end] {
                if r < minimum {
                    minimum = r;
                }
            }
            gain_floor[i] = minimum;
        }

        // Instant attack onto the floor, exponential release back to 1
        let release_samples =
            (self.settings.release_ms / 1000.0 * f64::from(sample_rate)).max(1.0);
        let release_coeff = (-1.0 / release_samples).exp();
        let mut gain = 1.0_f64;
        let mut gains = Vec::with_capacity(frames);
        for &floor in &gain_floor {
            if floor < gain {
                gain = floor;
            } else {
                gain = (1.0 - (1.0 - gain) * release_coeff).min(floor);
            }
            gains.push(gain);
        }

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                channel
                    .iter()
                    .zip(gains.iter())
                    .map(|(&s, &g)| (f64::from(s) * g) as f32)
                    .collect()
            })
            .collect();
        SampleBuffer::new(channels, sample_rate)
            .expect("per-channel mapping preserves the layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn hot_buffer() -> SampleBuffer {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * PI32 * 440.0 * i as f32 / 44_100.0).sin() * 1.4)
            .collect();
        SampleBuffer::stereo(samples.clone(), samples, 44_100).unwrap()
    }

    #[test]
    fn oversampling_preserves_original_samples() {
        let samples = vec![0.1_f32, -0.4, 0.7, 0.2];
        let oversampled = oversample_4x(&samples);
        assert_eq!(oversampled.len(), 16);
        for (i, &s) in samples.iter().enumerate() {
            assert_eq!(oversampled[i * 4], s);
        }
    }

    #[test]
    fn oversampling_interpolates_between_samples() {
        // A half-cycle: interpolated values must land between neighbors,
        // not jump
        let samples: Vec<f32> = (0..64)
            .map(|i| (2.0 * PI32 * 1000.0 * i as f32 / 44_100.0).sin())
            .collect();
        let oversampled = oversample_4x(&samples);
        // Away from the edges the interpolation error vs the true sine
        // is small
        for i in 16..48 {
            let t = (i as f32 + 0.5) / 4.0;
            let expected = (2.0 * PI32 * 1000.0 * t / 44_100.0).sin();
            let actual = oversampled[i * 4 + 2];
            assert!(
                (actual - expected).abs() < 0.05,
                "at {i}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn limiter_holds_the_ceiling() {
        let limiter = TruePeakLimiter::new(LimiterSettings {
            ceiling_db: -1.0,
            release_ms: 80.0,
            lookahead_ms: 1.5,
        });
        let output = limiter.process(&hot_buffer());
        let ceiling = db_to_linear(-1.0) as f32;
        assert!(
            output.peak() <= ceiling + 1e-4,
            "peak {} exceeds ceiling {}",
            output.peak(),
            ceiling
        );
    }

    #[test]
    fn quiet_signal_is_untouched() {
        let limiter = TruePeakLimiter::new(LimiterSettings::default());
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * PI32 * 440.0 * i as f32 / 44_100.0).sin() * 0.2)
            .collect();
        let input = SampleBuffer::mono(samples, 44_100);
        let output = limiter.process(&input);
        let max_diff: f32 = input
            .channel(0)
            .iter()
            .zip(output.channel(0).iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(max_diff < 1e-6, "quiet signal changed by {max_diff}");
    }

    #[test]
    fn limiting_is_deterministic() {
        let limiter = TruePeakLimiter::new(LimiterSettings::default());
        let input = hot_buffer();
        assert_eq!(limiter.process(&input), limiter.process(&input));
    }
}
