//! Transient shaper stage

use crate::chain::Stage;
use crate::config::TransientSettings;
use crate::stages::dynamics::{level_db, EnvelopeFollower};
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Transient shaper: attack/sustain envelope reshaping
///
/// Two envelope followers track the signal - a fast one that jumps on
/// transients and a slow one that represents the sustain level. The
/// difference classifies each frame as attack-ish or sustain-ish, and
/// the configured gains are crossfaded accordingly. Channels are linked
/// (one gain per frame) to keep the stereo image stable.
pub struct TransientShaper {
    settings: TransientSettings,
}

/// Difference between fast and slow envelopes that counts as a full
/// transient, in dB
const TRANSIENT_RANGE_DB: f64 = 12.0;

impl TransientShaper {
    /// Create a transient shaper from validated settings
    pub fn new(settings: TransientSettings) -> Self {
        Self { settings }
    }
}

impl Stage for TransientShaper {
    fn name(&self) -> &'static str {
        "Transient Shaper"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let frames = buffer.frames();
        let mut fast = EnvelopeFollower::new(sample_rate, 1.0, 20.0);
        let mut slow = EnvelopeFollower::new(sample_rate, 40.0, 200.0);

        let mut gains = Vec::with_capacity(frames);
        for frame in 0..frames {
            let frame_level = buffer
                .channels()
                .iter()
                .map(|ch| level_db(ch[frame]))
                .fold(f64::NEG_INFINITY, f64::max);
            let fast_db = fast.tick(frame_level);
            let slow_db = slow.tick(frame_level);
            let weight = ((fast_db - slow_db) / TRANSIENT_RANGE_DB).clamp(0.0, 1.0);
            let gain_db = self.settings.attack_gain_db * weight
                + self.settings.sustain_gain_db * (1.0 - weight);
            gains.push(db_to_linear(gain_db) as f32);
        }

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                channel
                    .iter()
                    .zip(gains.iter())
                    .map(|(&s, &g)| s * g)
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

    /// A burst with a sharp attack and a long quiet tail
    fn burst_buffer() -> SampleBuffer {
        let mut samples = vec![0.0_f32; 44_100];
        for (i, s) in samples.iter_mut().enumerate().take(220) {
            *s = 0.8 * (1.0 - i as f32 / 220.0);
        }
        for (i, s) in samples.iter_mut().enumerate().skip(2200).take(22_050) {
            let t = (i - 2200) as f32 / 44_100.0;
            *s = 0.1 * (2.0 * std::f32::consts::PI * 220.0 * t).sin();
        }
        SampleBuffer::mono(samples, 44_100)
    }

    #[test]
    fn neutral_settings_are_transparent() {
        let shaper = TransientShaper::new(TransientSettings {
            attack_gain_db: 0.0,
            sustain_gain_db: 0.0,
        });
        let input = burst_buffer();
        let output = shaper.process(&input);
        let max_diff: f32 = input
            .channel(0)
            .iter()
            .zip(output.channel(0).iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(max_diff < 1e-6);
    }

    #[test]
    fn attack_boost_raises_the_transient() {
        let shaper = TransientShaper::new(TransientSettings {
            attack_gain_db: 6.0,
            sustain_gain_db: 0.0,
        });
        let input = burst_buffer();
        let output = shaper.process(&input);
        assert!(
            output.peak_db() > input.peak_db() + 2.0,
            "peak moved from {} to {}",
            input.peak_db(),
            output.peak_db()
        );
    }

    #[test]
    fn sustain_cut_lowers_the_tail() {
        let shaper = TransientShaper::new(TransientSettings {
            attack_gain_db: 0.0,
            sustain_gain_db: -6.0,
        });
        let input = burst_buffer();
        let output = shaper.process(&input);
        // Compare RMS over the sustained portion only
        let tail_in = &input.channel(0)[10_000..30_000];
        let tail_out = &output.channel(0)[10_000..30_000];
        let rms = |s: &[f32]| (s.iter().map(|x| x * x).sum::<f32>() / s.len() as f32).sqrt();
        let delta_db = 20.0 * (rms(tail_out) / rms(tail_in)).log10();
        assert!(delta_db < -3.0, "tail changed by {delta_db} dB");
    }
}
