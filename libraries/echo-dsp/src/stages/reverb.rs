//! Motion reverb stage
//!
//! A dense multi-tap tail with exponential decay, slow modulation of the
//! tap positions ("motion"), and optional ducking tied to the input
//! envelope. Tap spacing and gains extend the classic four-tap room
//! pattern into a full decay cloud.

use crate::chain::Stage;
use crate::config::MotionReverbSettings;
use crate::stages::dynamics::{level_db, EnvelopeFollower};
use echo_core::SampleBuffer;
use std::f64::consts::PI;

/// Diffusion spacing between taps in seconds
const TAP_SPACING_SECS: f64 = 0.013;
/// Fixed per-tap jitter cycle in ms, breaks up metallic ringing
const TAP_JITTER_MS: [f64; 8] = [0.0, 3.1, -2.3, 1.7, -0.9, 2.9, -1.3, 0.6];
/// Maximum number of tail taps
const MAX_TAPS: usize = 64;
/// Peak tap-position modulation at full depth, in ms
const MOTION_RANGE_MS: f64 = 2.0;
/// Ducking detector timing
const DUCK_ATTACK_MS: f64 = 5.0;
const DUCK_RELEASE_MS: f64 = 150.0;

/// One tail tap: base delay and gain
struct Tap {
    delay_secs: f64,
    gain: f32,
}

/// Motion reverb
pub struct MotionReverb {
    settings: MotionReverbSettings,
}

impl MotionReverb {
    /// Create a motion reverb from validated settings
    pub fn new(settings: MotionReverbSettings) -> Self {
        Self { settings }
    }

    fn design_taps(&self) -> Vec<Tap> {
        let pre_delay = self.settings.pre_delay_ms / 1000.0;
        let mut taps = Vec::new();
        for n in 0..MAX_TAPS {
            let jitter = TAP_JITTER_MS[n % TAP_JITTER_MS.len()] / 1000.0;
            let delay_secs = pre_delay + n as f64 * TAP_SPACING_SECS + jitter.max(0.0);
            // -60 dB across the configured decay time
            let gain = 10.0_f64.powf(-3.0 * (delay_secs - pre_delay) / self.settings.decay_s);
            if gain < 1e-4 {
                break;
            }
            taps.push(Tap {
                delay_secs,
                gain: gain as f32,
            });
        }
        taps
    }

    /// Modulation rate: free-running, or one cycle per bar when a tempo
    /// is supplied
    fn motion_rate_hz(&self) -> f64 {
        match self.settings.tempo_bpm {
            Some(bpm) if bpm > 0.0 => bpm / 60.0 / 4.0,
            _ => self.settings.motion_rate_hz,
        }
    }
}

impl Stage for MotionReverb {
    fn name(&self) -> &'static str {
        "Motion Reverb"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        if self.settings.wet <= 0.0 {
            return buffer.clone();
        }
        let sample_rate = f64::from(buffer.sample_rate());
        let frames = buffer.frames();
        let taps = self.design_taps();
        let rate = self.motion_rate_hz();
        let depth_samples = self.settings.motion_depth * MOTION_RANGE_MS / 1000.0 * sample_rate;
        let wet = self.settings.wet as f32;
        let dry = 1.0 - wet;

        let channels: Vec<Vec<f32>> = buffer
            .channels()
            .iter()
            .enumerate()
            .map(|(channel_index, channel)| {
                // Per-channel phase offset decorrelates the tails
                let channel_phase = channel_index as f64 * PI / 3.0;
                let mut duck_env =
                    EnvelopeFollower::new(buffer.sample_rate(), DUCK_ATTACK_MS, DUCK_RELEASE_MS);

                (0..frames)
                    .map(|i| {
                        let t = i as f64 / sample_rate;
                        let lfo = (2.0 * PI * rate * t + channel_phase).sin();

                        let mut wet_sample = 0.0_f32;
                        for (n, tap) in taps.iter().enumerate() {
                            // Alternate modulation polarity across taps
                            let polarity = if n % 2 == 0 { 1.0 } else { -1.0 };
                            let delay_samples =
                                tap.delay_secs * sample_rate + lfo * depth_samples * polarity;
                            let read_pos = i as f64 - delay_samples;
                            if read_pos < 0.0 {
                                continue;
                            }
                            let index = read_pos as usize;
                            if index + 1 >= frames {
                                continue;
                            }
                            let frac = (read_pos - index as f64) as f32;
                            let interpolated =
                                channel[index] * (1.0 - frac) + channel[index + 1] * frac;
                            wet_sample += interpolated * tap.gain;
                        }

                        // Ducking: loud input pushes the tail down
                        let env_db = duck_env.tick(level_db(channel[i]));
                        let openness = ((env_db + 40.0) / 40.0).clamp(0.0, 1.0);
                        let duck_gain = (1.0 - self.settings.duck * openness) as f32;

                        channel[i] * dry + wet_sample * wet * duck_gain
                    })
                    .collect()
            })
            .collect();

        SampleBuffer::new(channels, buffer.sample_rate())
            .expect("per-channel mapping preserves the layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A short burst followed by silence, so the tail is visible
    fn burst_buffer() -> SampleBuffer {
        let mut samples = vec![0.0_f32; 44_100 * 2];
        for (i, s) in samples.iter_mut().enumerate().take(2205) {
            let t = i as f32 / 44_100.0;
            *s = 0.8 * (2.0 * std::f32::consts::PI * 500.0 * t).sin();
        }
        SampleBuffer::mono(samples, 44_100)
    }

    fn tail_rms(buffer: &SampleBuffer) -> f32 {
        let tail = &buffer.channel(0)[22_050..44_100];
        (tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32).sqrt()
    }

    #[test]
    fn zero_wet_is_bit_identical() {
        let reverb = MotionReverb::new(MotionReverbSettings {
            wet: 0.0,
            ..Default::default()
        });
        let input = burst_buffer();
        assert_eq!(reverb.process(&input), input);
    }

    #[test]
    fn reverb_adds_a_tail() {
        let reverb = MotionReverb::new(MotionReverbSettings {
            decay_s: 1.5,
            wet: 0.4,
            ..Default::default()
        });
        let input = burst_buffer();
        let output = reverb.process(&input);
        assert!(
            tail_rms(&output) > tail_rms(&input) * 5.0 || tail_rms(&input) == 0.0,
            "tail rms {} vs {}",
            tail_rms(&output),
            tail_rms(&input)
        );
    }

    #[test]
    fn longer_decay_means_more_tail() {
        let short = MotionReverb::new(MotionReverbSettings {
            decay_s: 0.3,
            wet: 0.4,
            ..Default::default()
        });
        let long = MotionReverb::new(MotionReverbSettings {
            decay_s: 3.0,
            wet: 0.4,
            ..Default::default()
        });
        let input = burst_buffer();
        assert!(tail_rms(&long.process(&input)) > tail_rms(&short.process(&input)));
    }

    #[test]
    fn ducking_reduces_wet_under_the_direct_signal() {
        let open = MotionReverb::new(MotionReverbSettings {
            decay_s: 1.5,
            wet: 0.5,
            duck: 0.0,
            ..Default::default()
        });
        let ducked = MotionReverb::new(MotionReverbSettings {
            decay_s: 1.5,
            wet: 0.5,
            duck: 0.9,
            ..Default::default()
        });
        // Sustained signal keeps the duck engaged
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 500.0 * i as f32 / 44_100.0).sin() * 0.7)
            .collect();
        let input = SampleBuffer::mono(samples, 44_100);
        let open_out = open.process(&input);
        let ducked_out = ducked.process(&input);
        assert!(ducked_out.rms() < open_out.rms());
    }

    #[test]
    fn processing_is_deterministic() {
        let reverb = MotionReverb::new(MotionReverbSettings {
            motion_depth: 0.8,
            ..Default::default()
        });
        let input = burst_buffer();
        assert_eq!(reverb.process(&input), reverb.process(&input));
    }
}
