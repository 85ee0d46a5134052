//! Dynamic EQ stage: per-band keyed compression/expansion

use crate::biquad::Biquad;
use crate::chain::Stage;
use crate::config::{DynamicEqMode, DynamicEqSettings};
use crate::stages::dynamics::{compression_gain_db, level_db, EnvelopeFollower};
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Dynamic EQ: each band is isolated with a band-pass filter, its level
/// is keyed against a threshold, and the resulting gain is applied to
/// the band component only:
///
/// `out = in + (gain - 1) * band`
///
/// In `Compress` mode the band is pulled down when it exceeds the
/// threshold; in `Expand` mode it is lifted when it falls below.
pub struct DynamicEq {
    settings: DynamicEqSettings,
}

impl DynamicEq {
    /// Create a dynamic EQ stage from validated settings
    pub fn new(settings: DynamicEqSettings) -> Self {
        Self { settings }
    }
}

impl Stage for DynamicEq {
    fn name(&self) -> &'static str {
        "Dynamic EQ"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        if self.settings.bands.is_empty() {
            return buffer.clone();
        }
        let sample_rate = buffer.sample_rate();
        let mut channels: Vec<Vec<f32>> =
            buffer.channels().iter().map(|ch| ch.to_vec()).collect();

        for band in &self.settings.bands {
            let filter = Biquad::band_pass(sample_rate, band.frequency_hz, band.q);
            for channel in &mut channels {
                let isolated = filter.filter_channel(channel);
                let mut follower =
                    EnvelopeFollower::new(sample_rate, band.attack_ms, band.release_ms);
                for (sample, &band_sample) in channel.iter_mut().zip(isolated.iter()) {
                    let env_db = follower.tick(level_db(band_sample));
                    let gain_db = match band.mode {
                        DynamicEqMode::Compress => {
                            compression_gain_db(env_db, band.threshold_db, band.ratio)
                                .max(-band.max_gain_db)
                        }
                        DynamicEqMode::Expand => {
                            // Lift the band toward the threshold when it
                            // falls below
                            if env_db < band.threshold_db {
                                let under = band.threshold_db - env_db;
                                (under * (1.0 - 1.0 / band.ratio)).min(band.max_gain_db)
                            } else {
                                0.0
                            }
                        }
                    };
                    let gain = db_to_linear(gain_db) as f32;
                    *sample += (gain - 1.0) * band_sample;
                }
            }
        }

        SampleBuffer::new(channels, sample_rate)
            .expect("per-channel mapping preserves the layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicEqBand;
    use std::f32::consts::PI;

    fn sine_buffer(frequency: f32, amplitude: f32) -> SampleBuffer {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * PI * frequency * i as f32 / 44_100.0).sin() * amplitude)
            .collect();
        SampleBuffer::mono(samples, 44_100)
    }

    fn band(mode: DynamicEqMode) -> DynamicEqBand {
        DynamicEqBand {
            frequency_hz: 1000.0,
            q: 1.0,
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 2.0,
            release_ms: 80.0,
            mode,
            max_gain_db: 12.0,
        }
    }

    #[test]
    fn compress_mode_reduces_a_hot_band() {
        let eq = DynamicEq::new(DynamicEqSettings {
            bands: vec![band(DynamicEqMode::Compress)],
        });
        // -6 dBFS tone, well over the -20 dB threshold
        let input = sine_buffer(1000.0, 0.5);
        let output = eq.process(&input);
        assert!(
            output.rms_db() < input.rms_db() - 2.0,
            "band was not reduced: {} vs {}",
            output.rms_db(),
            input.rms_db()
        );
    }

    #[test]
    fn below_threshold_compression_is_transparent() {
        let eq = DynamicEq::new(DynamicEqSettings {
            bands: vec![band(DynamicEqMode::Compress)],
        });
        // -40 dBFS tone, far below threshold
        let input = sine_buffer(1000.0, 0.01);
        let output = eq.process(&input);
        assert!((output.rms_db() - input.rms_db()).abs() < 0.5);
    }

    #[test]
    fn expand_mode_lifts_a_quiet_band() {
        let eq = DynamicEq::new(DynamicEqSettings {
            bands: vec![band(DynamicEqMode::Expand)],
        });
        let input = sine_buffer(1000.0, 0.01);
        let output = eq.process(&input);
        assert!(
            output.rms_db() > input.rms_db() + 2.0,
            "band was not lifted: {} vs {}",
            output.rms_db(),
            input.rms_db()
        );
    }

    #[test]
    fn off_band_content_is_untouched() {
        let eq = DynamicEq::new(DynamicEqSettings {
            bands: vec![band(DynamicEqMode::Compress)],
        });
        let input = sine_buffer(100.0, 0.5);
        let output = eq.process(&input);
        assert!((output.rms_db() - input.rms_db()).abs() < 0.5);
    }
}
