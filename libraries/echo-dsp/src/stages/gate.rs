//! Gate/expander stage

use crate::chain::Stage;
use crate::config::GateSettings;
use crate::stages::dynamics::{expansion_gain_db, level_db, EnvelopeFollower};
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Downward expander/gate
///
/// Signal below the threshold is pushed further down by the ratio,
/// clamped at the range. Channels are linked: one detector and one gain
/// per frame, so the stereo image does not wander as the gate moves.
pub struct Gate {
    settings: GateSettings,
}

impl Gate {
    /// Create a gate from validated settings
    pub fn new(settings: GateSettings) -> Self {
        Self { settings }
    }
}

impl Stage for Gate {
    fn name(&self) -> &'static str {
        "Gate"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let frames = buffer.frames();
        let mut follower =
            EnvelopeFollower::new(sample_rate, self.settings.attack_ms, self.settings.release_ms);

        let mut gains = Vec::with_capacity(frames);
        for frame in 0..frames {
            let frame_level = buffer
                .channels()
                .iter()
                .map(|ch| level_db(ch[frame]))
                .fold(f64::NEG_INFINITY, f64::max);
            let env_db = follower.tick(frame_level);
            let gain_db = expansion_gain_db(
                env_db,
                self.settings.threshold_db,
                self.settings.ratio,
                self.settings.range_db,
            );
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
    use std::f32::consts::PI;

    fn sine_buffer(amplitude: f32) -> SampleBuffer {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44_100.0).sin() * amplitude)
            .collect();
        SampleBuffer::mono(samples, 44_100)
    }

    #[test]
    fn loud_signal_passes() {
        let gate = Gate::new(GateSettings::default());
        let input = sine_buffer(0.5);
        let output = gate.process(&input);
        assert!((output.rms_db() - input.rms_db()).abs() < 0.5);
    }

    #[test]
    fn quiet_signal_is_attenuated() {
        let gate = Gate::new(GateSettings {
            threshold_db: -30.0,
            ratio: 8.0,
            ..Default::default()
        });
        // -52 dBFS, far below the -30 dB threshold
        let input = sine_buffer(0.0025);
        let output = gate.process(&input);
        assert!(
            output.rms_db() < input.rms_db() - 10.0,
            "quiet signal only moved from {} to {}",
            input.rms_db(),
            output.rms_db()
        );
    }

    #[test]
    fn silence_stays_silent_without_errors() {
        let gate = Gate::new(GateSettings::default());
        let input = SampleBuffer::silent(2, 44_100, 44_100);
        let output = gate.process(&input);
        assert!(output.is_silent());
    }
}
