//! De-esser stage: frequency-targeted dynamic reduction

use crate::biquad::Biquad;
use crate::chain::Stage;
use crate::config::DeEsserSettings;
use crate::stages::dynamics::{compression_gain_db, level_db, EnvelopeFollower};
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Sibilance detector timing: fast enough to catch an "s", slow enough
/// not to chatter
const ATTACK_MS: f64 = 0.5;
const RELEASE_MS: f64 = 60.0;

/// De-esser: the band above the sibilance corner is keyed against a
/// threshold, and only that band is attenuated:
///
/// `out = in - (1 - gain) * sibilance_band`
pub struct DeEsser {
    settings: DeEsserSettings,
}

impl DeEsser {
    /// Create a de-esser stage from validated settings
    pub fn new(settings: DeEsserSettings) -> Self {
        Self { settings }
    }
}

impl Stage for DeEsser {
    fn name(&self) -> &'static str {
        "De-Esser"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let filter = Biquad::high_pass(sample_rate, self.settings.frequency_hz);

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                let sibilance = filter.filter_channel(channel);
                let mut follower = EnvelopeFollower::new(sample_rate, ATTACK_MS, RELEASE_MS);
                channel
                    .iter()
                    .zip(sibilance.iter())
                    .map(|(&sample, &band)| {
                        let env_db = follower.tick(level_db(band));
                        let gain_db = compression_gain_db(
                            env_db,
                            self.settings.threshold_db,
                            self.settings.ratio,
                        );
                        let gain = db_to_linear(gain_db) as f32;
                        sample - (1.0 - gain) * band
                    })
                    .collect()
            })
            .collect();

        SampleBuffer::new(channels, sample_rate)
            .expect("per-channel mapping preserves the layout")
    }
}
