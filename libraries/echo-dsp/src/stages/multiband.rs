//! Multiband compressor stage

use crate::biquad::Biquad;
use crate::chain::Stage;
use crate::config::{BandCompressorSettings, MultibandSettings};
use crate::stages::dynamics::{compression_gain_db, level_db, EnvelopeFollower};
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Multiband compressor: complementary three-way split, an independent
/// compressor per band, then recombination.
///
/// The split is subtractive - `low = LP(x)`, `rest = x - low`,
/// `mid = LP(rest)`, `high = rest - mid` - so with all bands neutral the
/// recombined signal reconstructs the input exactly (no crossover
/// ripple to undo).
pub struct MultibandCompressor {
    settings: MultibandSettings,
}

impl MultibandCompressor {
    /// Create a multiband stage from validated settings
    pub fn new(settings: MultibandSettings) -> Self {
        Self { settings }
    }

    fn compress_band(
        band: &[f32],
        settings: &BandCompressorSettings,
        sample_rate: u32,
    ) -> Vec<f32> {
        if settings.ratio <= 1.0 && settings.makeup_db == 0.0 {
            return band.to_vec();
        }
        let makeup = db_to_linear(settings.makeup_db);
        let mut follower =
            EnvelopeFollower::new(sample_rate, settings.attack_ms, settings.release_ms);
        band.iter()
            .map(|&sample| {
                let env_db = follower.tick(level_db(sample));
                let gain_db =
                    compression_gain_db(env_db, settings.threshold_db, settings.ratio);
                (f64::from(sample) * db_to_linear(gain_db) * makeup) as f32
            })
            .collect()
    }
}

impl Stage for MultibandCompressor {
    fn name(&self) -> &'static str {
        "Multiband Compressor"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let low_split = Biquad::low_pass(sample_rate, self.settings.low_crossover_hz);
        let high_split = Biquad::low_pass(sample_rate, self.settings.high_crossover_hz);

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                let low = low_split.filter_channel(channel);
                let rest: Vec<f32> = channel
                    .iter()
                    .zip(low.iter())
                    .map(|(&s, &l)| s - l)
                    .collect();
                let mid = high_split.filter_channel(&rest);
                let high: Vec<f32> =
                    rest.iter().zip(mid.iter()).map(|(&r, &m)| r - m).collect();

                let low = Self::compress_band(&low, &self.settings.low, sample_rate);
                let mid = Self::compress_band(&mid, &self.settings.mid, sample_rate);
                let high = Self::compress_band(&high, &self.settings.high, sample_rate);

                low.iter()
                    .zip(mid.iter())
                    .zip(high.iter())
                    .map(|((&l, &m), &h)| l + m + h)
                    .collect()
            })
            .collect();

        SampleBuffer::new(channels, sample_rate)
            .expect("per-channel mapping preserves the layout")
    }
}
