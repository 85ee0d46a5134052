//! Stereo imager stage: per-band width via mid/side scaling

use crate::biquad::Biquad;
use crate::chain::Stage;
use crate::config::ImagerSettings;
use echo_core::SampleBuffer;

/// Stereo imager: the signal is split into low/mid/high with the same
/// complementary crossover as the multiband compressor, and each band's
/// side component is scaled by its width:
///
/// - width 0: band collapses to mono
/// - width 1: band unchanged
/// - width 2: side doubled
///
/// Mono buffers pass through untouched - there is no side signal to
/// scale.
pub struct StereoImager {
    settings: ImagerSettings,
}

impl StereoImager {
    /// Create an imager from validated settings
    pub fn new(settings: ImagerSettings) -> Self {
        Self { settings }
    }

    fn split(filter_low: &Biquad, filter_high: &Biquad, channel: &[f32]) -> [Vec<f32>; 3] {
        let low = filter_low.filter_channel(channel);
        let rest: Vec<f32> = channel.iter().zip(low.iter()).map(|(&s, &l)| s - l).collect();
        let mid = filter_high.filter_channel(&rest);
        let high: Vec<f32> = rest.iter().zip(mid.iter()).map(|(&r, &m)| r - m).collect();
        [low, mid, high]
    }
}

impl Stage for StereoImager {
    fn name(&self) -> &'static str {
        "Stereo Imager"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        if buffer.channel_count() < 2 {
            tracing::debug!("stereo imager skipped on mono buffer");
            return buffer.clone();
        }
        let sample_rate = buffer.sample_rate();
        let filter_low = Biquad::low_pass(sample_rate, self.settings.low_crossover_hz);
        let filter_high = Biquad::low_pass(sample_rate, self.settings.high_crossover_hz);

        let left_bands = Self::split(&filter_low, &filter_high, buffer.channel(0));
        let right_bands = Self::split(&filter_low, &filter_high, buffer.channel(1));
        let widths = [
            self.settings.low_width as f32,
            self.settings.mid_width as f32,
            self.settings.high_width as f32,
        ];

        let frames = buffer.frames();
        let mut left_out = vec![0.0_f32; frames];
        let mut right_out = vec![0.0_f32; frames];
        for (band, &width) in widths.iter().enumerate() {
            let l_band = &left_bands[band];
            let r_band = &right_bands[band];
            for i in 0..frames {
                let mid = (l_band[i] + r_band[i]) * 0.5;
                let side = (l_band[i] - r_band[i]) * 0.5 * width;
                left_out[i] += mid + side;
                right_out[i] += mid - side;
            }
        }

        SampleBuffer::stereo(left_out, right_out, sample_rate)
            .expect("band sums preserve channel length")
    }
}
