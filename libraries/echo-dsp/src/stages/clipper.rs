//! Soft clipper stage

use crate::chain::Stage;
use crate::config::ClipperSettings;
use echo_core::math::db_to_linear;
use echo_core::SampleBuffer;

/// Soft clipper: transparent below the knee, saturating up to the
/// threshold, never beyond it
///
/// With `softness` 0 this is a hard clip at the threshold. With
/// `softness` s, the knee starts at `threshold * (1 - s)` and the
/// region above it is rounded with a tanh curve that asymptotically
/// approaches the threshold.
pub struct Clipper {
    settings: ClipperSettings,
}

impl Clipper {
    /// Create a clipper from validated settings
    pub fn new(settings: ClipperSettings) -> Self {
        Self { settings }
    }
}

impl Stage for Clipper {
    fn name(&self) -> &'static str {
        "Soft Clipper"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let threshold = db_to_linear(self.settings.threshold_db) as f32;
        let knee = threshold * (1.0 - self.settings.softness as f32);
        let curve_range = threshold - knee;

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                channel
                    .iter()
                    .map(|&s| {
                        let magnitude = s.abs();
                        if magnitude <= knee {
                            s
                        } else if curve_range <= f32::EPSILON {
                            s.signum() * threshold
                        } else {
                            let over = (magnitude - knee) / curve_range;
                            s.signum() * (knee + curve_range * over.tanh())
                        }
                    })
                    .collect()
            })
            .collect();
        SampleBuffer::new(channels, buffer.sample_rate())
            .expect("per-channel mapping preserves the layout")
    }
}
