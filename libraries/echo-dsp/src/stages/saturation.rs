//! Saturation stage: tape/tube/digital nonlinearities

use crate::chain::Stage;
use crate::config::{SaturationKind, SaturationSettings};
use echo_core::SampleBuffer;

/// Saturator: waveshaping nonlinearity with dry/wet mix
///
/// All three curves are normalized so a full-scale input maps to a
/// full-scale output; the flavor is in the shape of the knee:
/// - `Tape`: tanh - smooth symmetric soft clip
/// - `Tube`: arctangent - rounder knee, gentler high-order harmonics
/// - `Digital`: hard clip at `1/drive` - the harsh one
pub struct Saturator {
    settings: SaturationSettings,
}

impl Saturator {
    /// Create a saturator from validated settings
    pub fn new(settings: SaturationSettings) -> Self {
        Self { settings }
    }

    #[inline]
    fn shape(&self, sample: f32, drive: f32) -> f32 {
        match self.settings.kind {
            SaturationKind::Tape => (sample * drive).tanh() / drive.tanh(),
            SaturationKind::Tube => (sample * drive).atan() / drive.atan(),
            SaturationKind::Digital => (sample * drive).clamp(-1.0, 1.0),
        }
    }
}

impl Stage for Saturator {
    fn name(&self) -> &'static str {
        "Saturator"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        if self.settings.amount <= 0.0 || self.settings.mix <= 0.0 {
            return buffer.clone();
        }
        // amount 0..1 maps to drive 1..10
        let drive = (1.0 + self.settings.amount * 9.0) as f32;
        let mix = self.settings.mix as f32;

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                channel
                    .iter()
                    .map(|&s| s * (1.0 - mix) + self.shape(s, drive) * mix)
                    .collect()
            })
            .collect();
        SampleBuffer::new(channels, buffer.sample_rate())
            .expect("per-channel mapping preserves the layout")
    }
}
