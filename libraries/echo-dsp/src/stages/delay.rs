//! Feedback delay - the shared send-bus echo effect
//!
//! Not part of the mastering stage order; the mix engine feeds the
//! delay bus with send-weighted stem signal, processes it once through
//! this effect, and sums the result back into the master.

use crate::chain::Stage;
use crate::config::BusDelaySettings;
use echo_core::SampleBuffer;

/// Feedback delay line: `y[i] = x[i - D] + feedback * y[i - D]`
///
/// Output is wet-only (the repeats, starting at one delay time), which
/// is what a send bus wants - the dry signal is already on the master.
pub struct BusDelay {
    settings: BusDelaySettings,
}

impl BusDelay {
    /// Create a bus delay from validated settings
    pub fn new(settings: BusDelaySettings) -> Self {
        Self { settings }
    }
}

impl Stage for BusDelay {
    fn name(&self) -> &'static str {
        "Bus Delay"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let sample_rate = buffer.sample_rate();
        let delay_samples =
            ((self.settings.delay_ms / 1000.0) * f64::from(sample_rate)).round() as usize;
        let delay_samples = delay_samples.max(1);
        let feedback = self.settings.feedback as f32;

        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                let mut out = vec![0.0_f32; channel.len()];
                for i in delay_samples..channel.len() {
                    out[i] = channel[i - delay_samples] + feedback * out[i - delay_samples];
                }
                out
            })
            .collect();
        SampleBuffer::new(channels, sample_rate)
            .expect("per-channel mapping preserves the layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_produces_decaying_repeats() {
        let delay = BusDelay::new(BusDelaySettings {
            delay_ms: 100.0,
            feedback: 0.5,
        });
        let mut samples = vec![0.0_f32; 44_100];
        samples[0] = 1.0;
        let input = SampleBuffer::mono(samples, 44_100);
        let output = delay.process(&input);
        let d = 4410;
        assert!((output.channel(0)[d] - 1.0).abs() < 1e-6);
        assert!((output.channel(0)[2 * d] - 0.5).abs() < 1e-6);
        assert!((output.channel(0)[3 * d] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn output_is_wet_only() {
        let delay = BusDelay::new(BusDelaySettings::default());
        let mut samples = vec![0.0_f32; 44_100];
        samples[0] = 1.0;
        let input = SampleBuffer::mono(samples, 44_100);
        let output = delay.process(&input);
        // The dry impulse itself is not echoed back at time zero
        assert_eq!(output.channel(0)[0], 0.0);
    }
}
