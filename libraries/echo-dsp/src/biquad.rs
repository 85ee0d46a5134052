//! RBJ biquad filters
//!
//! Direct Form I biquads with coefficients from the Audio EQ Cookbook.
//! One `Biquad` holds the coefficients; one `BiquadState` holds the
//! per-channel delay memory, so a single filter design can run over any
//! number of channels.

use std::f64::consts::PI;

/// Biquad coefficients (a0-normalized)
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Per-channel filter memory
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Identity filter (passes the signal unchanged)
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Peaking EQ band
    pub fn peaking(sample_rate: u32, frequency_hz: f64, gain_db: f64, q: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_w0;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha / a;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Low shelf
    pub fn low_shelf(sample_rate: u32, frequency_hz: f64, gain_db: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let cos_w0 = w0.cos();
        // Shelf slope fixed at 1.0 (Butterworth-like transition)
        let alpha = w0.sin() / 2.0 * (2.0_f64).sqrt();
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha);
        let a0 = (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0);
        let a2 = (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// High shelf
    pub fn high_shelf(sample_rate: u32, frequency_hz: f64, gain_db: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / 2.0 * (2.0_f64).sqrt();
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha);
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0);
        let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha);
        let a0 = (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w0);
        let a2 = (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// 2nd-order Butterworth low-pass
    pub fn low_pass(sample_rate: u32, frequency_hz: f64) -> Self {
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let q = std::f64::consts::FRAC_1_SQRT_2;
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let b0 = (1.0 - cos_w0) / 2.0;
        let b1 = 1.0 - cos_w0;
        let b2 = (1.0 - cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// 2nd-order Butterworth high-pass
    pub fn high_pass(sample_rate: u32, frequency_hz: f64) -> Self {
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let q = std::f64::consts::FRAC_1_SQRT_2;
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Band-pass (constant peak gain)
    pub fn band_pass(sample_rate: u32, frequency_hz: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let b0 = alpha;
        let b1 = 0.0;
        let b2 = -alpha;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Process one sample through the filter
    #[inline]
    pub fn tick(&self, state: &mut BiquadState, input: f32) -> f32 {
        let x0 = f64::from(input);
        let y0 = self.b0 * x0 + self.b1 * state.x1 + self.b2 * state.x2
            - self.a1 * state.y1
            - self.a2 * state.y2;
        state.x2 = state.x1;
        state.x1 = x0;
        state.y2 = state.y1;
        state.y1 = y0;
        y0 as f32
    }

    /// Filter a whole channel with fresh state
    pub fn filter_channel(&self, samples: &[f32]) -> Vec<f32> {
        let mut state = BiquadState::default();
        samples.iter().map(|&s| self.tick(&mut state, s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn sine(frequency: f32, n: usize, sample_rate: f32) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI32 * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn identity_passes_signal() {
        let filter = Biquad::identity();
        let input = sine(440.0, 1000, 44_100.0);
        let output = filter.filter_channel(&input);
        for (a, b) in input.iter().zip(output.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn low_pass_attenuates_high_frequencies() {
        let filter = Biquad::low_pass(44_100, 500.0);
        let low = filter.filter_channel(&sine(100.0, 44_100, 44_100.0));
        let high = filter.filter_channel(&sine(8000.0, 44_100, 44_100.0));
        assert!(rms(&low) > 0.6);
        assert!(rms(&high) < 0.05);
    }

    #[test]
    fn high_pass_attenuates_low_frequencies() {
        let filter = Biquad::high_pass(44_100, 2000.0);
        let low = filter.filter_channel(&sine(100.0, 44_100, 44_100.0));
        let high = filter.filter_channel(&sine(8000.0, 44_100, 44_100.0));
        assert!(rms(&low) < 0.05);
        assert!(rms(&high) > 0.6);
    }

    #[test]
    fn peaking_boosts_center_frequency() {
        let filter = Biquad::peaking(44_100, 1000.0, 6.0, 1.0);
        let at_center = filter.filter_channel(&sine(1000.0, 44_100, 44_100.0));
        let off_center = filter.filter_channel(&sine(100.0, 44_100, 44_100.0));
        // +6 dB at center ~ 2x amplitude
        assert!(rms(&at_center) > 1.2 * rms(&sine(1000.0, 44_100, 44_100.0)));
        // Far from center, roughly unity
        assert!((rms(&off_center) / rms(&sine(100.0, 44_100, 44_100.0)) - 1.0).abs() < 0.1);
    }

    #[test]
    fn zero_gain_peaking_is_transparent() {
        let filter = Biquad::peaking(44_100, 1000.0, 0.0, 1.0);
        let input = sine(440.0, 4410, 44_100.0);
        let output = filter.filter_channel(&input);
        let diff: f32 = input
            .iter()
            .zip(output.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(diff < 1e-5, "max diff {diff}");
    }
}
