//! Deterministic test signal generation
//!
//! Shared by the workspace test suites (feature `test-signals`). All
//! generators are deterministic - noise comes from a seeded RNG - so
//! fixtures are reproducible across runs and the mixdown determinism
//! tests stay meaningful.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Generate a mono sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
pub fn sine_wave(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * frequency * t).sin() * amplitude
        })
        .collect()
}

/// Generate seeded white noise (deterministic for a given seed)
pub fn white_noise(sample_rate: u32, duration: f32, amplitude: f32, seed: u64) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_samples)
        .map(|_| (rng.gen::<f32>() * 2.0 - 1.0) * amplitude)
        .collect()
}

/// A single kick-style percussive burst: downward pitch sweep with a
/// fast exponential envelope
pub fn kick_burst(sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * 0.18) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = 120.0 * (-22.0 * t).exp() + 36.0;
            let env = (-18.0 * t).exp();
            (2.0 * PI * freq * t).sin() * env * amplitude
        })
        .collect()
}

/// Generate a percussive loop: kick bursts on every beat of a fixed BPM
/// grid. Useful for tempo, delay and sidechain fixtures.
pub fn percussive_loop(bpm: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    let beat_samples = ((60.0 / bpm) * sample_rate as f32) as usize;
    let kick = kick_burst(sample_rate, amplitude);
    let mut out = vec![0.0_f32; num_samples];
    let mut pos = 0;
    while pos < num_samples {
        for (i, &s) in kick.iter().enumerate() {
            if pos + i >= num_samples {
                break;
            }
            out[pos + i] += s;
        }
        pos += beat_samples;
    }
    out
}

/// Run a dry signal through a feedback delay: taps at `n * delay_ms`
/// with gain `feedback^n`, like a digital delay pedal
pub fn feedback_echo(
    dry: &[f32],
    sample_rate: u32,
    delay_ms: f32,
    feedback: f32,
    repeats: usize,
) -> Vec<f32> {
    let delay_samples = ((delay_ms / 1000.0) * sample_rate as f32) as usize;
    let mut out = dry.to_vec();
    for n in 1..=repeats {
        let offset = delay_samples * n;
        let gain = feedback.powi(n as i32);
        for (i, &s) in dry.iter().enumerate() {
            if i + offset >= out.len() {
                break;
            }
            out[i + offset] += s * gain;
        }
    }
    out
}

/// Add a dense reverb-like tail: many exponentially-decaying taps after
/// a pre-delay gap. `decay_secs` is the time for the tail to fall 60 dB.
pub fn reverb_tail(
    dry: &[f32],
    sample_rate: u32,
    decay_secs: f32,
    pre_delay_ms: f32,
    wet: f32,
) -> Vec<f32> {
    let pre_delay = ((pre_delay_ms / 1000.0) * sample_rate as f32) as usize;
    let tap_spacing = (sample_rate as f32 * 0.013) as usize; // ~13ms diffusion
    let tap_count = ((decay_secs * sample_rate as f32) / tap_spacing as f32) as usize;
    let mut out = dry.to_vec();
    for n in 0..tap_count {
        let offset = pre_delay + n * tap_spacing;
        let t = offset as f32 / sample_rate as f32;
        // -60 dB over decay_secs
        let gain = 10.0_f32.powf(-3.0 * t / decay_secs) * wet;
        if gain < 1e-4 {
            break;
        }
        for (i, &s) in dry.iter().enumerate() {
            if i + offset >= out.len() {
                break;
            }
            out[i + offset] += s * gain;
        }
    }
    out
}

/// Scale a signal by a linear factor
pub fn scaled(samples: &[f32], gain: f32) -> Vec<f32> {
    samples.iter().map(|&s| s * gain).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peak_matches_amplitude() {
        let signal = sine_wave(440.0, 44_100, 1.0, 0.5);
        let peak = signal.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
        assert!(peak > 0.49 && peak <= 0.5);
    }

    #[test]
    fn noise_is_deterministic_for_a_seed() {
        let a = white_noise(44_100, 0.1, 0.8, 7);
        let b = white_noise(44_100, 0.1, 0.8, 7);
        assert_eq!(a, b);
        let c = white_noise(44_100, 0.1, 0.8, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn percussive_loop_has_bursts_on_the_grid() {
        let loop_signal = percussive_loop(120.0, 44_100, 2.0, 0.8);
        let beat = (44_100.0_f32 * 0.5) as usize;
        // Energy right after a beat should dwarf energy just before it
        let on_beat: f32 = loop_signal[beat..beat + 400].iter().map(|s| s * s).sum();
        let off_beat: f32 = loop_signal[beat - 400..beat].iter().map(|s| s * s).sum();
        assert!(on_beat > off_beat * 10.0);
    }

    #[test]
    fn feedback_echo_adds_delayed_copies() {
        let mut dry = vec![0.0_f32; 44_100];
        dry[0] = 1.0;
        let wet = feedback_echo(&dry, 44_100, 500.0, 0.35, 3);
        let d = (0.5_f32 * 44_100.0) as usize;
        assert!((wet[d] - 0.35).abs() < 1e-6);
        assert!((wet[2 * d] - 0.35 * 0.35).abs() < 1e-6);
    }
}
