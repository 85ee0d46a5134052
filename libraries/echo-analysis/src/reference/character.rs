//! Overall character classification
//!
//! A small fixed ruleset maps combined metrics (tail energy, dynamic
//! range, level) onto the discrete space/energy labels the level
//! suggestion and scoring layers consume.

use super::delay::DelayAnalysis;
use super::reverb::ReverbAnalysis;
use echo_core::{AudioMetrics, SampleBuffer};
use serde::{Deserialize, Serialize};

/// How much acoustic space the mix occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceCharacter {
    Dry,
    Roomy,
    Spacious,
}

/// Overall intensity of the mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCharacter {
    Subdued,
    Moderate,
    Intense,
}

/// Combined character labels for a reference track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallCharacter {
    pub space: SpaceCharacter,
    pub energy: EnergyCharacter,
}

/// RMS above this reads as an intense master
const INTENSE_RMS_DB: f64 = -14.0;
/// RMS above this (but below intense) reads as moderate
const MODERATE_RMS_DB: f64 = -22.0;
/// Long decay plus a wet balance pushes roomy into spacious
const SPACIOUS_DECAY_S: f64 = 1.2;
const SPACIOUS_WET_RATIO: f64 = 0.25;

/// Classify a reference buffer given its effect analyses
pub fn classify(
    buffer: &SampleBuffer,
    reverb: &ReverbAnalysis,
    delay: &DelayAnalysis,
) -> OverallCharacter {
    let metrics = AudioMetrics::measure(buffer);

    let space = if reverb.detected
        && reverb.decay_time_s >= SPACIOUS_DECAY_S
        && reverb.wet_dry_ratio >= SPACIOUS_WET_RATIO
    {
        SpaceCharacter::Spacious
    } else if reverb.detected || delay.detected {
        SpaceCharacter::Roomy
    } else {
        SpaceCharacter::Dry
    };

    let energy = if metrics.rms_db >= INTENSE_RMS_DB {
        EnergyCharacter::Intense
    } else if metrics.rms_db >= MODERATE_RMS_DB {
        EnergyCharacter::Moderate
    } else {
        // Includes the silent (-inf) degenerate case
        EnergyCharacter::Subdued
    };

    OverallCharacter { space, energy }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loud_buffer() -> SampleBuffer {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44_100.0).sin() * 0.5)
            .collect();
        SampleBuffer::mono(samples, 44_100)
    }

    #[test]
    fn dry_quiet_signal_classifies_dry() {
        let character = classify(
            &SampleBuffer::silent(1, 44_100, 44_100),
            &ReverbAnalysis::none(),
            &DelayAnalysis::none(),
        );
        assert_eq!(character.space, SpaceCharacter::Dry);
        assert_eq!(character.energy, EnergyCharacter::Subdued);
    }

    #[test]
    fn detected_reverb_is_at_least_roomy() {
        let mut reverb = ReverbAnalysis::none();
        reverb.detected = true;
        reverb.decay_time_s = 0.5;
        let character = classify(&loud_buffer(), &reverb, &DelayAnalysis::none());
        assert_eq!(character.space, SpaceCharacter::Roomy);
    }

    #[test]
    fn long_wet_decay_is_spacious() {
        let mut reverb = ReverbAnalysis::none();
        reverb.detected = true;
        reverb.decay_time_s = 2.0;
        reverb.wet_dry_ratio = 0.4;
        let character = classify(&loud_buffer(), &reverb, &DelayAnalysis::none());
        assert_eq!(character.space, SpaceCharacter::Spacious);
    }

    #[test]
    fn loud_sine_is_moderate_or_intense() {
        let character = classify(
            &loud_buffer(),
            &ReverbAnalysis::none(),
            &DelayAnalysis::none(),
        );
        assert_ne!(character.energy, EnergyCharacter::Subdued);
    }
}
