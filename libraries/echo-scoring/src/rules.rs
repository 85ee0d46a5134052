//! Recommendation rules
//!
//! Each rule flags one specific out-of-range metric and proposes one
//! atomic `EchoAction`. Actions are independently appliable - applying
//! one never requires applying another - and default to the inaudible
//! state (EQ bands at 0 dB and disabled, parameters disabled).

use crate::engine::ScoreInput;
use crate::report::{ActionKind, ActionParam, EchoAction, EqBandSuggestion};

/// Run every rule and collect the flagged actions
pub fn recommended_actions(input: &ScoreInput<'_>) -> Vec<EchoAction> {
    let mut actions = Vec::new();
    if input.after.is_silent() {
        // Nothing to fix on a silent render; the report summary already
        // says "insufficient signal"
        return actions;
    }
    if let Some(action) = excessive_true_peak(input) {
        actions.push(action);
    }
    if let Some(action) = loudness_off_target(input) {
        actions.push(action);
    }
    if let Some(action) = crushed_dynamics(input) {
        actions.push(action);
    }
    if let Some(action) = missing_presence(input) {
        actions.push(action);
    }
    if let Some(action) = dry_against_spacious_reference(input) {
        actions.push(action);
    }
    actions
}

/// True peak above the -1 dBTP streaming ceiling
fn excessive_true_peak(input: &ScoreInput<'_>) -> Option<EchoAction> {
    let true_peak = input.after.true_peak_dbtp.unwrap_or(input.after.peak_db);
    if true_peak <= -1.0 {
        return None;
    }
    Some(EchoAction {
        kind: ActionKind::Limiter,
        label: "Tame true peaks".to_string(),
        description: format!(
            "True peak measures {true_peak:.1} dBTP; streaming encoders want -1 dBTP or below."
        ),
        bands: None,
        params: Some(vec![ActionParam {
            name: "ceiling_db".to_string(),
            value: -1.0,
            min: -3.0,
            max: 0.0,
            step: 0.1,
            unit: "dBTP".to_string(),
            enabled_by_default: false,
        }]),
    })
}

/// Integrated loudness far from the genre target
fn loudness_off_target(input: &ScoreInput<'_>) -> Option<EchoAction> {
    let genre = input.genre?;
    let lufs = input.after.lufs?;
    if !lufs.integrated.is_finite() {
        return None;
    }
    let delta = genre.target_lufs - lufs.integrated;
    if delta.abs() <= 1.5 {
        return None;
    }
    Some(EchoAction {
        kind: ActionKind::Loudness,
        label: if delta > 0.0 {
            "Raise overall loudness".to_string()
        } else {
            "Lower overall loudness".to_string()
        },
        description: format!(
            "Integrated loudness is {:.1} LUFS; the {:?} target is {:.1} LUFS.",
            lufs.integrated, genre.style, genre.target_lufs
        ),
        bands: None,
        params: Some(vec![ActionParam {
            name: "output_gain_db".to_string(),
            value: delta.clamp(-12.0, 12.0),
            min: -12.0,
            max: 12.0,
            step: 0.5,
            unit: "dB".to_string(),
            enabled_by_default: false,
        }]),
    })
}

/// Loudness range crushed flat
fn crushed_dynamics(input: &ScoreInput<'_>) -> Option<EchoAction> {
    let lufs = input.after.lufs?;
    if lufs.range >= 3.0 {
        return None;
    }
    Some(EchoAction {
        kind: ActionKind::Dynamics,
        label: "Recover dynamics".to_string(),
        description: format!(
            "Loudness range is {:.1} LU - the mix barely breathes. Easing bus compression restores movement.",
            lufs.range
        ),
        bands: None,
        params: Some(vec![ActionParam {
            name: "compression_ratio".to_string(),
            value: 2.0,
            min: 1.0,
            max: 8.0,
            step: 0.5,
            unit: ":1".to_string(),
            enabled_by_default: false,
        }]),
    })
}

/// Presence-band energy likely missing against an intense reference
fn missing_presence(input: &ScoreInput<'_>) -> Option<EchoAction> {
    let reference = input.reference?;
    use echo_analysis::EnergyCharacter;
    if reference.character.energy != EnergyCharacter::Intense || input.after.rms_db >= -18.0 {
        return None;
    }
    Some(EchoAction {
        kind: ActionKind::Eq,
        label: "Add presence".to_string(),
        description:
            "The reference is intense and forward; the mix sits back. A presence-band lift around 3 kHz closes the gap."
                .to_string(),
        // New bands start at 0 dB gain and disabled
        bands: Some(vec![EqBandSuggestion {
            freq_hz: 3000.0,
            gain_db: 0.0,
            q: 1.0,
            enabled_by_default: false,
        }]),
        params: None,
    })
}

/// Dry mix against a spacious reference
fn dry_against_spacious_reference(input: &ScoreInput<'_>) -> Option<EchoAction> {
    let reference = input.reference?;
    use echo_analysis::SpaceCharacter;
    if reference.character.space != SpaceCharacter::Spacious || !reference.reverb.detected {
        return None;
    }
    Some(EchoAction {
        kind: ActionKind::Space,
        label: "Open up the space".to_string(),
        description: format!(
            "The reference carries a {:.1}s reverb tail; matching its space means raising reverb sends.",
            reference.reverb.decay_time_s
        ),
        bands: None,
        params: Some(vec![ActionParam {
            name: "reverb_send".to_string(),
            value: reference.reverb.wet_dry_ratio.clamp(0.0, 0.6),
            min: 0.0,
            max: 1.0,
            step: 0.05,
            unit: "".to_string(),
            enabled_by_default: false,
        }]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genre::{GenreProfile, GenreStyle};
    use echo_core::{AudioMetrics, LufsSummary, SampleBuffer};

    fn metrics(rms_db: f64, peak_db: f64, true_peak: f64, lufs: LufsSummary) -> AudioMetrics {
        AudioMetrics {
            rms_db,
            peak_db,
            crest_factor_db: peak_db - rms_db,
            lufs: Some(lufs),
            true_peak_dbtp: Some(true_peak),
        }
    }

    fn input_with<'a>(
        before: &'a AudioMetrics,
        after: &'a AudioMetrics,
        genre: Option<&'a GenreProfile>,
    ) -> ScoreInput<'a> {
        ScoreInput {
            before,
            after,
            reference: None,
            genre,
        }
    }

    #[test]
    fn hot_true_peak_is_flagged() {
        let before = AudioMetrics::measure(&SampleBuffer::silent(2, 64, 44_100));
        let after = metrics(
            -8.0,
            -0.2,
            0.4,
            LufsSummary {
                integrated: -9.0,
                range: 5.0,
            },
        );
        let actions = recommended_actions(&input_with(&before, &after, None));
        assert!(actions.iter().any(|a| a.kind == ActionKind::Limiter));
    }

    #[test]
    fn compliant_master_gets_no_limiter_action() {
        let before = AudioMetrics::measure(&SampleBuffer::silent(2, 64, 44_100));
        let after = metrics(
            -12.0,
            -2.0,
            -1.5,
            LufsSummary {
                integrated: -14.0,
                range: 6.0,
            },
        );
        let actions = recommended_actions(&input_with(&before, &after, None));
        assert!(!actions.iter().any(|a| a.kind == ActionKind::Limiter));
    }

    #[test]
    fn loudness_gap_suggests_a_gain_move() {
        let genre = GenreProfile::for_style(GenreStyle::Trap);
        let before = AudioMetrics::measure(&SampleBuffer::silent(2, 64, 44_100));
        let after = metrics(
            -20.0,
            -6.0,
            -5.0,
            LufsSummary {
                integrated: -18.0,
                range: 6.0,
            },
        );
        let actions = recommended_actions(&input_with(&before, &after, Some(&genre)));
        let loudness = actions
            .iter()
            .find(|a| a.kind == ActionKind::Loudness)
            .expect("loudness action");
        let params = loudness.params.as_ref().unwrap();
        // -18 LUFS toward -9 LUFS means roughly +9 dB
        assert!((params[0].value - 9.0).abs() < 0.5);
    }

    #[test]
    fn every_action_defaults_inaudible() {
        let genre = GenreProfile::for_style(GenreStyle::Trap);
        let before = AudioMetrics::measure(&SampleBuffer::silent(2, 64, 44_100));
        let after = metrics(
            -4.0,
            0.5,
            0.8,
            LufsSummary {
                integrated: -4.0,
                range: 1.0,
            },
        );
        let actions = recommended_actions(&input_with(&before, &after, Some(&genre)));
        assert!(!actions.is_empty());
        for action in &actions {
            if let Some(bands) = &action.bands {
                for band in bands {
                    assert_eq!(band.gain_db, 0.0);
                    assert!(!band.enabled_by_default);
                }
            }
            if let Some(params) = &action.params {
                for param in params {
                    assert!(!param.enabled_by_default);
                }
            }
        }
    }

    #[test]
    fn silent_render_yields_no_actions() {
        let silent = AudioMetrics::measure(&SampleBuffer::silent(2, 64, 44_100));
        let actions = recommended_actions(&input_with(&silent, &silent, None));
        assert!(actions.is_empty());
    }
}
