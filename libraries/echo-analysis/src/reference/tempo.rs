//! Tempo estimation from the onset-strength envelope

use crate::envelope::{normalized_autocorrelation, onset_strength};

/// Candidate tempo range in BPM
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 200.0;

/// Minimum autocorrelation at the winning lag for a confident estimate
const MIN_PERIODICITY: f32 = 0.2;

/// Estimate a single BPM scalar for a buffer's mono mix
///
/// Onset-strength envelope (spectral flux) -> mean-removed
/// autocorrelation over the 60-200 BPM lag range -> best lag, weighted
/// by a log-normal prior centered at 120 BPM so that metrically
/// ambiguous material resolves to the conventional octave.
///
/// Returns `None` when the signal is too short or has no usable
/// periodicity - the caller reports "no tempo" rather than an error.
pub fn estimate_bpm(samples: &[f32], sample_rate: u32) -> Option<f32> {
    let onsets = onset_strength(samples, sample_rate);
    if onsets.len() < 64 {
        return None;
    }

    let min_lag = onsets.ms_to_lag(60_000.0 / MAX_BPM).max(1);
    let max_lag = onsets.ms_to_lag(60_000.0 / MIN_BPM);
    let acf = normalized_autocorrelation(&onsets.values, max_lag + 1);
    if acf.is_empty() || acf.len() <= min_lag {
        return None;
    }

    let mut best_lag = 0;
    let mut best_score = 0.0_f32;
    for lag in min_lag..acf.len() {
        let bpm = 60.0 / (lag as f64 * onsets.hop_secs);
        let score = acf[lag] * octave_prior(bpm);
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    if best_lag == 0 || acf[best_lag] < MIN_PERIODICITY {
        return None;
    }

    let bpm = 60.0 / (best_lag as f64 * onsets.hop_secs);
    tracing::debug!(bpm, periodicity = acf[best_lag], "tempo estimate");
    Some(bpm as f32)
}

/// Log-normal prior over tempo, centered at 120 BPM
fn octave_prior(bpm: f64) -> f32 {
    let octaves = (bpm / 120.0).log2();
    (-0.5 * (octaves / 0.6).powi(2)).exp() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prior_prefers_120() {
        assert!(octave_prior(120.0) > octave_prior(60.0));
        assert!(octave_prior(120.0) > octave_prior(200.0));
    }

    #[test]
    fn too_short_returns_none() {
        let samples = vec![0.0_f32; 1000];
        assert_eq!(estimate_bpm(&samples, 44_100), None);
    }

    #[test]
    fn silence_returns_none() {
        let samples = vec![0.0_f32; 44_100 * 4];
        assert_eq!(estimate_bpm(&samples, 44_100), None);
    }
}
