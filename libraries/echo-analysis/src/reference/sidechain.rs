//! Sidechain-ducking detection
//!
//! Kick-triggered pumping shows up as periodic envelope dips on the
//! sustained (non-percussive) content, time-locked to the low-band
//! transient grid. Dip depth gives the ducking amount; the recovery
//! time constant gives the release.

use crate::envelope::{one_pole_high_pass, one_pole_low_pass, pick_peaks, rms_envelope};
use echo_core::math::linear_to_db_f32;
use echo_core::SampleBuffer;
use serde::{Deserialize, Serialize};

/// Sidechain characteristics extracted from a reference track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidechainAnalysis {
    /// True when periodic kick-locked ducking was found
    pub detected: bool,
    /// Dip depth in dB
    pub amount_db: f64,
    /// Recovery time constant in ms
    pub release_ms: f64,
}

impl SidechainAnalysis {
    /// The "nothing found" result
    pub fn none() -> Self {
        Self {
            detected: false,
            amount_db: 0.0,
            release_ms: 0.0,
        }
    }
}

/// Kick band and sustained band split points
const KICK_BAND_HZ: f32 = 150.0;
const SUSTAIN_BAND_HZ: f32 = 800.0;

/// Envelope resolution
const ENV_WINDOW_SECS: f64 = 0.03;
const ENV_HOP_SECS: f64 = 0.005;

/// Minimum aligned dips and minimum median depth for a detection
const MIN_DIP_COUNT: usize = 4;
const MIN_DIP_DB: f32 = 1.5;

/// Detect kick-locked ducking on the sustained content
pub fn detect_sidechain(buffer: &SampleBuffer) -> SidechainAnalysis {
    let sample_rate = buffer.sample_rate();
    let mono = buffer.mono_mix();

    // Kick grid from the low band
    let low = one_pole_low_pass(&mono, sample_rate, KICK_BAND_HZ);
    let low_env = rms_envelope(&low, sample_rate, ENV_WINDOW_SECS, ENV_HOP_SECS);
    let spacing = low_env.ms_to_lag(200.0).max(1);
    let kicks = pick_peaks(&low_env.values, 0.5, spacing);
    if kicks.len() < MIN_DIP_COUNT {
        return SidechainAnalysis::none();
    }

    // Sustained content envelope in dB
    let sustained = one_pole_high_pass(&mono, sample_rate, SUSTAIN_BAND_HZ);
    let env = rms_envelope(&sustained, sample_rate, ENV_WINDOW_SECS, ENV_HOP_SECS);
    let env_db: Vec<f32> = env
        .values
        .iter()
        .map(|&v| linear_to_db_f32(v).max(-100.0))
        .collect();

    let pre_window = env.ms_to_lag(40.0).max(1);
    let dip_window = env.ms_to_lag(160.0).max(1);
    let release_limit = env.ms_to_lag(600.0);

    let mut dips = Vec::new();
    let mut releases = Vec::new();

    for &kick in &kicks {
        if kick < pre_window + 2 || kick + dip_window + 2 >= env_db.len() {
            continue;
        }
        // Level just before the kick
        let pre: f32 = env_db[kick - pre_window..kick.saturating_sub(1)]
            .iter()
            .copied()
            .sum::<f32>()
            / (pre_window - 1).max(1) as f32;
        if pre <= -90.0 {
            continue; // no sustained content to duck
        }
        // Deepest point shortly after the kick
        let search = &env_db[kick..kick + dip_window];
        let (min_offset, &min_db) = search
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((0, &pre));
        let dip = pre - min_db;
        if dip < MIN_DIP_DB {
            continue;
        }
        dips.push(f64::from(dip));

        // Recovery: time from the dip floor back to within 1 dB of pre
        let dip_index = kick + min_offset;
        let recover_end = (dip_index + release_limit).min(env_db.len());
        if let Some(offset) = env_db[dip_index..recover_end]
            .iter()
            .position(|&db| db >= pre - 1.0)
        {
            releases.push(offset as f64 * env.hop_secs * 1000.0);
        }
    }

    if dips.len() < MIN_DIP_COUNT {
        return SidechainAnalysis::none();
    }

    let amount_db = median(&mut dips).unwrap_or(0.0);
    let release_ms = median(&mut releases).unwrap_or(0.0);

    tracing::debug!(amount_db, release_ms, dips = dips.len(), "sidechain detected");

    SidechainAnalysis {
        detected: true,
        amount_db,
        release_ms,
    }
}

fn median(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(values[values.len() / 2])
}
