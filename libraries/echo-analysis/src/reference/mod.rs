//! Reference-track characteristic extraction
//!
//! One analysis run extracts tempo, reverb, delay, sidechain and overall
//! character from an arbitrary reference buffer. The five sub-analyses
//! are independent: a sub-analysis that finds nothing (or whose signal
//! is too ambiguous) reports `detected: false` without blocking the
//! others. The run as a whole is cancellable - reference analysis is the
//! most expensive operation in the core, and a superseding upload must
//! be able to abort it.

mod character;
mod delay;
mod reverb;
mod sidechain;
mod tempo;

pub use character::{classify, EnergyCharacter, OverallCharacter, SpaceCharacter};
pub use delay::{detect_delay, DelayAnalysis, DelayKind, NoteDivision};
pub use reverb::{detect_reverb, ReverbAnalysis, ReverbCharacter};
pub use sidechain::{detect_sidechain, SidechainAnalysis};
pub use tempo::estimate_bpm;

use crate::error::{AnalysisError, Result};
use echo_core::{CancelToken, SampleBuffer};
use serde::{Deserialize, Serialize};

/// Immutable result of one analysis run against one reference buffer
///
/// Invalidated and recomputed whenever the reference changes; the mix
/// session only accepts a result whose generation matches the currently
/// selected reference (latest wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAnalysis {
    /// Estimated tempo in BPM, `None` when no periodicity was usable
    pub estimated_bpm: Option<f32>,
    /// Discrete space/energy labels
    pub character: OverallCharacter,
    /// Reverb tail characteristics
    pub reverb: ReverbAnalysis,
    /// Echo characteristics
    pub delay: DelayAnalysis,
    /// Kick-ducking characteristics
    pub sidechain: SidechainAnalysis,
}

/// Reference track analyzer
///
/// Stateless; each call to [`ReferenceAnalyzer::analyze`] is a complete
/// independent run over the supplied buffer.
pub struct ReferenceAnalyzer {
    _private: (),
}

impl ReferenceAnalyzer {
    /// Create an analyzer
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Analyze a reference buffer
    ///
    /// The token is checked between sub-analyses; a cancelled run
    /// returns `Cancelled` and discards all partial results.
    ///
    /// # Errors
    /// Only cancellation is an error here - degenerate input yields a
    /// result full of `detected: false` sub-analyses instead.
    pub fn analyze(
        &self,
        buffer: &SampleBuffer,
        cancel: &CancelToken,
    ) -> Result<ReferenceAnalysis> {
        let check = |stage: &str| -> Result<()> {
            if cancel.is_cancelled() {
                tracing::debug!(stage, "reference analysis cancelled");
                return Err(AnalysisError::Cancelled);
            }
            Ok(())
        };

        check("start")?;
        let mono = buffer.mono_mix();
        let estimated_bpm = estimate_bpm(&mono, buffer.sample_rate());

        check("tempo")?;
        let reverb = detect_reverb(buffer);

        check("reverb")?;
        let delay = detect_delay(buffer, estimated_bpm);

        check("delay")?;
        let sidechain = detect_sidechain(buffer);

        check("sidechain")?;
        let character = classify(buffer, &reverb, &delay);

        tracing::info!(
            bpm = ?estimated_bpm,
            reverb = reverb.detected,
            delay = delay.detected,
            sidechain = sidechain.detected,
            "reference analysis complete"
        );

        Ok(ReferenceAnalysis {
            estimated_bpm,
            character,
            reverb,
            delay,
            sidechain,
        })
    }
}

impl Default for ReferenceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
