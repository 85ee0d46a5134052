//! Report types - the scoring wire contract
//!
//! An `EchoReport` is built fresh per analysis run and never mutated in
//! place; a new report replaces the old one.

use serde::{Deserialize, Serialize};

/// Overall verdict for a mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    ReleaseReady,
    RefinementsAvailable,
    NeedsWork,
}

/// Pillar sub-scores with their fixed maxima
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    /// Recording quality, max 25
    pub recording_quality: f64,
    /// Stem quality, max 20
    pub stem_quality: f64,
    /// Genre accuracy, max 25
    pub genre_accuracy: f64,
    /// Vocal/beat relationship, max 20
    pub vocal_beat_relationship: f64,
    /// Creative excellence, max 10
    pub creative_excellence: f64,
    /// Sum of the pillars, clamped to [0, 100]
    pub total: f64,
}

/// Category of a recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Eq,
    Limiter,
    Dynamics,
    Loudness,
    Space,
}

/// A suggested EQ band; new bands start at 0 dB gain and disabled so
/// that accepting the action sheet without edits changes nothing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBandSuggestion {
    pub freq_hz: f64,
    pub gain_db: f64,
    pub q: f64,
    pub enabled_by_default: bool,
}

/// A suggested scalar parameter change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParam {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: String,
    pub enabled_by_default: bool,
}

/// One atomic, independently appliable fix
///
/// Applying one action never requires applying another. The payload is
/// either `bands` (EQ-shaped fixes) or `params` (everything else).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoAction {
    /// Action category
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Short UI label
    pub label: String,
    /// One-sentence description of the issue and the fix
    pub description: String,
    /// EQ band payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<EqBandSuggestion>>,
    /// Scalar parameter payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<ActionParam>>,
}

/// Composite quality report for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoReport {
    /// Overall verdict
    pub verdict: Verdict,
    /// Confidence in the verdict, [0, 1] - degenerate inputs (silence,
    /// missing reference) lower this instead of failing
    pub confidence: f64,
    /// Pillar sub-scores
    pub score: PillarScores,
    /// One-line summary
    pub summary: String,
    /// Per-pillar explanations
    pub explanation: Vec<String>,
    /// Independently appliable fixes
    pub recommended_actions: Vec<EchoAction>,
}
