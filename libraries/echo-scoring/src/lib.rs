//! Echo Mastering Core - composite quality scoring
//!
//! Combines level metrics, loudness measurement and reference analysis
//! into an [`EchoReport`]: five pillar sub-scores (25/20/25/20/10), a
//! configurable verdict policy, a confidence value that degrades on
//! insufficient signal instead of failing, and a list of independently
//! appliable [`EchoAction`] fixes that default to the inaudible state.
//!
//! # Example
//!
//! ```
//! use echo_core::{AudioMetrics, SampleBuffer};
//! use echo_scoring::ScoringEngine;
//!
//! let engine = ScoringEngine::new();
//! let silent = AudioMetrics::measure(&SampleBuffer::silent(2, 1024, 44_100));
//! let report = engine.score(&silent, &silent, None, None);
//! // Silence is "insufficient signal", not an error
//! assert!(report.confidence < 0.5);
//! ```

mod engine;
mod genre;
mod report;
mod rules;

pub use engine::{
    PillarOutcome, PillarRule, ScoreInput, ScoringEngine, VerdictPolicy,
};
pub use genre::{GenreProfile, GenreStyle};
pub use report::{
    ActionKind, ActionParam, EchoAction, EchoReport, EqBandSuggestion, PillarScores, Verdict,
};
pub use rules::recommended_actions;
