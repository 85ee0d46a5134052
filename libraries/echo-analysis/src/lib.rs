//! Echo Mastering Core - audio analysis
//!
//! This crate provides:
//! - EBU R128 loudness metering (integrated LUFS, loudness range, true
//!   peak) with streaming-target compliance flags
//! - Stereo field analysis (phase correlation, mid/side decomposition,
//!   vectorscope transform)
//! - Reference-track characteristic extraction (tempo, reverb, delay,
//!   sidechain ducking, overall character)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │ SampleBuffer │ ──► │ LoudnessMeter  │ ──► │ LufsMeasurement  │
//! └──────────────┘     └────────────────┘     └──────────────────┘
//!        │
//!        │             ┌────────────────────┐     ┌───────────────────┐
//!        └───────────► │ ReferenceAnalyzer  │ ──► │ ReferenceAnalysis │
//!                      └────────────────────┘     └───────────────────┘
//!                        tempo │ reverb │ delay │ sidechain │ character
//! ```
//!
//! All analyses are synchronous pure functions over immutable buffers.
//! The expensive ones take a [`echo_core::CancelToken`] so a superseded
//! buffer can abort its in-flight analysis.

pub mod envelope;
mod error;
mod loudness;
pub mod reference;
mod stereo;

pub use error::{AnalysisError, Result};
pub use loudness::{
    ComplianceFlag, LoudnessMeter, LufsMeasurement, StreamingTarget, COMPLIANCE_TOLERANCE_LU,
    STREAMING_TARGETS,
};
pub use reference::{
    DelayAnalysis, DelayKind, EnergyCharacter, NoteDivision, OverallCharacter, ReferenceAnalysis,
    ReferenceAnalyzer, ReverbAnalysis, ReverbCharacter, SidechainAnalysis, SpaceCharacter,
};
pub use stereo::{
    correlation, mid_side, scope_point, MidSide, ScopePoint, StereoFieldAnalyzer,
    DEFAULT_CORRELATION_WINDOW,
};
