//! Echo Mastering Core - signal processing
//!
//! This crate provides the configurable processing chain the mix engine
//! renders through:
//!
//! - [`ProcessingConfig`]: flat optional-field wire record; an absent
//!   field means the stage is bypassed bit-identically (the default
//!   configuration is inaudible)
//! - [`ProcessingChain`]: the fixed stage order - EQ, dynamic EQ,
//!   multiband compression, transient shaping, de-essing, saturation,
//!   motion reverb, stereo imaging, gate, true-peak limiter, soft
//!   clipper
//! - individual [`stages`] for one-at-a-time A/B application, plus the
//!   [`stages::BusDelay`] send-bus effect
//!
//! # Example
//!
//! ```
//! use echo_core::SampleBuffer;
//! use echo_dsp::{ProcessingChain, ProcessingConfig};
//!
//! let buffer = SampleBuffer::silent(2, 1024, 44_100);
//!
//! // The default config bypasses every stage bit-identically
//! let chain = ProcessingChain::from_config(&ProcessingConfig::default());
//! assert_eq!(chain.apply(&buffer), buffer);
//! ```
//!
//! Numeric semantics throughout: gains in dB convert to linear via
//! `10^(dB/20)`; dB displays derive from `20*log10(x)` with zero mapped
//! to `-inf`, never a numeric error.

pub mod biquad;
mod chain;
mod config;
mod error;
pub mod stages;

pub use chain::{ProcessingChain, Stage};
pub use config::{
    BandCompressorSettings, BandKind, BusDelaySettings, ClipperSettings, DeEsserSettings,
    DynamicEqBand, DynamicEqMode, DynamicEqSettings, EqBandSettings, EqSettings, GateSettings,
    ImagerSettings, LimiterSettings, MotionReverbSettings, MultibandSettings, ProcessingConfig,
    SaturationSettings, SaturationKind, TransientSettings,
};
pub use error::{DspError, Result};
