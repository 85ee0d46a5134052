//! Processing chain: ordered signal-processing stages
//!
//! A stage maps one immutable `SampleBuffer` to a new one. Stages keep
//! no state between calls - each `process` is a complete deterministic
//! pass over the whole buffer, so repeated renders of the same input
//! and configuration are bit-identical.
//!
//! The chain applies stages in a fixed documented order; a stage is only
//! present when its `ProcessingConfig` field is set. With no stages the
//! chain returns a bit-identical copy of its input (the bypass
//! invariant). Individual stages are public, so callers can also apply
//! one stage at a time for A/B and partial-apply workflows.

use crate::config::ProcessingConfig;
use crate::stages::{
    Clipper, DeEsser, DynamicEq, Gate, MotionReverb, MultibandCompressor, ParametricEq,
    Saturator, StereoImager, TransientShaper, TruePeakLimiter,
};
use echo_core::SampleBuffer;

/// One signal-processing stage
///
/// Implementations must be pure: same input buffer, same output buffer,
/// no interior state carried across calls.
pub trait Stage: Send + Sync {
    /// Stage name for logging and A/B displays
    fn name(&self) -> &'static str;

    /// Process a buffer, returning a new one
    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer;
}

/// Ordered chain of processing stages built from a `ProcessingConfig`
///
/// Stage order is fixed: EQ, dynamic EQ, multiband compression,
/// transient shaping, de-essing, saturation, motion reverb, stereo
/// imaging, gate/expander, true-peak limiting, soft clipping.
pub struct ProcessingChain {
    stages: Vec<Box<dyn Stage>>,
}

impl ProcessingChain {
    /// Build a chain from a configuration
    ///
    /// The configuration is validated (out-of-range values clamped)
    /// before stages are constructed. Absent fields construct nothing.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        let mut config = config.clone();
        config.validate();

        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        if let Some(settings) = config.eq {
            stages.push(Box::new(ParametricEq::new(settings)));
        }
        if let Some(settings) = config.dynamic_eq {
            stages.push(Box::new(DynamicEq::new(settings)));
        }
        if let Some(settings) = config.multiband {
            stages.push(Box::new(MultibandCompressor::new(settings)));
        }
        if let Some(settings) = config.transient {
            stages.push(Box::new(TransientShaper::new(settings)));
        }
        if let Some(settings) = config.deesser {
            stages.push(Box::new(DeEsser::new(settings)));
        }
        if let Some(settings) = config.saturation {
            stages.push(Box::new(Saturator::new(settings)));
        }
        if let Some(settings) = config.reverb {
            stages.push(Box::new(MotionReverb::new(settings)));
        }
        if let Some(settings) = config.imager {
            stages.push(Box::new(StereoImager::new(settings)));
        }
        if let Some(settings) = config.gate {
            stages.push(Box::new(Gate::new(settings)));
        }
        if let Some(settings) = config.limiter {
            stages.push(Box::new(TruePeakLimiter::new(settings)));
        }
        if let Some(settings) = config.clipper {
            stages.push(Box::new(Clipper::new(settings)));
        }

        Self { stages }
    }

    /// Apply the whole chain to a buffer
    ///
    /// An empty chain returns a bit-identical copy of the input.
    pub fn apply(&self, buffer: &SampleBuffer) -> SampleBuffer {
        if self.stages.is_empty() {
            return buffer.clone();
        }
        let mut current = self.stages[0].process(buffer);
        for stage in &self.stages[1..] {
            tracing::debug!(stage = stage.name(), "applying stage");
            current = stage.process(&current);
        }
        current
    }

    /// Names of the active stages, in application order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of active stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stage is configured (full bypass)
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
