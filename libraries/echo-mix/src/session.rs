//! Mix session: the explicitly-owned state object
//!
//! One session owns the stems of one mix and the currently-selected
//! reference analysis. There is no global "current buffer" - every
//! operation takes the session it works on, and the session is the
//! single writer for its stems and its reference slot.
//!
//! Reference analysis is "latest wins": beginning a new analysis bumps
//! the generation and cancels the in-flight token, and a completed
//! result is only accepted when its generation still matches.

use crate::error::{MixError, Result};
use echo_analysis::ReferenceAnalysis;
use echo_core::{CancelToken, Stem, StemId};
use std::collections::BTreeMap;

/// Reference slot with generation-checked acceptance
#[derive(Debug, Default)]
pub struct ReferenceSlot {
    generation: u64,
    token: CancelToken,
    analysis: Option<ReferenceAnalysis>,
}

impl ReferenceSlot {
    /// Start a new analysis: cancels any in-flight run and returns the
    /// generation + token for the new one
    pub fn begin(&mut self) -> (u64, CancelToken) {
        self.token.cancel();
        self.generation += 1;
        self.token = CancelToken::new();
        self.analysis = None;
        (self.generation, self.token.clone())
    }

    /// Accept a completed analysis if it is still the latest
    ///
    /// Returns false (and discards the result) when a newer reference
    /// superseded this run.
    pub fn accept(&mut self, generation: u64, analysis: ReferenceAnalysis) -> bool {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "discarding stale reference analysis"
            );
            return false;
        }
        self.analysis = Some(analysis);
        true
    }

    /// The accepted analysis, if any
    pub fn analysis(&self) -> Option<&ReferenceAnalysis> {
        self.analysis.as_ref()
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One mix session: stems plus reference state
///
/// Stems are keyed in a `BTreeMap` so iteration (and therefore
/// summation order in the renderer) is deterministic.
pub struct MixSession {
    sample_rate: u32,
    stems: BTreeMap<StemId, Stem>,
    reference: ReferenceSlot,
}

impl MixSession {
    /// Create an empty session at a fixed sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            stems: BTreeMap::new(),
            reference: ReferenceSlot::default(),
        }
    }

    /// Session sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Add a stem
    ///
    /// # Errors
    /// Rejects stems that are neither mono nor stereo, and stems whose
    /// sample rate differs from the session's - failing here keeps the
    /// render loop free of silent channel truncation.
    pub fn add_stem(&mut self, stem: Stem) -> Result<()> {
        let channels = stem.buffer.channel_count();
        if !(1..=2).contains(&channels) {
            return Err(MixError::UnsupportedChannelCount(channels));
        }
        if stem.buffer.sample_rate() != self.sample_rate {
            return Err(MixError::SampleRateMismatch {
                expected: self.sample_rate,
                actual: stem.buffer.sample_rate(),
            });
        }
        tracing::debug!(id = %stem.id, role = %stem.role, "stem added");
        self.stems.insert(stem.id.clone(), stem);
        Ok(())
    }

    /// Remove a stem, returning it if present
    pub fn remove_stem(&mut self, id: &StemId) -> Option<Stem> {
        self.stems.remove(id)
    }

    /// Borrow a stem
    pub fn stem(&self, id: &StemId) -> Option<&Stem> {
        self.stems.get(id)
    }

    /// Mutably borrow a stem (UI-originated parameter commands)
    pub fn stem_mut(&mut self, id: &StemId) -> Option<&mut Stem> {
        self.stems.get_mut(id)
    }

    /// Iterate stems in deterministic id order
    pub fn stems(&self) -> impl Iterator<Item = &Stem> {
        self.stems.values()
    }

    /// Number of stems
    pub fn len(&self) -> usize {
        self.stems.len()
    }

    /// True when the session holds no stems
    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// True when any stem is soloed
    pub fn any_solo(&self) -> bool {
        self.stems.values().any(|s| s.solo)
    }

    /// Begin a reference analysis run (latest wins)
    pub fn begin_reference_analysis(&mut self) -> (u64, CancelToken) {
        self.reference.begin()
    }

    /// Offer a completed reference analysis; stale results are dropped
    pub fn accept_reference(&mut self, generation: u64, analysis: ReferenceAnalysis) -> bool {
        self.reference.accept(generation, analysis)
    }

    /// The currently accepted reference analysis
    pub fn reference(&self) -> Option<&ReferenceAnalysis> {
        self.reference.analysis()
    }
}
