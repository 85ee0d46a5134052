//! Deterministic offline mixdown
//!
//! One render pass: every audible stem is gain/pan-processed (in
//! parallel - per-stem work is independent), the contributions are
//! summed sequentially in stem-id order, the shared reverb/delay buses
//! are processed once and summed back in, and the optional mastering
//! chain runs on the result. The same session state and configuration
//! always produce byte-identical output: no randomness, no wall clock,
//! fixed summation order.

use crate::error::Result;
use crate::session::MixSession;
use echo_core::math::{db_to_linear, linear_to_db};
use echo_core::{SampleBuffer, Stem};
use echo_dsp::stages::{BusDelay, MotionReverb};
use echo_dsp::{BusDelaySettings, MotionReverbSettings, ProcessingChain, ProcessingConfig, Stage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bus configuration for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BusConfig {
    /// Shared reverb bus effect (fed by each stem's reverb send)
    pub reverb: Option<MotionReverbSettings>,
    /// Shared delay bus effect (fed by each stem's delay send)
    pub delay: Option<BusDelaySettings>,
    /// Mastering chain applied to the summed master bus
    pub master: Option<ProcessingConfig>,
}

/// Result of one mixdown render
#[derive(Debug, Clone, PartialEq)]
pub struct Mixdown {
    /// The rendered master buffer (always stereo)
    pub buffer: SampleBuffer,
    /// Sample peak of the result in dBFS
    pub peak_db: f64,
    /// RMS of the result in dBFS
    pub rms_db: f64,
    /// True when any post-sum, pre-limiter sample exceeded +/-1.0.
    /// Not fatal - surfaced so the caller can warn the user.
    pub clipped: bool,
}

/// Per-stem gain/pan contribution plus its send-weighted copies
struct StemRender {
    left: Vec<f32>,
    right: Vec<f32>,
    reverb_send: f64,
    delay_send: f64,
}

/// Effective linear gain of a stem under the session's solo state
///
/// 0 if muted; 0 if any other stem is soloed and this one is not; else
/// the stem's own fader gain. This one function is used by both live
/// monitoring and offline rendering so the two can never diverge.
pub fn effective_gain(stem: &Stem, any_solo: bool) -> f64 {
    if stem.muted {
        return 0.0;
    }
    if any_solo && !stem.solo {
        return 0.0;
    }
    db_to_linear(stem.volume_db())
}

/// Pan gains with unity at center
///
/// Panning attenuates the opposite channel only: a center-panned stem
/// sums into the master at exactly its own level, and a hard-panned
/// stem puts its full level on one side.
fn pan_gains(pan: f64) -> (f32, f32) {
    let left = if pan > 0.0 { 1.0 - pan } else { 1.0 };
    let right = if pan < 0.0 { 1.0 + pan } else { 1.0 };
    (left as f32, right as f32)
}

impl MixSession {
    /// Effective linear gain of a stem in this session
    pub fn effective_gain(&self, stem: &Stem) -> f64 {
        effective_gain(stem, self.any_solo())
    }

    /// Render the current stem state into a master buffer
    ///
    /// Takes a snapshot of stem and configuration state at invocation;
    /// configuration mutation never interleaves with a running render.
    ///
    /// # Errors
    /// Currently infallible for valid sessions (stem layout is validated
    /// at insertion); the `Result` keeps the seam stable for callers.
    pub fn render_mixdown(&self, bus: &BusConfig) -> Result<Mixdown> {
        let sample_rate = self.sample_rate();
        let frames = self.stems().map(|s| s.buffer.frames()).max().unwrap_or(0);
        let any_solo = self.any_solo();

        tracing::info!(stems = self.len(), frames, "mixdown render start");

        // Per-stem processing is embarrassingly parallel; collect() keeps
        // the deterministic id order for the summation below
        let stems: Vec<&Stem> = self.stems().collect();
        let renders: Vec<Option<StemRender>> = stems
            .par_iter()
            .map(|stem| render_stem(stem, any_solo, frames))
            .collect();

        // Single synchronization point: ordered sequential summation
        let mut master_left = vec![0.0_f32; frames];
        let mut master_right = vec![0.0_f32; frames];
        let mut reverb_left = vec![0.0_f32; frames];
        let mut reverb_right = vec![0.0_f32; frames];
        let mut delay_left = vec![0.0_f32; frames];
        let mut delay_right = vec![0.0_f32; frames];
        let mut any_reverb_send = false;
        let mut any_delay_send = false;

        for render in renders.into_iter().flatten() {
            for i in 0..frames {
                master_left[i] += render.left[i];
                master_right[i] += render.right[i];
            }
            if render.reverb_send > 0.0 {
                any_reverb_send = true;
                let send = render.reverb_send as f32;
                for i in 0..frames {
                    reverb_left[i] += render.left[i] * send;
                    reverb_right[i] += render.right[i] * send;
                }
            }
            if render.delay_send > 0.0 {
                any_delay_send = true;
                let send = render.delay_send as f32;
                for i in 0..frames {
                    delay_left[i] += render.left[i] * send;
                    delay_right[i] += render.right[i] * send;
                }
            }
        }

        // Each shared bus is processed once and summed back in
        if let (Some(settings), true) = (&bus.reverb, any_reverb_send) {
            let mut settings = *settings;
            settings.wet = 1.0; // bus effects return wet only
            let bus_in = SampleBuffer::stereo(reverb_left, reverb_right, sample_rate)
                .expect("bus channels share the master length");
            let wet = MotionReverb::new(settings).process(&bus_in);
            for i in 0..frames {
                master_left[i] += wet.channel(0)[i];
                master_right[i] += wet.channel(1)[i];
            }
        }
        if let (Some(settings), true) = (&bus.delay, any_delay_send) {
            let bus_in = SampleBuffer::stereo(delay_left, delay_right, sample_rate)
                .expect("bus channels share the master length");
            let wet = BusDelay::new(*settings).process(&bus_in);
            for i in 0..frames {
                master_left[i] += wet.channel(0)[i];
                master_right[i] += wet.channel(1)[i];
            }
        }

        // Clipping is judged post-sum, pre-limiter
        let clipped = master_left
            .iter()
            .chain(master_right.iter())
            .any(|s| s.abs() > 1.0);

        let mut master = SampleBuffer::stereo(master_left, master_right, sample_rate)
            .expect("master channels share one length");

        if let Some(config) = &bus.master {
            master = ProcessingChain::from_config(config).apply(&master);
        }

        let peak_db = master.peak_db();
        let rms_db = master.rms_db();
        tracing::info!(peak_db, rms_db, clipped, "mixdown render complete");

        Ok(Mixdown {
            buffer: master,
            peak_db,
            rms_db,
            clipped,
        })
    }
}

fn render_stem(stem: &Stem, any_solo: bool, frames: usize) -> Option<StemRender> {
    let gain = effective_gain(stem, any_solo);
    if gain <= 0.0 {
        return None;
    }
    let (pan_left, pan_right) = pan_gains(stem.pan());
    let gain = gain as f32;

    let mut left = vec![0.0_f32; frames];
    let mut right = vec![0.0_f32; frames];
    match stem.buffer.channel_count() {
        1 => {
            let mono = stem.buffer.channel(0);
            for (i, &s) in mono.iter().enumerate() {
                left[i] = s * gain * pan_left;
                right[i] = s * gain * pan_right;
            }
        }
        2 => {
            let l = stem.buffer.channel(0);
            let r = stem.buffer.channel(1);
            for i in 0..l.len() {
                left[i] = l[i] * gain * pan_left;
                right[i] = r[i] * gain * pan_right;
            }
        }
        // Guarded at insertion; reaching this is a programmer error
        other => unreachable!("stem with {other} channels escaped session validation"),
    }

    Some(StemRender {
        left,
        right,
        reverb_send: stem.reverb_send(),
        delay_send: stem.delay_send(),
    })
}

/// Convenience: linear-domain metrics for a monitoring meter
pub fn monitor_level_db(stem: &Stem, any_solo: bool) -> f64 {
    let gain = effective_gain(stem, any_solo);
    if gain <= 0.0 {
        return f64::NEG_INFINITY;
    }
    linear_to_db(stem.buffer.rms() * gain)
}
