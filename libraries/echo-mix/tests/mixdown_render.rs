//! Mixdown rendering scenarios
//!
//! Covers the deterministic summation contract: RMS preservation for a
//! single audible stem, clip reporting, idempotent renders, mute/solo
//! behavior and the send-bus path.

use echo_core::signals::sine_wave;
use echo_core::{SampleBuffer, Stem, StemId, StemRole};
use echo_dsp::{BusDelaySettings, LimiterSettings, MotionReverbSettings, ProcessingConfig};
use echo_mix::{BusConfig, MixSession, WavEncoder};

const SR: u32 = 44_100;

fn sine_stem(id: &str, amplitude: f32) -> Stem {
    let samples = sine_wave(440.0, SR, 2.0, amplitude);
    Stem::new(
        StemId::new(id),
        id.to_string(),
        StemRole::Melody,
        SampleBuffer::mono(samples, SR),
    )
}

fn silent_stem(id: &str) -> Stem {
    Stem::new(
        StemId::new(id),
        id.to_string(),
        StemRole::Other,
        SampleBuffer::silent(2, (SR * 2) as usize, SR),
    )
}

#[test]
fn single_stem_renders_at_its_own_level() {
    // Stem A: -6 dBFS sine, pan center, unity gain. Stem B: silence.
    // The mix RMS must equal stem A's RMS.
    let mut session = MixSession::new(SR);
    let a = sine_stem("a", 0.501187); // -6 dBFS
    let a_rms_db = a.buffer.rms_db();
    session.add_stem(a).unwrap();
    session.add_stem(silent_stem("b")).unwrap();

    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert!(!mixdown.clipped);
    assert!(
        (mixdown.rms_db - a_rms_db).abs() < 0.01,
        "mix RMS {} vs stem RMS {}",
        mixdown.rms_db,
        a_rms_db
    );
}

#[test]
fn hot_stem_reports_clipping() {
    // +12 dB of fader gain on a -6 dBFS-peak buffer pushes the summed
    // peak over 0 dBFS
    let mut session = MixSession::new(SR);
    let mut stem = sine_stem("hot", 0.5);
    stem.set_volume_db(12.0);
    session.add_stem(stem).unwrap();

    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert!(mixdown.clipped, "expected clipping to be reported");
    assert!(mixdown.peak_db > 0.0, "peak was {}", mixdown.peak_db);
}

#[test]
fn clipping_is_judged_before_the_master_limiter() {
    let mut session = MixSession::new(SR);
    let mut stem = sine_stem("hot", 0.5);
    stem.set_volume_db(12.0);
    session.add_stem(stem).unwrap();

    let bus = BusConfig {
        master: Some(ProcessingConfig {
            limiter: Some(LimiterSettings::default()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mixdown = session.render_mixdown(&bus).unwrap();
    // The limiter brought the output under the ceiling, but the pre-
    // limiter sum clipped and that is what gets surfaced
    assert!(mixdown.clipped);
    assert!(mixdown.peak_db <= -0.9, "post-limiter peak {}", mixdown.peak_db);
}

#[test]
fn render_is_idempotent() {
    let mut session = MixSession::new(SR);
    session.add_stem(sine_stem("a", 0.4)).unwrap();
    let mut b = sine_stem("b", 0.2);
    b.set_pan(-0.5);
    b.set_reverb_send(0.3);
    session.add_stem(b).unwrap();

    let bus = BusConfig {
        reverb: Some(MotionReverbSettings::default()),
        delay: Some(BusDelaySettings::default()),
        master: Some(ProcessingConfig::default()),
    };
    let first = session.render_mixdown(&bus).unwrap();
    let second = session.render_mixdown(&bus).unwrap();
    assert_eq!(
        first.buffer, second.buffer,
        "unchanged state must render byte-identically"
    );
    assert_eq!(first.clipped, second.clipped);
}

#[test]
fn all_silent_session_is_degenerate_not_an_error() {
    let mut session = MixSession::new(SR);
    session.add_stem(silent_stem("a")).unwrap();
    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert!(!mixdown.clipped);
    assert_eq!(mixdown.rms_db, f64::NEG_INFINITY);
    assert_eq!(mixdown.peak_db, f64::NEG_INFINITY);
}

#[test]
fn muted_stem_is_absent_from_the_mix() {
    let mut session = MixSession::new(SR);
    let mut stem = sine_stem("a", 0.5);
    stem.muted = true;
    session.add_stem(stem).unwrap();
    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert!(mixdown.buffer.is_silent());
}

#[test]
fn solo_excludes_everything_else() {
    let mut session = MixSession::new(SR);
    session.add_stem(sine_stem("backing", 0.5)).unwrap();
    let mut lead = sine_stem("lead", 0.25);
    lead.solo = true;
    let lead_rms_db = lead.buffer.rms_db();
    session.add_stem(lead).unwrap();

    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert!(
        (mixdown.rms_db - lead_rms_db).abs() < 0.01,
        "solo mix RMS {} vs lead RMS {}",
        mixdown.rms_db,
        lead_rms_db
    );
}

#[test]
fn pan_moves_signal_between_channels() {
    let mut session = MixSession::new(SR);
    let mut stem = sine_stem("a", 0.5);
    stem.set_pan(-1.0);
    session.add_stem(stem).unwrap();

    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    let left: &[f32] = mixdown.buffer.channel(0);
    let right: &[f32] = mixdown.buffer.channel(1);
    assert!(left.iter().any(|&s| s.abs() > 0.4));
    assert!(right.iter().all(|&s| s.abs() < 1e-9));
}

#[test]
fn reverb_send_adds_bus_return_to_the_master() {
    let mut dry_session = MixSession::new(SR);
    dry_session.add_stem(sine_stem("a", 0.3)).unwrap();

    let mut wet_session = MixSession::new(SR);
    let mut stem = sine_stem("a", 0.3);
    stem.set_reverb_send(0.8);
    wet_session.add_stem(stem).unwrap();

    let bus = BusConfig {
        reverb: Some(MotionReverbSettings {
            decay_s: 1.0,
            ..Default::default()
        }),
        ..Default::default()
    };
    let dry = dry_session.render_mixdown(&bus).unwrap();
    let wet = wet_session.render_mixdown(&bus).unwrap();
    assert!(
        wet.buffer.rms() > dry.buffer.rms() * 1.01,
        "bus return did not add energy: {} vs {}",
        wet.buffer.rms(),
        dry.buffer.rms()
    );
}

#[test]
fn mono_and_stereo_stems_mix_together() {
    let mut session = MixSession::new(SR);
    session.add_stem(sine_stem("mono", 0.25)).unwrap();
    let stereo_samples = sine_wave(880.0, SR, 1.0, 0.25);
    session
        .add_stem(Stem::new(
            StemId::new("stereo"),
            "Stereo",
            StemRole::Fx,
            SampleBuffer::stereo(stereo_samples.clone(), stereo_samples, SR).unwrap(),
        ))
        .unwrap();

    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();
    assert_eq!(mixdown.buffer.channel_count(), 2);
    assert_eq!(mixdown.buffer.frames(), (SR * 2) as usize);
    assert!(!mixdown.clipped);
}

#[test]
fn rendered_mix_exports_losslessly() {
    let mut session = MixSession::new(SR);
    session.add_stem(sine_stem("a", 0.4)).unwrap();
    let mixdown = session.render_mixdown(&BusConfig::default()).unwrap();

    let mut encoder = WavEncoder::new();
    let encoded = echo_mix::export_mixdown(&mut encoder, &mixdown.buffer).unwrap();
    assert!(!encoded.is_empty());
    assert_eq!(&encoded.bytes[..4], b"RIFF");
}
