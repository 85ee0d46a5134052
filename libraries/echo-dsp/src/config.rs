//! Processing configuration - the wire contract between any UI and the
//! rendering core
//!
//! `ProcessingConfig` is a flat record of optional per-stage settings.
//! An absent field means "stage bypassed, bit-identical passthrough" -
//! the default configuration is inaudible. Unknown JSON fields are
//! ignored on deserialization, so the shape stays forward-compatible.

use serde::{Deserialize, Serialize};

/// EQ band filter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BandKind {
    LowShelf,
    #[default]
    Peaking,
    HighShelf,
}

/// One parametric EQ band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBandSettings {
    /// Center/corner frequency in Hz
    pub frequency_hz: f64,
    /// Gain in dB (-24 to +24)
    pub gain_db: f64,
    /// Q factor (0.1 to 10), ignored for shelves
    pub q: f64,
    /// Filter kind
    #[serde(default)]
    pub kind: BandKind,
}

impl EqBandSettings {
    /// Peaking band
    pub fn peaking(frequency_hz: f64, gain_db: f64, q: f64) -> Self {
        Self {
            frequency_hz,
            gain_db,
            q,
            kind: BandKind::Peaking,
        }
    }

    /// Low shelf band
    pub fn low_shelf(frequency_hz: f64, gain_db: f64) -> Self {
        Self {
            frequency_hz,
            gain_db,
            q: 0.707,
            kind: BandKind::LowShelf,
        }
    }

    /// High shelf band
    pub fn high_shelf(frequency_hz: f64, gain_db: f64) -> Self {
        Self {
            frequency_hz,
            gain_db,
            q: 0.707,
            kind: BandKind::HighShelf,
        }
    }

    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.frequency_hz = self.frequency_hz.clamp(20.0, 20_000.0);
        self.gain_db = self.gain_db.clamp(-24.0, 24.0);
        self.q = self.q.clamp(0.1, 10.0);
    }
}

/// Parametric EQ settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EqSettings {
    /// Bands applied in order
    pub bands: Vec<EqBandSettings>,
}

impl EqSettings {
    /// Clamp all bands
    pub fn validate(&mut self) {
        for band in &mut self.bands {
            band.validate();
        }
    }
}

/// Dynamic EQ band mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DynamicEqMode {
    /// Reduce the band when it exceeds the threshold
    #[default]
    Compress,
    /// Boost the band when it falls below the threshold
    Expand,
}

/// One dynamic EQ band: a frequency-selective compressor/expander
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicEqBand {
    /// Center frequency in Hz
    pub frequency_hz: f64,
    /// Q factor for the band isolation filter
    pub q: f64,
    /// Threshold in dB the band level is keyed against
    pub threshold_db: f64,
    /// Ratio (1 to 20)
    pub ratio: f64,
    /// Attack time in ms
    pub attack_ms: f64,
    /// Release time in ms
    pub release_ms: f64,
    /// Compress or expand
    #[serde(default)]
    pub mode: DynamicEqMode,
    /// Maximum gain change applied to the band, in dB
    pub max_gain_db: f64,
}

impl DynamicEqBand {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.frequency_hz = self.frequency_hz.clamp(20.0, 20_000.0);
        self.q = self.q.clamp(0.1, 10.0);
        self.threshold_db = self.threshold_db.clamp(-60.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.attack_ms = self.attack_ms.clamp(0.1, 100.0);
        self.release_ms = self.release_ms.clamp(10.0, 1000.0);
        self.max_gain_db = self.max_gain_db.clamp(0.0, 24.0);
    }
}

/// Dynamic EQ settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DynamicEqSettings {
    /// Independent keyed bands
    pub bands: Vec<DynamicEqBand>,
}

impl DynamicEqSettings {
    /// Clamp all bands
    pub fn validate(&mut self) {
        for band in &mut self.bands {
            band.validate();
        }
    }
}

/// Compressor parameters for one multiband band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandCompressorSettings {
    /// Threshold in dB
    pub threshold_db: f64,
    /// Ratio (1 to 20)
    pub ratio: f64,
    /// Attack time in ms
    pub attack_ms: f64,
    /// Release time in ms
    pub release_ms: f64,
    /// Makeup gain in dB
    pub makeup_db: f64,
}

impl BandCompressorSettings {
    /// Neutral band (1:1, no makeup)
    pub fn neutral() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_ms: 5.0,
            release_ms: 100.0,
            makeup_db: 0.0,
        }
    }

    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-60.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.attack_ms = self.attack_ms.clamp(0.1, 100.0);
        self.release_ms = self.release_ms.clamp(10.0, 1000.0);
        self.makeup_db = self.makeup_db.clamp(0.0, 24.0);
    }
}

/// Multiband compressor settings: crossover split, one compressor per
/// band, recombine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultibandSettings {
    /// Low/mid crossover in Hz
    pub low_crossover_hz: f64,
    /// Mid/high crossover in Hz
    pub high_crossover_hz: f64,
    /// Low band compressor
    pub low: BandCompressorSettings,
    /// Mid band compressor
    pub mid: BandCompressorSettings,
    /// High band compressor
    pub high: BandCompressorSettings,
}

impl Default for MultibandSettings {
    fn default() -> Self {
        Self {
            low_crossover_hz: 200.0,
            high_crossover_hz: 4000.0,
            low: BandCompressorSettings::neutral(),
            mid: BandCompressorSettings::neutral(),
            high: BandCompressorSettings::neutral(),
        }
    }
}

impl MultibandSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.low_crossover_hz = self.low_crossover_hz.clamp(40.0, 1000.0);
        self.high_crossover_hz = self
            .high_crossover_hz
            .clamp(self.low_crossover_hz * 2.0, 12_000.0);
        self.low.validate();
        self.mid.validate();
        self.high.validate();
    }
}

/// Transient shaper settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TransientSettings {
    /// Gain applied to attack portions, in dB (-12 to +12)
    pub attack_gain_db: f64,
    /// Gain applied to sustain portions, in dB (-12 to +12)
    pub sustain_gain_db: f64,
}

impl TransientSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.attack_gain_db = self.attack_gain_db.clamp(-12.0, 12.0);
        self.sustain_gain_db = self.sustain_gain_db.clamp(-12.0, 12.0);
    }
}

/// De-esser settings: frequency-targeted dynamic reduction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeEsserSettings {
    /// Sibilance corner frequency in Hz
    pub frequency_hz: f64,
    /// Threshold in dB the sibilance band is keyed against
    pub threshold_db: f64,
    /// Ratio (1 to 20)
    pub ratio: f64,
}

impl Default for DeEsserSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 6000.0,
            threshold_db: -24.0,
            ratio: 4.0,
        }
    }
}

impl DeEsserSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.frequency_hz = self.frequency_hz.clamp(2000.0, 16_000.0);
        self.threshold_db = self.threshold_db.clamp(-60.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
    }
}

/// Saturation flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaturationKind {
    #[default]
    Tape,
    Tube,
    Digital,
}

/// Saturation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationSettings {
    /// Nonlinearity flavor
    #[serde(default)]
    pub kind: SaturationKind,
    /// Drive amount, 0..1
    pub amount: f64,
    /// Dry/wet mix, 0 = dry only, 1 = wet only
    pub mix: f64,
}

impl Default for SaturationSettings {
    fn default() -> Self {
        Self {
            kind: SaturationKind::Tape,
            amount: 0.3,
            mix: 1.0,
        }
    }
}

impl SaturationSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.amount = self.amount.clamp(0.0, 1.0);
        self.mix = self.mix.clamp(0.0, 1.0);
    }
}

/// Motion reverb settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionReverbSettings {
    /// Tail decay time in seconds (time to fall 60 dB)
    pub decay_s: f64,
    /// Pre-delay in ms before the first reflection
    pub pre_delay_ms: f64,
    /// Dry/wet mix, 0 = dry only, 1 = wet only
    pub wet: f64,
    /// Modulation depth of the tail tap positions, 0..1
    pub motion_depth: f64,
    /// Modulation rate in Hz; when `tempo_bpm` is set the rate locks to
    /// one cycle per bar instead
    pub motion_rate_hz: f64,
    /// Tempo for bar-locked modulation, if known
    #[serde(default)]
    pub tempo_bpm: Option<f64>,
    /// Ducking amount tied to the input envelope, 0..1
    #[serde(default)]
    pub duck: f64,
}

impl Default for MotionReverbSettings {
    fn default() -> Self {
        Self {
            decay_s: 1.2,
            pre_delay_ms: 20.0,
            wet: 0.25,
            motion_depth: 0.2,
            motion_rate_hz: 0.5,
            tempo_bpm: None,
            duck: 0.0,
        }
    }
}

impl MotionReverbSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.decay_s = self.decay_s.clamp(0.1, 12.0);
        self.pre_delay_ms = self.pre_delay_ms.clamp(0.0, 250.0);
        self.wet = self.wet.clamp(0.0, 1.0);
        self.motion_depth = self.motion_depth.clamp(0.0, 1.0);
        self.motion_rate_hz = self.motion_rate_hz.clamp(0.05, 8.0);
        self.duck = self.duck.clamp(0.0, 1.0);
    }
}

/// Stereo imager settings: per-band width via mid/side scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagerSettings {
    /// Width of the low band (0 = mono, 1 = unchanged, 2 = double)
    pub low_width: f64,
    /// Width of the mid band
    pub mid_width: f64,
    /// Width of the high band
    pub high_width: f64,
    /// Low/mid crossover in Hz
    pub low_crossover_hz: f64,
    /// Mid/high crossover in Hz
    pub high_crossover_hz: f64,
}

impl Default for ImagerSettings {
    fn default() -> Self {
        Self {
            low_width: 1.0,
            mid_width: 1.0,
            high_width: 1.0,
            low_crossover_hz: 200.0,
            high_crossover_hz: 4000.0,
        }
    }
}

impl ImagerSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.low_width = self.low_width.clamp(0.0, 2.0);
        self.mid_width = self.mid_width.clamp(0.0, 2.0);
        self.high_width = self.high_width.clamp(0.0, 2.0);
        self.low_crossover_hz = self.low_crossover_hz.clamp(40.0, 1000.0);
        self.high_crossover_hz = self
            .high_crossover_hz
            .clamp(self.low_crossover_hz * 2.0, 12_000.0);
    }
}

/// Gate/expander settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateSettings {
    /// Threshold in dB below which expansion kicks in
    pub threshold_db: f64,
    /// Expansion ratio (1 to 20; high values act as a gate)
    pub ratio: f64,
    /// Attack time in ms (gain recovery when signal returns)
    pub attack_ms: f64,
    /// Release time in ms (fade into attenuation)
    pub release_ms: f64,
    /// Maximum attenuation in dB
    pub range_db: f64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            threshold_db: -50.0,
            ratio: 4.0,
            attack_ms: 1.0,
            release_ms: 100.0,
            range_db: 60.0,
        }
    }
}

impl GateSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-80.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.attack_ms = self.attack_ms.clamp(0.1, 100.0);
        self.release_ms = self.release_ms.clamp(5.0, 1000.0);
        self.range_db = self.range_db.clamp(0.0, 90.0);
    }
}

/// True-peak limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimiterSettings {
    /// Output ceiling in dBTP (always negative)
    pub ceiling_db: f64,
    /// Release time in ms
    pub release_ms: f64,
    /// Lookahead in ms
    pub lookahead_ms: f64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            ceiling_db: -1.0,
            release_ms: 100.0,
            lookahead_ms: 1.5,
        }
    }
}

impl LimiterSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.ceiling_db = self.ceiling_db.clamp(-12.0, 0.0);
        self.release_ms = self.release_ms.clamp(10.0, 1000.0);
        self.lookahead_ms = self.lookahead_ms.clamp(0.5, 10.0);
    }
}

/// Soft clipper settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipperSettings {
    /// Clip threshold in dB
    pub threshold_db: f64,
    /// Softness of the knee, 0 = hard clip, 1 = fully rounded
    pub softness: f64,
}

impl Default for ClipperSettings {
    fn default() -> Self {
        Self {
            threshold_db: -0.3,
            softness: 0.5,
        }
    }
}

impl ClipperSettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-12.0, 0.0);
        self.softness = self.softness.clamp(0.0, 1.0);
    }
}

/// Send-bus feedback delay settings (bus effect; not part of the
/// mastering stage order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusDelaySettings {
    /// Echo time in ms
    pub delay_ms: f64,
    /// Feedback amount, 0..0.95
    pub feedback: f64,
}

impl Default for BusDelaySettings {
    fn default() -> Self {
        Self {
            delay_ms: 375.0,
            feedback: 0.35,
        }
    }
}

impl BusDelaySettings {
    /// Clamp values into their legal ranges
    pub fn validate(&mut self) {
        self.delay_ms = self.delay_ms.clamp(10.0, 2000.0);
        self.feedback = self.feedback.clamp(0.0, 0.95);
    }
}

/// Full processing configuration
///
/// One optional field per stage, applied in the fixed documented order
/// (see [`crate::ProcessingChain`]). `ProcessingConfig::default()` is
/// the all-bypass configuration: applying it returns a bit-identical
/// buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProcessingConfig {
    pub eq: Option<EqSettings>,
    pub dynamic_eq: Option<DynamicEqSettings>,
    pub multiband: Option<MultibandSettings>,
    pub transient: Option<TransientSettings>,
    pub deesser: Option<DeEsserSettings>,
    pub saturation: Option<SaturationSettings>,
    pub reverb: Option<MotionReverbSettings>,
    pub imager: Option<ImagerSettings>,
    pub gate: Option<GateSettings>,
    pub limiter: Option<LimiterSettings>,
    pub clipper: Option<ClipperSettings>,
}

impl ProcessingConfig {
    /// True when every stage is absent (the all-bypass default)
    pub fn is_bypass(&self) -> bool {
        self == &Self::default()
    }

    /// Clamp every present stage's values into their legal ranges
    pub fn validate(&mut self) {
        if let Some(eq) = &mut self.eq {
            eq.validate();
        }
        if let Some(dynamic_eq) = &mut self.dynamic_eq {
            dynamic_eq.validate();
        }
        if let Some(multiband) = &mut self.multiband {
            multiband.validate();
        }
        if let Some(transient) = &mut self.transient {
            transient.validate();
        }
        if let Some(deesser) = &mut self.deesser {
            deesser.validate();
        }
        if let Some(saturation) = &mut self.saturation {
            saturation.validate();
        }
        if let Some(reverb) = &mut self.reverb {
            reverb.validate();
        }
        if let Some(imager) = &mut self.imager {
            imager.validate();
        }
        if let Some(gate) = &mut self.gate {
            gate.validate();
        }
        if let Some(limiter) = &mut self.limiter {
            limiter.validate();
        }
        if let Some(clipper) = &mut self.clipper {
            clipper.validate();
        }
    }
}
