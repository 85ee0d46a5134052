//! Stem model: one isolated component track of a mix

use crate::buffer::SampleBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stem identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StemId(String);

impl StemId {
    /// Create a stem ID from an existing string (e.g. supplied by the
    /// upload collaborator)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random stem ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Musical role of a stem within the mix
///
/// The separation collaborator emits vocals/drums/bass/other; finer
/// roles are assigned by the user or by detection heuristics upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemRole {
    LeadVocal,
    BackgroundVocal,
    Adlibs,
    Beat,
    Bass,
    Drums,
    Melody,
    Fx,
    Other,
}

impl StemRole {
    /// True for vocal-family roles
    pub fn is_vocal(self) -> bool {
        matches!(self, Self::LeadVocal | Self::BackgroundVocal | Self::Adlibs)
    }

    /// True for rhythm-section roles that anchor the low end
    pub fn is_rhythm(self) -> bool {
        matches!(self, Self::Beat | Self::Bass | Self::Drums)
    }
}

impl fmt::Display for StemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LeadVocal => "lead_vocal",
            Self::BackgroundVocal => "background_vocal",
            Self::Adlibs => "adlibs",
            Self::Beat => "beat",
            Self::Bass => "bass",
            Self::Drums => "drums",
            Self::Melody => "melody",
            Self::Fx => "fx",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Allowed stem volume range in dB
pub const STEM_VOLUME_MIN_DB: f64 = -24.0;
/// Allowed stem volume range in dB
pub const STEM_VOLUME_MAX_DB: f64 = 12.0;

/// One isolated component track, owned exclusively by its mix session
///
/// Created on upload/detection, mutated by UI-originated commands,
/// destroyed on removal. The audio buffer itself is immutable; mix
/// parameters (volume, pan, sends, mute, solo) are the mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stem {
    /// Unique identifier
    pub id: StemId,
    /// Display name
    pub name: String,
    /// Musical role
    pub role: StemRole,
    /// The stem's decoded audio
    pub buffer: SampleBuffer,
    /// Fader volume in dB, clamped to [-24, +12]
    volume_db: f64,
    /// Pan position, -1 (hard left) .. +1 (hard right)
    pan: f64,
    /// Reverb send level, 0..1
    reverb_send: f64,
    /// Delay send level, 0..1
    delay_send: f64,
    /// Muted flag
    pub muted: bool,
    /// Solo flag
    pub solo: bool,
}

impl Stem {
    /// Create a stem with neutral mix parameters
    pub fn new(id: StemId, name: impl Into<String>, role: StemRole, buffer: SampleBuffer) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            buffer,
            volume_db: 0.0,
            pan: 0.0,
            reverb_send: 0.0,
            delay_send: 0.0,
            muted: false,
            solo: false,
        }
    }

    /// Fader volume in dB
    pub fn volume_db(&self) -> f64 {
        self.volume_db
    }

    /// Set fader volume, clamped to [-24, +12] dB
    pub fn set_volume_db(&mut self, volume_db: f64) {
        self.volume_db = volume_db.clamp(STEM_VOLUME_MIN_DB, STEM_VOLUME_MAX_DB);
    }

    /// Pan position in [-1, 1]
    pub fn pan(&self) -> f64 {
        self.pan
    }

    /// Set pan, clamped to [-1, 1]
    pub fn set_pan(&mut self, pan: f64) {
        self.pan = pan.clamp(-1.0, 1.0);
    }

    /// Reverb send in [0, 1]
    pub fn reverb_send(&self) -> f64 {
        self.reverb_send
    }

    /// Set reverb send, clamped to [0, 1]
    pub fn set_reverb_send(&mut self, send: f64) {
        self.reverb_send = send.clamp(0.0, 1.0);
    }

    /// Delay send in [0, 1]
    pub fn delay_send(&self) -> f64 {
        self.delay_send
    }

    /// Set delay send, clamped to [0, 1]
    pub fn set_delay_send(&mut self, send: f64) {
        self.delay_send = send.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stem() -> Stem {
        Stem::new(
            StemId::new("stem-1"),
            "Lead",
            StemRole::LeadVocal,
            SampleBuffer::silent(2, 100, 44_100),
        )
    }

    #[test]
    fn volume_is_clamped() {
        let mut stem = test_stem();
        stem.set_volume_db(40.0);
        assert_eq!(stem.volume_db(), 12.0);
        stem.set_volume_db(-100.0);
        assert_eq!(stem.volume_db(), -24.0);
    }

    #[test]
    fn pan_and_sends_are_clamped() {
        let mut stem = test_stem();
        stem.set_pan(-3.0);
        assert_eq!(stem.pan(), -1.0);
        stem.set_reverb_send(1.5);
        assert_eq!(stem.reverb_send(), 1.0);
        stem.set_delay_send(-0.5);
        assert_eq!(stem.delay_send(), 0.0);
    }

    #[test]
    fn role_families() {
        assert!(StemRole::BackgroundVocal.is_vocal());
        assert!(StemRole::Bass.is_rhythm());
        assert!(!StemRole::Fx.is_vocal());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&StemRole::LeadVocal).unwrap();
        assert_eq!(json, "\"lead_vocal\"");
    }
}
