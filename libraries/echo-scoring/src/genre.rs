//! Genre loudness/dynamics targets

use serde::{Deserialize, Serialize};

/// Supported style presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreStyle {
    Trap,
    Synthwave,
    Rock,
    Ambient,
}

/// Loudness and dynamics targets for one genre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    /// Style the targets belong to
    pub style: GenreStyle,
    /// Target integrated loudness in LUFS
    pub target_lufs: f64,
    /// Target loudness range in LU
    pub target_lra: f64,
    /// Typical tempo range in BPM
    pub bpm_range: (f32, f32),
}

impl GenreProfile {
    /// Targets for a style
    pub fn for_style(style: GenreStyle) -> Self {
        match style {
            GenreStyle::Trap => Self {
                style,
                target_lufs: -9.0,
                target_lra: 4.0,
                bpm_range: (130.0, 170.0),
            },
            GenreStyle::Synthwave => Self {
                style,
                target_lufs: -11.0,
                target_lra: 6.0,
                bpm_range: (80.0, 118.0),
            },
            GenreStyle::Rock => Self {
                style,
                target_lufs: -9.5,
                target_lra: 5.0,
                bpm_range: (100.0, 160.0),
            },
            GenreStyle::Ambient => Self {
                style,
                target_lufs: -16.0,
                target_lra: 9.0,
                bpm_range: (60.0, 100.0),
            },
        }
    }

    /// True when a tempo sits inside the genre's typical range
    pub fn bpm_in_range(&self, bpm: f32) -> bool {
        bpm >= self.bpm_range.0 && bpm <= self.bpm_range.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_is_quieter_and_wider_than_trap() {
        let trap = GenreProfile::for_style(GenreStyle::Trap);
        let ambient = GenreProfile::for_style(GenreStyle::Ambient);
        assert!(ambient.target_lufs < trap.target_lufs);
        assert!(ambient.target_lra > trap.target_lra);
    }

    #[test]
    fn bpm_range_check() {
        let trap = GenreProfile::for_style(GenreStyle::Trap);
        assert!(trap.bpm_in_range(150.0));
        assert!(!trap.bpm_in_range(90.0));
    }
}
