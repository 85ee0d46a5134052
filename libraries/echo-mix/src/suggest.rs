//! Mix level suggestions from a reference analysis
//!
//! Maps the reference's character and detected effects onto a starting
//! point per stem role: fader volume, pan and send levels. These are
//! suggestions for the UI to offer, not state the engine applies on its
//! own.

use echo_analysis::{EnergyCharacter, ReferenceAnalysis, SpaceCharacter};
use echo_core::StemRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suggested mix parameters for one stem role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StemSuggestion {
    /// Fader volume in dB
    pub volume_db: f64,
    /// Pan position in [-1, 1]
    pub pan: f64,
    /// Reverb send in [0, 1]
    pub reverb_send: f64,
    /// Delay send in [0, 1]
    pub delay_send: f64,
}

const ALL_ROLES: [StemRole; 9] = [
    StemRole::LeadVocal,
    StemRole::BackgroundVocal,
    StemRole::Adlibs,
    StemRole::Beat,
    StemRole::Bass,
    StemRole::Drums,
    StemRole::Melody,
    StemRole::Fx,
    StemRole::Other,
];

/// Build a role -> suggestion table from a reference analysis
pub fn suggest_mix_levels(analysis: &ReferenceAnalysis) -> BTreeMap<StemRole, StemSuggestion> {
    let mut table = BTreeMap::new();
    for role in ALL_ROLES {
        table.insert(role, suggest_for_role(role, analysis));
    }
    table
}

fn suggest_for_role(role: StemRole, analysis: &ReferenceAnalysis) -> StemSuggestion {
    let mut suggestion = baseline(role);

    // Space: a wetter reference pulls the sends up, most strongly on
    // background material
    let space_factor = match analysis.character.space {
        SpaceCharacter::Dry => 0.2,
        SpaceCharacter::Roomy => 0.6,
        SpaceCharacter::Spacious => 1.0,
    };
    suggestion.reverb_send *= space_factor;
    if analysis.reverb.detected {
        // Scale toward the reference's wet balance
        let wet = analysis.reverb.wet_dry_ratio.clamp(0.0, 0.6);
        suggestion.reverb_send = (suggestion.reverb_send + wet * send_weight(role)).min(1.0);
    }

    // Delay: only suggested when the reference actually uses one
    if analysis.delay.detected {
        let depth = (analysis.delay.feedback + 0.1).clamp(0.0, 0.5);
        suggestion.delay_send = depth * send_weight(role);
    } else {
        suggestion.delay_send = 0.0;
    }

    // Energy: intense references ride the rhythm section harder
    match analysis.character.energy {
        EnergyCharacter::Intense => {
            if role.is_rhythm() {
                suggestion.volume_db += 1.0;
            }
        }
        EnergyCharacter::Subdued => {
            if role.is_rhythm() {
                suggestion.volume_db -= 1.0;
            }
        }
        EnergyCharacter::Moderate => {}
    }

    // A reference with audible kick ducking implies the bass should sit
    // under the lead elements a touch more
    if analysis.sidechain.detected && role == StemRole::Bass {
        suggestion.volume_db -= 1.0;
    }

    suggestion.volume_db = suggestion.volume_db.clamp(-24.0, 12.0);
    suggestion
}

/// Neutral starting points per role
fn baseline(role: StemRole) -> StemSuggestion {
    let (volume_db, pan, reverb_send) = match role {
        StemRole::LeadVocal => (0.0, 0.0, 0.15),
        StemRole::BackgroundVocal => (-5.0, 0.25, 0.35),
        StemRole::Adlibs => (-8.0, -0.4, 0.3),
        StemRole::Beat => (-1.5, 0.0, 0.05),
        StemRole::Bass => (-3.0, 0.0, 0.0),
        StemRole::Drums => (-1.0, 0.0, 0.1),
        StemRole::Melody => (-4.0, 0.15, 0.25),
        StemRole::Fx => (-9.0, -0.2, 0.4),
        StemRole::Other => (-6.0, 0.0, 0.15),
    };
    StemSuggestion {
        volume_db,
        pan,
        reverb_send,
        delay_send: 0.0,
    }
}

/// How strongly a role participates in send effects
fn send_weight(role: StemRole) -> f64 {
    match role {
        StemRole::LeadVocal => 0.5,
        StemRole::BackgroundVocal | StemRole::Adlibs | StemRole::Fx => 0.8,
        StemRole::Melody => 0.6,
        StemRole::Beat | StemRole::Drums | StemRole::Other => 0.2,
        StemRole::Bass => 0.0,
    }
}
