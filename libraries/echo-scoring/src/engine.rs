//! Scoring engine: five pillar evaluators and the composite report
//!
//! Each pillar is an independent, swappable rule evaluator with a fixed
//! maximum (25/20/25/20/10); the total is their sum clamped to [0, 100].
//! Verdict cut lines are product policy, carried as configurable
//! constants rather than hard invariants.

use crate::genre::GenreProfile;
use crate::report::{EchoReport, PillarScores, Verdict};
use crate::rules::recommended_actions;
use echo_analysis::ReferenceAnalysis;
use echo_core::AudioMetrics;

/// Verdict thresholds (product policy, configurable)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictPolicy {
    /// Total at or above this is release-ready
    pub release_ready: f64,
    /// Total at or above this (but below release-ready) has refinements
    /// available
    pub refinements: f64,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            release_ready: 80.0,
            refinements: 50.0,
        }
    }
}

/// Everything a pillar evaluator may look at
pub struct ScoreInput<'a> {
    /// Metrics of the raw material before processing
    pub before: &'a AudioMetrics,
    /// Metrics of the processed mix
    pub after: &'a AudioMetrics,
    /// Reference analysis, when a reference track was supplied
    pub reference: Option<&'a ReferenceAnalysis>,
    /// Genre targets, when a genre was selected
    pub genre: Option<&'a GenreProfile>,
}

/// One pillar's outcome
pub struct PillarOutcome {
    /// Points awarded, already clamped to the pillar maximum
    pub points: f64,
    /// Human-readable note for the report explanation
    pub note: String,
}

/// An independent, swappable pillar evaluator
pub trait PillarRule: Send + Sync {
    /// Pillar name
    fn name(&self) -> &'static str;
    /// Fixed maximum for this pillar
    fn max_points(&self) -> f64;
    /// Evaluate the pillar against one analysis run
    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome;
}

/// Composite scoring engine
pub struct ScoringEngine {
    policy: VerdictPolicy,
    recording_quality: Box<dyn PillarRule>,
    stem_quality: Box<dyn PillarRule>,
    genre_accuracy: Box<dyn PillarRule>,
    vocal_beat: Box<dyn PillarRule>,
    creative: Box<dyn PillarRule>,
}

impl ScoringEngine {
    /// Engine with the default pillar evaluators and policy
    pub fn new() -> Self {
        Self::with_policy(VerdictPolicy::default())
    }

    /// Engine with a custom verdict policy
    pub fn with_policy(policy: VerdictPolicy) -> Self {
        Self {
            policy,
            recording_quality: Box::new(RecordingQuality),
            stem_quality: Box::new(StemQuality),
            genre_accuracy: Box::new(GenreAccuracy),
            vocal_beat: Box::new(VocalBeatRelationship),
            creative: Box::new(CreativeExcellence),
        }
    }

    /// Score one analysis run into a fresh report
    pub fn score(
        &self,
        before: &AudioMetrics,
        after: &AudioMetrics,
        reference: Option<&ReferenceAnalysis>,
        genre: Option<&GenreProfile>,
    ) -> EchoReport {
        let input = ScoreInput {
            before,
            after,
            reference,
            genre,
        };

        let pillars = [
            &self.recording_quality,
            &self.stem_quality,
            &self.genre_accuracy,
            &self.vocal_beat,
            &self.creative,
        ];
        let mut outcomes = Vec::with_capacity(pillars.len());
        let mut explanation = Vec::with_capacity(pillars.len());
        for pillar in pillars {
            let outcome = pillar.evaluate(&input);
            let points = outcome.points.clamp(0.0, pillar.max_points());
            explanation.push(format!(
                "{}: {:.1}/{} - {}",
                pillar.name(),
                points,
                pillar.max_points(),
                outcome.note
            ));
            outcomes.push(points);
        }

        let score = PillarScores {
            recording_quality: outcomes[0],
            stem_quality: outcomes[1],
            genre_accuracy: outcomes[2],
            vocal_beat_relationship: outcomes[3],
            creative_excellence: outcomes[4],
            total: outcomes.iter().sum::<f64>().clamp(0.0, 100.0),
        };

        let verdict = if score.total >= self.policy.release_ready {
            Verdict::ReleaseReady
        } else if score.total >= self.policy.refinements {
            Verdict::RefinementsAvailable
        } else {
            Verdict::NeedsWork
        };

        let confidence = confidence(&input);
        let summary = summary_line(verdict, score.total, &input);
        let recommended = recommended_actions(&input);

        tracing::info!(total = score.total, ?verdict, confidence, "scoring complete");

        EchoReport {
            verdict,
            confidence,
            score,
            summary,
            explanation,
            recommended_actions: recommended,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence starts high and is eroded by degenerate or missing inputs
fn confidence(input: &ScoreInput<'_>) -> f64 {
    let mut confidence: f64 = 0.9;
    if input.after.is_silent() {
        confidence -= 0.4;
    }
    if input.before.is_silent() {
        confidence -= 0.2;
    }
    if input.after.lufs.is_none() {
        confidence -= 0.1;
    }
    if input.reference.is_none() {
        confidence -= 0.1;
    }
    if input.genre.is_none() {
        confidence -= 0.1;
    }
    confidence.clamp(0.1, 1.0)
}

fn summary_line(verdict: Verdict, total: f64, input: &ScoreInput<'_>) -> String {
    if input.after.is_silent() {
        return "Insufficient signal to judge this mix - the rendered output is silent."
            .to_string();
    }
    match verdict {
        Verdict::ReleaseReady => {
            format!("Scored {total:.0}/100 - this master is ready to ship.")
        }
        Verdict::RefinementsAvailable => {
            format!("Scored {total:.0}/100 - solid foundation with refinements available.")
        }
        Verdict::NeedsWork => {
            format!("Scored {total:.0}/100 - the mix needs work before release.")
        }
    }
}

// --- Default pillar evaluators -----------------------------------------

/// Crest factor window that reads as a healthy master
const HEALTHY_CREST_DB: (f64, f64) = (6.0, 14.0);

struct RecordingQuality;

impl PillarRule for RecordingQuality {
    fn name(&self) -> &'static str {
        "Recording quality"
    }

    fn max_points(&self) -> f64 {
        25.0
    }

    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome {
        if input.after.is_silent() {
            return PillarOutcome {
                points: 2.0,
                note: "no measurable signal".to_string(),
            };
        }
        let mut points = 25.0;
        let mut notes = Vec::new();

        if let Some(true_peak) = input.after.true_peak_dbtp {
            if true_peak > -1.0 {
                points -= 6.0;
                notes.push("true peak above the -1 dBTP streaming ceiling");
            }
        } else if input.after.peak_db > -0.3 {
            points -= 4.0;
            notes.push("sample peak close to full scale");
        }

        let crest = input.after.crest_factor_db;
        if crest < HEALTHY_CREST_DB.0 {
            points -= 5.0;
            notes.push("crushed dynamics (very low crest factor)");
        } else if crest > 20.0 {
            points -= 3.0;
            notes.push("unprocessed dynamics (very high crest factor)");
        }

        PillarOutcome {
            points,
            note: if notes.is_empty() {
                "clean levels with headroom".to_string()
            } else {
                notes.join("; ")
            },
        }
    }
}

struct StemQuality;

impl PillarRule for StemQuality {
    fn name(&self) -> &'static str {
        "Stem quality"
    }

    fn max_points(&self) -> f64 {
        20.0
    }

    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome {
        if input.before.is_silent() {
            return PillarOutcome {
                points: 4.0,
                note: "source material carried no signal".to_string(),
            };
        }
        let mut points = 20.0;
        let mut notes = Vec::new();

        if input.before.peak_db > -0.1 {
            points -= 6.0;
            notes.push("source stems arrived already at full scale");
        }
        if input.before.crest_factor_db < 4.0 {
            points -= 5.0;
            notes.push("source stems were pre-crushed");
        }

        PillarOutcome {
            points,
            note: if notes.is_empty() {
                "healthy source material".to_string()
            } else {
                notes.join("; ")
            },
        }
    }
}

struct GenreAccuracy;

impl PillarRule for GenreAccuracy {
    fn name(&self) -> &'static str {
        "Genre accuracy"
    }

    fn max_points(&self) -> f64 {
        25.0
    }

    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome {
        let Some(genre) = input.genre else {
            // No target selected: neutral 70% so the pillar neither
            // rewards nor punishes
            return PillarOutcome {
                points: 17.5,
                note: "no genre target selected".to_string(),
            };
        };
        let Some(lufs) = input.after.lufs else {
            return PillarOutcome {
                points: 10.0,
                note: "loudness not measured".to_string(),
            };
        };
        if !lufs.integrated.is_finite() {
            return PillarOutcome {
                points: 2.0,
                note: "no measurable loudness".to_string(),
            };
        }

        let mut points = 25.0;
        let mut notes = Vec::new();

        let loudness_miss = (lufs.integrated - genre.target_lufs).abs();
        if loudness_miss > 1.0 {
            points -= ((loudness_miss - 1.0) * 2.5).min(15.0);
            notes.push(format!(
                "integrated loudness {:.1} LUFS vs the {:.1} LUFS target",
                lufs.integrated, genre.target_lufs
            ));
        }
        let lra_miss = (lufs.range - genre.target_lra).abs();
        if lra_miss > 2.0 {
            points -= ((lra_miss - 2.0) * 1.5).min(8.0);
            notes.push(format!(
                "loudness range {:.1} LU vs the {:.1} LU target",
                lufs.range, genre.target_lra
            ));
        }

        PillarOutcome {
            points,
            note: if notes.is_empty() {
                format!("on target for {:?}", genre.style)
            } else {
                notes.join("; ")
            },
        }
    }
}

struct VocalBeatRelationship;

impl PillarRule for VocalBeatRelationship {
    fn name(&self) -> &'static str {
        "Vocal/beat relationship"
    }

    fn max_points(&self) -> f64 {
        20.0
    }

    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome {
        if input.after.is_silent() {
            return PillarOutcome {
                points: 2.0,
                note: "no measurable signal".to_string(),
            };
        }
        let mut points = 12.0;
        let mut notes = Vec::new();

        let crest = input.after.crest_factor_db;
        if (HEALTHY_CREST_DB.0..=HEALTHY_CREST_DB.1).contains(&crest) {
            points += 4.0;
            notes.push("vocal sits with room against the beat".to_string());
        } else {
            notes.push("level balance leaves little separation".to_string());
        }

        if let Some(reference) = input.reference {
            if reference.estimated_bpm.is_some() {
                points += 2.0;
            }
            if reference.sidechain.detected {
                // The reference pumps; movement in the mix suggests the
                // relationship was carried over
                let moved = input.after.lufs.is_some_and(|l| l.range >= 2.0);
                if moved {
                    points += 2.0;
                    notes.push("groove movement matches the reference".to_string());
                } else {
                    notes.push("reference pumps but the mix is static".to_string());
                }
            }
        }

        PillarOutcome {
            points,
            note: notes.join("; "),
        }
    }
}

struct CreativeExcellence;

impl PillarRule for CreativeExcellence {
    fn name(&self) -> &'static str {
        "Creative excellence"
    }

    fn max_points(&self) -> f64 {
        10.0
    }

    fn evaluate(&self, input: &ScoreInput<'_>) -> PillarOutcome {
        if input.after.is_silent() {
            return PillarOutcome {
                points: 1.0,
                note: "no measurable signal".to_string(),
            };
        }
        let mut points = 3.0;
        let mut notes = Vec::new();

        if let Some(lufs) = input.after.lufs {
            if lufs.range >= 3.0 {
                points += 3.0;
                notes.push("dynamic movement preserved".to_string());
            }
        }
        if input.after.true_peak_dbtp.is_some_and(|tp| tp <= -1.0) {
            points += 2.0;
            notes.push("clean true-peak headroom".to_string());
        }
        if input
            .reference
            .is_some_and(|r| r.reverb.detected || r.delay.detected)
        {
            points += 2.0;
            notes.push("reference space vocabulary available".to_string());
        }

        PillarOutcome {
            points,
            note: if notes.is_empty() {
                "functional but plain".to_string()
            } else {
                notes.join("; ")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::{LufsSummary, SampleBuffer};

    fn metrics(rms_db: f64, peak_db: f64, lufs: Option<LufsSummary>) -> AudioMetrics {
        AudioMetrics {
            rms_db,
            peak_db,
            crest_factor_db: peak_db - rms_db,
            lufs,
            true_peak_dbtp: lufs.map(|_| peak_db + 0.2),
        }
    }

    fn silent_metrics() -> AudioMetrics {
        AudioMetrics::measure(&SampleBuffer::silent(2, 1024, 44_100))
    }

    #[test]
    fn pillar_totals_respect_their_maxima() {
        let engine = ScoringEngine::new();
        let before = metrics(-18.0, -8.0, None);
        let after = metrics(
            -12.0,
            -2.0,
            Some(LufsSummary {
                integrated: -9.0,
                range: 4.0,
            }),
        );
        let report = engine.score(&before, &after, None, None);
        assert!(report.score.recording_quality <= 25.0);
        assert!(report.score.stem_quality <= 20.0);
        assert!(report.score.genre_accuracy <= 25.0);
        assert!(report.score.vocal_beat_relationship <= 20.0);
        assert!(report.score.creative_excellence <= 10.0);
        assert!((0.0..=100.0).contains(&report.score.total));
        let sum = report.score.recording_quality
            + report.score.stem_quality
            + report.score.genre_accuracy
            + report.score.vocal_beat_relationship
            + report.score.creative_excellence;
        assert!((report.score.total - sum).abs() < 1e-9);
    }

    #[test]
    fn silent_input_lowers_confidence_instead_of_failing() {
        let engine = ScoringEngine::new();
        let report = engine.score(&silent_metrics(), &silent_metrics(), None, None);
        assert_eq!(report.verdict, Verdict::NeedsWork);
        assert!(report.confidence < 0.5);
        assert!(report.summary.contains("Insufficient signal"));
    }

    #[test]
    fn verdict_policy_is_configurable() {
        let strict = ScoringEngine::with_policy(VerdictPolicy {
            release_ready: 99.0,
            refinements: 90.0,
        });
        let before = metrics(-18.0, -8.0, None);
        let after = metrics(
            -12.0,
            -2.0,
            Some(LufsSummary {
                integrated: -9.0,
                range: 4.0,
            }),
        );
        let report = strict.score(&before, &after, None, None);
        assert_eq!(report.verdict, Verdict::NeedsWork);
    }

    #[test]
    fn good_master_beats_crushed_master() {
        let engine = ScoringEngine::new();
        let before = metrics(-18.0, -8.0, None);
        let good = metrics(
            -11.0,
            -2.0,
            Some(LufsSummary {
                integrated: -9.2,
                range: 4.5,
            }),
        );
        // 2 dB of crest factor, loud and flat
        let crushed = metrics(
            -3.0,
            -1.0,
            Some(LufsSummary {
                integrated: -4.0,
                range: 1.0,
            }),
        );
        let genre = GenreProfile::for_style(crate::genre::GenreStyle::Trap);
        let good_report = engine.score(&before, &good, None, Some(&genre));
        let crushed_report = engine.score(&before, &crushed, None, Some(&genre));
        assert!(good_report.score.total > crushed_report.score.total);
    }

    #[test]
    fn report_serializes_for_the_wire() {
        let engine = ScoringEngine::new();
        let before = metrics(-18.0, -8.0, None);
        let after = metrics(-12.0, -2.0, None);
        let report = engine.score(&before, &after, None, None);
        let json = serde_json::to_string(&report).unwrap();
        let back: EchoReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
